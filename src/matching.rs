//! Label matching against an ordered list of taxonomy names.
//!
//! Matching is case-insensitive. Fuzzy matching is bidirectional substring
//! containment and the first satisfying name in declared order wins, so
//! reordering a taxonomy can change which entry an ambiguous label lands on.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Contains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMatch {
    /// Position of the matched name in the candidate list.
    pub index: usize,
    pub kind: MatchKind,
}

/// Trims a raw label and treats an empty result as absent.
pub fn clean_label(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Full three-tier rule minus the fallback: exact match first, then the
/// first name that contains or is contained by the label.
pub fn match_label<'a, I>(label: &str, names: I) -> Option<LabelMatch>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let label = clean_label(Some(label))?;
    let folded = label.to_lowercase();
    let names = names.into_iter();

    names
        .clone()
        .position(|name| name.to_lowercase() == folded)
        .map(|index| LabelMatch {
            index,
            kind: MatchKind::Exact,
        })
        .or_else(|| contains_match(label, names))
}

/// Bidirectional substring containment, first match in declared order.
pub fn contains_match<'a, I>(label: &str, names: I) -> Option<LabelMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    let label = clean_label(Some(label))?;
    let folded = label.to_lowercase();

    names
        .into_iter()
        .position(|name| {
            let name = name.to_lowercase();
            !name.is_empty() && (folded.contains(&name) || name.contains(&folded))
        })
        .map(|index| LabelMatch {
            index,
            kind: MatchKind::Contains,
        })
}
