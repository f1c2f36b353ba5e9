use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::SourceError;

/// Reads every line of a log file. Invalid UTF-8 is replaced rather than
/// rejected so one corrupt line cannot hide the rest of the file.
pub fn read_lines(path: &Path) -> Result<Vec<String>, SourceError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
        _ => SourceError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn splits_lines_and_strips_crlf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first\r\nsecond error\n\nlast").unwrap();

        let lines = read_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["first", "second error", "", "last"]);
    }

    #[test]
    fn empty_file_has_no_lines() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(read_lines(file.path()).unwrap().is_empty());
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ok\nerror \xff here\n").unwrap();

        let lines = read_lines(file.path()).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("error "));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_lines(&dir.path().join("production.log")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_lines(dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::Unreadable { .. }));
    }
}
