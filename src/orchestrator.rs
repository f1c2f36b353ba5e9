use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use crate::error::ClassifyError;
use crate::normalizer::{degraded, normalize};
use crate::taxonomy::TaxonomyRegistry;
use crate::types::{CandidateError, NormalizedRecord, RawJudgment};

pub const DEFAULT_BATCH_SIZE: usize = 5;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Upper bound on classification calls in flight at once.
    pub batch_size: usize,
    /// Per-call limit. Expiry is treated like any other call failure.
    pub call_timeout: Option<Duration>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            call_timeout: None,
        }
    }
}

/// Drives classification over candidates in fixed-size batches.
///
/// Every call in a batch is issued at once and the next batch only starts
/// after all of them settle. Output order equals input order no matter how
/// the calls complete, and a failed call becomes a degraded record instead
/// of failing the run.
pub struct Orchestrator<'a> {
    registry: &'a TaxonomyRegistry,
    config: BatchConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a TaxonomyRegistry, config: BatchConfig) -> Self {
        Self { registry, config }
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    pub async fn run<F, Fut>(&self, candidates: Vec<CandidateError>, classify: F) -> Vec<NormalizedRecord>
    where
        F: Fn(CandidateError) -> Fut,
        Fut: Future<Output = Result<RawJudgment, ClassifyError>>,
    {
        if candidates.is_empty() {
            info!("no candidate errors to classify");
            return Vec::new();
        }

        let batch_size = self.batch_size();
        let batches = candidates.len().div_ceil(batch_size);
        info!(
            candidates = candidates.len(),
            batch_size,
            batches,
            "classifying candidate errors"
        );

        let mut records = Vec::with_capacity(candidates.len());
        for (n, batch) in candidates.chunks(batch_size).enumerate() {
            let settled = join_all(
                batch
                    .iter()
                    .map(|candidate| self.classify_one(candidate.clone(), &classify)),
            )
            .await;
            records.extend(settled);
            info!(batch = n + 1, batches, classified = records.len(), "batch settled");
        }

        records
    }

    async fn classify_one<F, Fut>(&self, candidate: CandidateError, classify: &F) -> NormalizedRecord
    where
        F: Fn(CandidateError) -> Fut,
        Fut: Future<Output = Result<RawJudgment, ClassifyError>>,
    {
        let call = classify(candidate.clone());
        let outcome = match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(ClassifyError::Timeout(limit))),
            None => call.await,
        };

        match outcome {
            Ok(raw) => normalize(candidate, &raw, self.registry),
            Err(e) => {
                warn!(line = candidate.line_number, error = %e, "classification failed");
                degraded(candidate, self.registry)
            }
        }
    }
}
