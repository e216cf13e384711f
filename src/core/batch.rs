use crate::domain::model::{BatchReport, Category, TargetOutcomes};
use crate::domain::ports::RegistryLookup;
use std::time::Duration;
use tokio::time::sleep;

/// Pause between category queries, applied regardless of outcome. This is
/// rate limiting against the upstream anti-bot controls, not retry backoff.
const QUERY_PAUSE: Duration = Duration::from_secs(2);

/// Walks the target × category matrix strictly in order, one request at a
/// time. Per-pair failures land in the report's failure set and never
/// abort the batch; a fully failed batch is still a completed run.
pub struct BatchRunner<Q: RegistryLookup> {
    querier: Q,
    pause: Duration,
}

impl<Q: RegistryLookup> BatchRunner<Q> {
    pub fn new(querier: Q) -> Self {
        Self::with_pause(querier, QUERY_PAUSE)
    }

    /// Pause override used by tests.
    pub fn with_pause(querier: Q, pause: Duration) -> Self {
        Self { querier, pause }
    }

    pub async fn run(&mut self, targets: &[String], categories: &[Category]) -> BatchReport {
        let mut report = BatchReport::default();
        let total = targets.len();

        for (idx, target) in targets.iter().enumerate() {
            report
                .table
                .insert(target.clone(), TargetOutcomes::default());
            tracing::info!("[{}/{}] querying {}", idx + 1, total, target);

            for &category in categories {
                match self.querier.lookup(target, category).await {
                    Ok(outcome) => {
                        report
                            .table
                            .entry(target.clone())
                            .or_default()
                            .record(category, outcome);
                    }
                    Err(e) => {
                        tracing::error!("❌ query failed [{}][{}]: {}", target, category, e);
                        report.failures.insert(target.clone());
                    }
                }
                sleep(self.pause).await;
            }

            self.log_target_summary(&report, target, categories);
        }

        report
    }

    fn log_target_summary(&self, report: &BatchReport, target: &str, categories: &[Category]) {
        if report.failures.contains(target) {
            tracing::error!("[failed] {}", target);
            return;
        }
        tracing::info!("[results] {}", target);
        if let Some(outcomes) = report.table.get(target) {
            for &category in categories {
                let joined = outcomes.joined(category);
                if joined.is_empty() {
                    tracing::info!("  {}: no registration", category);
                } else {
                    tracing::info!("  {}: {}", category, joined);
                }
            }
        }
    }
}
