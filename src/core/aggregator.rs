use crate::core::concurrency::ConcurrencyLimit;
use crate::core::grouping::group_outcomes;
use crate::domain::model::{AggregationResult, Direction, DirectionOutcome, NationalId, ParsingOutcome};
use crate::domain::ports::RatingSource;
use crate::utils::error::AggregationError;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Queries the rating list of every direction concurrently and folds the
/// outcomes into one grouped, ordered result.
///
/// Any hard source error fails the whole call; a national ID missing from a
/// list is a regular all-zero row.
pub struct RatingAggregator {
    source: Arc<dyn RatingSource>,
    limit: ConcurrencyLimit,
}

impl RatingAggregator {
    pub fn new(source: Arc<dyn RatingSource>) -> Self {
        Self {
            source,
            limit: ConcurrencyLimit::Unbounded,
        }
    }

    pub fn with_limit(mut self, limit: ConcurrencyLimit) -> Self {
        self.limit = limit;
        self
    }

    pub async fn aggregate(
        &self,
        directions: &[Direction],
        national_id: &NationalId,
    ) -> Result<AggregationResult, AggregationError> {
        if directions.is_empty() {
            return Ok(AggregationResult::default());
        }

        let expected = directions.len();
        tracing::info!("🚀 Aggregating {} rating lists", expected);

        // Each task writes exactly once to one of the two channels, so a capacity
        // of `expected` means try_send can never hit a full buffer.
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<DirectionOutcome>(expected);
        let (error_tx, mut error_rx) = mpsc::channel::<AggregationError>(expected);
        let limiter = self.limit.limiter();

        let mut handles = Vec::with_capacity(expected);
        for direction in directions.iter().cloned() {
            let direction_id = direction.id;
            let source = Arc::clone(&self.source);
            let national_id = national_id.clone();
            let limiter = limiter.clone();
            let outcome_tx = outcome_tx.clone();
            let error_tx = error_tx.clone();

            let handle = tokio::spawn(async move {
                let _permit = limiter.acquire().await;
                tracing::debug!(
                    direction_id = %direction.id,
                    university = %direction.university_name,
                    "Fetching rating list {}",
                    direction.url
                );

                let result = source
                    .fetch(&direction.university_name, &direction.url, &national_id)
                    .await;

                match ParsingOutcome::from(result) {
                    ParsingOutcome::Found(record) => {
                        let _ = outcome_tx.try_send(DirectionOutcome::found(direction, record));
                    }
                    ParsingOutcome::NotFound => {
                        tracing::debug!(direction_id = %direction.id, "National id is not listed");
                        let _ = outcome_tx.try_send(DirectionOutcome::not_found(direction));
                    }
                    ParsingOutcome::Error(err) => {
                        tracing::warn!(
                            direction_id = %direction.id,
                            "Rating list lookup failed: {}",
                            err
                        );
                        let _ = error_tx.try_send(AggregationError::Source {
                            direction_id: direction.id,
                            university: direction.university_name,
                            source: err,
                        });
                    }
                }
            });

            handles.push((direction_id, handle));
        }
        drop(outcome_tx);
        drop(error_tx);

        // Join everything before looking at results; nothing is cancelled early.
        let mut task_failure = None;
        for (direction_id, handle) in handles {
            if let Err(join_error) = handle.await {
                task_failure.get_or_insert(AggregationError::TaskFailed {
                    direction_id,
                    message: join_error.to_string(),
                });
            }
        }

        if let Ok(error) = error_rx.try_recv() {
            return Err(error);
        }
        if let Some(error) = task_failure {
            return Err(error);
        }

        let mut outcomes = Vec::with_capacity(expected);
        while let Ok(outcome) = outcome_rx.try_recv() {
            outcomes.push(outcome);
        }
        if outcomes.len() != expected {
            return Err(AggregationError::IncompleteFanIn {
                expected,
                received: outcomes.len(),
            });
        }

        let result = group_outcomes(outcomes);
        tracing::info!(
            "✅ Aggregated {} directions across {} universities",
            result.direction_count(),
            result.groups.len()
        );
        Ok(result)
    }
}
