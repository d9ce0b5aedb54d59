use crate::core::concurrency::ConcurrencyLimit;
use crate::domain::model::{DirectionId, UniversityId};
use crate::domain::ports::DirectionResolver;
use dashmap::DashSet;
use std::sync::Arc;

/// Maps direction ids to the set of universities that own them.
pub struct UniversitySetResolver {
    resolver: Arc<dyn DirectionResolver>,
    limit: ConcurrencyLimit,
}

impl UniversitySetResolver {
    pub fn new(resolver: Arc<dyn DirectionResolver>) -> Self {
        Self {
            resolver,
            limit: ConcurrencyLimit::Unbounded,
        }
    }

    pub fn with_limit(mut self, limit: ConcurrencyLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Resolves every direction concurrently and returns the distinct owners.
    ///
    /// A direction that fails to resolve is skipped: it contributes nothing and
    /// does not fail the call. Order of the returned ids is unspecified.
    pub async fn resolve_universities(&self, direction_ids: &[DirectionId]) -> Vec<UniversityId> {
        let universities = Arc::new(DashSet::new());
        let limiter = self.limit.limiter();

        let mut handles = Vec::with_capacity(direction_ids.len());
        for &direction_id in direction_ids {
            let resolver = Arc::clone(&self.resolver);
            let universities = Arc::clone(&universities);
            let limiter = limiter.clone();

            handles.push(tokio::spawn(async move {
                let _permit = limiter.acquire().await;
                match resolver.owning_university(direction_id).await {
                    Ok(university_id) => {
                        universities.insert(university_id);
                    }
                    Err(e) => {
                        tracing::warn!(
                            direction_id = %direction_id,
                            "Skipping direction without owning university: {}",
                            e
                        );
                    }
                }
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("University resolution task failed: {}", e);
            }
        }

        let resolved: Vec<UniversityId> = universities.iter().map(|id| *id).collect();
        tracing::debug!(
            "Resolved {} directions to {} universities",
            direction_ids.len(),
            resolved.len()
        );
        resolved
    }
}
