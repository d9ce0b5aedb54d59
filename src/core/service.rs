use crate::core::aggregator::RatingAggregator;
use crate::core::concurrency::EngineConfig;
use crate::core::grouping::group_directions;
use crate::core::resolver::UniversitySetResolver;
use crate::domain::model::{AggregationResult, Direction, DirectionId, UniversityDirections};
use crate::domain::ports::{DirectionRepository, RatingSource, UniversityRepository, UserRepository};
use crate::utils::error::Result;
use std::sync::Arc;

/// Direction use cases: listings, selections and ratings of a user.
pub struct DirectionService<D, U, V>
where
    D: DirectionRepository + 'static,
    U: UserRepository,
    V: UniversityRepository,
{
    directions: Arc<D>,
    users: Arc<U>,
    universities: Arc<V>,
    aggregator: RatingAggregator,
    resolver: UniversitySetResolver,
}

impl<D, U, V> DirectionService<D, U, V>
where
    D: DirectionRepository + 'static,
    U: UserRepository,
    V: UniversityRepository,
{
    pub fn new(
        directions: Arc<D>,
        users: Arc<U>,
        universities: Arc<V>,
        source: Arc<dyn RatingSource>,
        config: EngineConfig,
    ) -> Self {
        let aggregator = RatingAggregator::new(source).with_limit(config.aggregation);
        let resolver = UniversitySetResolver::new(directions.clone()).with_limit(config.resolution);

        Self {
            directions,
            users,
            universities,
            aggregator,
            resolver,
        }
    }

    pub async fn get_by_id(&self, id: DirectionId) -> Result<Direction> {
        Ok(self.directions.get_by_id(id).await?)
    }

    pub async fn get_all(&self) -> Result<Vec<UniversityDirections>> {
        let directions = self.directions.get_all().await?;
        Ok(group_directions(directions))
    }

    pub async fn get_for_user(&self, user_id: u64) -> Result<Vec<UniversityDirections>> {
        let directions = self.directions.get_for_user(user_id).await?;
        Ok(group_directions(directions))
    }

    /// Loads the user's directions and national ID, then aggregates ratings.
    pub async fn get_for_user_with_rating(&self, user_id: u64) -> Result<AggregationResult> {
        let directions = self.directions.get_for_user(user_id).await.map_err(|e| {
            tracing::error!("Failed to load directions of user {}: {}", user_id, e);
            e
        })?;
        let national_id = self.users.get_national_id(user_id).await.map_err(|e| {
            tracing::error!("Failed to load national id of user {}: {}", user_id, e);
            e
        })?;

        Ok(self.aggregator.aggregate(&directions, &national_id).await?)
    }

    /// Replaces the user's direction selection and the derived university set.
    pub async fn set_for_user(&self, user_id: u64, direction_ids: &[DirectionId]) -> Result<()> {
        self.directions.clear(user_id).await?;
        self.directions.set_for_user(user_id, direction_ids).await?;

        let university_ids = self.resolver.resolve_universities(direction_ids).await;
        self.universities.clear(user_id).await?;
        self.universities.set_for_user(user_id, &university_ids).await?;

        tracing::info!(
            "Stored {} directions across {} universities for user {}",
            direction_ids.len(),
            university_ids.len(),
            user_id
        );
        Ok(())
    }
}
