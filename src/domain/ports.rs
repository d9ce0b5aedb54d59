use crate::domain::model::{Direction, DirectionId, NationalId, RatingRecord, University, UniversityId};
use crate::utils::error::{RepositoryError, SourceError};
use async_trait::async_trait;

/// Looks up an applicant in the rating list published for one direction.
///
/// `Err(SourceError::NotListed)` means the list was read but the national ID is
/// absent; every other error is a hard failure of that lookup.
#[async_trait]
pub trait RatingSource: Send + Sync {
    async fn fetch(
        &self,
        university_name: &str,
        direction_url: &str,
        national_id: &NationalId,
    ) -> Result<RatingRecord, SourceError>;
}

#[async_trait]
pub trait DirectionResolver: Send + Sync {
    async fn owning_university(&self, direction_id: DirectionId) -> Result<UniversityId, RepositoryError>;
}

#[async_trait]
pub trait DirectionRepository: DirectionResolver {
    async fn get_by_id(&self, id: DirectionId) -> Result<Direction, RepositoryError>;
    async fn get_all(&self) -> Result<Vec<Direction>, RepositoryError>;
    async fn get_for_user(&self, user_id: u64) -> Result<Vec<Direction>, RepositoryError>;
    async fn set_for_user(&self, user_id: u64, direction_ids: &[DirectionId]) -> Result<(), RepositoryError>;
    async fn clear(&self, user_id: u64) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_national_id(&self, user_id: u64) -> Result<NationalId, RepositoryError>;
}

#[async_trait]
pub trait UniversityRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<University>, RepositoryError>;
    async fn get_for_user(&self, user_id: u64) -> Result<Vec<University>, RepositoryError>;
    async fn set_for_user(&self, user_id: u64, university_ids: &[UniversityId]) -> Result<(), RepositoryError>;
    async fn clear(&self, user_id: u64) -> Result<(), RepositoryError>;
}
