use crate::domain::model::{Direction, DirectionId, NationalId, University, UniversityId};
use crate::domain::ports::{DirectionRepository, DirectionResolver, UniversityRepository, UserRepository};
use crate::utils::error::RepositoryError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct DirectionRow {
    id: DirectionId,
    name: String,
    university_id: UniversityId,
    url: String,
}

#[derive(Debug, Default)]
struct StoreState {
    universities: BTreeMap<UniversityId, University>,
    directions: BTreeMap<DirectionId, DirectionRow>,
    users: HashMap<u64, NationalId>,
    user_directions: HashMap<u64, Vec<DirectionId>>,
    user_universities: HashMap<u64, Vec<UniversityId>>,
}

impl StoreState {
    fn direction(&self, id: DirectionId) -> Result<Direction, RepositoryError> {
        let row = self
            .directions
            .get(&id)
            .ok_or_else(|| RepositoryError::direction_not_found(id))?;
        let university = self
            .universities
            .get(&row.university_id)
            .ok_or_else(|| RepositoryError::university_not_found(row.university_id))?;

        Ok(Direction {
            id: row.id,
            name: row.name.clone(),
            university_id: university.id,
            university_name: university.name.clone(),
            university_full_name: university.full_name.clone(),
            url: row.url.clone(),
        })
    }
}

/// In-process implementation of the repository ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_university(&self, university: University) {
        let mut state = self.state.write().await;
        state.universities.insert(university.id, university);
    }

    pub async fn add_direction(
        &self,
        id: DirectionId,
        name: impl Into<String>,
        university_id: UniversityId,
        url: impl Into<String>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.universities.contains_key(&university_id) {
            return Err(RepositoryError::university_not_found(university_id));
        }

        state.directions.insert(
            id,
            DirectionRow {
                id,
                name: name.into(),
                university_id,
                url: url.into(),
            },
        );
        Ok(())
    }

    pub async fn add_user(&self, user_id: u64, national_id: NationalId) {
        let mut state = self.state.write().await;
        state.users.insert(user_id, national_id);
    }
}

#[async_trait]
impl DirectionResolver for InMemoryStore {
    async fn owning_university(&self, direction_id: DirectionId) -> Result<UniversityId, RepositoryError> {
        let state = self.state.read().await;
        state
            .directions
            .get(&direction_id)
            .map(|row| row.university_id)
            .ok_or_else(|| RepositoryError::direction_not_found(direction_id))
    }
}

#[async_trait]
impl DirectionRepository for InMemoryStore {
    async fn get_by_id(&self, id: DirectionId) -> Result<Direction, RepositoryError> {
        self.state.read().await.direction(id)
    }

    async fn get_all(&self) -> Result<Vec<Direction>, RepositoryError> {
        let state = self.state.read().await;
        state.directions.keys().map(|id| state.direction(*id)).collect()
    }

    async fn get_for_user(&self, user_id: u64) -> Result<Vec<Direction>, RepositoryError> {
        let state = self.state.read().await;
        match state.user_directions.get(&user_id) {
            Some(ids) => ids.iter().map(|id| state.direction(*id)).collect(),
            None => Ok(Vec::new()),
        }
    }

    async fn set_for_user(&self, user_id: u64, direction_ids: &[DirectionId]) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if let Some(missing) = direction_ids.iter().find(|id| !state.directions.contains_key(*id)) {
            return Err(RepositoryError::direction_not_found(*missing));
        }

        let selected = state.user_directions.entry(user_id).or_default();
        for id in direction_ids {
            if !selected.contains(id) {
                selected.push(*id);
            }
        }
        Ok(())
    }

    async fn clear(&self, user_id: u64) -> Result<(), RepositoryError> {
        self.state.write().await.user_directions.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get_national_id(&self, user_id: u64) -> Result<NationalId, RepositoryError> {
        self.state
            .read()
            .await
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| RepositoryError::user_not_found(user_id))
    }
}

#[async_trait]
impl UniversityRepository for InMemoryStore {
    async fn get_all(&self) -> Result<Vec<University>, RepositoryError> {
        Ok(self.state.read().await.universities.values().cloned().collect())
    }

    async fn get_for_user(&self, user_id: u64) -> Result<Vec<University>, RepositoryError> {
        let state = self.state.read().await;
        let ids = state.user_universities.get(&user_id).cloned().unwrap_or_default();
        ids.into_iter()
            .map(|id| {
                state
                    .universities
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| RepositoryError::university_not_found(id))
            })
            .collect()
    }

    async fn set_for_user(&self, user_id: u64, university_ids: &[UniversityId]) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if let Some(missing) = university_ids.iter().find(|id| !state.universities.contains_key(*id)) {
            return Err(RepositoryError::university_not_found(*missing));
        }

        let selected = state.user_universities.entry(user_id).or_default();
        for id in university_ids {
            if !selected.contains(id) {
                selected.push(*id);
            }
        }
        Ok(())
    }

    async fn clear(&self, user_id: u64) -> Result<(), RepositoryError> {
        self.state.write().await.user_universities.remove(&user_id);
        Ok(())
    }
}
