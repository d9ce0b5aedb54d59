#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use toml_config::AppConfig;

use crate::adapters::InMemoryStore;
use crate::domain::model::{DirectionId, UniversityId};
use crate::utils::error::{ConfigError, ConfigResult};

impl AppConfig {
    /// Seeds an in-memory store with the configured catalog and user.
    pub async fn seed_store(&self, store: &InMemoryStore) -> ConfigResult<()> {
        for university in self.universities() {
            store.add_university(university).await;
        }

        for direction in &self.directions {
            store
                .add_direction(
                    DirectionId(direction.id),
                    direction.name.clone(),
                    UniversityId(direction.university_id),
                    direction.url.clone(),
                )
                .await
                .map_err(|e| ConfigError::InvalidValue {
                    field: "directions".to_string(),
                    value: direction.id.to_string(),
                    reason: e.to_string(),
                })?;
        }

        store.add_user(self.user.id, self.national_id()?).await;
        Ok(())
    }
}
