use crate::config::toml_config::SourceConfig;
use crate::domain::model::{NationalId, RatingRecord};
use crate::domain::ports::RatingSource;
use crate::utils::error::{ConfigError, ConfigResult, SourceError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Rating list document served at a direction URL.
#[derive(Debug, Clone, Deserialize)]
pub struct RatingList {
    pub budget_places: u32,
    pub applicants: Vec<Applicant>,
}

/// One row of a rating list, in list order.
#[derive(Debug, Clone, Deserialize)]
pub struct Applicant {
    pub national_id: String,
    pub score: u32,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub consent: bool,
}

impl RatingList {
    /// Standing of `national_id`, or `None` when it is not in the list.
    pub fn standing_of(&self, national_id: &NationalId) -> Option<RatingRecord> {
        let wanted = national_id.digits();
        let index = self
            .applicants
            .iter()
            .position(|a| NationalId::new(a.national_id.as_str()).digits() == wanted)?;

        let above = &self.applicants[..index];
        Some(RatingRecord {
            position: index as u32 + 1,
            score: self.applicants[index].score,
            priority_one_upper: above.iter().filter(|a| a.priority == 1).count() as u32,
            submitted_consent_upper: above.iter().filter(|a| a.consent).count() as u32,
            budget_places: self.budget_places,
        })
    }
}

/// `RatingSource` reading JSON rating lists over HTTP.
pub struct HttpRatingSource {
    client: Client,
}

impl HttpRatingSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the HTTP client from the `[source]` section.
    pub fn from_config(config: &SourceConfig) -> ConfigResult<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in config.headers.iter().flatten() {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| ConfigError::InvalidValue {
                field: "source.headers".to_string(),
                value: key.clone(),
                reason: e.to_string(),
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidValue {
                field: format!("source.headers.{}", key),
                value: value.clone(),
                reason: e.to_string(),
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .user_agent(config.user_agent())
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "source".to_string(),
                value: String::new(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self::new(client))
    }
}

#[async_trait]
impl RatingSource for HttpRatingSource {
    async fn fetch(
        &self,
        university_name: &str,
        direction_url: &str,
        national_id: &NationalId,
    ) -> Result<RatingRecord, SourceError> {
        let url = Url::parse(direction_url).map_err(|e| SourceError::InvalidUrl {
            url: direction_url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(university = university_name, "GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: direction_url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let list: RatingList = serde_json::from_str(&body).map_err(|e| SourceError::Parse {
            url: direction_url.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(
            university = university_name,
            "Rating list has {} applicants",
            list.applicants.len()
        );

        list.standing_of(national_id).ok_or(SourceError::NotListed)
    }
}
