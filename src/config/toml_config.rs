use crate::core::concurrency::{ConcurrencyLimit, EngineConfig};
use crate::domain::model::{DirectionId, NationalId, University, UniversityId};
use crate::utils::error::{ConfigError, ConfigResult};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const MAX_TIMEOUT_SECONDS: u64 = 300;
const DEFAULT_USER_AGENT: &str = concat!("rating-monitor/", env!("CARGO_PKG_VERSION"));

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    pub aggregation: Option<ConcurrencyConfig>,
    pub resolver: Option<ConcurrencyConfig>,
    pub user: UserConfig,
    #[serde(default)]
    pub universities: Vec<UniversityConfig>,
    #[serde(default)]
    pub directions: Vec<DirectionConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub headers: Option<HashMap<String, String>>,
}

impl SourceConfig {
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub max_in_flight: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub id: u64,
    pub national_id: String,
    #[serde(default)]
    pub directions: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniversityConfig {
    pub id: u32,
    pub name: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionConfig {
    pub id: u32,
    pub name: String,
    pub university_id: u32,
    pub url: String,
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let processed = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as-is.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> ConfigResult<()> {
        validation::validate_range(
            "source.timeout_seconds",
            self.source.timeout_seconds(),
            1,
            MAX_TIMEOUT_SECONDS,
        )?;

        for (field, section) in [("aggregation", &self.aggregation), ("resolver", &self.resolver)] {
            if let Some(max) = section.as_ref().and_then(|s| s.max_in_flight) {
                validation::validate_positive_number(&format!("{}.max_in_flight", field), max, 1)?;
            }
        }

        let mut university_ids = HashSet::new();
        for university in &self.universities {
            validation::validate_non_empty_string("universities.name", &university.name)?;
            if !university_ids.insert(university.id) {
                return Err(duplicate("universities.id", university.id));
            }
        }

        let mut direction_ids = HashSet::new();
        for direction in &self.directions {
            validation::validate_url("directions.url", &direction.url)?;
            if !direction_ids.insert(direction.id) {
                return Err(duplicate("directions.id", direction.id));
            }
            if !university_ids.contains(&direction.university_id) {
                return Err(ConfigError::InvalidValue {
                    field: "directions.university_id".to_string(),
                    value: direction.university_id.to_string(),
                    reason: format!("direction {} refers to an unknown university", direction.id),
                });
            }
        }

        for id in &self.user.directions {
            if !direction_ids.contains(id) {
                return Err(ConfigError::InvalidValue {
                    field: "user.directions".to_string(),
                    value: id.to_string(),
                    reason: "selected direction is not declared".to_string(),
                });
            }
        }

        self.national_id()?;
        Ok(())
    }

    pub fn national_id(&self) -> ConfigResult<NationalId> {
        validation::validate_non_empty_string("user.national_id", &self.user.national_id)?;
        NationalId::parse_snils(&self.user.national_id).map_err(|e| ConfigError::InvalidValue {
            field: "user.national_id".to_string(),
            value: self.user.national_id.clone(),
            reason: e.to_string(),
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        let limit = |section: &Option<ConcurrencyConfig>| {
            ConcurrencyLimit::from_max_in_flight(section.as_ref().and_then(|s| s.max_in_flight))
        };

        EngineConfig {
            aggregation: limit(&self.aggregation),
            resolution: limit(&self.resolver),
        }
    }

    pub fn selected_directions(&self) -> Vec<DirectionId> {
        self.user.directions.iter().copied().map(DirectionId).collect()
    }

    pub fn universities(&self) -> impl Iterator<Item = University> + '_ {
        self.universities.iter().map(|u| University {
            id: UniversityId(u.id),
            name: u.name.clone(),
            full_name: u.full_name.clone(),
        })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.validate_config()
    }
}

fn duplicate(field: &str, id: u32) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: id.to_string(),
        reason: "duplicate id".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    const SAMPLE: &str = r#"
[source]
timeout_seconds = 5
headers = { Accept = "application/json" }

[aggregation]
max_in_flight = 4

[user]
id = 1
national_id = "112-233-445 95"
directions = [1, 3]

[[universities]]
id = 10
name = "ITMO"
full_name = "ITMO University"

[[universities]]
id = 20
name = "SPbU"
full_name = "Saint Petersburg State University"

[[directions]]
id = 1
name = "Software Engineering"
university_id = 10
url = "https://lists.example.org/itmo/1.json"

[[directions]]
id = 3
name = "Mathematics"
university_id = 20
url = "https://lists.example.org/spbu/3.json"
"#;

    #[test]
    fn test_parse_sample() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.timeout_seconds(), 5);
        assert_eq!(config.source.user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(config.selected_directions(), vec![DirectionId(1), DirectionId(3)]);
        assert_eq!(config.universities().count(), 2);
        assert_eq!(config.national_id().unwrap().as_str(), "11223344595");
    }

    #[test]
    fn test_engine_config_defaults_to_unbounded() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        let engine = config.engine_config();
        assert_eq!(
            engine.aggregation,
            ConcurrencyLimit::Bounded(NonZeroUsize::new(4).unwrap())
        );
        assert_eq!(engine.resolution, ConcurrencyLimit::Unbounded);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("RLM_TEST_SNILS", "11223344595");
        let content = SAMPLE.replace("112-233-445 95", "${RLM_TEST_SNILS}");
        let config = AppConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.user.national_id, "11223344595");

        let content = SAMPLE.replace("112-233-445 95", "${RLM_TEST_UNSET_VARIABLE}");
        let config = AppConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.user.national_id, "${RLM_TEST_UNSET_VARIABLE}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_university_reference() {
        let content = SAMPLE.replace("university_id = 20", "university_id = 30");
        let config = AppConfig::from_toml_str(&content).unwrap();
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "directions.university_id")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_selection_and_bad_url() {
        let content = SAMPLE.replace("directions = [1, 3]", "directions = [1, 4]");
        let config = AppConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());

        let content = SAMPLE.replace("https://lists.example.org/itmo/1.json", "ftp://lists/1");
        let config = AppConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_in_flight_and_bad_timeout() {
        let content = SAMPLE.replace("max_in_flight = 4", "max_in_flight = 0");
        assert!(AppConfig::from_toml_str(&content).unwrap().validate().is_err());

        let content = SAMPLE.replace("timeout_seconds = 5", "timeout_seconds = 0");
        assert!(AppConfig::from_toml_str(&content).unwrap().validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        assert!(matches!(
            AppConfig::from_toml_str("[user\nid = 1"),
            Err(ConfigError::Parse(_))
        ));
    }
}
