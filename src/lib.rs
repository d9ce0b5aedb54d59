pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{HttpRatingSource, InMemoryStore};
pub use config::AppConfig;
pub use core::{
    aggregator::RatingAggregator,
    concurrency::{ConcurrencyLimit, EngineConfig},
    resolver::UniversitySetResolver,
    service::DirectionService,
};
pub use utils::error::{AggregationError, ServiceError, SourceError};
