pub mod aggregator;
pub mod concurrency;
pub mod grouping;
pub mod resolver;
pub mod service;

pub use crate::domain::model::{AggregationResult, Direction, DirectionOutcome, NationalId};
pub use crate::domain::ports::{DirectionResolver, RatingSource};
pub use crate::utils::error::Result;
