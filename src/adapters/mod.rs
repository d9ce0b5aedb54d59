// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod memory;

pub use http::HttpRatingSource;
pub use memory::InMemoryStore;
