// Domain layer: models and ports. Concrete stores and sources live in adapters.

pub mod model;
pub mod ports;
