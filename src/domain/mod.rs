// Domain layer: the Batch model and ports (interfaces) to external systems.

pub mod model;
pub mod ports;
