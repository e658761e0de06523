// Domain layer: records, constants and ports. Adapters live under src/adapters.

pub mod model;
pub mod ports;
