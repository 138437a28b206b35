// Domain layer: models and ports. Adapters implement the ports, core wires them together.

pub mod model;
pub mod ports;
