// Domain layer: models, the grading policy and ports. No I/O here.

pub mod model;
pub mod policy;
pub mod ports;
