// Pipeline processing: normalization, agent attribution and aggregation

pub mod aggregate;
pub mod attribute;
pub mod normalize;
