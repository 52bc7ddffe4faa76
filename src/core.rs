pub mod accumulator;
pub mod classify;
pub mod compute;
pub mod engine;
pub mod estimate;
pub mod extract;
pub mod rate_structure;
pub mod resolve;
pub mod tdsp;
pub mod usage;
