pub mod accumulator;
pub mod analyzer;
pub mod render;
pub mod snapshot;

pub use accumulator::CoverageAccumulator;
pub use analyzer::{CoverageAnalyzer, CrossReference};
pub use snapshot::{CoverageSnapshot, CoverageSummary};
