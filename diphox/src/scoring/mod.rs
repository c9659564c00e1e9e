pub mod frequency;
pub mod scorer;

pub use frequency::FrequencyTable;
pub use scorer::{write_scores, CorpusScorer, Granularity, ScoreOptions, TokenScore};
