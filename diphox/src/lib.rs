pub mod corpus;
pub mod coverage;
pub mod error;
pub mod g2p;
pub mod phones;
pub mod scoring;
pub mod utils;

// Re-export key functionality for easy access
pub use corpus::{Corpus, PronunciationDictionary, TokenRecord};
pub use coverage::{CoverageAccumulator, CoverageAnalyzer, CoverageSnapshot, CrossReference};
pub use error::{DiphoneError, ParseError, Result};
pub use phones::{Diphone, PhoneInventory, DEFAULT_PHONEMES};
pub use scoring::{CorpusScorer, FrequencyTable, Granularity, ScoreOptions, TokenScore};
