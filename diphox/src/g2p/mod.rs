pub mod backend;
pub mod batch;
pub mod lexicon;

pub use backend::{G2pBackend, G2pError, G2pFuture, Phonemized};
pub use batch::{phonemize_batch, phonemize_file, BatchOptions, BatchReport};
pub use lexicon::{normalize_token, LexiconG2p};
