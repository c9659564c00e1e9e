use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use crate::corpus::TokenRecord;

/// A pronunciation produced for one input token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phonemized {
    /// The token as the backend normalised it
    pub token: String,
    pub source: String,
    /// One space-delimited phone string per word
    pub phone_strings: Vec<String>,
}

impl Phonemized {
    pub fn into_record(self) -> TokenRecord {
        TokenRecord::new(self.token, self.source, self.phone_strings)
    }
}

pub type G2pError = Box<dyn Error + Send + Sync>;

/// `Ok(None)` means the backend has no pronunciation for the token, which
/// is an expected outcome and not an error.
pub type G2pFuture = Pin<Box<dyn Future<Output = Result<Option<Phonemized>, G2pError>> + Send>>;

/// Grapheme-to-phoneme engine the batch runner drives. Implementations
/// may do their work anywhere (in-process lookup, model inference, a
/// subprocess); the batch only awaits the returned future.
pub trait G2pBackend: Send + Sync {
    fn phonemize(&self, token: String) -> G2pFuture;

    /// Source tag written next to every pronunciation from this backend.
    fn source(&self) -> &str;
}
