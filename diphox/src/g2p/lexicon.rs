//! Dictionary-backed G2P: every word of a token must be listed in the
//! lexicon or the token gets no pronunciation.
use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::corpus::PronunciationDictionary;
use crate::g2p::backend::{G2pBackend, G2pFuture, Phonemized};

lazy_static! {
    // anything but letters (with their marks), digits, apostrophes, hyphens, whitespace
    static ref PUNCTUATION: Regex =
        Regex::new(r"[^\p{L}\p{M}\p{N}\s'\-]").expect("punctuation pattern is valid");
}

/// Lowercases, strips punctuation and collapses whitespace.
pub fn normalize_token(token: &str) -> String {
    let lowered = token.to_lowercase();
    PUNCTUATION
        .replace_all(&lowered, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct LexiconG2p {
    lexicon: Arc<HashMap<String, String>>,
    source: String,
}

impl LexiconG2p {
    /// Builds the lookup table from a pronunciation dictionary. Keys are
    /// normalised; when a word is listed twice the first entry wins.
    pub fn new(dictionary: &PronunciationDictionary, source: impl Into<String>) -> Self {
        let mut lexicon = HashMap::with_capacity(dictionary.len());
        for (word, phones) in &dictionary.entries {
            let phones = phones.split_whitespace().collect::<Vec<_>>().join(" ");
            lexicon.entry(normalize_token(word)).or_insert(phones);
        }
        Self {
            lexicon: Arc::new(lexicon),
            source: source.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }

    pub fn lookup(&self, token: &str) -> Option<Phonemized> {
        lookup_in(&self.lexicon, &self.source, token)
    }
}

fn lookup_in(lexicon: &HashMap<String, String>, source: &str, token: &str) -> Option<Phonemized> {
    let normalized = normalize_token(token);
    if normalized.is_empty() {
        return None;
    }

    let phone_strings = normalized
        .split(' ')
        .map(|word| lexicon.get(word).cloned())
        .collect::<Option<Vec<String>>>()?;

    Some(Phonemized {
        token: normalized,
        source: source.to_string(),
        phone_strings,
    })
}

impl G2pBackend for LexiconG2p {
    fn phonemize(&self, token: String) -> G2pFuture {
        let lexicon = Arc::clone(&self.lexicon);
        let source = self.source.clone();
        Box::pin(async move { Ok(lookup_in(&lexicon, &source, &token)) })
    }

    fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> LexiconG2p {
        let dict = PronunciationDictionary::from_entries([
            ("mig", "m ɪː ɣ"),
            ("Hús", "h uː s"),
            ("mig", "m ɪ ɣ"),
            ("á", "au"),
        ]);
        LexiconG2p::new(&dict, "lexicon")
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("  Hús,  á  (mig)! "), "hús á mig");
        assert_eq!(normalize_token("?!"), "");
        assert_eq!(normalize_token("Jón's"), "jón's");
    }

    #[test]
    fn test_lookup_multi_word_token() {
        let g2p = backend();
        assert_eq!(g2p.len(), 3);
        let p = g2p.lookup("Hús á").unwrap();
        assert_eq!(p.token, "hús á");
        assert_eq!(p.source, "lexicon");
        assert_eq!(p.phone_strings, vec!["h uː s", "au"]);
        // first listed pronunciation wins
        assert_eq!(g2p.lookup("mig").unwrap().phone_strings, vec!["m ɪː ɣ"]);
    }

    #[test]
    fn test_unknown_word_gives_nothing() {
        let g2p = backend();
        assert!(g2p.lookup("hús hestur").is_none());
        assert!(g2p.lookup("...").is_none());
    }

    #[tokio::test]
    async fn test_backend_future() {
        let g2p = backend();
        assert_eq!(g2p.source(), "lexicon");
        let p = g2p.phonemize("mig".to_string()).await.unwrap().unwrap();
        assert_eq!(p.into_record().to_line(), "mig\tlexicon\tm ɪː ɣ");
        assert!(g2p.phonemize("xyz".to_string()).await.unwrap().is_none());
    }
}
