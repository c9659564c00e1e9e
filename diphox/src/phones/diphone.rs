use std::collections::HashSet;
use std::fmt;

/// An ordered pair of adjacent phones, e.g. `m` followed by `ɪː`.
///
/// Displayed (and written out) as the concatenation of both symbols, which is
/// how reference lists and reports name diphones. Equality and hashing use
/// the pair itself so two pairs with the same concatenation stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Diphone {
    pub first: String,
    pub second: String,
}

impl Diphone {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Canonical key: both symbols concatenated.
    pub fn key(&self) -> String {
        format!("{}{}", self.first, self.second)
    }
}

impl fmt::Display for Diphone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.first, self.second)
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for Diphone {
    fn from((first, second): (A, B)) -> Self {
        Diphone::new(first, second)
    }
}

fn pairs<'a>(phones: impl Iterator<Item = &'a str>) -> Vec<Diphone> {
    let phones: Vec<&str> = phones.collect();
    phones
        .windows(2)
        .map(|w| Diphone::new(w[0], w[1]))
        .collect()
}

/// Diphones of a single word, e.g. `"m ɪː ɣ"` gives `[mɪː, ɪːɣ]`.
///
/// A phone string with zero or one phone yields nothing.
pub fn extract_word(phone_string: &str) -> Vec<Diphone> {
    pairs(phone_string.split_whitespace())
}

/// Diphones of a whole token. The word-level phone strings are joined into
/// one sequence first, so transitions across word boundaries are included.
pub fn extract_sentence<S: AsRef<str>>(phone_strings: &[S]) -> Vec<Diphone> {
    pairs(
        phone_strings
            .iter()
            .flat_map(|s| s.as_ref().split_whitespace()),
    )
}

/// Drops repeated diphones, keeping the first occurrence of each.
pub fn unique(diphones: impl IntoIterator<Item = Diphone>) -> Vec<Diphone> {
    let mut seen = HashSet::new();
    diphones
        .into_iter()
        .filter(|d| seen.insert(d.clone()))
        .collect()
}
