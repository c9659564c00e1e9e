//! Readers for the tab-separated text formats the tools exchange.
//!
//! Corpus lines look like `token<TAB>source<TAB>phones<TAB>phones...`, with
//! one space-delimited phone string per orthographic word. Dictionary lines
//! are `token<TAB>phones`. Malformed lines are returned alongside the good
//! records so callers can report how many were skipped.
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ParseError, ParseErrorKind, Result};
use crate::phones::{extract_sentence, Diphone};

/// One transcribed token of the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub token: String,
    /// Where the pronunciation came from, e.g. a lexicon or a G2P model
    pub source: String,
    /// One space-delimited phone string per orthographic word
    pub phone_strings: Vec<String>,
}

impl TokenRecord {
    pub fn new(
        token: impl Into<String>,
        source: impl Into<String>,
        phone_strings: Vec<String>,
    ) -> Self {
        Self {
            token: token.into(),
            source: source.into(),
            phone_strings,
        }
    }

    /// Token length in characters, the normaliser for rarity scores.
    pub fn surface_len(&self) -> usize {
        self.token.chars().count()
    }

    /// Token-level diphones, word boundaries included.
    pub fn diphones(&self) -> Vec<Diphone> {
        extract_sentence(&self.phone_strings)
    }

    /// Renders the record back into its corpus line (without newline).
    pub fn to_line(&self) -> String {
        let mut fields = Vec::with_capacity(self.phone_strings.len() + 2);
        fields.push(self.token.as_str());
        fields.push(self.source.as_str());
        fields.extend(self.phone_strings.iter().map(String::as_str));
        fields.join("\t")
    }
}

/// Splits `reader` into numbered lines, decoding each one on its own so a
/// single bad line does not poison the rest. Only read failures are fatal.
fn decoded_lines<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = io::Result<(usize, std::result::Result<String, ParseError>)>> {
    reader.split(b'\n').enumerate().map(|(idx, bytes)| {
        let line_no = idx + 1;
        bytes.map(|bytes| {
            let line = String::from_utf8(bytes)
                .map_err(|_| ParseError::new(line_no, ParseErrorKind::InvalidUtf8));
            (line_no, line)
        })
    })
}

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Parses one corpus line. `line_no` is 1-based and only used for errors.
pub fn parse_record(line_no: usize, line: &str) -> std::result::Result<TokenRecord, ParseError> {
    let fields: Vec<&str> = strip_eol(line).split('\t').collect();
    if fields.len() < 3 {
        return Err(ParseError::new(
            line_no,
            ParseErrorKind::FieldCount {
                expected: 3,
                found: fields.len(),
            },
        ));
    }

    let token = fields[0].trim();
    if token.is_empty() {
        return Err(ParseError::new(line_no, ParseErrorKind::EmptyToken));
    }

    let mut phone_strings = Vec::with_capacity(fields.len() - 2);
    for (offset, field) in fields[2..].iter().enumerate() {
        let phones = field.split_whitespace().collect::<Vec<_>>().join(" ");
        if phones.is_empty() {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::EmptyPhoneString { field: offset + 3 },
            ));
        }
        phone_strings.push(phones);
    }

    Ok(TokenRecord::new(token, fields[1].trim(), phone_strings))
}

/// Records read from a corpus file together with the lines that were skipped.
#[derive(Debug, Default, Clone)]
pub struct Corpus {
    pub records: Vec<TokenRecord>,
    pub skipped: Vec<ParseError>,
}

impl Corpus {
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut corpus = Corpus::default();
        for line in decoded_lines(reader) {
            let (line_no, decoded) = line?;
            let line = match decoded {
                Ok(line) => line,
                Err(e) => {
                    debug!("skipping corpus {e}");
                    corpus.skipped.push(e);
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_record(line_no, &line) {
                Ok(record) => corpus.records.push(record),
                Err(e) => {
                    debug!("skipping corpus {e}");
                    corpus.skipped.push(e);
                }
            }
        }
        if !corpus.skipped.is_empty() {
            warn!(
                skipped = corpus.skipped.len(),
                kept = corpus.records.len(),
                "malformed corpus lines were skipped"
            );
        }
        Ok(corpus)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// External pronunciation dictionary, one phone string per entry.
#[derive(Debug, Default, Clone)]
pub struct PronunciationDictionary {
    pub entries: Vec<(String, String)>,
    pub skipped: Vec<ParseError>,
}

impl PronunciationDictionary {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            skipped: Vec::new(),
        }
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut dict = PronunciationDictionary::default();
        for line in decoded_lines(reader) {
            let (line_no, decoded) = line?;
            let line = match decoded {
                Ok(line) => line,
                Err(e) => {
                    dict.skipped.push(e);
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = strip_eol(&line).split('\t').collect();
            let kind = match fields.as_slice() {
                [token, _] if token.trim().is_empty() => ParseErrorKind::EmptyToken,
                [_, phones] if phones.trim().is_empty() => {
                    ParseErrorKind::EmptyPhoneString { field: 2 }
                }
                [token, phones] => {
                    dict.entries
                        .push((token.trim().to_string(), phones.trim().to_string()));
                    continue;
                }
                other => ParseErrorKind::FieldCount {
                    expected: 2,
                    found: other.len(),
                },
            };
            dict.skipped.push(ParseError::new(line_no, kind));
        }
        if !dict.skipped.is_empty() {
            warn!(
                skipped = dict.skipped.len(),
                "malformed dictionary lines were skipped"
            );
        }
        Ok(dict)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
