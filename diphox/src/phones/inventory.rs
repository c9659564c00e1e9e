use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{DiphoneError, Result};
use crate::phones::diphone::Diphone;

/// The Icelandic IPA phone set the recording-script tooling was built around.
pub const DEFAULT_PHONEMES: &[&str] = &[
    "a", "r", "t", "s", "n", "ɪ", "l", "ʏ", "k", "m",
    "ð", "ɛ", "v", "p", "h", "f", "j", "c", "i", "ɔ", "r̥",
    "ei", "ŋ", "ɣ", "ou", "œ", "ouː", "au", "ai", "aː", "auː",
    "iː", "eiː", "ɪː", "ɛː", "θ", "l̥", "tʰ", "uː", "aiː",
    "kʰ", "u", "ɔː", "x", "œː", "œy", "n̥", "cʰ", "œyː", "pʰ",
    "ɲ", "ʏː", "ç", "ŋ̊", "m̥", "ʏi", "ɲ̊", "ɔi",
];

/// Validated phone alphabet plus the curated list of diphones that count
/// towards coverage. Built once, then shared read-only by every component.
#[derive(Debug, Clone)]
pub struct PhoneInventory {
    phonemes: Vec<String>,
    phone_index: HashMap<String, usize>,
    diphones: Vec<Diphone>,
    diphone_index: HashMap<Diphone, usize>,
}

impl PhoneInventory {
    /// Builds an inventory from a phone alphabet and the valid diphone pairs,
    /// both kept in the order given.
    pub fn load<P, S, D>(phonemes: P, diphones: D) -> Result<Self>
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
        D: IntoIterator<Item = Diphone>,
    {
        let mut inventory = PhoneInventory {
            phonemes: Vec::new(),
            phone_index: HashMap::new(),
            diphones: Vec::new(),
            diphone_index: HashMap::new(),
        };

        for phone in phonemes {
            let phone: String = phone.into();
            let phone = phone.trim().to_string();
            if phone.is_empty() || phone.contains(char::is_whitespace) {
                return Err(DiphoneError::configuration(format!(
                    "invalid phoneme symbol {phone:?}"
                )));
            }
            if inventory.phone_index.contains_key(&phone) {
                return Err(DiphoneError::configuration(format!(
                    "duplicate phoneme '{phone}'"
                )));
            }
            inventory
                .phone_index
                .insert(phone.clone(), inventory.phonemes.len());
            inventory.phonemes.push(phone);
        }
        if inventory.phonemes.is_empty() {
            return Err(DiphoneError::configuration("phoneme list is empty"));
        }

        for diphone in diphones {
            for phone in [&diphone.first, &diphone.second] {
                if !inventory.phone_index.contains_key(phone) {
                    return Err(DiphoneError::configuration(format!(
                        "diphone '{diphone}' uses unknown phoneme '{phone}'"
                    )));
                }
            }
            if inventory.diphone_index.contains_key(&diphone) {
                return Err(DiphoneError::configuration(format!(
                    "duplicate diphone '{diphone}'"
                )));
            }
            inventory
                .diphone_index
                .insert(diphone.clone(), inventory.diphones.len());
            inventory.diphones.push(diphone);
        }
        if inventory.diphones.is_empty() {
            return Err(DiphoneError::configuration("valid diphone list is empty"));
        }

        debug!(
            phonemes = inventory.phonemes.len(),
            diphones = inventory.diphones.len(),
            "phone inventory loaded"
        );
        Ok(inventory)
    }

    /// Reads the valid-diphone reference list: one `phone1<TAB>phone2` pair
    /// per line, no header. Blank lines are ignored.
    pub fn from_reader<P, S, R>(phonemes: P, reader: R) -> Result<Self>
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
        R: BufRead,
    {
        let mut diphones = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                DiphoneError::configuration(format!("reading diphone list: {e}"))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            diphones.push(parse_reference_line(idx + 1, &line)?);
        }
        Self::load(phonemes, diphones)
    }

    /// Like [`PhoneInventory::from_reader`], opening `path` first.
    pub fn from_file<P, S>(phonemes: P, path: impl AsRef<Path>) -> Result<Self>
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            DiphoneError::configuration(format!(
                "cannot open diphone list {}: {e}",
                path.display()
            ))
        })?;
        Self::from_reader(phonemes, BufReader::new(file))
    }

    /// Inventory over [`DEFAULT_PHONEMES`].
    pub fn with_default_phonemes(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(DEFAULT_PHONEMES.iter().copied(), path)
    }

    pub fn is_valid_phoneme(&self, phone: &str) -> bool {
        self.phone_index.contains_key(phone)
    }

    pub fn is_valid_diphone(&self, diphone: &Diphone) -> bool {
        self.diphone_index.contains_key(diphone)
    }

    /// Valid diphones in reference-file order.
    pub fn enumerate_diphones(&self) -> &[Diphone] {
        &self.diphones
    }

    pub fn phonemes(&self) -> &[String] {
        &self.phonemes
    }

    pub fn phone_index(&self, phone: &str) -> Option<usize> {
        self.phone_index.get(phone).copied()
    }

    pub fn diphone_index(&self, diphone: &Diphone) -> Option<usize> {
        self.diphone_index.get(diphone).copied()
    }

    /// Number of valid diphones.
    pub fn len(&self) -> usize {
        self.diphones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diphones.is_empty()
    }

    /// Every ordered pair of two distinct phones of the alphabet.
    ///
    /// This is a wider universe than the curated diphone list; the corpus
    /// scorer seeds its frequency table from it.
    pub fn ordered_pair_closure(&self) -> impl Iterator<Item = Diphone> + '_ {
        self.phonemes.iter().enumerate().flat_map(move |(i, a)| {
            self.phonemes
                .iter()
                .enumerate()
                .filter(move |(j, _)| *j != i)
                .map(move |(_, b)| Diphone::new(a.as_str(), b.as_str()))
        })
    }
}

fn parse_reference_line(line_no: usize, line: &str) -> Result<Diphone> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    match fields.as_slice() {
        [first, second] if !first.is_empty() && !second.is_empty() => {
            Ok(Diphone::new(*first, *second))
        }
        _ => Err(DiphoneError::configuration(format!(
            "malformed diphone list line {line_no}: {line:?}"
        ))),
    }
}
