use std::io::{self, Write};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::corpus::TokenRecord;
use crate::error::{DiphoneError, ParseError, ParseErrorKind, Result};
use crate::phones::{extract_word, unique, Diphone, PhoneInventory};
use crate::scoring::frequency::FrequencyTable;
use crate::utils::parallel::parallel_map_with_progress;
use crate::utils::progress::progress_bar;

/// Which diphones of a token contribute to its score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Granularity {
    /// Every diphone of the token, including those spanning word boundaries
    #[default]
    Sentence,
    /// Only diphones inside a single word, so every scored diphone was also
    /// counted by the frequency pass
    Word,
}

#[derive(Debug, Clone)]
pub struct ScoreOptions {
    pub granularity: Granularity,
    /// Worker threads for the scoring pass
    pub workers: usize,
    pub show_progress: bool,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::Sentence,
            workers: 4,
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenScore {
    pub token: String,
    pub score: f64,
}

/// Ranks tokens by how much rare-diphone content they carry per character.
///
/// Scoring needs global frequencies before any single token can be scored,
/// so it runs in two passes over the same corpus: [`build_frequency_table`]
/// then [`score_token`] for each record.
///
/// [`build_frequency_table`]: CorpusScorer::build_frequency_table
/// [`score_token`]: CorpusScorer::score_token
#[derive(Debug, Clone)]
pub struct CorpusScorer<'a> {
    inventory: &'a PhoneInventory,
    options: ScoreOptions,
}

impl<'a> CorpusScorer<'a> {
    pub fn new(inventory: &'a PhoneInventory, options: ScoreOptions) -> Self {
        Self { inventory, options }
    }

    /// Pass 1.
    pub fn build_frequency_table(&self, corpus: &[TokenRecord]) -> FrequencyTable {
        let table = FrequencyTable::build(self.inventory, corpus);
        debug!(
            distinct = table.len(),
            observed = table.observed(),
            occurrences = table.total(),
            "frequency table built"
        );
        table
    }

    fn scored_diphones(&self, record: &TokenRecord) -> Vec<Diphone> {
        match self.options.granularity {
            Granularity::Sentence => unique(record.diphones()),
            Granularity::Word => unique(
                record
                    .phone_strings
                    .iter()
                    .flat_map(|phones| extract_word(phones)),
            ),
        }
    }

    /// Pass 2: `(1 / token length) * Σ 1 / frequency` over the token's
    /// distinct diphones.
    ///
    /// Fails with [`DiphoneError::InternalConsistency`] when a diphone has no
    /// count in `table`, which means the table was built from a different
    /// corpus or at a narrower granularity than this pass.
    pub fn score_token(&self, table: &FrequencyTable, record: &TokenRecord) -> Result<TokenScore> {
        let len = record.surface_len();
        if len == 0 {
            return Err(ParseError::new(0, ParseErrorKind::EmptyToken).into());
        }

        let mut score = 0.0;
        for diphone in self.scored_diphones(record) {
            match table.get(&diphone) {
                Some(freq) if freq > 0 => score += 1.0 / freq as f64,
                _ => return Err(DiphoneError::InternalConsistency(diphone.key())),
            }
        }

        Ok(TokenScore {
            token: record.token.clone(),
            score: score / len as f64,
        })
    }

    /// Runs both passes and returns scores best first. Equal scores keep
    /// their corpus order.
    ///
    /// Records that cannot be scored (empty tokens) are skipped; a missing
    /// frequency aborts the whole run.
    pub fn score_file(&self, corpus: &[TokenRecord]) -> Result<Vec<TokenScore>> {
        let table = self.build_frequency_table(corpus);

        let pb = progress_bar(corpus.len() as u64, "Scoring tokens", self.options.show_progress);
        let results = parallel_map_with_progress(corpus, self.options.workers, &pb, |record| {
            self.score_token(&table, record)
        });
        pb.finish_and_clear();

        let mut scores = Vec::with_capacity(results.len());
        let mut skipped = 0usize;
        for (idx, result) in results.into_iter().enumerate() {
            match result {
                Ok(score) => scores.push(score),
                Err(DiphoneError::Parse(e)) => {
                    debug!("skipping record {}: {}", idx + 1, e.kind);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        if skipped > 0 {
            warn!(skipped, "records could not be scored");
        }

        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        info!(scored = scores.len(), "corpus scored");
        Ok(scores)
    }
}

/// Writes `token<TAB>score` lines, in the order given.
pub fn write_scores<W: Write>(writer: &mut W, scores: &[TokenScore]) -> io::Result<()> {
    for TokenScore { token, score } in scores {
        writeln!(writer, "{token}\t{score}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> PhoneInventory {
        PhoneInventory::load(
            ["m", "ɪː", "ɣ", "a", "ð", "s"],
            [Diphone::new("m", "ɪː"), Diphone::new("ɪː", "ɣ")],
        )
        .unwrap()
    }

    fn record(token: &str, phones: &[&str]) -> TokenRecord {
        TokenRecord::new(token, "g2p", phones.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_score_token_example() {
        let inv = inventory();
        let scorer = CorpusScorer::new(&inv, ScoreOptions::default());
        let table = FrequencyTable::from_counts([(("m", "ɪː"), 2), (("ɪː", "ɣ"), 1)]);

        let score = scorer
            .score_token(&table, &record("mig", &["m ɪː", "ɣ"]))
            .unwrap();
        assert_eq!(score.token, "mig");
        assert!((score.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_duplicates_count_once() {
        let inv = inventory();
        let scorer = CorpusScorer::new(&inv, ScoreOptions::default());
        let table = FrequencyTable::from_counts([(("a", "ð"), 4), (("ð", "a"), 2)]);

        // að, ða, að, ða → {að, ða}
        let score = scorer
            .score_token(&table, &record("aðað", &["a ð a ð a"]))
            .unwrap();
        assert!((score.score - (0.25 + 0.5) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_frequency_is_internal_consistency_error() {
        let inv = inventory();
        let scorer = CorpusScorer::new(&inv, ScoreOptions::default());
        let table = FrequencyTable::from_counts([(("m", "ɪː"), 2), (("ɪː", "ɣ"), 0)]);

        let err = scorer
            .score_token(&table, &record("mig", &["m ɪː", "ɣ"]))
            .unwrap_err();
        assert!(matches!(err, DiphoneError::InternalConsistency(ref d) if d == "ɪːɣ"));
    }

    #[test]
    fn test_sentence_scoring_fails_on_cross_word_only_diphone() {
        let inv = inventory();
        let corpus = vec![record("mig", &["m ɪː", "ɣ"])];

        let sentence = CorpusScorer::new(&inv, ScoreOptions::default());
        assert!(matches!(
            sentence.score_file(&corpus),
            Err(DiphoneError::InternalConsistency(_))
        ));

        let word = CorpusScorer::new(
            &inv,
            ScoreOptions {
                granularity: Granularity::Word,
                ..ScoreOptions::default()
            },
        );
        let scores = word.score_file(&corpus).unwrap();
        assert!((scores[0].score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_score_file_ranks_and_keeps_ties_in_order() {
        let inv = inventory();
        let corpus = vec![
            record("as", &["a s"]),
            record("mas", &["m a s"]),
            record("sa", &["s a"]),
            record("aa", &["a s"]),
            record("ma", &["m a"]),
        ];
        let scorer = CorpusScorer::new(
            &inv,
            ScoreOptions {
                workers: 3,
                ..ScoreOptions::default()
            },
        );
        let scores = scorer.score_file(&corpus).unwrap();
        let tokens: Vec<&str> = scores.iter().map(|s| s.token.as_str()).collect();

        // frequencies as=3, ma=2, sa=1
        // sa: 1/2, mas: (1/2 + 1/3)/3, ma: (1/2)/2, as and aa: (1/3)/2
        assert_eq!(tokens, vec!["sa", "mas", "ma", "as", "aa"]);
        assert!(scores.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let inv = inventory();
        let corpus = vec![
            record("mig", &["m ɪː ɣ"]),
            record("sam", &["s a m"]),
            record("mas", &["m a s"]),
            record("ás", &["a s"]),
        ];
        let scorer = CorpusScorer::new(&inv, ScoreOptions::default());

        assert_eq!(
            scorer.build_frequency_table(&corpus),
            scorer.build_frequency_table(&corpus)
        );
        assert_eq!(scorer.score_file(&corpus).unwrap(), scorer.score_file(&corpus).unwrap());
    }

    #[test]
    fn test_empty_token_is_skipped() {
        let inv = inventory();
        let corpus = vec![record("", &["m ɪː"]), record("mɪ", &["m ɪː"])];
        let scores = CorpusScorer::new(&inv, ScoreOptions::default())
            .score_file(&corpus)
            .unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].token, "mɪ");
    }

    #[test]
    fn test_write_scores() {
        let scores = vec![
            TokenScore { token: "mig".into(), score: 0.5 },
            TokenScore { token: "sa".into(), score: 0.25 },
        ];
        let mut out = Vec::new();
        write_scores(&mut out, &scores).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "mig\t0.5\nsa\t0.25\n");
    }

    #[test]
    fn test_scores_serialize_as_json() {
        let scores = vec![TokenScore { token: "mig".into(), score: 0.5 }];
        let json = serde_json::to_value(&scores).unwrap();
        assert_eq!(json, serde_json::json!([{ "token": "mig", "score": 0.5 }]));
    }
}
