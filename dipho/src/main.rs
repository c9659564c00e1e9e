use clap::{Parser, Subcommand};
use diphox::{
    corpus::{Corpus, PronunciationDictionary},
    coverage::{render, CoverageAccumulator, CoverageAnalyzer},
    error::DiphoneError,
    g2p::{phonemize_file, BatchOptions, LexiconG2p},
    phones::{PhoneInventory, DEFAULT_PHONEMES},
    scoring::{write_scores, CorpusScorer, Granularity, ScoreOptions},
};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Subcommand, Debug)]
enum Mode {
    /// Phonemize a token list (one token per line) into a corpus file
    #[command(alias = "p")]
    G2p {
        /// Filesystem path to read tokens from
        input_path: PathBuf,

        /// Pronunciation lexicon (token<TAB>phones) used as the G2P backend
        #[arg(short = 'x', long = "lexicon", value_name = "LEXICON_PATH")]
        lexicon_path: PathBuf,

        /// Source tag written next to every pronunciation
        #[arg(long = "source", default_value = "lexicon")]
        source: String,

        /// Corpus file to write
        #[arg(
            short = 'o',
            long = "output",
            value_name = "OUTPUT_PATH",
            default_value = "data/tokens/g2p.tsv"
        )]
        output_path: PathBuf,
    },

    /// Report diphone coverage of a corpus
    #[command(alias = "c")]
    Coverage {
        /// Corpus file (token<TAB>source<TAB>phones...)
        corpus_path: PathBuf,

        /// Pronunciation dictionary to cross-reference missing diphones against
        #[arg(long = "dictionary", value_name = "DICTIONARY_PATH")]
        dictionary_path: Option<PathBuf>,

        /// Directory to write count tables, heatmap matrix and missing lists to
        #[arg(short = 'e', long = "export", value_name = "EXPORT_DIR")]
        export_dir: Option<PathBuf>,

        /// Print the summary as JSON instead of text
        #[arg(long = "json", default_value_t = false)]
        json: bool,
    },

    /// Rank corpus tokens by rare-diphone content
    #[command(alias = "s")]
    Score {
        /// Corpus file (token<TAB>source<TAB>phones...)
        corpus_path: PathBuf,

        /// Scores file to write (token<TAB>score, best first)
        #[arg(
            short = 'o',
            long = "output",
            value_name = "OUTPUT_PATH",
            default_value = "data/tokens/scored.tsv"
        )]
        output_path: PathBuf,

        /// Score only diphones inside words instead of whole tokens
        #[arg(long = "word-level", default_value_t = false)]
        word_level: bool,

        /// Print the ranked scores as JSON instead of a summary line
        #[arg(long = "json", default_value_t = false)]
        json: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "dipho")]
#[command(version = "0.1")]
#[command(about = "Diphone coverage statistics and rarity scoring for recording scripts")]
struct Cli {
    /// Valid diphone list, one phone1<TAB>phone2 pair per line
    #[arg(
        short = 'd',
        long = "diphones",
        value_name = "DIPHONES_PATH",
        default_value = "pron_data/diphones/complete_ipa.txt"
    )]
    diphones_path: PathBuf,

    /// Phone alphabet, one symbol per line. Defaults to the built-in
    /// Icelandic IPA set
    #[arg(long = "phonemes", value_name = "PHONEMES_PATH")]
    phonemes_path: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(
        short = 'j',
        long = "jobs",
        value_name = "JOBS",
        env = "DIPHO_JOBS",
        default_value_t = 4
    )]
    jobs: usize,

    /// Enable verbose debug logs
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_inventory(
    diphones_path: &Path,
    phonemes_path: Option<&Path>,
) -> Result<PhoneInventory, Box<dyn std::error::Error>> {
    let inventory = match phonemes_path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let phonemes: Vec<&str> = content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect();
            PhoneInventory::from_file(phonemes, diphones_path)?
        }
        None => PhoneInventory::from_file(DEFAULT_PHONEMES.iter().copied(), diphones_path)?,
    };
    info!(
        phonemes = inventory.phonemes().len(),
        diphones = inventory.len(),
        "loaded diphone inventory from {}",
        diphones_path.display()
    );
    Ok(inventory)
}

fn create_output(path: &Path) -> std::io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        diphones_path,
        phonemes_path,
        jobs,
        verbose,
        mode,
    } = Cli::parse();

    init_logging(verbose);

    match mode {
        Mode::G2p {
            input_path,
            lexicon_path,
            source,
            output_path,
        } => {
            let dictionary = PronunciationDictionary::from_file(&lexicon_path)?;
            let backend = Arc::new(LexiconG2p::new(&dictionary, source));
            let options = BatchOptions {
                jobs,
                show_progress: true,
            };

            let rt = tokio::runtime::Runtime::new()?;
            let report = rt.block_on(phonemize_file(
                backend,
                &input_path,
                &output_path,
                &options,
            ))?;

            println!(
                "Phonemized {} tokens ({} without pronunciation, {} failed) -> {}",
                report.records.len(),
                report.missed,
                report.failed,
                output_path.display()
            );
        }

        Mode::Coverage {
            corpus_path,
            dictionary_path,
            export_dir,
            json,
        } => {
            let inventory = load_inventory(&diphones_path, phonemes_path.as_deref())?;
            let corpus = Corpus::from_file(&corpus_path)?;

            let accumulator = CoverageAccumulator::ingest_parallel(&inventory, &corpus.records, jobs)?;
            let snapshot = accumulator.snapshot();
            let analyzer = CoverageAnalyzer::new(&snapshot);
            let summary = snapshot.summary();
            let missing = analyzer.missing_diphones();

            let xref = match &dictionary_path {
                Some(path) => {
                    let dictionary = PronunciationDictionary::from_file(path)?;
                    Some(analyzer.cross_reference(&dictionary))
                }
                None => None,
            };

            if json {
                let mut report = serde_json::json!({
                    "summary": summary,
                    "skipped_lines": corpus.skipped.len(),
                    "missing": missing.iter().map(|d| d.key()).collect::<Vec<_>>(),
                });
                if let Some(xref) = &xref {
                    report["in_dictionary"] =
                        serde_json::json!(xref.in_dictionary.iter().map(|d| d.key()).collect::<Vec<_>>());
                    report["nowhere"] =
                        serde_json::json!(xref.nowhere.iter().map(|d| d.key()).collect::<Vec<_>>());
                }
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Records:        {} ({} lines skipped)", summary.records, corpus.skipped.len());
                println!(
                    "Coverage:       {:.4} ({}/{} diphones)",
                    summary.coverage, summary.covered, summary.inventory
                );
                println!("Missing:        {}", summary.missing);
                println!(
                    "Unrecognised:   {} distinct, {} occurrences",
                    summary.bad_diphones, summary.bad_occurrences
                );
                if let Some(xref) = &xref {
                    println!("  in dictionary: {}", xref.in_dictionary.len());
                    println!("  nowhere:       {}", xref.nowhere.len());
                }
            }

            if let Some(dir) = export_dir {
                let mut written = render::export_snapshot(&snapshot, &dir)?;

                let missing_path = dir.join("missing_diphones.txt");
                let mut writer = create_output(&missing_path)?;
                render::write_diphones(&mut writer, &missing)?;
                writer.flush()?;
                written.push(missing_path);

                if let Some(xref) = &xref {
                    for (name, diphones) in [
                        ("missing_in_dictionary.txt", &xref.in_dictionary),
                        ("missing_nowhere.txt", &xref.nowhere),
                    ] {
                        let path = dir.join(name);
                        let mut writer = create_output(&path)?;
                        render::write_diphones(&mut writer, diphones)?;
                        writer.flush()?;
                        written.push(path);
                    }
                }

                for path in written {
                    eprintln!("wrote {}", path.display());
                }
            }
        }

        Mode::Score {
            corpus_path,
            output_path,
            word_level,
            json,
        } => {
            let inventory = load_inventory(&diphones_path, phonemes_path.as_deref())?;
            let corpus = Corpus::from_file(&corpus_path)?;

            let options = ScoreOptions {
                granularity: if word_level {
                    Granularity::Word
                } else {
                    Granularity::Sentence
                },
                workers: jobs,
                show_progress: true,
            };
            let scorer = CorpusScorer::new(&inventory, options);
            let scores = scorer.score_file(&corpus.records).map_err(|e| {
                if !word_level && matches!(e, DiphoneError::InternalConsistency(_)) {
                    eprintln!("hint: rerun with --word-level to score only diphones inside words");
                }
                e
            })?;

            let mut writer = create_output(&output_path)?;
            write_scores(&mut writer, &scores)?;
            writer.flush()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&scores)?);
            } else {
                println!(
                    "Scored {} tokens ({} lines skipped) -> {}",
                    scores.len(),
                    corpus.skipped.len(),
                    output_path.display()
                );
            }
        }
    }

    Ok(())
}
