use std::fs;
use std::io::BufReader;

use diphox::coverage::render;
use diphox::scoring::write_scores;
use diphox::{
    Corpus, CorpusScorer, CoverageAccumulator, CoverageAnalyzer, Diphone, Granularity,
    PhoneInventory, PronunciationDictionary, ScoreOptions,
};

const PHONEMES: [&str; 8] = ["m", "ɪː", "ɣ", "h", "uː", "s", "a", "ð"];

const DIPHONES: &str = "m\tɪː\nɪː\tɣ\nh\tuː\nuː\ts\ns\ta\na\tð\nð\ta\nɣ\th\n";

const CORPUS: &str = "\
mig\tg2p\tm ɪː\tɣ
hús\tlexicon\th uː s
broken line
mig hús\tg2p\tm ɪː ɣ\th uː s
að\tg2p\ta ð
sa\tg2p\ts a
xx\tg2p\tx y x
";

#[test]
fn coverage_and_scoring_over_files() {
    let dir = tempfile::tempdir().unwrap();
    let diphone_path = dir.path().join("complete_ipa.txt");
    let corpus_path = dir.path().join("corpus.tsv");
    let dict_path = dir.path().join("dict.tsv");
    fs::write(&diphone_path, DIPHONES).unwrap();
    fs::write(&corpus_path, CORPUS).unwrap();
    fs::write(&dict_path, "ða\tð a\nhæ\th a\n").unwrap();

    let inventory = PhoneInventory::from_file(PHONEMES, &diphone_path).unwrap();
    assert_eq!(inventory.enumerate_diphones().len(), 8);

    let corpus = Corpus::from_file(&corpus_path).unwrap();
    assert_eq!(corpus.len(), 6);
    assert_eq!(corpus.skipped.len(), 1);
    assert_eq!(corpus.skipped[0].line, 3);

    let mut accumulator = CoverageAccumulator::new(&inventory);
    accumulator.ingest_all(&corpus.records);

    // counts equal the adjacent occurrences restricted to the inventory
    assert_eq!(accumulator.count(&Diphone::new("m", "ɪː")), 2);
    assert_eq!(accumulator.count(&Diphone::new("ɪː", "ɣ")), 2);
    assert_eq!(accumulator.count(&Diphone::new("ɣ", "h")), 1);
    assert_eq!(accumulator.count(&Diphone::new("uː", "s")), 2);
    assert_eq!(accumulator.bad_count(&Diphone::new("x", "y")), 1);

    let snapshot = accumulator.snapshot();
    let analyzer = CoverageAnalyzer::new(&snapshot);
    assert_eq!(analyzer.missing_diphones(), vec![Diphone::new("ð", "a")]);
    assert!((analyzer.coverage_ratio() - 7.0 / 8.0).abs() < 1e-12);

    let dictionary = PronunciationDictionary::from_reader(BufReader::new(
        fs::File::open(&dict_path).unwrap(),
    ))
    .unwrap();
    let xref = analyzer.cross_reference(&dictionary);
    assert_eq!(xref.in_dictionary, vec![Diphone::new("ð", "a")]);
    assert!(xref.nowhere.is_empty());

    let written = render::export_snapshot(&snapshot, dir.path().join("plots")).unwrap();
    assert_eq!(written.len(), 4);

    // sentence-level scoring needs ɣh, which only ever occurs across words
    let sentence = CorpusScorer::new(&inventory, ScoreOptions::default());
    assert!(sentence.score_file(&corpus.records).is_err());

    let scorer = CorpusScorer::new(
        &inventory,
        ScoreOptions {
            granularity: Granularity::Word,
            workers: 2,
            show_progress: false,
        },
    );
    let scores = scorer.score_file(&corpus.records).unwrap();
    assert_eq!(scores.len(), corpus.len());
    assert!(scores.windows(2).all(|w| w[0].score >= w[1].score));

    let mut out = Vec::new();
    write_scores(&mut out, &scores).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), corpus.len());
    assert!(text.lines().all(|l| l.split('\t').count() == 2));
}

#[test]
fn partitioned_ingest_equals_sequential() {
    let inventory = PhoneInventory::from_reader(PHONEMES, DIPHONES.as_bytes()).unwrap();
    let corpus = Corpus::from_reader(CORPUS.as_bytes()).unwrap();

    let mut sequential = CoverageAccumulator::new(&inventory);
    sequential.ingest_all(&corpus.records);
    let parallel = CoverageAccumulator::ingest_parallel(&inventory, &corpus.records, 3).unwrap();

    assert_eq!(sequential.snapshot(), parallel.snapshot());
}
