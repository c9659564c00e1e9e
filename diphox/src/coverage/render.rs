//! Delimited-text renderings of a [`CoverageSnapshot`] for plotting tools:
//! the ranked count series behind a coverage bar plot and the phone×phone
//! matrix behind a heatmap.
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::coverage::analyzer::CoverageAnalyzer;
use crate::coverage::snapshot::CoverageSnapshot;
use crate::phones::Diphone;

pub const COUNTS_FILE: &str = "diphone_counts.tsv";
pub const RANKED_FILE: &str = "diphone_coverage.tsv";
pub const HEATMAP_FILE: &str = "diphone_heatmap.tsv";
pub const BAD_FILE: &str = "bad_diphones.tsv";

/// `diphone<TAB>count` per inventory diphone, inventory order.
pub fn write_counts<W: Write>(writer: &mut W, snapshot: &CoverageSnapshot) -> io::Result<()> {
    for (diphone, count) in &snapshot.counts {
        writeln!(writer, "{diphone}\t{count}")?;
    }
    Ok(())
}

/// `rank<TAB>diphone<TAB>count`, most frequent first.
pub fn write_ranked<W: Write>(writer: &mut W, snapshot: &CoverageSnapshot) -> io::Result<()> {
    let ranked = CoverageAnalyzer::new(snapshot).ranked_counts();
    for (rank, (diphone, count)) in ranked.iter().enumerate() {
        writeln!(writer, "{rank}\t{diphone}\t{count}")?;
    }
    Ok(())
}

/// The adjacency matrix with a header row of phone labels; each following
/// row starts with the label of the first phone.
pub fn write_heatmap<W: Write>(writer: &mut W, snapshot: &CoverageSnapshot) -> io::Result<()> {
    writeln!(writer, "\t{}", snapshot.phones.join("\t"))?;
    for (phone, row) in snapshot.phones.iter().zip(snapshot.adjacency.rows()) {
        let cells: Vec<String> = row.iter().map(u64::to_string).collect();
        writeln!(writer, "{phone}\t{}", cells.join("\t"))?;
    }
    Ok(())
}

/// `diphone<TAB>count` per unrecognised diphone, most frequent first.
pub fn write_bad<W: Write>(writer: &mut W, snapshot: &CoverageSnapshot) -> io::Result<()> {
    for (diphone, count) in &snapshot.bad {
        writeln!(writer, "{diphone}\t{count}")?;
    }
    Ok(())
}

/// One diphone per line, as its concatenated key.
pub fn write_diphones<W: Write>(writer: &mut W, diphones: &[Diphone]) -> io::Result<()> {
    for diphone in diphones {
        writeln!(writer, "{diphone}")?;
    }
    Ok(())
}

fn write_file(
    path: &Path,
    snapshot: &CoverageSnapshot,
    render: fn(&mut BufWriter<File>, &CoverageSnapshot) -> io::Result<()>,
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    render(&mut writer, snapshot)?;
    writer.flush()
}

/// Writes every rendering into `dir`, creating it if needed, and returns
/// the paths written.
pub fn export_snapshot(snapshot: &CoverageSnapshot, dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let outputs: [(&str, fn(&mut BufWriter<File>, &CoverageSnapshot) -> io::Result<()>); 4] = [
        (COUNTS_FILE, write_counts),
        (RANKED_FILE, write_ranked),
        (HEATMAP_FILE, write_heatmap),
        (BAD_FILE, write_bad),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (name, render) in outputs {
        let path = dir.join(name);
        write_file(&path, snapshot, render)?;
        written.push(path);
    }
    info!(dir = %dir.display(), files = written.len(), "coverage snapshot exported");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TokenRecord;
    use crate::coverage::CoverageAccumulator;
    use crate::phones::PhoneInventory;

    fn snapshot() -> CoverageSnapshot {
        let inv = PhoneInventory::load(
            ["a", "ð", "s"],
            [Diphone::new("a", "ð"), Diphone::new("ð", "a"), Diphone::new("a", "s")],
        )
        .unwrap();
        let mut acc = CoverageAccumulator::new(&inv);
        acc.ingest(&TokenRecord::new("aðað", "test", vec!["a ð a ð".into()]));
        acc.ingest(&TokenRecord::new("sa", "test", vec!["s a".into()]));
        acc.snapshot()
    }

    fn render(f: fn(&mut Vec<u8>, &CoverageSnapshot) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out, &snapshot()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_counts_and_ranked() {
        assert_eq!(render(write_counts), "að\t2\nða\t1\nas\t0\n");
        assert_eq!(render(write_ranked), "0\tað\t2\n1\tða\t1\n2\tas\t0\n");
        assert_eq!(render(write_bad), "sa\t1\n");
    }

    #[test]
    fn test_heatmap_layout() {
        assert_eq!(
            render(write_heatmap),
            "\ta\tð\ts\na\t0\t2\t0\nð\t1\t0\t0\ns\t0\t0\t0\n"
        );
    }

    #[test]
    fn test_export_snapshot_writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_snapshot(&snapshot(), dir.path().join("out")).unwrap();
        assert_eq!(written.len(), 4);
        for path in &written {
            assert!(path.exists(), "{}", path.display());
        }
        let counts = fs::read_to_string(dir.path().join("out").join(COUNTS_FILE)).unwrap();
        assert_eq!(counts.lines().count(), 3);
    }
}
