use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::record::DecomposedRecord;

/// Paths for the per-entity tables written next to the main output
#[derive(Debug, Clone)]
pub struct TableOutputPaths {
    pub all: PathBuf,
    pub items: PathBuf,
    pub journals: PathBuf,
    pub abstracts: PathBuf,
    pub au_addrs: PathBuf,
    pub addresses: PathBuf,
    pub references: PathBuf,
    pub rp_authors: PathBuf,
    pub authors: PathBuf,
    pub grants: PathBuf,
}

impl TableOutputPaths {
    /// Generate table paths from a base path
    /// "papers.jsonl" -> "papers.jsonl", "papers_au_addrs.jsonl", "papers_references.jsonl", ...
    pub fn from_base<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let extension = base.extension().and_then(|s| s.to_str());
        let parent = base.parent();

        let make_path = |suffix: &str| -> PathBuf {
            let filename = match extension {
                Some(ext) => format!("{}_{}.{}", stem, suffix, ext),
                None => format!("{}_{}", stem, suffix),
            };
            match parent {
                Some(p) if !p.as_os_str().is_empty() => p.join(filename),
                _ => PathBuf::from(filename),
            }
        };

        Self {
            all: base.to_path_buf(),
            items: make_path("items"),
            journals: make_path("journals"),
            abstracts: make_path("abstracts"),
            au_addrs: make_path("au_addrs"),
            addresses: make_path("addresses"),
            references: make_path("references"),
            rp_authors: make_path("rp_authors"),
            authors: make_path("authors"),
            grants: make_path("grants"),
        }
    }
}

/// One table row: an entity tagged with the record it came from
#[derive(Debug, Serialize)]
pub struct TableRow<'a, T: Serialize> {
    pub record_id: &'a str,
    #[serde(flatten)]
    pub row: &'a T,
}

/// Abstract text keyed by record, one row per paper with an abstract
#[derive(Debug, Serialize)]
struct AbstractRow<'a> {
    #[serde(rename = "abstract")]
    text: &'a str,
}

struct TableWriters {
    items: BufWriter<File>,
    journals: BufWriter<File>,
    abstracts: BufWriter<File>,
    au_addrs: BufWriter<File>,
    addresses: BufWriter<File>,
    references: BufWriter<File>,
    rp_authors: BufWriter<File>,
    authors: BufWriter<File>,
    grants: BufWriter<File>,
}

/// Writes decomposed records as JSONL, optionally fanned out into tables
pub struct RecordWriter {
    records: BufWriter<File>,
    tables: Option<TableWriters>,
}

impl RecordWriter {
    /// Create (or, with `append`, extend) the output files under `base`.
    pub fn create<P: AsRef<Path>>(base: P, split_tables: bool, append: bool) -> Result<Self> {
        let paths = TableOutputPaths::from_base(base);
        let tables = if split_tables {
            Some(TableWriters {
                items: open_output(&paths.items, append)?,
                journals: open_output(&paths.journals, append)?,
                abstracts: open_output(&paths.abstracts, append)?,
                au_addrs: open_output(&paths.au_addrs, append)?,
                addresses: open_output(&paths.addresses, append)?,
                references: open_output(&paths.references, append)?,
                rp_authors: open_output(&paths.rp_authors, append)?,
                authors: open_output(&paths.authors, append)?,
                grants: open_output(&paths.grants, append)?,
            })
        } else {
            None
        };

        Ok(Self {
            records: open_output(&paths.all, append)?,
            tables,
        })
    }

    pub fn write(&mut self, record: &DecomposedRecord) -> Result<()> {
        let json_line = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(self.records, "{}", json_line).context("Failed to write to output file")?;

        if let Some(tables) = self.tables.as_mut() {
            let id = record.record_id.as_str();
            write_rows(&mut tables.items, id, std::slice::from_ref(&record.item))?;
            write_rows(&mut tables.journals, id, std::slice::from_ref(&record.journal))?;
            if !record.abstract_text.is_empty() {
                let row = AbstractRow { text: &record.abstract_text };
                write_rows(&mut tables.abstracts, id, &[row])?;
            }
            write_rows(&mut tables.au_addrs, id, &record.links)?;
            write_rows(&mut tables.addresses, id, &record.locations)?;
            write_rows(&mut tables.references, id, &record.references)?;
            write_rows(&mut tables.rp_authors, id, &record.reprint_authors)?;
            write_rows(&mut tables.authors, id, &record.authors)?;
            write_rows(&mut tables.grants, id, &record.grants)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.records.flush()?;
        if let Some(tables) = self.tables.as_mut() {
            for writer in [
                &mut tables.items,
                &mut tables.journals,
                &mut tables.abstracts,
                &mut tables.au_addrs,
                &mut tables.addresses,
                &mut tables.references,
                &mut tables.rp_authors,
                &mut tables.authors,
                &mut tables.grants,
            ] {
                writer.flush()?;
            }
        }
        Ok(())
    }
}

fn open_output(path: &Path, append: bool) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_rows<T: Serialize>(writer: &mut BufWriter<File>, record_id: &str, rows: &[T]) -> Result<()> {
    for row in rows {
        let json_line = serde_json::to_string(&TableRow { record_id, row })
            .context("Failed to serialize table row")?;
        writeln!(writer, "{}", json_line).context("Failed to write table row")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressResolver;
    use crate::record::{decompose_record, RawRecord};
    use std::io::{BufRead, BufReader};
    use tempfile::tempdir;

    #[test]
    fn test_table_path_generation() {
        let paths = TableOutputPaths::from_base("papers.jsonl");
        assert_eq!(paths.all, PathBuf::from("papers.jsonl"));
        assert_eq!(paths.items, PathBuf::from("papers_items.jsonl"));
        assert_eq!(paths.au_addrs, PathBuf::from("papers_au_addrs.jsonl"));
        assert_eq!(paths.rp_authors, PathBuf::from("papers_rp_authors.jsonl"));
        assert_eq!(paths.grants, PathBuf::from("papers_grants.jsonl"));
    }

    #[test]
    fn test_table_path_with_directory() {
        let paths = TableOutputPaths::from_base("/path/to/output.jsonl");
        assert_eq!(paths.references, PathBuf::from("/path/to/output_references.jsonl"));
    }

    #[test]
    fn test_table_path_no_extension() {
        let paths = TableOutputPaths::from_base("papers");
        assert_eq!(paths.addresses, PathBuf::from("papers_addresses"));
    }

    fn count_lines(path: &Path) -> usize {
        BufReader::new(File::open(path).unwrap()).lines().count()
    }

    #[test]
    fn test_record_writer_tables() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("out.jsonl");
        let raw: RawRecord = [
            ("UT", "WOS:1"),
            ("PY", "2020"),
            ("SO", "NATURE"),
            ("C1", "[Smith, J; Doe, A] Univ X, Boston, MA 02115 USA"),
            ("CR", "Smith J, 2020, NATURE, V580, P123"),
        ]
        .into_iter()
        .collect();
        let record = decompose_record(&raw, &AddressResolver::default());

        let mut writer = RecordWriter::create(&base, true, false).unwrap();
        writer.write(&record).unwrap();
        writer.flush().unwrap();

        let paths = TableOutputPaths::from_base(&base);
        assert_eq!(count_lines(&paths.all), 1);
        assert_eq!(count_lines(&paths.items), 1);
        assert_eq!(count_lines(&paths.journals), 1);
        assert_eq!(count_lines(&paths.abstracts), 0);
        assert_eq!(count_lines(&paths.au_addrs), 2);
        assert_eq!(count_lines(&paths.addresses), 1);
        assert_eq!(count_lines(&paths.references), 1);
        assert_eq!(count_lines(&paths.grants), 0);

        let first = std::fs::read_to_string(&paths.au_addrs).unwrap();
        let row: serde_json::Value = serde_json::from_str(first.lines().next().unwrap()).unwrap();
        assert_eq!(row["record_id"], "1");
        assert_eq!(row["author"], "Smith, J");

        let item: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.items).unwrap()).unwrap();
        assert_eq!(item["record_id"], "1");
        assert_eq!(item["pub_year"], "2020");
        assert_eq!(item["num_authors"], 0);
        assert_eq!(item["num_countries"], 1);
        assert_eq!(item["num_references"], 1);

        let journal: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.journals).unwrap()).unwrap();
        assert_eq!(journal["source"], "NATURE");
    }

    #[test]
    fn test_record_writer_append() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("out.jsonl");
        let record = decompose_record(&RawRecord::new(), &AddressResolver::default());

        for _ in 0..2 {
            let mut writer = RecordWriter::create(&base, false, true).unwrap();
            writer.write(&record).unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(count_lines(&base), 2);
    }
}
