use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::RawRecord;

const BOM: char = '\u{feff}';

/// Reads a tab-delimited export: one header line of field tags, then one
/// record per line.
pub struct ExportReader<R: BufRead> {
    reader: R,
    header: Vec<String>,
    line_number: usize,
    buf: Vec<u8>,
}

impl ExportReader<Box<dyn BufRead + Send>> {
    /// Open an export file, decompressing `.gz` files on the fly.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open export file: {}", path.display()))?;

        let reader: Box<dyn BufRead + Send> = if path.extension().map_or(false, |ext| ext == "gz") {
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        ExportReader::new(reader)
            .with_context(|| format!("Failed to read header of {}", path.display()))
    }
}

impl<R: BufRead> ExportReader<R> {
    /// Consume the header line. An input without one yields no records.
    pub fn new(reader: R) -> Result<Self> {
        let mut export = Self {
            reader,
            header: Vec::new(),
            line_number: 0,
            buf: Vec::new(),
        };

        if let Some(line) = export.next_line()? {
            export.header = line
                .trim_start_matches(BOM)
                .split('\t')
                .map(|tag| tag.trim().to_string())
                .collect();
        }
        Ok(export)
    }

    /// Next non-blank line, lossily decoded, without its line terminator.
    fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            self.buf.clear();
            let n = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .with_context(|| format!("Failed to read line {}", self.line_number + 1))?;
            if n == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = String::from_utf8_lossy(&self.buf);
            let line = line.trim_end_matches(['\r', '\n']);
            if !line.trim().is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    fn parse_row(&self, line: &str) -> RawRecord {
        let values: Vec<&str> = line.split('\t').collect();
        if values.len() > self.header.len() {
            debug!(
                "Line {}: {} fields for {} header tags, extra fields ignored",
                self.line_number,
                values.len(),
                self.header.len()
            );
        }

        let mut record = RawRecord::new();
        for (i, tag) in self.header.iter().enumerate() {
            record.insert(tag, values.get(i).copied().unwrap_or_default());
        }
        record
    }
}

impl<R: BufRead> Iterator for ExportReader<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.header.is_empty() {
            return None;
        }
        match self.next_line() {
            Ok(Some(line)) => Some(Ok(self.parse_row(&line))),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map_or(false, |name| name.starts_with('.'))
}

/// Export files under `input`: the file itself, or every non-hidden file
/// below a directory, in path order.
pub fn discover_export_files<P: AsRef<Path>>(input: P) -> Result<Vec<PathBuf>> {
    let input = input.as_ref();
    if !input.exists() {
        return Err(anyhow::anyhow!("Input does not exist: {}", input.display()));
    }
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry.with_context(|| format!("Failed to scan {}", input.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
