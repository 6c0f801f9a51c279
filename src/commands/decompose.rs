use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver};
use log::{debug, error, info};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use wos_field_decomposer::common::{
    create_record_spinner, format_elapsed, setup_logging, DecomposeStats, ProcessingHistory,
    RecordWriter,
};
use wos_field_decomposer::record::{
    decompose_record, discover_export_files, DecomposedRecord, ExportReader, RawRecord,
};
use wos_field_decomposer::reference::ReferenceKind;
use wos_field_decomposer::{AddressResolver, StateCodes};

use crate::cli::DecomposeArgs;

struct ProcessingStats {
    files_processed: AtomicUsize,
    files_skipped: AtomicUsize,
    records_read: AtomicUsize,
    records_skipped: AtomicUsize,
    links: AtomicUsize,
    resolved_addresses: AtomicUsize,
    references: AtomicUsize,
    invalid_references: AtomicUsize,
    reprint_authors: AtomicUsize,
    grants: AtomicUsize,
}

impl ProcessingStats {
    fn new() -> Self {
        Self {
            files_processed: AtomicUsize::new(0),
            files_skipped: AtomicUsize::new(0),
            records_read: AtomicUsize::new(0),
            records_skipped: AtomicUsize::new(0),
            links: AtomicUsize::new(0),
            resolved_addresses: AtomicUsize::new(0),
            references: AtomicUsize::new(0),
            invalid_references: AtomicUsize::new(0),
            reprint_authors: AtomicUsize::new(0),
            grants: AtomicUsize::new(0),
        }
    }

    fn record(&self, record: &DecomposedRecord) {
        self.links.fetch_add(record.links.len(), Ordering::Relaxed);
        self.resolved_addresses.fetch_add(record.locations.len(), Ordering::Relaxed);
        self.references.fetch_add(record.references.len(), Ordering::Relaxed);
        self.invalid_references.fetch_add(
            record
                .references
                .iter()
                .filter(|r| r.kind == ReferenceKind::Invalid)
                .count(),
            Ordering::Relaxed,
        );
        self.reprint_authors.fetch_add(record.reprint_authors.len(), Ordering::Relaxed);
        self.grants.fetch_add(record.grants.len(), Ordering::Relaxed);
    }

    fn log_current(&self) {
        info!(
            "Progress: {} files | {} records | {} links | {} references | {} reprint authors",
            self.files_processed.load(Ordering::Relaxed),
            self.records_read.load(Ordering::Relaxed),
            self.links.load(Ordering::Relaxed),
            self.references.load(Ordering::Relaxed),
            self.reprint_authors.load(Ordering::Relaxed),
        );
    }

    fn to_decompose_stats(&self, records_written: usize) -> DecomposeStats {
        DecomposeStats {
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            records_read: self.records_read.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            records_written,
            links: self.links.load(Ordering::Relaxed),
            resolved_addresses: self.resolved_addresses.load(Ordering::Relaxed),
            references: self.references.load(Ordering::Relaxed),
            invalid_references: self.invalid_references.load(Ordering::Relaxed),
            reprint_authors: self.reprint_authors.load(Ordering::Relaxed),
            grants: self.grants.load(Ordering::Relaxed),
        }
    }
}

fn decompose_batch(
    records: &[RawRecord],
    resolver: &AddressResolver,
    stats: &ProcessingStats,
) -> Vec<DecomposedRecord> {
    records
        .par_iter()
        .map(|raw| {
            let record = decompose_record(raw, resolver);
            stats.record(&record);
            record
        })
        .collect()
}

/// Drop records an earlier run (or an earlier row of this run) already covered.
fn filter_processed(
    batch: Vec<RawRecord>,
    history: &mut Option<ProcessingHistory>,
    stats: &ProcessingStats,
) -> Vec<RawRecord> {
    let Some(history) = history.as_mut() else {
        return batch;
    };
    batch
        .into_iter()
        .filter(|raw| {
            let id = raw.record_id();
            if id.is_empty() || history.mark_record_processed(&id) {
                true
            } else {
                debug!("Skipping already processed record {}", id);
                stats.records_skipped.fetch_add(1, Ordering::Relaxed);
                false
            }
        })
        .collect()
}

fn load_resolver(state_codes: Option<&str>) -> Result<AddressResolver> {
    let codes = match state_codes {
        Some(path) => StateCodes::from_csv_path(path)?,
        None => {
            info!("Using builtin USA state-code table");
            StateCodes::builtin()
        }
    };
    Ok(AddressResolver::new(codes))
}

/// What the decomposition loop hands to the writer thread
enum WriterMessage {
    Record(DecomposedRecord),
    /// Every record of this input file has been sent
    FileCompleted(String),
}

/// Drain the channel into `writer`. With a history, record ids and the file
/// are marked and saved only after the file's records have been flushed.
fn write_records(
    receiver: Receiver<WriterMessage>,
    mut writer: RecordWriter,
    mut history: Option<(ProcessingHistory, PathBuf)>,
) -> Result<usize> {
    let mut count = 0;
    let mut pending = Vec::new();

    for message in receiver {
        match message {
            WriterMessage::Record(record) => {
                writer.write(&record)?;
                count += 1;
                if history.is_some() && !record.record_id.is_empty() {
                    pending.push(record.record_id);
                }

                if count % 10000 == 0 {
                    writer.flush()?;
                }
            }
            WriterMessage::FileCompleted(file_key) => {
                writer.flush()?;
                if let Some((history, path)) = history.as_mut() {
                    for id in pending.drain(..) {
                        history.mark_record_processed(&id);
                    }
                    history.mark_file_completed(&file_key);
                    history.save(path)?;
                }
            }
        }
    }

    writer.flush()?;
    Ok(count)
}

fn join_writer(handle: thread::JoinHandle<Result<usize>>) -> Result<usize> {
    handle
        .join()
        .map_err(|e| anyhow!("Writer thread panicked: {:?}", e))?
        .context("Writer thread failed")
}

/// Run the decompose command with the given arguments
pub fn run_decompose(args: DecomposeArgs) -> Result<DecomposeStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting Web of Science field decomposition");
    info!("Input: {}", args.input);
    info!("Output: {}", args.output);

    let num_threads = if args.threads == 0 {
        let cores = num_cpus::get();
        info!("Auto-detected {} CPU cores. Using {} threads.", cores, cores);
        cores
    } else {
        info!("Using specified {} threads.", args.threads);
        args.threads
    };

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        error!("Failed to build thread pool: {}. Using default.", e);
    }

    let resolver = load_resolver(args.state_codes.as_deref())?;
    let files = discover_export_files(&args.input)?;
    info!("Found {} export file(s)", files.len());

    let history = match args.history.as_deref() {
        Some(path) => {
            let path = PathBuf::from(path);
            let history = ProcessingHistory::load(&path)?;
            info!(
                "Loaded history: {} files, {} records already processed",
                history.files_completed.len(),
                history.records_processed.len()
            );
            Some((history, path))
        }
        None => None,
    };
    // Skip decisions run on a copy; only the writer thread saves history.
    let mut seen = history.as_ref().map(|(history, _)| history.clone());

    let writer = RecordWriter::create(&args.output, args.split_tables, history.is_some())?;
    let (sender, receiver) = bounded::<WriterMessage>(num_threads * 100);
    let writer_thread = thread::spawn(move || write_records(receiver, writer, history));

    let stats = Arc::new(ProcessingStats::new());
    let stats_thread_running = Arc::new(std::sync::Mutex::new(true));
    let stats_clone = Arc::clone(&stats);
    let stats_running_clone = Arc::clone(&stats_thread_running);
    let stats_interval = Duration::from_secs(args.stats_interval);

    let stats_thread = thread::spawn(move || {
        let mut last_log = Instant::now();
        loop {
            if let Ok(running) = stats_running_clone.lock() {
                if !*running {
                    break;
                }
            }

            thread::sleep(Duration::from_millis(500));

            if last_log.elapsed() >= stats_interval {
                stats_clone.log_current();
                last_log = Instant::now();
            }
        }
    });

    let progress = create_record_spinner("Processing export files...");
    let batch_size = args.batch_size.max(1);

    let processed = files.iter().try_for_each(|path| -> Result<()> {
        let file_key = path.display().to_string();
        if seen.as_ref().map_or(false, |h| h.is_file_completed(&file_key)) {
            info!("Skipping already processed file: {}", file_key);
            stats.files_skipped.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        progress.set_message(format!("Processing: {}", file_name));

        let mut reader = ExportReader::open(path)?;
        let mut file_records = 0;

        loop {
            let batch = reader
                .by_ref()
                .take(batch_size)
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Failed to read records from {}", file_key))?;
            if batch.is_empty() {
                break;
            }
            file_records += batch.len();
            stats.records_read.fetch_add(batch.len(), Ordering::Relaxed);
            progress.inc(batch.len() as u64);

            let batch = filter_processed(batch, &mut seen, &stats);
            for record in decompose_batch(&batch, &resolver, &stats) {
                sender
                    .send(WriterMessage::Record(record))
                    .map_err(|_| anyhow!("Writer stopped while processing {}", file_key))?;
            }
        }

        sender
            .send(WriterMessage::FileCompleted(file_key.clone()))
            .map_err(|_| anyhow!("Writer stopped while processing {}", file_key))?;
        stats.files_processed.fetch_add(1, Ordering::Relaxed);

        debug!("Completed processing: {} ({} records)", file_name, file_records);
        Ok(())
    });

    progress.finish_with_message("Export processing complete");

    drop(sender);

    info!("Waiting for writer thread to finish...");
    let written = join_writer(writer_thread);

    if let Ok(mut running) = stats_thread_running.lock() {
        *running = false;
    }
    let _ = stats_thread.join();

    // A writer failure also surfaces as a send error; report its cause.
    let records_written = written?;
    processed?;

    let final_stats = stats.to_decompose_stats(records_written);
    let total_time = start_time.elapsed();

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(total_time));
    info!("Files processed: {}", final_stats.files_processed);
    info!("Files skipped (history): {}", final_stats.files_skipped);
    info!("Records read: {}", final_stats.records_read);
    info!("Records skipped (history): {}", final_stats.records_skipped);
    info!("Author/address links: {}", final_stats.links);
    info!("Resolved addresses: {}", final_stats.resolved_addresses);
    info!("References: {} ({} invalid)", final_stats.references, final_stats.invalid_references);
    info!("Reprint authors: {}", final_stats.reprint_authors);
    info!("Grants: {}", final_stats.grants);
    info!("Records written to output: {}", final_stats.records_written);
    info!("Output file: {}", args.output);
    info!("========================================================");

    Ok(final_stats)
}
