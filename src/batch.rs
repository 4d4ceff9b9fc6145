/// Sequential batch conversion.
///
/// Batches walk a snapshot of the session one entry at a time: decode,
/// quality search, then deliver (or insert into the archive) before the next
/// entry is touched. Peak memory stays around one decoded bitmap plus one
/// encoded buffer, plus the archive being built.
use crate::archive::ArchiveBuilder;
use crate::constants::{ARCHIVE_FILE_NAME, PROGRESS_BAR_TEMPLATE};
use crate::delivery::DownloadSink;
use crate::error::Result;
use crate::naming::UniqueNames;
use crate::session::{CompressedArtifact, PendingTask, Session};
use crate::settings::ConversionSettings;
use crate::utils::{calculate_compression_ratio, format_file_size};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared stop request, checked between images.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
    /// Converted images whose output is still above the target
    pub over_target: usize,
    /// The subset of `over_target` that went all the way to the floor
    pub floor_reached: usize,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
    pub cancelled: bool,
    pub elapsed: Duration,
    /// Names delivered, or stored in the archive, in order
    pub outputs: Vec<String>,
}

impl BatchSummary {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    fn record(&mut self, task: &PendingTask, artifact: &CompressedArtifact) {
        self.converted += 1;
        self.total_input_bytes += task.source.bytes.len() as u64;
        self.total_output_bytes += artifact.encoded_bytes.len() as u64;
        if !artifact.fits_target {
            self.over_target += 1;
            if artifact.quality_used.is_floor() {
                self.floor_reached += 1;
            }
        }
    }

    pub fn print(&self) {
        crate::info!("\n📊 Conversion Summary:");
        crate::info!("  📁 Converted: {}/{}", self.converted, self.total);
        crate::info!(
            "  📊 Total original size: {}",
            format_file_size(self.total_input_bytes)
        );
        crate::info!(
            "  📊 Total converted size: {}",
            format_file_size(self.total_output_bytes)
        );
        crate::info!(
            "  🎯 Overall compression ratio: {:.1}%",
            calculate_compression_ratio(self.total_input_bytes, self.total_output_bytes)
        );
        crate::info!("  ⏱️  Total time: {:?}", self.elapsed);
        if self.over_target > 0 {
            crate::info!(
                "  ⚠️  Above target size: {} ({} at minimum quality)",
                self.over_target,
                self.floor_reached
            );
        }
        if self.failed > 0 {
            crate::info!("  ⚠️  Failed files: {}", self.failed);
        }
        if self.cancelled {
            crate::info!("  ⚠️  Cancelled before completion");
        }
    }
}

/// A conversion run over the entries present when it was created.
pub struct Batch {
    tasks: Vec<PendingTask>,
    settings: ConversionSettings,
    cancel: CancelFlag,
}

impl Batch {
    pub fn new(session: &Session, settings: ConversionSettings) -> Self {
        Self {
            tasks: session.snapshot(),
            settings,
            cancel: CancelFlag::new(),
        }
    }

    #[cfg(test)]
    fn from_tasks(tasks: Vec<PendingTask>, settings: ConversionSettings) -> Self {
        Self {
            tasks,
            settings,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Converts every entry and delivers each artifact on its own.
    pub fn run_individual(self, sink: &mut dyn DownloadSink) -> Result<BatchSummary> {
        let mut names = UniqueNames::new();
        self.run(|artifact| {
            let name = names.claim(&artifact.derived_name);
            sink.deliver(&name, &artifact.encoded_bytes)?;
            Ok(name)
        })
    }

    /// Converts every entry into one zip and delivers it as
    /// `converted_images.zip`. A cancelled run delivers nothing.
    pub fn run_archived(self, sink: &mut dyn DownloadSink) -> Result<BatchSummary> {
        if self.is_empty() {
            return Ok(BatchSummary::default());
        }

        let mut archive = ArchiveBuilder::new();
        let summary =
            self.run(|artifact| archive.add(&artifact.derived_name, &artifact.encoded_bytes))?;

        if summary.cancelled || archive.is_empty() {
            return Ok(summary);
        }

        let bytes = archive.finish()?;
        sink.deliver(ARCHIVE_FILE_NAME, &bytes)?;
        crate::info!(
            "📦 {} ({} entries, {})",
            ARCHIVE_FILE_NAME,
            summary.converted,
            format_file_size(bytes.len() as u64)
        );
        Ok(summary)
    }

    /// Shared loop. `emit` hands one artifact onwards and returns the name it
    /// went out under; an emit error aborts the batch since the sink or
    /// archive is then unusable.
    fn run<F>(self, mut emit: F) -> Result<BatchSummary>
    where
        F: FnMut(&CompressedArtifact) -> Result<String>,
    {
        let start_time = Instant::now();
        let mut summary = BatchSummary::new(self.tasks.len());
        if self.tasks.is_empty() {
            return Ok(summary);
        }

        crate::info!(
            "🚀 Converting {} image(s) to {} (target {})",
            self.tasks.len(),
            self.settings.output_format,
            self.settings.target_size
        );
        let progress = create_progress_bar(self.tasks.len() as u64);

        for task in &self.tasks {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            progress.set_message(task.source.name.clone());
            match task.convert(&self.settings) {
                Ok(artifact) => {
                    let name = emit(&artifact)?;
                    crate::verbose!(
                        "{} -> {} ({:.1} KB, Q: {}%)",
                        task.source.name,
                        name,
                        artifact.size_kb(),
                        artifact.quality_used.percent()
                    );
                    summary.record(task, &artifact);
                    summary.outputs.push(name);
                }
                Err(e) => {
                    progress.suspend(|| {
                        crate::error!("Failed to convert {}: {}", task.source.name, e);
                    });
                    summary.failed += 1;
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        summary.elapsed = start_time.elapsed();
        Ok(summary)
    }
}

fn create_progress_bar(len: u64) -> ProgressBar {
    if crate::logger::is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(PROGRESS_BAR_TEMPLATE) {
        pb.set_style(style);
    }
    pb
}
