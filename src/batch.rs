//! Batch rendering pipeline
//!
//! Iterates transcript files in an input directory, composes each into a
//! timeline, and hands the result to ffmpeg for MP3 encoding. One failing
//! file is reported and skipped; the rest of the batch proceeds.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::compose::Composer;
use crate::timeline::AudioTimeline;
use crate::transcript::TranscriptFile;
use crate::{Error, Result};

/// Container extension for rendered tracks
pub const OUTPUT_EXT: &str = "mp3";

/// Outcome of a batch run
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchSummary {
    /// Files rendered successfully
    pub rendered: usize,

    /// Files skipped after a parse, synthesis, or export failure
    pub failed: usize,
}

/// Verify the external audio toolchain is present
///
/// Runs before any processing so a missing encoder surfaces as one clear
/// startup error instead of a confusing failure on the first export.
///
/// # Errors
///
/// Returns [`Error::MissingDependency`] if ffmpeg is not on the PATH.
pub fn check_toolchain() -> Result<PathBuf> {
    which::which("ffmpeg").map_err(|_| {
        Error::MissingDependency(
            "ffmpeg not found in PATH; it is required to encode rendered audio".to_string(),
        )
    })
}

/// Drives transcript files through composition and export
pub struct BatchDriver {
    composer: Composer,
    transcripts_dir: PathBuf,
    output_dir: PathBuf,
    ffmpeg: PathBuf,
}

impl BatchDriver {
    /// Create a driver over a composer and the run's directories
    #[must_use]
    pub fn new(
        composer: Composer,
        transcripts_dir: PathBuf,
        output_dir: PathBuf,
        ffmpeg: PathBuf,
    ) -> Self {
        Self {
            composer,
            transcripts_dir,
            output_dir,
            ffmpeg,
        }
    }

    /// Render every transcript file in the input directory
    ///
    /// Files are processed in name order for deterministic runs. A failure
    /// on one file (malformed transcript, synthesis failure, export error)
    /// is logged with its cause and the batch continues; partial output for
    /// the failed file is not left in the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error only if the input directory cannot be listed or the
    /// output directory cannot be created; per-file failures are recorded
    /// in the summary instead.
    pub async fn run(&mut self) -> Result<BatchSummary> {
        std::fs::create_dir_all(&self.output_dir)?;

        let mut files = transcript_files(&self.transcripts_dir)?;
        files.sort();

        if files.is_empty() {
            tracing::info!(
                dir = %self.transcripts_dir.display(),
                "no transcript files found"
            );
            return Ok(BatchSummary::default());
        }

        let mut summary = BatchSummary::default();
        for path in files {
            tracing::info!(file = %path.display(), "processing transcript");
            match self.render_file(&path).await {
                Ok(()) => summary.rendered += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(file = %path.display(), error = %e, "skipping transcript");
                }
            }
        }

        tracing::info!(
            rendered = summary.rendered,
            failed = summary.failed,
            "batch finished"
        );
        Ok(summary)
    }

    /// Parse, compose, and export a single transcript file
    async fn render_file(&mut self, path: &Path) -> Result<()> {
        let document = TranscriptFile::from_path(path)?;
        if let Some(title) = &document.title {
            tracing::debug!(%title, "transcript title");
        }
        let track = self.composer.compose(&document.transcript).await?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Transcript(format!("unusable file name: {}", path.display())))?;
        let output_path = self.output_dir.join(format!("{stem}.{OUTPUT_EXT}"));

        export_track(&track, &self.ffmpeg, &output_path)?;
        tracing::info!(
            output = %output_path.display(),
            duration_secs = track.duration_secs(),
            "exported track"
        );
        Ok(())
    }
}

/// List transcript files (`.json`, non-recursive) in a directory
fn transcript_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            files.push(path);
        }
    }
    Ok(files)
}

/// Encode a timeline to the output path via ffmpeg
///
/// The timeline goes to a scratch WAV first; ffmpeg owns the MP3 encode.
///
/// # Errors
///
/// Returns [`Error::Artifact`] if the scratch file cannot be written or
/// ffmpeg exits non-zero.
pub fn export_track(track: &AudioTimeline, ffmpeg: &Path, output_path: &Path) -> Result<()> {
    let wav = track.to_wav_bytes()?;
    let scratch = tempfile::Builder::new()
        .prefix("scriptcast-")
        .suffix(".wav")
        .tempfile()
        .map_err(|e| Error::Artifact(e.to_string()))?;
    std::fs::write(scratch.path(), wav)
        .map_err(|e| Error::Artifact(format!("{}: {e}", scratch.path().display())))?;

    let result = Command::new(ffmpeg)
        .arg("-y")
        .args(["-loglevel", "error"])
        .arg("-i")
        .arg(scratch.path())
        .arg(output_path)
        .output()
        .map_err(|e| Error::Artifact(format!("failed to run ffmpeg: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        // Do not leave a truncated file behind.
        let _ = std::fs::remove_file(output_path);
        return Err(Error::Artifact(format!(
            "ffmpeg failed for {}: {}",
            output_path.display(),
            stderr.trim()
        )));
    }

    Ok(())
}
