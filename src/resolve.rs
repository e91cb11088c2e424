//! Audio segment resolution
//!
//! Turns a text segment into a decoded timeline, going through the cache
//! first and falling back to rate-limited synthesis. Artifacts are named by
//! a content hash of the text so identical text always lands on the same
//! file, even across cache resets mid-run.

use sha2::{Digest, Sha256};

use crate::cache::{ARTIFACT_EXT, AudioCache};
use crate::synth::{RequestPacer, SpeechSynthesizer};
use crate::timeline::AudioTimeline;
use crate::{Error, Result};

/// Derive the artifact filename for a trimmed text segment
///
/// Hash collisions between different texts are an accepted risk at the
/// expected volume; the cache does not guard against them.
#[must_use]
pub fn content_filename(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("{}.{ARTIFACT_EXT}", hex::encode(digest))
}

/// Short text preview for progress logging
#[must_use]
pub fn preview(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{head}...")
    }
}

/// Resolves text segments to timelines via cache or synthesis
pub struct SegmentResolver {
    cache: AudioCache,
    synthesizer: Box<dyn SpeechSynthesizer>,
    pacer: RequestPacer,
    sample_rate: u32,
}

impl SegmentResolver {
    /// Create a resolver over a loaded cache and a synthesis backend
    #[must_use]
    pub fn new(
        cache: AudioCache,
        synthesizer: Box<dyn SpeechSynthesizer>,
        pacer: RequestPacer,
        sample_rate: u32,
    ) -> Self {
        Self {
            cache,
            synthesizer,
            pacer,
            sample_rate,
        }
    }

    /// The underlying cache
    #[must_use]
    pub fn cache(&self) -> &AudioCache {
        &self.cache
    }

    /// Resolve a text segment to a decoded timeline
    ///
    /// Empty (after trimming) text short-circuits to an empty timeline with
    /// no cache or synthesis interaction. A cache hit whose artifact fails
    /// to decode is degraded to a miss and regenerated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Synthesis`] if the backend call fails and
    /// [`Error::Artifact`] if the fresh artifact cannot be written or read
    /// back.
    pub async fn resolve(&mut self, text: &str) -> Result<AudioTimeline> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(AudioTimeline::new(self.sample_rate));
        }

        if let Some(path) = self.cache.lookup_by_text(text) {
            match std::fs::read(&path)
                .map_err(|e| Error::Artifact(format!("{}: {e}", path.display())))
                .and_then(|bytes| AudioTimeline::from_wav_bytes(&bytes, self.sample_rate))
            {
                Ok(timeline) => {
                    tracing::info!(text = %preview(text), "using cached audio");
                    return Ok(timeline);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "cached artifact unreadable, regenerating"
                    );
                }
            }
        }

        tracing::info!(text = %preview(text), "synthesizing");
        self.pacer.acquire().await;
        let bytes = self.synthesizer.synthesize(text).await?;

        let filename = content_filename(text);
        let path = self.cache.artifact_path(&filename);
        std::fs::write(&path, &bytes)
            .map_err(|e| Error::Artifact(format!("{}: {e}", path.display())))?;
        self.cache.put(&filename, text)?;

        let written = std::fs::read(&path)
            .map_err(|e| Error::Artifact(format!("{}: {e}", path.display())))?;
        AudioTimeline::from_wav_bytes(&written, self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_deterministic_and_distinct() {
        assert_eq!(content_filename("Hello"), content_filename("Hello"));
        assert_ne!(content_filename("Hello"), content_filename("hello"));
        assert!(content_filename("Hello").ends_with(".wav"));
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "x".repeat(100);
        let p = preview(&long);
        assert_eq!(p.chars().count(), 43);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }
}
