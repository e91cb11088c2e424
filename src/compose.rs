//! Transcript composition
//!
//! Recursively interprets a transcript node sequence into one linear
//! timeline. Processing is strictly sequential in document order; audio is
//! order-sensitive, so no reordering or parallelism.

use crate::resolve::SegmentResolver;
use crate::timeline::AudioTimeline;
use crate::transcript::TranscriptNode;
use crate::Result;

/// Composes transcript trees into audio timelines
pub struct Composer {
    resolver: SegmentResolver,
    sample_rate: u32,
}

impl Composer {
    /// Create a composer over a segment resolver
    #[must_use]
    pub fn new(resolver: SegmentResolver, sample_rate: u32) -> Self {
        Self {
            resolver,
            sample_rate,
        }
    }

    /// The underlying resolver
    #[must_use]
    pub fn resolver(&self) -> &SegmentResolver {
        &self.resolver
    }

    /// Compose a node sequence into a single timeline
    ///
    /// Repeat groups compose their children once and duplicate the
    /// sub-timeline, so a group never costs more than one synthesis pass
    /// per unique text and its repetitions are sample-identical.
    ///
    /// # Errors
    ///
    /// Propagates resolution failures ([`crate::Error::Synthesis`],
    /// [`crate::Error::Artifact`]) from text leaves.
    pub async fn compose(&mut self, nodes: &[TranscriptNode]) -> Result<AudioTimeline> {
        let mut track = AudioTimeline::new(self.sample_rate);

        for node in nodes {
            match node {
                TranscriptNode::Text(text) => {
                    let segment = self.resolver.resolve(text).await?;
                    track.append(&segment);
                }
                TranscriptNode::Break { seconds } => {
                    track.append_silence(*seconds);
                }
                // A zero-count group is skipped outright: composing its
                // children would cost synthesis calls for audio that is
                // never heard.
                TranscriptNode::Repeat { count: 0, .. } => {}
                TranscriptNode::Repeat { count, children } => {
                    let sub = Box::pin(self.compose(children)).await?;
                    track.append_repeated(&sub, *count);
                }
            }
        }

        Ok(track)
    }
}
