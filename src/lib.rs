//! scriptcast - batch transcript-to-audio renderer
//!
//! Turns structured transcript files (speech text, pauses, repeated
//! sections) into narrated audio tracks through a text-to-speech backend,
//! backed by a persistent content-addressed cache and a process-wide
//! request pacer.
//!
//! # Architecture
//!
//! ```text
//! transcripts/*.json
//!        │
//! ┌──────▼──────┐   ┌──────────┐   ┌───────────────────┐
//! │ BatchDriver ├──►│ Composer ├──►│ SegmentResolver   │
//! └──────┬──────┘   └──────────┘   │  ├─ AudioCache    │
//!        │                         │  └─ GoogleTts     │
//!    output/*.mp3                  │     (RequestPacer)│
//!                                  └───────────────────┘
//! ```

pub mod batch;
pub mod cache;
pub mod compose;
pub mod config;
pub mod error;
pub mod resolve;
pub mod synth;
pub mod timeline;
pub mod transcript;

pub use batch::{BatchDriver, BatchSummary};
pub use cache::AudioCache;
pub use compose::Composer;
pub use config::{Config, VoiceParams};
pub use error::{Error, Result};
pub use resolve::SegmentResolver;
pub use synth::{GoogleTts, RequestPacer, SpeechSynthesizer};
pub use timeline::{AudioTimeline, SAMPLE_RATE};
pub use transcript::{TranscriptFile, TranscriptNode};
