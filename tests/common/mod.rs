//! Shared test utilities

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use scriptcast::{
    AudioCache, AudioTimeline, Composer, RequestPacer, SAMPLE_RATE, SegmentResolver,
    SpeechSynthesizer,
};

/// Fake backend producing a tone whose length tracks the text length,
/// so distinct texts yield distinguishable timelines.
pub struct FakeSynth {
    calls: Arc<AtomicUsize>,
}

impl FakeSynth {
    #[must_use]
    pub fn counting() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

/// Samples a fake synthesis of `text` produces
#[must_use]
pub fn samples_for(text: &str) -> usize {
    text.len() * 100
}

#[async_trait]
impl SpeechSynthesizer for FakeSynth {
    async fn synthesize(&self, text: &str) -> scriptcast::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut t = AudioTimeline::new(SAMPLE_RATE);
        #[allow(clippy::cast_precision_loss)]
        t.append_silence(samples_for(text) as f64 / f64::from(SAMPLE_RATE));
        t.to_wav_bytes()
    }
}

/// Backend that refuses every call, standing in for absent credentials or
/// an unreachable service
pub struct UnavailableSynth;

#[async_trait]
impl SpeechSynthesizer for UnavailableSynth {
    async fn synthesize(&self, text: &str) -> scriptcast::Result<Vec<u8>> {
        Err(scriptcast::Error::Synthesis(format!(
            "backend unavailable for: {text}"
        )))
    }
}

/// Build a resolver over a cache in `dir` whose backend always fails
pub fn offline_resolver_in(dir: &std::path::Path) -> SegmentResolver {
    let cache = AudioCache::load(dir).expect("failed to load cache");
    SegmentResolver::new(
        cache,
        Box::new(UnavailableSynth),
        RequestPacer::new(60_000),
        SAMPLE_RATE,
    )
}

/// Build a resolver over a cache in `dir` with a counting fake backend
pub fn resolver_in(dir: &std::path::Path) -> (SegmentResolver, Arc<AtomicUsize>) {
    let cache = AudioCache::load(dir).expect("failed to load cache");
    let (synth, calls) = FakeSynth::counting();
    // High ceiling keeps tests fast; spacing is covered by pacer unit tests.
    let resolver = SegmentResolver::new(
        cache,
        Box::new(synth),
        RequestPacer::new(60_000),
        SAMPLE_RATE,
    );
    (resolver, calls)
}

/// Build a composer over a cache in `dir` with a counting fake backend
pub fn composer_in(dir: &std::path::Path) -> (Composer, Arc<AtomicUsize>) {
    let (resolver, calls) = resolver_in(dir);
    (Composer::new(resolver, SAMPLE_RATE), calls)
}
