//! Rate-limited speech synthesis
//!
//! Wraps the Google Cloud text-to-speech REST API behind a trait seam so
//! tests can substitute a fake backend, and paces outbound requests with a
//! process-wide governor limiter.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use governor::clock::{Clock, DefaultClock, ReasonablyRealtime};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};

use crate::config::VoiceParams;
use crate::{Error, Result};

/// Synthesis endpoint for the Google Cloud TTS REST API
const SYNTHESIZE_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// A backend that turns text into encoded WAV audio bytes
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech for the given text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Synthesis`] if the backend call fails. Failures are
    /// not retried here; the caller decides whether to skip or abort.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Google Cloud text-to-speech client
///
/// Voice parameters are fixed for the lifetime of the client; they are run
/// configuration, not per-call arguments. The API key may be absent at
/// construction: a run served entirely from cache never needs it, so the
/// missing credential only surfaces on the first actual synthesis call.
pub struct GoogleTts {
    client: reqwest::Client,
    api_key: Option<String>,
    voice: VoiceParams,
    sample_rate: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f64,
    pitch: f64,
    sample_rate_hertz: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

impl GoogleTts {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(
        api_key: Option<String>,
        voice: VoiceParams,
        sample_rate: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            voice,
            sample_rate,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "no synthesis API key: set {} or place a {} file in the project directory",
                crate::config::API_KEY_ENV,
                crate::config::API_KEY_FILE,
            ))
        })?;

        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &self.voice.language_code,
                name: &self.voice.voice_name,
            },
            audio_config: AudioConfig {
                audio_encoding: "LINEAR16",
                speaking_rate: self.voice.speaking_rate,
                pitch: self.voice.pitch,
                sample_rate_hertz: self.sample_rate,
            },
        };

        let response = self
            .client
            .post(SYNTHESIZE_URL)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!("TTS error {status}: {body}")));
        }

        let payload: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        let encoded = payload
            .audio_content
            .ok_or_else(|| Error::Synthesis("response carried no audio content".to_string()))?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::Synthesis(format!("audio content is not valid base64: {e}")))
    }
}

/// Process-wide request pacer enforcing a minimum inter-request interval
///
/// Built from a queries-per-minute ceiling with burst capacity 1, so two
/// consecutive grants are always at least `60 / qpm` seconds apart. The
/// clock is a type parameter so tests can drive a
/// [`governor::clock::FakeRelativeClock`].
pub struct RequestPacer<C: Clock = DefaultClock> {
    limiter: RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<C::Instant>>,
}

/// Quota with burst 1 for the given queries-per-minute ceiling
fn interval_quota(queries_per_minute: u32) -> Quota {
    let qpm = NonZeroU32::new(queries_per_minute).unwrap_or(NonZeroU32::MIN);
    let period = Duration::from_secs_f64(60.0 / f64::from(qpm.get()));
    Quota::with_period(period).unwrap_or_else(|| Quota::per_minute(qpm))
}

impl RequestPacer<DefaultClock> {
    /// Create a pacer on the system clock
    #[must_use]
    pub fn new(queries_per_minute: u32) -> Self {
        Self {
            limiter: RateLimiter::direct(interval_quota(queries_per_minute)),
        }
    }
}

impl<C: Clock> RequestPacer<C> {
    /// Create a pacer on an explicit clock (used by tests)
    #[must_use]
    pub fn with_clock(queries_per_minute: u32, clock: C) -> Self {
        Self {
            limiter: RateLimiter::direct_with_clock(interval_quota(queries_per_minute), clock),
        }
    }

    /// Non-blocking grant check; `false` means the interval has not elapsed
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl<C: Clock + ReasonablyRealtime> RequestPacer<C> {
    /// Wait until the next request may be sent
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}
