//! Configuration management for scriptcast
//!
//! All settings are fixed at process start. Defaults cover a working setup;
//! an optional `config.toml` in the project directory overlays them (every
//! field optional, mirroring the file's partial nature).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Environment variable holding the synthesis API key
pub const API_KEY_ENV: &str = "SCRIPTCAST_API_KEY";

/// Fallback credential file discovered in the project directory
pub const API_KEY_FILE: &str = "google_api_key";

/// Overlay config file name, looked up in the project directory
pub const CONFIG_FILE: &str = "config.toml";

/// Voice selection and prosody, fixed for a whole run
#[derive(Debug, Clone)]
pub struct VoiceParams {
    /// BCP-47 language code (e.g. "en-AU")
    pub language_code: String,

    /// Voice identity within the language
    pub voice_name: String,

    /// Speaking-rate multiplier (1.0 = normal)
    pub speaking_rate: f64,

    /// Pitch adjustment in semitones
    pub pitch: f64,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            language_code: "en-AU".to_string(),
            voice_name: "en-AU-Neural2-B".to_string(),
            speaking_rate: 1.25,
            pitch: 0.0,
        }
    }
}

/// Resolved run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Project directory anchoring all relative paths
    pub project_dir: PathBuf,

    /// Directory of transcript description files
    pub transcripts_dir: PathBuf,

    /// Directory holding synthesized artifacts and the cache index
    pub audio_lib_dir: PathBuf,

    /// Directory receiving rendered tracks
    pub output_dir: PathBuf,

    /// Voice parameters
    pub voice: VoiceParams,

    /// Synthesis requests-per-minute ceiling
    pub queries_per_minute: u32,

    /// Sample rate for synthesized speech and timelines, Hz
    pub sample_rate: u32,

    /// Per-request timeout for the synthesis API
    pub request_timeout: Duration,

    /// Synthesis API key, if discoverable at startup
    pub api_key: Option<String>,
}

/// Top-level TOML overlay schema
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    /// Transcript input directory, relative to the project directory
    transcripts_dir: Option<PathBuf>,

    /// Artifact/cache directory, relative to the project directory
    audio_lib_dir: Option<PathBuf>,

    /// Rendered output directory, relative to the project directory
    output_dir: Option<PathBuf>,

    #[serde(default)]
    voice: VoiceFileConfig,

    #[serde(default)]
    synthesis: SynthesisFileConfig,
}

/// Voice overlay section
#[derive(Debug, Default, Deserialize)]
struct VoiceFileConfig {
    language: Option<String>,
    name: Option<String>,
    speaking_rate: Option<f64>,
    pitch: Option<f64>,
}

/// Synthesis overlay section
#[derive(Debug, Default, Deserialize)]
struct SynthesisFileConfig {
    queries_per_minute: Option<u32>,
    sample_rate: Option<u32>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Build the configuration for a project directory
    ///
    /// Reads the optional `config.toml` overlay and discovers the API key
    /// from [`API_KEY_ENV`] or the [`API_KEY_FILE`] credential file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the overlay file exists but cannot be
    /// read, and [`Error::Toml`] if it cannot be parsed.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let overlay = load_overlay(project_dir)?;
        let voice_defaults = VoiceParams::default();

        let resolve_dir = |overridden: Option<PathBuf>, default: &str| {
            let dir = overridden.unwrap_or_else(|| PathBuf::from(default));
            if dir.is_absolute() {
                dir
            } else {
                project_dir.join(dir)
            }
        };

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            transcripts_dir: resolve_dir(overlay.transcripts_dir, "transcripts"),
            audio_lib_dir: resolve_dir(overlay.audio_lib_dir, "audio_lib"),
            output_dir: resolve_dir(overlay.output_dir, "output"),
            voice: VoiceParams {
                language_code: overlay
                    .voice
                    .language
                    .unwrap_or(voice_defaults.language_code),
                voice_name: overlay.voice.name.unwrap_or(voice_defaults.voice_name),
                speaking_rate: overlay
                    .voice
                    .speaking_rate
                    .unwrap_or(voice_defaults.speaking_rate),
                pitch: overlay.voice.pitch.unwrap_or(voice_defaults.pitch),
            },
            queries_per_minute: overlay.synthesis.queries_per_minute.unwrap_or(15),
            sample_rate: overlay
                .synthesis
                .sample_rate
                .unwrap_or(crate::timeline::SAMPLE_RATE),
            request_timeout: Duration::from_secs(
                overlay.synthesis.request_timeout_secs.unwrap_or(30),
            ),
            api_key: discover_api_key(project_dir),
        })
    }
}

/// Read the optional TOML overlay from the project directory
fn load_overlay(project_dir: &Path) -> Result<ConfigFile> {
    let path = project_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let raw = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    let parsed = toml::from_str(&raw)?;
    tracing::debug!(path = %path.display(), "loaded config overlay");
    Ok(parsed)
}

/// Resolve the synthesis API key from the environment or a credential file
fn discover_api_key(project_dir: &Path) -> Option<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            return Some(key);
        }
    }

    let path = project_dir.join(API_KEY_FILE);
    match std::fs::read_to_string(&path) {
        Ok(raw) => {
            let key = raw.trim().to_string();
            if key.is_empty() {
                None
            } else {
                tracing::debug!(path = %path.display(), "using credential file");
                Some(key)
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.transcripts_dir, dir.path().join("transcripts"));
        assert_eq!(config.audio_lib_dir, dir.path().join("audio_lib"));
        assert_eq!(config.output_dir, dir.path().join("output"));
        assert_eq!(config.queries_per_minute, 15);
        assert_eq!(config.sample_rate, 24_000);
        assert!((config.voice.speaking_rate - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn overlay_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
output_dir = "rendered"

[voice]
language = "en-GB"
speaking_rate = 1.0

[synthesis]
queries_per_minute = 30
"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.output_dir, dir.path().join("rendered"));
        assert_eq!(config.voice.language_code, "en-GB");
        assert!((config.voice.speaking_rate - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.queries_per_minute, 30);
        // Untouched fields keep their defaults.
        assert_eq!(config.voice.voice_name, "en-AU-Neural2-B");
    }

    #[test]
    fn malformed_overlay_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "not = [valid").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn credential_file_is_discovered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(API_KEY_FILE), "  secret-key\n").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("secret-key"));
    }
}
