//! Persistent audio cache
//!
//! Maps generated artifact filenames to the exact source text that produced
//! them. Lookup is by value (the text), not by key: filenames are
//! content-hash derived and the text is the semantic identity. A full scan
//! per lookup is deliberate — cache sizes stay in the low thousands and
//! synthesis cost dwarfs it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Name of the persisted index file inside the artifact directory
pub const INDEX_FILE: &str = "cache_index.json";

/// Extension of synthesized audio artifacts
pub const ARTIFACT_EXT: &str = "wav";

/// Filename-to-source-text cache backed by a JSON index on disk
#[derive(Debug)]
pub struct AudioCache {
    dir: PathBuf,
    entries: HashMap<String, String>,
}

impl AudioCache {
    /// Load the cache index from `dir`, creating the directory if needed
    ///
    /// A missing index file yields an empty cache. A present but
    /// unparseable index is a fatal [`Error::CacheLoad`]: silently
    /// discarding it would orphan every artifact it references.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CacheLoad`] if the directory cannot be created or
    /// the index exists but cannot be read or parsed.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::CacheLoad(format!("{}: {e}", dir.display())))?;

        let index_path = dir.join(INDEX_FILE);
        let entries = if index_path.exists() {
            let raw = std::fs::read_to_string(&index_path)
                .map_err(|e| Error::CacheLoad(format!("{}: {e}", index_path.display())))?;
            serde_json::from_str(&raw)
                .map_err(|e| Error::CacheLoad(format!("{}: {e}", index_path.display())))?
        } else {
            HashMap::new()
        };

        tracing::debug!(
            dir = %dir.display(),
            entries = entries.len(),
            "audio cache loaded"
        );

        Ok(Self { dir, entries })
    }

    /// Number of cached entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directory holding artifacts and the index file
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an artifact filename resolves to
    #[must_use]
    pub fn artifact_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Find the artifact recorded for exactly this text
    ///
    /// Surrounding whitespace is trimmed from the input; the comparison is
    /// then byte-exact and case-sensitive, with no other normalization. An
    /// entry whose backing artifact file has gone missing is reported as a
    /// miss so the caller regenerates it.
    #[must_use]
    pub fn lookup_by_text(&self, text: &str) -> Option<PathBuf> {
        let text = text.trim();
        let filename = self
            .entries
            .iter()
            .find(|(_, recorded)| recorded.as_str() == text)
            .map(|(filename, _)| filename)?;

        let path = self.dir.join(filename);
        if path.exists() {
            Some(path)
        } else {
            tracing::warn!(
                %filename,
                "cache entry has no backing artifact, treating as miss"
            );
            None
        }
    }

    /// Insert or overwrite an entry and persist the full index immediately
    ///
    /// The index is rewritten whole on every mutation; a crash between
    /// artifact write and index write only costs a regeneration, since
    /// lookup is by content rather than filename.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Artifact`] if the index cannot be written.
    pub fn put(&mut self, filename: &str, text: &str) -> Result<()> {
        self.entries.insert(filename.to_string(), text.to_string());
        self.save()
    }

    /// Delete all audio artifacts and rewrite an empty index
    ///
    /// Per-artifact delete failures are logged and skipped so one stuck
    /// file does not block the rest of the cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Artifact`] if the directory cannot be listed or
    /// the emptied index cannot be written.
    pub fn reset(&mut self) -> Result<usize> {
        let read_dir = std::fs::read_dir(&self.dir)
            .map_err(|e| Error::Artifact(format!("{}: {e}", self.dir.display())))?;

        let mut deleted = 0usize;
        for entry in read_dir.flatten() {
            let path = entry.path();
            let is_artifact = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(ARTIFACT_EXT));
            if !is_artifact {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to delete artifact");
                }
            }
        }

        self.entries.clear();
        self.save()?;

        tracing::info!(deleted, "audio cache reset");
        Ok(deleted)
    }

    /// Persist the full index to disk
    fn save(&self) -> Result<()> {
        let index_path = self.dir.join(INDEX_FILE);
        let raw = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&index_path, raw)
            .map_err(|e| Error::Artifact(format!("{}: {e}", index_path.display())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_index_yields_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::load(dir.path()).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_index_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE), "not json{").unwrap();
        let err = AudioCache::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::CacheLoad(_)));
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = AudioCache::load(dir.path()).unwrap();
        std::fs::write(dir.path().join("h1.wav"), b"riff").unwrap();
        cache.put("h1.wav", "Hello").unwrap();

        assert_eq!(
            cache.lookup_by_text("Hello"),
            Some(dir.path().join("h1.wav"))
        );
        assert_eq!(cache.lookup_by_text("hello"), None);
        assert_eq!(cache.lookup_by_text("Hello world"), None);
    }

    #[test]
    fn lookup_trims_surrounding_whitespace_from_the_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = AudioCache::load(dir.path()).unwrap();
        std::fs::write(dir.path().join("h1.wav"), b"riff").unwrap();
        cache.put("h1.wav", "Hello").unwrap();

        let expected = Some(dir.path().join("h1.wav"));
        assert_eq!(cache.lookup_by_text("Hello "), expected);
        assert_eq!(cache.lookup_by_text("  Hello \n"), expected);
        // Interior whitespace is not normalized.
        assert_eq!(cache.lookup_by_text("Hel lo"), None);
    }

    #[test]
    fn missing_artifact_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = AudioCache::load(dir.path()).unwrap();
        cache.put("gone.wav", "Hello").unwrap();

        assert_eq!(cache.lookup_by_text("Hello"), None);
        // The entry itself stays; regeneration overwrites it.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut cache = AudioCache::load(dir.path()).unwrap();
            cache.put("a.wav", "Alpha").unwrap();
        }
        let cache = AudioCache::load(dir.path()).unwrap();
        assert_eq!(cache.len(), 1);
        std::fs::write(dir.path().join("a.wav"), b"riff").unwrap();
        assert!(cache.lookup_by_text("Alpha").is_some());
    }

    #[test]
    fn reset_deletes_artifacts_and_empties_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = AudioCache::load(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.wav"), b"riff").unwrap();
        std::fs::write(dir.path().join("b.wav"), b"riff").unwrap();
        cache.put("a.wav", "Alpha").unwrap();
        cache.put("b.wav", "Beta").unwrap();

        let deleted = cache.reset().unwrap();
        assert_eq!(deleted, 2);
        assert!(cache.is_empty());
        assert!(!dir.path().join("a.wav").exists());
        // Index file survives, emptied.
        let reloaded = AudioCache::load(dir.path()).unwrap();
        assert!(reloaded.is_empty());
    }
}
