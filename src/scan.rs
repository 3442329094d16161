//! TabState directory scanner
//!
//! Selects candidate files, reads each one and decodes it on the blocking
//! pool. Files are independent: a failure in one never affects another.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::DecodeError;
use crate::fingerprint::evidence_digest_hex;
use crate::format::{DecodedRecord, RecordDecoder};
use crate::{Result, TabStateError};

/// Why a single file produced no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanFailure {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// File exceeds the configured size limit
    #[error("file too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge {
        /// File size
        size: u64,
        /// Size limit
        limit: u64,
    },

    /// Buffer could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Outcome of processing one file
#[derive(Debug, Clone)]
pub struct ScanEntry {
    /// File name without directory
    pub file_name: String,
    /// Full path
    pub path: PathBuf,
    /// Bytes read
    pub size: u64,
    /// SHA-256 of the bytes read, if the file was read
    pub sha256: Option<String>,
    /// Decoded record or failure
    pub outcome: std::result::Result<DecodedRecord, ScanFailure>,
}

impl ScanEntry {
    fn failed(path: PathBuf, size: u64, failure: ScanFailure) -> Self {
        Self {
            file_name: file_name_of(&path),
            path,
            size,
            sha256: None,
            outcome: Err(failure),
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether a path is selected for decoding under `config`
///
/// The extension must match and the name must not end in a skip suffix;
/// both checks ignore ASCII case.
#[must_use]
pub fn is_candidate(path: &Path, config: &Config) -> bool {
    let name = file_name_of(path).to_ascii_lowercase();
    let extension = format!(".{}", config.extension.to_ascii_lowercase());

    name.ends_with(&extension)
        && !config
            .skip_suffixes
            .iter()
            .any(|suffix| name.ends_with(&suffix.to_ascii_lowercase()))
}

/// Scanner for tab state files
#[derive(Debug, Clone)]
pub struct Scanner {
    config: Arc<Config>,
    decoder: RecordDecoder,
}

impl Scanner {
    /// Create a new scanner
    #[must_use]
    pub fn new(config: Config) -> Self {
        let decoder = RecordDecoder::new(config.limits.decode_limits());
        Self {
            config: Arc::new(config),
            decoder,
        }
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Candidate files in `dir`, sorted by file name
    ///
    /// # Errors
    ///
    /// Returns error if the directory does not exist or cannot be listed
    pub fn candidates(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TabStateError::DirectoryNotFound(dir.display().to_string()));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();

            if !path.is_file() {
                continue;
            }
            if is_candidate(&path, &self.config) {
                paths.push(path);
            } else {
                debug!("Skipping {}", path.display());
            }
        }

        paths.sort_by_key(|path| file_name_of(path));
        Ok(paths)
    }

    /// Decode every candidate file in `dir`
    ///
    /// # Errors
    ///
    /// Returns error only if the directory cannot be listed; per-file
    /// failures are reported in each [`ScanEntry`]
    pub async fn scan(&self, dir: &Path) -> Result<Vec<ScanEntry>> {
        let paths = self.candidates(dir)?;
        info!("Scanning {} candidate files in {}", paths.len(), dir.display());

        let entries = self.decode_files(paths).await;

        let failed = entries.iter().filter(|e| e.outcome.is_err()).count();
        info!(
            "Scan complete: {} decoded, {} failed",
            entries.len() - failed,
            failed
        );
        Ok(entries)
    }

    /// Decode the given files in parallel, preserving input order
    pub async fn decode_files(&self, paths: Vec<PathBuf>) -> Vec<ScanEntry> {
        let semaphore = Arc::new(Semaphore::new(self.config.limits.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, path) in paths.into_iter().enumerate() {
            let scanner = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, scanner.decode_file(path).await)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => warn!("Decode task failed: {}", e),
            }
        }

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, entry)| entry).collect()
    }

    /// Read and decode a single file
    pub async fn decode_file(&self, path: PathBuf) -> ScanEntry {
        let limit = self.config.limits.max_file_size;

        let size = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!("Cannot stat {}: {}", path.display(), e);
                return ScanEntry::failed(path, 0, ScanFailure::Io(e.to_string()));
            }
        };
        if size > limit {
            warn!("Skipping {}: {} bytes", path.display(), size);
            return ScanEntry::failed(path, size, ScanFailure::TooLarge { size, limit });
        }

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                return ScanEntry::failed(path, size, ScanFailure::Io(e.to_string()));
            }
        };

        let decoder = self.decoder;
        let file_name = file_name_of(&path);
        let task_path = path.clone();
        let decoded = tokio::task::spawn_blocking(move || {
            decode_buffer(&decoder, file_name, task_path, &data)
        });
        match decoded.await {
            Ok(entry) => entry,
            Err(e) => ScanEntry::failed(path, size, ScanFailure::Io(e.to_string())),
        }
    }
}

/// Decode an in-memory buffer into a [`ScanEntry`]
#[must_use]
pub fn decode_buffer(
    decoder: &RecordDecoder,
    file_name: String,
    path: PathBuf,
    data: &[u8],
) -> ScanEntry {
    let outcome = decoder.decode(data).map_err(ScanFailure::from);
    match &outcome {
        Ok(record) => debug!("Decoded {} (flag {})", file_name, record.flag()),
        Err(e) => debug!("Failed to decode {}: {}", file_name, e),
    }

    ScanEntry {
        file_name,
        path,
        size: data.len() as u64,
        sha256: Some(evidence_digest_hex(data)),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::test_support::untitled;
    use tempfile::TempDir;

    #[test]
    fn test_is_candidate() {
        let config = Config::default();
        assert!(is_candidate(Path::new("0f1e2d3c.bin"), &config));
        assert!(is_candidate(Path::new("/x/ABC.BIN"), &config));
        assert!(!is_candidate(Path::new("0f1e2d3c.0.bin"), &config));
        assert!(!is_candidate(Path::new("0f1e2d3c.1.bin"), &config));
        assert!(!is_candidate(Path::new("notes.txt"), &config));
        assert!(!is_candidate(Path::new("bin"), &config));
    }

    #[test]
    fn test_candidates_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["b.bin", "a.bin", "a.0.bin", "a.1.bin", "readme.txt"] {
            std::fs::write(dir.path().join(name), b"NP").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.bin")).unwrap();

        let scanner = Scanner::new(Config::default());
        let names: Vec<String> = scanner
            .candidates(dir.path())
            .unwrap()
            .iter()
            .map(|p| file_name_of(p))
            .collect();
        assert_eq!(names, vec!["a.bin", "b.bin"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let scanner = Scanner::new(Config::default());
        assert!(matches!(
            scanner.candidates(&dir.path().join("absent")),
            Err(TabStateError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_decode_buffer_records_digest() {
        let data = untitled(1, "hello");
        let entry = decode_buffer(
            &RecordDecoder::default(),
            "x.bin".to_string(),
            PathBuf::from("x.bin"),
            &data,
        );
        assert_eq!(entry.size, data.len() as u64);
        assert_eq!(entry.sha256.as_deref(), Some(evidence_digest_hex(&data).as_str()));
        assert_eq!(entry.outcome.unwrap().content(), Some("hello"));
    }

    #[tokio::test]
    async fn test_file_over_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, untitled(1, "more than sixteen bytes")).unwrap();

        let mut config = Config::default();
        config.limits.max_file_size = 16;
        let entry = Scanner::new(config).decode_file(path).await;

        assert!(entry.sha256.is_none());
        assert!(matches!(
            entry.outcome,
            Err(ScanFailure::TooLarge { limit: 16, .. })
        ));
    }

    #[tokio::test]
    async fn test_decode_files_preserves_order() {
        let dir = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in 0..20u64 {
            let path = dir.path().join(format!("{i:02}.bin"));
            std::fs::write(&path, untitled(i, &format!("note {i}"))).unwrap();
            paths.push(path);
        }
        paths.push(dir.path().join("missing.bin"));

        let mut config = Config::default();
        config.limits.max_concurrency = 3;
        let entries = Scanner::new(config).decode_files(paths).await;

        assert_eq!(entries.len(), 21);
        for (i, entry) in entries.iter().take(20).enumerate() {
            let record = entry.outcome.as_ref().unwrap();
            assert_eq!(record.sequence(), Some(i as u64));
        }
        assert!(matches!(entries[20].outcome, Err(ScanFailure::Io(_))));
    }
}
