#![forbid(unsafe_code)]

//! Persistence sinks and hydration sources for layouts.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        LayoutStore                            │
//! │   - debounces writes, saves only variants that changed        │
//! │   - logs save failures, never surfaces them                   │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │              PersistenceSink / HydrationSource                │
//! │   - MemoryStorage: shared in-memory map (tests, ephemeral)    │
//! │   - FileStorage: one JSON document (requires file-storage)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Save logged and dropped; load falls back to defaults |
//! | `StorageError::Serialization` | JSON encode failure | Save logged and dropped |
//! | Corrupt file / unknown version | Hand edits, older releases | Treated as empty, logged |
//! | Corrupt variant entry | Partial hand edit | That variant skipped, logged |

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use dashgrid_layout::Layout;

use crate::{LayoutBundle, LayoutVariant};

const TARGET: &str = "dashgrid.persist";

/// Errors that can occur during layout storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Stored data is corrupted or has an unknown format.
    Corruption(String),
    /// Backend cannot be used right now.
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_)
            | StorageError::Corruption(_)
            | StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for debounced layout writes.
pub trait PersistenceSink: Send {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Store `layout` under `variant`, replacing any previous value.
    fn save(&mut self, variant: &LayoutVariant, layout: &Layout) -> StorageResult<()>;
}

/// Source of previously persisted layouts, read once at store startup.
pub trait HydrationSource {
    /// Stored layout for `variant`, `None` when nothing was saved.
    fn load(&self, variant: &LayoutVariant) -> StorageResult<Option<Layout>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Arc<RwLock<LayoutBundle>>,
    saves: Arc<AtomicUsize>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with layouts.
    #[must_use]
    pub fn with_layouts(layouts: LayoutBundle) -> Self {
        Self {
            data: Arc::new(RwLock::new(layouts)),
            saves: Arc::default(),
        }
    }

    /// Currently stored layout for `variant`.
    pub fn get(&self, variant: &LayoutVariant) -> StorageResult<Option<Layout>> {
        self.load(variant)
    }

    /// Copy of everything stored.
    pub fn snapshot(&self) -> StorageResult<LayoutBundle> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.clone())
    }

    /// Number of successful `save` calls across all clones.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn clear(&self) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.clear();
        Ok(())
    }
}

impl PersistenceSink for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn save(&mut self, variant: &LayoutVariant, layout: &Layout) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.insert(variant.clone(), layout.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl HydrationSource for MemoryStorage {
    fn load(&self, variant: &LayoutVariant) -> StorageResult<Option<Layout>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.get(variant).cloned())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.data.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStorage")
            .field("variants", &count)
            .field("saves", &self.save_count())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires file-storage feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "file-storage")]
mod file_storage {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk document.
    #[derive(Serialize, Deserialize)]
    struct LayoutFile {
        format_version: u32,
        /// Variants stay raw so one corrupt entry does not hide the others.
        variants: BTreeMap<String, serde_json::Value>,
    }

    impl LayoutFile {
        const FORMAT_VERSION: u32 = 1;
    }

    /// JSON file storage holding every variant in one document.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "variants": {
    ///     "desktop": [{ "id": "goals", "x": 0, "y": 0, "w": 4, "h": 2 }]
    ///   }
    /// }
    /// ```
    ///
    /// # Atomic Writes
    ///
    /// 1. Write to `{path}.tmp`
    /// 2. Flush and sync
    /// 3. Rename `{path}.tmp` -> `{path}`
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// Create a file storage at the given path.
        ///
        /// The file does not need to exist; it will be created on first save.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        /// Read every decodable variant.
        ///
        /// A missing file is empty. An unparsable file or an unknown format
        /// version is logged and treated as empty.
        pub fn load_all(&self) -> StorageResult<LayoutBundle> {
            if !self.path.exists() {
                return Ok(LayoutBundle::new());
            }

            let file = File::open(&self.path)?;
            let reader = BufReader::new(file);
            let layout_file: LayoutFile = match serde_json::from_reader(reader) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(
                        target: TARGET,
                        path = %self.path.display(),
                        error = %e,
                        "layout file is corrupt, ignoring stored layouts"
                    );
                    return Ok(LayoutBundle::new());
                }
            };

            if layout_file.format_version != LayoutFile::FORMAT_VERSION {
                tracing::warn!(
                    target: TARGET,
                    stored = layout_file.format_version,
                    expected = LayoutFile::FORMAT_VERSION,
                    "layout file format version mismatch, ignoring stored layouts"
                );
                return Ok(LayoutBundle::new());
            }

            let mut bundle = LayoutBundle::new();
            for (name, raw) in layout_file.variants {
                match serde_json::from_value::<Layout>(raw) {
                    Ok(layout) => {
                        bundle.insert(LayoutVariant::new(name), layout);
                    }
                    Err(e) => {
                        tracing::warn!(
                            target: TARGET,
                            variant = %name,
                            error = %e,
                            "failed to decode stored layout, skipping"
                        );
                    }
                }
            }
            Ok(bundle)
        }

        /// Replace the whole document with `bundle`.
        pub fn save_all(&self, bundle: &LayoutBundle) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut variants = BTreeMap::new();
            for (variant, layout) in bundle {
                let value = serde_json::to_value(layout).map_err(|e| {
                    StorageError::Serialization(format!("failed to encode {variant}: {e}"))
                })?;
                variants.insert(variant.as_str().to_string(), value);
            }
            let layout_file = LayoutFile {
                format_version: LayoutFile::FORMAT_VERSION,
                variants,
            };

            let tmp_path = self.temp_path();
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &layout_file).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize layouts: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                target: TARGET,
                path = %self.path.display(),
                variants = bundle.len(),
                "saved layouts"
            );
            Ok(())
        }

        /// Remove the file if present.
        pub fn clear(&self) -> StorageResult<()> {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            Ok(())
        }
    }

    impl PersistenceSink for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn save(&mut self, variant: &LayoutVariant, layout: &Layout) -> StorageResult<()> {
            let mut bundle = self.load_all()?;
            bundle.insert(variant.clone(), layout.clone());
            self.save_all(&bundle)
        }
    }

    impl HydrationSource for FileStorage {
        fn load(&self, variant: &LayoutVariant) -> StorageResult<Option<Layout>> {
            Ok(self.load_all()?.remove(variant))
        }
    }
}

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
