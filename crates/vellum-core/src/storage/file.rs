//! File-based storage.

use super::{DocumentFile, FILE_EXTENSION, Storage, StorageError, StorageResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `document` to `path` atomically.
///
/// The JSON goes to a temporary file in the same directory, is synced, then
/// renamed over `path`. If anything fails the previous file is untouched.
pub fn save_to_path(path: &Path, document: &DocumentFile) -> StorageResult<()> {
    let json = document.to_json()?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| StorageError::Io(format!("Failed to create temp file in {}: {}", dir.display(), e)))?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    tmp.persist(path)
        .map_err(|e| StorageError::Io(format!("Failed to replace {}: {}", path.display(), e.error)))?;

    log::info!(
        "Saved {} strokes, {} text boxes to {}",
        document.strokes.len(),
        document.text_boxes.len(),
        path.display()
    );
    Ok(())
}

/// Read and parse the document at `path`.
pub fn load_from_path(path: &Path) -> StorageResult<DocumentFile> {
    if !path.exists() {
        return Err(StorageError::NotFound(path.display().to_string()));
    }
    let json = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let document = DocumentFile::from_json(&json).map_err(|e| match e {
        StorageError::Serialization(msg) => {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), msg))
        }
        other => other,
    })?;
    log::info!(
        "Loaded {} strokes, {} text boxes from {}",
        document.strokes.len(),
        document.text_boxes.len(),
        path.display()
    );
    Ok(document)
}

/// Stores documents as `<id>.vellum` files in one directory.
pub struct FileStorage {
    /// Base directory for document storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("Failed to create storage directory: {}", e)))?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location
    /// (`<data_local_dir>/vellum/documents`).
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("vellum").join("documents"))
    }

    fn document_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.{}", safe_id, FILE_EXTENSION))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &DocumentFile) -> StorageResult<()> {
        save_to_path(&self.document_path(id), document)
    }

    fn load(&self, id: &str) -> StorageResult<DocumentFile> {
        let path = self.document_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        load_from_path(&path)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.document_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {}", path.display(), e)))?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut ids: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == FILE_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.document_path(id).exists())
    }
}
