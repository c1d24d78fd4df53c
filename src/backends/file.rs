use crate::data::{Backend, BackendError, Entry};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const DEFAULT_STORE: &str = ".langstore/strings.json";

/// On-disk encoding of the strings table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Json,
    Yaml,
}

impl StoreFormat {
    /// `.yml` and `.yaml` files are YAML, everything else is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                StoreFormat::Yaml
            }
            _ => StoreFormat::Json,
        }
    }
}

/// One row of the strings table as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredString {
    key: String,
    value: String,
    /// RFC 3339 time of the last write
    #[serde(default)]
    updated_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StringTable {
    #[serde(default)]
    strings: Vec<StoredString>,
}

/// FileBackend keeps the strings table in a single JSON or YAML file.
///
/// The file looks like `{ "strings": [ { "key", "value", "updated_at" } ] }`.
/// A missing file is an empty table; it is created, along with its parent
/// directories, on the first write.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    format: StoreFormat,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Creates a new FileBackend
    ///
    /// # Arguments
    /// * `path` - Optional store file. If None, defaults to ".langstore/strings.json"
    pub fn new(path: Option<PathBuf>) -> Self {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));
        let format = StoreFormat::from_path(&path);
        Self {
            path,
            format,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> StoreFormat {
        self.format
    }

    fn read_table(&self) -> Result<StringTable, BackendError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StringTable::default()),
            Err(e) => {
                return Err(BackendError::Unavailable(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(StringTable::default());
        }

        let parsed = match self.format {
            StoreFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
            StoreFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|e| {
            BackendError::Corrupt(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// `strings.json` -> `strings.json.tmp`, so stores sharing a stem never
    /// share a temp file
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_table(&self, table: &StringTable) -> Result<(), BackendError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                BackendError::Unavailable(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let content = match self.format {
            StoreFormat::Json => serde_json::to_string_pretty(table).map_err(|e| e.to_string()),
            StoreFormat::Yaml => serde_yaml::to_string(table).map_err(|e| e.to_string()),
        }
        .map_err(|e| BackendError::Corrupt(format!("Failed to serialize strings: {}", e)))?;

        // Write next to the target and rename so readers never see a partial file
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, content).map_err(|e| {
            BackendError::Unavailable(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            BackendError::Unavailable(format!("Failed to replace {}: {}", self.path.display(), e))
        })
    }
}

impl Backend for FileBackend {
    fn load_all(&self) -> Result<Vec<Entry>, BackendError> {
        let table = self.read_table()?;
        Ok(table
            .strings
            .into_iter()
            .map(|row| Entry::new(row.key, row.value))
            .collect())
    }

    fn upsert(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut table = self.read_table()?;
        let updated_at = chrono::Utc::now().to_rfc3339();

        match table.strings.iter_mut().find(|row| row.key == key) {
            Some(row) => {
                row.value = value.to_string();
                row.updated_at = updated_at;
            }
            None => table.strings.push(StoredString {
                key: key.to_string(),
                value: value.to_string(),
                updated_at,
            }),
        }

        self.write_table(&table)
    }
}
