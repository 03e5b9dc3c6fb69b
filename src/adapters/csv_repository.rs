//! CSV implementation of the value table repository.
//!
//! Each model is one headerless `q_table_<id>.csv` file in the model
//! directory holding `<state key>,<value>` rows.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use crate::{
    Result,
    error::Error,
    identifiers::{ModelId, StateKey},
    ports::ValueTableRepository,
    td_learning::ValueTable,
};

const FILE_PREFIX: &str = "q_table_";
const FILE_EXTENSION: &str = "csv";

/// File-backed value table repository.
///
/// Saves write a sibling `.tmp` file first and rename it over the target, so
/// a failed save never leaves a truncated table behind.
///
/// # Examples
///
/// ```no_run
/// use tictactoe_td::adapters::CsvRepository;
/// use tictactoe_td::identifiers::ModelId;
/// use tictactoe_td::ports::ValueTableRepository;
///
/// let repo = CsvRepository::new("models");
/// let table = repo.load(ModelId::FIRST)?;
/// repo.save(ModelId::FIRST, &table)?;
/// # Ok::<(), tictactoe_td::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CsvRepository {
    dir: PathBuf,
}

impl CsvRepository {
    /// Create a repository rooted at `dir`. The directory is created on the
    /// first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the table file for `model_id`
    pub fn table_path(&self, model_id: ModelId) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}{model_id}.{FILE_EXTENSION}"))
    }

    fn parse_model_id(file_name: &str) -> Option<ModelId> {
        let number = file_name
            .strip_prefix(FILE_PREFIX)?
            .strip_suffix(FILE_EXTENSION)?
            .strip_suffix('.')?;
        number.parse::<u32>().ok().and_then(|n| ModelId::new(n).ok())
    }

    fn read_table(path: &Path, file: File) -> Result<ValueTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut table = ValueTable::new();
        for result in reader.records() {
            let record = result.map_err(|source| Error::MalformedTable {
                path: path.to_path_buf(),
                source,
            })?;
            let line = record.position().map_or(0, |p| p.line());
            let entry_error = |message: String| Error::InvalidTableEntry {
                path: path.to_path_buf(),
                line,
                message,
            };

            if record.len() != 2 {
                return Err(entry_error(format!(
                    "expected 2 fields, found {}",
                    record.len()
                )));
            }
            let (raw_key, value): (u32, f64) =
                record
                    .deserialize(None)
                    .map_err(|source| Error::MalformedTable {
                        path: path.to_path_buf(),
                        source,
                    })?;
            let key = StateKey::new(raw_key).map_err(|e| entry_error(e.to_string()))?;
            if !value.is_finite() {
                return Err(entry_error(format!("value {value} is not finite")));
            }
            table.set(key, value);
        }
        Ok(table)
    }

    fn write_table(path: &Path, table: &ValueTable) -> Result<()> {
        let io_error = |source: csv::Error| Error::Io {
            operation: format!("write value table {}", path.display()),
            source: io::Error::from(source),
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(io_error)?;
        for (key, value) in table.iter() {
            writer.serialize((key.value(), value)).map_err(io_error)?;
        }
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush value table {}", path.display()),
            source,
        })
    }
}

impl ValueTableRepository for CsvRepository {
    fn load(&self, model_id: ModelId) -> Result<ValueTable> {
        let path = self.table_path(model_id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No value table at {}, starting empty", path.display());
                return Ok(ValueTable::new());
            }
            Err(source) => {
                return Err(Error::Io {
                    operation: format!("open value table {}", path.display()),
                    source,
                });
            }
        };
        Self::read_table(&path, file)
    }

    fn save(&self, model_id: ModelId, table: &ValueTable) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| Error::Io {
            operation: format!("create model directory {}", self.dir.display()),
            source,
        })?;

        let path = self.table_path(model_id);
        let tmp_path = path.with_extension(format!("{FILE_EXTENSION}.tmp"));
        if let Err(e) = Self::write_table(&tmp_path, table) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &path).map_err(|source| Error::Io {
            operation: format!("replace value table {}", path.display()),
            source,
        })
    }

    fn exists(&self, model_id: ModelId) -> bool {
        self.table_path(model_id).is_file()
    }

    fn model_ids(&self) -> Result<Vec<ModelId>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(Error::Io {
                    operation: format!("list model directory {}", self.dir.display()),
                    source,
                });
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(id) = Self::parse_model_id(&entry.file_name().to_string_lossy()) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}
