use super::{SavedAlarmState, SavedControlState};
use crate::warn;
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use strum_macros::Display;

#[derive(Debug, Display)]
pub enum PersistenceError {
    Io(std::io::Error),
    Encode(bincode::error::EncodeError),
}

impl std::error::Error for PersistenceError {}

impl From<std::io::Error> for PersistenceError {
    fn from(value: std::io::Error) -> Self { PersistenceError::Io(value) }
}

impl From<bincode::error::EncodeError> for PersistenceError {
    fn from(value: bincode::error::EncodeError) -> Self { PersistenceError::Encode(value) }
}

/// Directory backed store of the session records.
///
/// Records are bincode encoded and replaced atomically: the new bytes go to a sibling
/// temp file that is renamed over the record, readers see either the old or the new one.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    const CONTROL_RECORD: &'static str = "controls.bin";
    const ALARM_RECORD: &'static str = "target_alarm.bin";

    /// Creates a store rooted at `dir`. The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    /// Replaces the record `name` atomically.
    ///
    /// # Arguments
    /// - `name`: File name of the record inside the store directory.
    /// - `record`: The value to encode.
    ///
    /// # Returns
    /// `Ok(())` once the record was renamed into place, otherwise the encode or I/O error.
    /// A failed write leaves the previous record intact.
    async fn write_record<T: Serialize>(&self, name: &str, record: &T) -> Result<(), PersistenceError> {
        let bytes = bincode::serde::encode_to_vec(record, bincode::config::standard())?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &bytes).await?;
        tokio::fs::rename(&temp_path, &path).await?;
        Ok(())
    }

    /// Reads the record `name`.
    ///
    /// # Arguments
    /// - `name`: File name of the record inside the store directory.
    ///
    /// # Returns
    /// The decoded record, `None` if it is missing or cannot be decoded.
    async fn read_record<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.dir.join(name);
        let bytes = tokio::fs::read(&path).await.ok()?;
        match bincode::serde::decode_from_slice::<T, _>(&bytes, bincode::config::standard()) {
            Ok((record, _)) => Some(record),
            Err(e) => {
                warn!("Discarding unreadable record {}: {e}", path.display());
                None
            }
        }
    }

    pub async fn save_controls(&self, state: &SavedControlState) -> Result<(), PersistenceError> {
        self.write_record(Self::CONTROL_RECORD, state).await
    }

    /// The saved control vector, `None` if there is none or it cannot be decoded.
    pub async fn load_controls(&self) -> Option<SavedControlState> {
        self.read_record(Self::CONTROL_RECORD).await
    }

    pub async fn save_alarm(&self, state: &SavedAlarmState) -> Result<(), PersistenceError> {
        self.write_record(Self::ALARM_RECORD, state).await
    }

    pub async fn load_alarm(&self) -> Option<SavedAlarmState> { self.read_record(Self::ALARM_RECORD).await }
}
