//! Interchangeable serialization formats for the save model.
//!
//! The codec maps a [`SaveState`] to bytes and back. It deliberately does
//! not synchronize associative sections; the persistence manager runs
//! `sync_all_to_records` before calling in and `sync_all_from_records`
//! after, so a codec round trip alone leaves the live maps empty.

use std::path::Path;

use crate::error::SaveError;
use crate::model::SaveState;

/// On-disk serialization format, selected per save operation. Both formats
/// can coexist for the same slot name because each uses its own extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// Human-editable UTF-8 JSON, pretty-printed. The default posture.
    Json,
    /// Dense MessagePack. Opaque; same-schema use only.
    Binary,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Json => "json",
            SaveFormat::Binary => "sav",
        }
    }

    pub fn from_extension(ext: &str) -> Option<SaveFormat> {
        match ext {
            "json" => Some(SaveFormat::Json),
            "sav" => Some(SaveFormat::Binary),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<SaveFormat> {
        path.extension().and_then(|e| e.to_str()).and_then(Self::from_extension)
    }
}

pub fn serialize(state: &SaveState, format: SaveFormat) -> Result<Vec<u8>, SaveError> {
    match format {
        SaveFormat::Json => Ok(serde_json::to_vec_pretty(state)?),
        SaveFormat::Binary => Ok(rmp_serde::to_vec_named(state)?),
    }
}

pub fn deserialize(bytes: &[u8], format: SaveFormat) -> Result<SaveState, SaveError> {
    match format {
        SaveFormat::Json => Ok(serde_json::from_slice(bytes)?),
        SaveFormat::Binary => Ok(rmp_serde::from_slice(bytes)?),
    }
}
