use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encode error: {0}")]
    BinaryEncode(#[from] rmp_serde::encode::Error),

    #[error("binary decode error: {0}")]
    BinaryDecode(#[from] rmp_serde::decode::Error),

    #[error("decompression failed (pipeline flag mismatch or corrupted data)")]
    Decompression,

    #[error("integrity failure: {0}")]
    Integrity(&'static str),

    #[error("corrupted save data: {0}")]
    Corrupted(&'static str),

    #[error("save data too large: {size} entries")]
    DataTooLarge { size: usize },

    #[error("invalid slot name: {name:?}")]
    InvalidSlotName { name: String },

    #[error("background save worker panicked")]
    WorkerPanicked,
}

impl SaveError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            SaveError::Io(_) => true,
            SaveError::InvalidSlotName { .. } => true,
            SaveError::Json(_) => false,
            SaveError::BinaryEncode(_) | SaveError::BinaryDecode(_) => false,
            SaveError::Decompression => false,
            SaveError::Integrity(_) => false,
            SaveError::Corrupted(_) => false,
            SaveError::DataTooLarge { .. } => false,
            SaveError::WorkerPanicked => false,
        }
    }

    /// Malformed bytes at the decompression or deserialization stage.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            SaveError::Json(_) | SaveError::BinaryDecode(_) | SaveError::Decompression
        )
    }

    /// Decryption produced implausible output (wrong key, bad IV, tampering).
    pub fn is_integrity(&self) -> bool {
        matches!(self, SaveError::Integrity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_recoverable() {
        let err = SaveError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert!(err.is_recoverable());
        assert!(!err.is_decode());
    }

    #[test]
    fn test_decode_and_integrity_classification() {
        assert!(SaveError::Decompression.is_decode());
        assert!(!SaveError::Decompression.is_integrity());
        assert!(SaveError::Integrity("bad padding").is_integrity());
        assert!(!SaveError::Integrity("bad padding").is_decode());
    }
}
