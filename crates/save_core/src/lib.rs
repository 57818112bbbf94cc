//! # save_core - Versioned Game Save Persistence Engine
//!
//! Persists game state (player attributes, inventory, equipment, world and
//! quest flags, settings) to durable storage across independent named slots
//! and restores it on demand.
//!
//! The write pipeline is serialize → compress → encrypt → atomic file
//! replace; the read pipeline is the exact reverse. Each stage is optional
//! and independently testable through its own inverse:
//!
//! - Two codecs: hand-editable JSON (default) and compact MessagePack.
//! - Optional zlib compression of the serialized payload.
//! - Optional AES-256-CBC encryption (obfuscation-grade) with a fresh
//!   random IV per write, stored as `IV || ciphertext`.
//!
//! Associative sections of the model (quest flags, settings, counters)
//! travel through the record-sequence adapter in [`adapter`], so they
//! survive codecs that only understand fixed-shape records and ordered
//! sequences.
//!
//! Both pipeline toggles default **off**: a freshly written slot is a plain,
//! human-readable document. That is a deliberate posture, not an oversight.

pub mod adapter;
pub mod autosave;
pub mod codec;
pub mod error;
pub mod flags;
pub mod integrity;
pub mod manager;
pub mod model;
pub mod pipeline;

pub use adapter::{from_records, to_records, Record, RecordMap};
pub use autosave::{Autosave, AUTOSAVE_SLOT};
pub use codec::SaveFormat;
pub use error::SaveError;
pub use flags::GlobalFlags;
pub use manager::{SaveJob, SaveManager};
pub use model::{
    EquipmentSlot, ExtensionValue, InventorySlot, PlayerState, SaveState, WorldState,
};

/// Save schema version stamped into every written state.
pub const SCHEMA_VERSION: &str = "1.0.0";
