//! Persistence manager: owns the save directory, the pipeline toggles and
//! the single current-save reference, and drives the write/read chains.
//!
//! The manager is an owned handle, passed explicitly to whoever saves or
//! loads. There is no process-wide singleton; "current save" semantics come
//! from the one handle the application constructs at startup.
//!
//! Concurrency contract: all in-memory mutation happens on the caller's
//! main loop. The async forms snapshot the pipeline output synchronously at
//! call time and move only file I/O onto a worker thread, so mutating the
//! state after the call starts cannot change what gets persisted. At most
//! one in-flight operation per slot; this is a caller discipline
//! (single-flight) requirement, not an enforced mutex.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use chrono::Utc;

use crate::codec::{self, SaveFormat};
use crate::error::SaveError;
use crate::flags::GlobalFlags;
use crate::integrity;
use crate::model::SaveState;
use crate::pipeline;

/// Handle to a background save/load operation.
pub struct SaveJob<T> {
    handle: JoinHandle<Result<T, SaveError>>,
}

impl<T> SaveJob<T> {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the operation completes and return its result.
    pub fn join(self) -> Result<T, SaveError> {
        self.handle.join().map_err(|_| SaveError::WorkerPanicked)?
    }
}

pub struct SaveManager {
    save_dir: PathBuf,

    /// Compress the serialized payload (zlib). Default off: the shipped
    /// posture prioritizes hand-editable files over footprint.
    pub use_compression: bool,

    /// Encrypt the (possibly compressed) payload. Default off, same
    /// rationale; obfuscation-grade when on (see `pipeline`).
    pub use_encryption: bool,

    key: [u8; 32],
    current: Option<SaveState>,
}

impl SaveManager {
    /// Manager over the given save directory, both pipeline toggles off,
    /// using the built-in obfuscation passphrase.
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self::with_secret(save_dir, pipeline::OBFUSCATION_SECRET)
    }

    /// Manager with a caller-supplied passphrase, for hosts that source the
    /// secret from somewhere better than the binary.
    pub fn with_secret(save_dir: impl Into<PathBuf>, secret: &str) -> Self {
        Self {
            save_dir: save_dir.into(),
            use_compression: false,
            use_encryption: false,
            key: pipeline::derive_key(secret),
            current: None,
        }
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    // ========================
    // Current-save reference
    // ========================

    pub fn current(&self) -> Option<&SaveState> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut SaveState> {
        self.current.as_mut()
    }

    pub fn set_current(&mut self, state: SaveState) {
        self.current = Some(state);
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// Replace the current save with a fresh all-defaults state.
    pub fn create_default(&mut self) -> &mut SaveState {
        self.current.insert(SaveState::new())
    }

    // ========================
    // Write / read pipeline
    // ========================

    /// Persist a state to the named slot: stamp metadata, sync associative
    /// sections to record form, serialize, optionally compress, optionally
    /// encrypt, then atomically replace the slot file.
    ///
    /// Metadata is stamped onto a staged copy and committed back to the
    /// caller's state only once the file write succeeds, so a failed write
    /// leaves both the previously committed file and the in-memory save
    /// counter untouched.
    pub fn write(
        &self,
        state: &mut SaveState,
        slot: &str,
        format: SaveFormat,
    ) -> Result<(), SaveError> {
        validate_slot_name(slot)?;
        let staged = self.stage_for_write(state, slot)?;
        let data =
            encode_bytes(&staged, format, self.use_compression, self.use_encryption, &self.key)?;
        write_atomic(&self.slot_path(slot, format), &data)?;
        log::info!("saved slot {slot:?} ({} bytes, {format:?})", data.len());
        *state = staged;
        Ok(())
    }

    /// [`SaveManager::write`] with the file I/O on a worker thread. The
    /// pipeline runs synchronously before this returns, so the bytes on the
    /// way to disk are a snapshot taken at call time. The metadata stamp
    /// commits at call time as well: the background outcome is only known
    /// at [`SaveJob::join`], and the snapshot is what gets persisted.
    pub fn write_async(
        &self,
        state: &mut SaveState,
        slot: &str,
        format: SaveFormat,
    ) -> Result<SaveJob<()>, SaveError> {
        validate_slot_name(slot)?;
        let staged = self.stage_for_write(state, slot)?;
        let data =
            encode_bytes(&staged, format, self.use_compression, self.use_encryption, &self.key)?;
        let path = self.slot_path(slot, format);
        *state = staged;
        let len = data.len();
        let slot = slot.to_string();
        let handle = thread::spawn(move || {
            write_atomic(&path, &data)?;
            log::info!("saved slot {slot:?} ({len} bytes, background)");
            Ok(())
        });
        Ok(SaveJob { handle })
    }

    /// Write the current save to a slot. A missing current save becomes a
    /// fresh default state first.
    pub fn write_current(&mut self, slot: &str, format: SaveFormat) -> Result<(), SaveError> {
        let mut state = self.current.take().unwrap_or_else(SaveState::new);
        let result = self.write(&mut state, slot, format);
        self.current = Some(state);
        result
    }

    /// Load a slot and make it the current save. `Ok(None)` when the slot
    /// file does not exist; any error leaves the current save untouched.
    ///
    /// The pipeline toggles must match the ones used for the corresponding
    /// write; the file content is not introspected to auto-detect them.
    pub fn read(&mut self, slot: &str, format: SaveFormat) -> Result<Option<SaveState>, SaveError> {
        let state = match self.peek(slot, format)? {
            Some(state) => state,
            None => return Ok(None),
        };
        self.current = Some(state.clone());
        log::info!("loaded slot {slot:?} ({format:?})");
        Ok(Some(state))
    }

    /// Load a slot without replacing the current save (slot pickers, UI
    /// previews).
    pub fn peek(&self, slot: &str, format: SaveFormat) -> Result<Option<SaveState>, SaveError> {
        validate_slot_name(slot)?;
        let path = self.slot_path(slot, format);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let state = decode_bytes(&bytes, format, self.use_compression, self.use_encryption, &self.key)?;
        Ok(Some(state))
    }

    /// [`SaveManager::read`] with everything on a worker thread. The loaded
    /// state is returned to the caller, who applies it via
    /// [`SaveManager::set_current`] back on the main loop.
    pub fn read_async(
        &self,
        slot: &str,
        format: SaveFormat,
    ) -> Result<SaveJob<Option<SaveState>>, SaveError> {
        validate_slot_name(slot)?;
        let path = self.slot_path(slot, format);
        let (use_compression, use_encryption, key) =
            (self.use_compression, self.use_encryption, self.key);
        let handle = thread::spawn(move || {
            if !path.exists() {
                return Ok(None);
            }
            let bytes = fs::read(&path)?;
            let state = decode_bytes(&bytes, format, use_compression, use_encryption, &key)?;
            Ok(Some(state))
        });
        Ok(SaveJob { handle })
    }

    // ========================
    // Slot management
    // ========================

    /// Names of all slots saved in the given format, sorted.
    pub fn list_slots(&self, format: SaveFormat) -> Result<Vec<String>, SaveError> {
        if !self.save_dir.exists() {
            return Ok(Vec::new());
        }

        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.save_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(format.extension()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                slots.push(stem.to_string());
            }
        }
        slots.sort();
        Ok(slots)
    }

    /// Remove one slot file. Returns whether a file was actually present.
    pub fn delete_slot(&self, slot: &str, format: SaveFormat) -> Result<bool, SaveError> {
        validate_slot_name(slot)?;
        let path = self.slot_path(slot, format);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        log::info!("deleted slot {slot:?} ({format:?})");
        Ok(true)
    }

    /// Remove every file in the save directory and recreate it empty.
    pub fn delete_all(&self) -> Result<(), SaveError> {
        if self.save_dir.exists() {
            fs::remove_dir_all(&self.save_dir)?;
        }
        fs::create_dir_all(&self.save_dir)?;
        log::info!("cleared save directory {:?}", self.save_dir);
        Ok(())
    }

    /// SHA-256 of a slot file's raw bytes, for out-of-band integrity
    /// tracking. `Ok(None)` when the slot does not exist.
    pub fn slot_digest(
        &self,
        slot: &str,
        format: SaveFormat,
    ) -> Result<Option<String>, SaveError> {
        validate_slot_name(slot)?;
        let path = self.slot_path(slot, format);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(integrity::sha256_hex(&bytes)))
    }

    // ========================
    // Global-flag convenience
    // ========================

    /// Set a flag on the current save, creating a default current save if
    /// none exists. In-memory only; nothing is written to disk.
    pub fn set_flag(&mut self, name: &str, value: bool) {
        let state = self.current.get_or_insert_with(SaveState::new);
        GlobalFlags::new(state).set(name, value);
    }

    pub fn get_flag(&self, name: &str) -> bool {
        self.current
            .as_ref()
            .and_then(|state| state.world.global_flags.get(name).copied())
            .unwrap_or(false)
    }

    pub fn evaluate_flag(&self, name: &str, expected: bool) -> bool {
        self.get_flag(name) == expected
    }

    // ========================
    // Private helpers
    // ========================

    fn slot_path(&self, slot: &str, format: SaveFormat) -> PathBuf {
        self.save_dir.join(format!("{slot}.{}", format.extension()))
    }

    /// Write metadata (timestamp, save counter, slot name) stamped onto a
    /// clone of the state, synced and validated, ready for encoding.
    fn stage_for_write(&self, state: &SaveState, slot: &str) -> Result<SaveState, SaveError> {
        let mut staged = state.clone();
        staged.last_save_time = Utc::now();
        staged.world.save_count += 1;
        staged.slot_name = slot.to_string();
        staged.sync_all_to_records();
        staged.validate()?;
        Ok(staged)
    }
}

fn validate_slot_name(slot: &str) -> Result<(), SaveError> {
    let bad = slot.is_empty()
        || slot.contains('/')
        || slot.contains('\\')
        || slot.contains("..");
    if bad {
        return Err(SaveError::InvalidSlotName { name: slot.to_string() });
    }
    Ok(())
}

fn encode_bytes(
    state: &SaveState,
    format: SaveFormat,
    use_compression: bool,
    use_encryption: bool,
    key: &[u8; 32],
) -> Result<Vec<u8>, SaveError> {
    let mut data = codec::serialize(state, format)?;
    if use_compression {
        data = pipeline::compress(&data)?;
    }
    if use_encryption {
        data = pipeline::encrypt(&data, key);
    }
    Ok(data)
}

fn decode_bytes(
    bytes: &[u8],
    format: SaveFormat,
    use_compression: bool,
    use_encryption: bool,
    key: &[u8; 32],
) -> Result<SaveState, SaveError> {
    let mut data = bytes.to_vec();
    if use_encryption {
        data = pipeline::decrypt(&data, key)?;
    }
    if use_compression {
        data = pipeline::decompress(&data)?;
    }
    let mut state = codec::deserialize(&data, format)?;
    state.sync_all_from_records();
    state.validate()?;
    Ok(state)
}

/// Temp file staged next to the target, keeping the full extension so
/// `slot1.json` and `slot1.sav` never stage at the same name.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write-to-temp-then-rename. A failed write leaves the committed file
/// untouched; a subsequent read never sees a partial file.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path);
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.flush()?;
        // sync_all ensures the bytes hit the disk before the rename commits.
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}
