//! Auto-save triggers: thin, event-driven glue over the manager.
//!
//! Engine lifecycle hooks call in here on startup, shutdown, scene change
//! and once per simulation step. No trigger fires when there is no current
//! save to persist.

use crate::codec::SaveFormat;
use crate::error::SaveError;
use crate::manager::SaveManager;
use crate::model::SaveState;

/// Conventional slot name for automatic saves.
pub const AUTOSAVE_SLOT: &str = "autosave";

pub struct Autosave {
    pub slot: String,
    pub format: SaveFormat,
    /// Seconds between interval-triggered saves.
    pub interval_secs: f32,
    elapsed: f32,
}

impl Autosave {
    pub fn new(format: SaveFormat, interval_secs: f32) -> Self {
        Self { slot: AUTOSAVE_SLOT.to_string(), format, interval_secs, elapsed: 0.0 }
    }

    /// Startup trigger: load the autosave slot if present and make it
    /// current.
    pub fn on_startup(&self, manager: &mut SaveManager) -> Result<Option<SaveState>, SaveError> {
        manager.read(&self.slot, self.format)
    }

    /// Shutdown trigger: persist the current save, if any.
    pub fn on_shutdown(&self, manager: &mut SaveManager) -> Result<(), SaveError> {
        self.save_now(manager).map(|_| ())
    }

    /// Scene-change trigger: record the new scene on the current save,
    /// persist, and restart the interval clock.
    pub fn on_scene_change(
        &mut self,
        manager: &mut SaveManager,
        scene: &str,
    ) -> Result<(), SaveError> {
        if let Some(state) = manager.current_mut() {
            state.world.current_scene = scene.to_string();
        }
        self.elapsed = 0.0;
        self.save_now(manager).map(|_| ())
    }

    /// Interval trigger: call once per simulation step with the frame delta.
    /// Returns whether a save fired.
    pub fn tick(&mut self, dt_secs: f32, manager: &mut SaveManager) -> Result<bool, SaveError> {
        self.elapsed += dt_secs;
        if self.elapsed < self.interval_secs {
            return Ok(false);
        }
        self.elapsed = 0.0;
        self.save_now(manager)
    }

    fn save_now(&self, manager: &mut SaveManager) -> Result<bool, SaveError> {
        if manager.current().is_none() {
            return Ok(false);
        }
        manager.write_current(&self.slot, self.format)?;
        log::debug!("autosave completed to slot {:?}", self.slot);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tick_fires_on_interval() {
        let dir = TempDir::new().unwrap();
        let mut manager = SaveManager::new(dir.path());
        manager.create_default();

        let mut autosave = Autosave::new(SaveFormat::Json, 10.0);

        assert!(!autosave.tick(4.0, &mut manager).unwrap());
        assert!(!autosave.tick(4.0, &mut manager).unwrap());
        assert!(autosave.tick(4.0, &mut manager).unwrap());

        assert_eq!(manager.list_slots(SaveFormat::Json).unwrap(), vec!["autosave"]);
    }

    #[test]
    fn test_triggers_are_noops_without_current_save() {
        let dir = TempDir::new().unwrap();
        let mut manager = SaveManager::new(dir.path());

        let mut autosave = Autosave::new(SaveFormat::Json, 1.0);
        autosave.on_shutdown(&mut manager).unwrap();
        assert!(!autosave.tick(5.0, &mut manager).unwrap());

        assert!(manager.list_slots(SaveFormat::Json).unwrap().is_empty());
    }

    #[test]
    fn test_scene_change_records_scene_and_saves() {
        let dir = TempDir::new().unwrap();
        let mut manager = SaveManager::new(dir.path());
        manager.create_default();

        let mut autosave = Autosave::new(SaveFormat::Json, 60.0);
        autosave.tick(50.0, &mut manager).unwrap();
        autosave.on_scene_change(&mut manager, "crypt_level_2").unwrap();

        // The interval clock restarted at the scene save.
        assert!(!autosave.tick(50.0, &mut manager).unwrap());

        let loaded = manager.peek(AUTOSAVE_SLOT, SaveFormat::Json).unwrap().unwrap();
        assert_eq!(loaded.world.current_scene, "crypt_level_2");
    }

    #[test]
    fn test_startup_restores_autosave() {
        let dir = TempDir::new().unwrap();
        let mut manager = SaveManager::new(dir.path());

        let mut state = SaveState::new();
        state.player.level = 7;
        manager.write(&mut state, AUTOSAVE_SLOT, SaveFormat::Json).unwrap();

        let autosave = Autosave::new(SaveFormat::Json, 60.0);
        let restored = autosave.on_startup(&mut manager).unwrap().unwrap();

        assert_eq!(restored.player.level, 7);
        assert_eq!(manager.current().unwrap().player.level, 7);
    }
}
