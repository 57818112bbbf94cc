//! The versioned, serializable save-state model.
//!
//! Field names on the wire follow the established structured-text layout
//! (`saveVersion`, `playerData`, `gameStateData`, ...) so default-posture
//! files stay hand-editable and stable across releases. All content mutation
//! belongs to the gameplay systems that own the data; the persistence layer
//! only stamps metadata (`lastSaveTime`, `saveCount`, `slotName`) at write
//! time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapter::RecordMap;
use crate::error::SaveError;
use crate::SCHEMA_VERSION;

/// Default number of inventory slots in a fresh save.
pub const DEFAULT_INVENTORY_SIZE: usize = 20;

/// Upper bound on inventory slots accepted by validation.
const MAX_INVENTORY_SIZE: usize = 10_000;

/// Fixed equipment-slot enumeration. `equipped` holds one item ID (or empty
/// string) per variant, indexed by discriminant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentSlot {
    Head,
    Chest,
    Legs,
    Hands,
    Feet,
    MainHand,
    OffHand,
    Trinket,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 8] = [
        EquipmentSlot::Head,
        EquipmentSlot::Chest,
        EquipmentSlot::Legs,
        EquipmentSlot::Hands,
        EquipmentSlot::Feet,
        EquipmentSlot::MainHand,
        EquipmentSlot::OffHand,
        EquipmentSlot::Trinket,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One positional inventory slot. Empty slots are represented, never
/// omitted, so slot indices survive a round trip.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InventorySlot {
    #[serde(rename = "itemID")]
    pub item_id: String,
    pub quantity: i32,
}

impl InventorySlot {
    pub fn empty() -> Self {
        Self { item_id: String::new(), quantity: 0 }
    }

    pub fn new(item_id: impl Into<String>, quantity: i32) -> Self {
        Self { item_id: item_id.into(), quantity }
    }

    pub fn is_empty(&self) -> bool {
        self.quantity <= 0 || self.item_id.is_empty()
    }
}

impl Default for InventorySlot {
    fn default() -> Self {
        Self::empty()
    }
}

/// A value in the open-ended extensions section. Untagged so plain scalars
/// stay plain scalars on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ExtensionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub player_name: String,
    pub level: i32,
    pub health: f32,
    pub max_health: f32,
    pub experience: f32,
    pub position: [f32; 3],

    /// Orientation quaternion (x, y, z, w).
    pub rotation: [f32; 4],

    pub inventory_slots: Vec<InventorySlot>,

    /// One item ID (or empty string) per [`EquipmentSlot`], in `ALL` order.
    #[serde(rename = "equippedItems")]
    pub equipped: Vec<String>,

    /// Named integer counters (currencies, attribute points, ...).
    #[serde(rename = "statsSerializable")]
    pub stats: RecordMap<i64>,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            player_name: "Player".to_string(),
            level: 1,
            health: 100.0,
            max_health: 100.0,
            experience: 0.0,
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            inventory_slots: vec![InventorySlot::empty(); DEFAULT_INVENTORY_SIZE],
            equipped: vec![String::new(); EquipmentSlot::COUNT],
            stats: RecordMap::new(),
        }
    }

    pub fn equipped_item(&self, slot: EquipmentSlot) -> &str {
        self.equipped.get(slot.index()).map(String::as_str).unwrap_or("")
    }

    /// Equip an item, replacing whatever the slot held. Pass an empty ID to
    /// unequip.
    pub fn set_equipped(&mut self, slot: EquipmentSlot, item_id: impl Into<String>) {
        if self.equipped.len() != EquipmentSlot::COUNT {
            self.equipped.resize(EquipmentSlot::COUNT, String::new());
        }
        self.equipped[slot.index()] = item_id.into();
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub current_scene: String,

    /// Cumulative play time in seconds.
    pub playtime: f64,

    /// Incremented once per successful write.
    pub save_count: i64,

    /// Uniqueness is a caller responsibility, not enforced here.
    pub unlocked_achievements: Vec<String>,

    #[serde(rename = "questStatesSerializable")]
    pub quest_states: RecordMap<bool>,

    #[serde(rename = "gameSettingsSerializable")]
    pub settings: RecordMap<f64>,

    /// Structurally identical to `quest_states` but a distinct section:
    /// content gating reads these, quest logic reads those.
    #[serde(rename = "globalFlagsSerializable")]
    pub global_flags: RecordMap<bool>,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            current_scene: String::new(),
            playtime: 0.0,
            save_count: 0,
            unlocked_achievements: Vec::new(),
            quest_states: RecordMap::new(),
            settings: RecordMap::new(),
            global_flags: RecordMap::new(),
        }
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

/// Root of the save model: everything one slot persists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    pub save_version: String,

    pub last_save_time: DateTime<Utc>,

    /// Set at write time; not semantically part of the content.
    #[serde(default)]
    pub slot_name: String,

    #[serde(rename = "playerData")]
    pub player: PlayerState,

    #[serde(rename = "gameStateData")]
    pub world: WorldState,

    /// Open-ended named values for systems the core model does not know
    /// about.
    #[serde(default)]
    pub extensions: RecordMap<ExtensionValue>,
}

impl SaveState {
    /// A fresh save with all defaults, used when no on-disk slot exists or
    /// on explicit reset.
    pub fn new() -> Self {
        Self {
            save_version: SCHEMA_VERSION.to_string(),
            last_save_time: Utc::now(),
            slot_name: String::new(),
            player: PlayerState::new(),
            world: WorldState::new(),
            extensions: RecordMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.save_version.is_empty() {
            return Err(SaveError::Corrupted("empty save version"));
        }

        if self.player.equipped.len() != EquipmentSlot::COUNT {
            return Err(SaveError::Corrupted("equipped list does not match slot count"));
        }

        if self.player.inventory_slots.len() > MAX_INVENTORY_SIZE {
            return Err(SaveError::DataTooLarge { size: self.player.inventory_slots.len() });
        }

        Ok(())
    }

    /// Refresh every associative section's record sequence from its live map.
    /// Must run before serialization.
    pub fn sync_all_to_records(&mut self) {
        self.player.stats.sync_to_records();
        self.world.quest_states.sync_to_records();
        self.world.settings.sync_to_records();
        self.world.global_flags.sync_to_records();
        self.extensions.sync_to_records();
    }

    /// Rebuild every associative section's live map from its record
    /// sequence. Must run after deserialization, before the state reaches
    /// callers.
    pub fn sync_all_from_records(&mut self) {
        self.player.stats.sync_from_records();
        self.world.quest_states.sync_from_records();
        self.world.settings.sync_from_records();
        self.world.global_flags.sync_from_records();
        self.extensions.sync_from_records();
    }
}

impl Default for SaveState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_validates() {
        let state = SaveState::new();
        assert!(state.validate().is_ok());
        assert_eq!(state.save_version, SCHEMA_VERSION);
        assert_eq!(state.player.inventory_slots.len(), DEFAULT_INVENTORY_SIZE);
        assert!(state.player.inventory_slots.iter().all(InventorySlot::is_empty));
    }

    #[test]
    fn test_empty_version_is_rejected() {
        let mut state = SaveState::new();
        state.save_version = String::new();

        assert!(matches!(state.validate(), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn test_equipment_indexing() {
        let mut player = PlayerState::new();
        player.set_equipped(EquipmentSlot::MainHand, "iron_sword");

        assert_eq!(player.equipped_item(EquipmentSlot::MainHand), "iron_sword");
        assert_eq!(player.equipped_item(EquipmentSlot::OffHand), "");

        player.set_equipped(EquipmentSlot::MainHand, "");
        assert_eq!(player.equipped_item(EquipmentSlot::MainHand), "");
    }

    #[test]
    fn test_slot_emptiness_rules() {
        assert!(InventorySlot::empty().is_empty());
        assert!(InventorySlot::new("potion", 0).is_empty());
        assert!(InventorySlot::new("", 5).is_empty());
        assert!(!InventorySlot::new("potion", 5).is_empty());
    }

    #[test]
    fn test_sync_all_roundtrip() {
        let mut state = SaveState::new();
        state.player.stats.insert("strength", 3);
        state.world.quest_states.insert("intro_done", true);
        state.world.settings.insert("music_volume", 0.8);
        state.world.global_flags.insert("bridge_open", true);
        state.extensions.insert("mod_data", ExtensionValue::Text("abc".to_string()));

        state.sync_all_to_records();

        let json = serde_json::to_vec(&state).unwrap();
        let mut reloaded: SaveState = serde_json::from_slice(&json).unwrap();

        // Straight out of the codec the live maps are empty; only the record
        // sequences are populated until the explicit sync runs.
        assert!(reloaded.player.stats.is_empty());
        reloaded.sync_all_from_records();

        assert_eq!(reloaded.player.stats.get("strength"), Some(&3));
        assert_eq!(reloaded.world.quest_states.get("intro_done"), Some(&true));
        assert_eq!(reloaded.world.global_flags.get("bridge_open"), Some(&true));
        assert_eq!(
            reloaded.extensions.get("mod_data"),
            Some(&ExtensionValue::Text("abc".to_string()))
        );
    }
}
