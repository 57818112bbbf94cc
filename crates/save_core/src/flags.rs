//! Named-boolean facade over the global-flags section.
//!
//! Gameplay systems gate content ("bridge_open", "ending_unlocked") through
//! this view instead of reaching into the save model. The facade holds
//! nothing but a borrow of the current state; it never touches disk.

use crate::model::SaveState;

pub struct GlobalFlags<'a> {
    state: &'a mut SaveState,
}

impl<'a> GlobalFlags<'a> {
    pub fn new(state: &'a mut SaveState) -> Self {
        Self { state }
    }

    pub fn set(&mut self, name: &str, value: bool) {
        self.state.world.global_flags.insert(name, value);
    }

    /// Unset flags read as `false`.
    pub fn get(&self, name: &str) -> bool {
        self.state.world.global_flags.get(name).copied().unwrap_or(false)
    }

    pub fn evaluate(&self, name: &str, expected: bool) -> bool {
        self.get(name) == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_evaluation_is_idempotent() {
        let mut state = SaveState::new();
        let mut flags = GlobalFlags::new(&mut state);

        flags.set("bridge_open", true);

        assert!(flags.evaluate("bridge_open", true));
        assert!(!flags.evaluate("bridge_open", false));
        assert!(flags.evaluate("bridge_open", true));
    }

    #[test]
    fn test_unset_flags_default_false() {
        let mut state = SaveState::new();
        let flags = GlobalFlags::new(&mut state);

        assert!(!flags.get("never_set"));
        assert!(flags.evaluate("never_set", false));
    }

    #[test]
    fn test_facade_writes_through_to_state() {
        let mut state = SaveState::new();
        GlobalFlags::new(&mut state).set("boss_defeated", true);

        assert_eq!(state.world.global_flags.get("boss_defeated"), Some(&true));
    }
}
