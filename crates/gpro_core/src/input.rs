use std::collections::HashSet;

/// Re-exported from `winit` so callers can name keys without depending on
/// the windowing crate directly.
pub use winit::keyboard::KeyCode;

/// Keyboard state at a given moment.
///
/// The runner feeds it the key events coming from `winit`; the camera
/// controller queries it once per frame.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Default::default()
    }

    /// Called by the event loop when a keyboard event arrives.
    pub fn update_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_down.insert(key);
        } else {
            self.keys_down.remove(&key);
        }
    }

    /// Returns true if the given key is currently pressed down.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Forget every held key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys_down.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_tracking() {
        let mut state = InputState::new();
        assert!(!state.is_key_pressed(KeyCode::KeyW));
        state.update_key(KeyCode::KeyW, true);
        assert!(state.is_key_pressed(KeyCode::KeyW));
        state.update_key(KeyCode::KeyW, false);
        assert!(!state.is_key_pressed(KeyCode::KeyW));
    }

    #[test]
    fn clear_releases_everything() {
        let mut state = InputState::new();
        state.update_key(KeyCode::Space, true);
        state.update_key(KeyCode::ArrowLeft, true);
        state.clear();
        assert!(!state.is_key_pressed(KeyCode::Space));
        assert!(!state.is_key_pressed(KeyCode::ArrowLeft));
    }
}
