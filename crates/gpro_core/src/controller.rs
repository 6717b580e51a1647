use std::collections::HashMap;

use glam::Vec3;

use crate::camera::Camera;
use crate::input::{InputState, KeyCode};

/// Free-flying camera controller.
///
/// Movement keys map to camera-space unit directions (`x` right, `y` up,
/// `z` forward); turn keys change yaw and pitch at a fixed angular rate.
///
/// # Example
/// ```rust,ignore
/// use gpro_core::{FlyController, KeyCode};
/// use glam::Vec3;
///
/// let mut controller = FlyController::new();
/// controller.bind(KeyCode::KeyE, Vec3::Y);
/// controller.speed = 2.0;
/// ```
#[derive(Debug, Clone)]
pub struct FlyController {
    mappings: HashMap<KeyCode, Vec3>,

    /// Translation speed in world units per second.
    ///
    /// Default: `4.0`
    pub speed: f32,

    /// Key that multiplies `speed` by `boost_factor` while held.
    pub boost_key: KeyCode,

    /// Default: `8.0`
    pub boost_factor: f32,

    /// Yaw/pitch rate in degrees per second.
    ///
    /// Default: `75.0`
    pub turn_speed: f32,

    /// Absolute pitch limit in degrees.
    pub pitch_limit: f32,
}

impl FlyController {
    /// WASD + Space/ShiftLeft movement, no turn keys beyond the arrows.
    pub fn new() -> Self {
        let mut mappings = HashMap::new();
        mappings.insert(KeyCode::KeyW, Vec3::Z);
        mappings.insert(KeyCode::KeyS, Vec3::NEG_Z);
        mappings.insert(KeyCode::KeyA, Vec3::NEG_X);
        mappings.insert(KeyCode::KeyD, Vec3::X);
        mappings.insert(KeyCode::Space, Vec3::Y);
        mappings.insert(KeyCode::ShiftLeft, Vec3::NEG_Y);
        Self {
            mappings,
            speed: 4.0,
            boost_key: KeyCode::KeyR,
            boost_factor: 8.0,
            turn_speed: 75.0,
            pitch_limit: 89.0,
        }
    }

    /// Binds `key` to a camera-space direction, replacing any old binding.
    pub fn bind(&mut self, key: KeyCode, dir: Vec3) {
        self.mappings.insert(key, dir);
    }

    pub fn unbind(&mut self, key: KeyCode) {
        self.mappings.remove(&key);
    }

    /// Sum of the camera-space directions of the held keys (not normalised).
    pub fn direction(&self, input: &InputState) -> Vec3 {
        self.mappings
            .iter()
            .filter(|(key, _)| input.is_key_pressed(**key))
            .map(|(_, dir)| *dir)
            .sum()
    }

    /// Applies one frame of input to `camera`.
    pub fn update(&self, camera: &mut Camera, input: &InputState, dt: f32) {
        let turn = self.turn_speed * dt;
        if input.is_key_pressed(KeyCode::ArrowLeft) {
            camera.yaw += turn;
        }
        if input.is_key_pressed(KeyCode::ArrowRight) {
            camera.yaw -= turn;
        }
        if input.is_key_pressed(KeyCode::ArrowUp) {
            camera.pitch += turn;
        }
        if input.is_key_pressed(KeyCode::ArrowDown) {
            camera.pitch -= turn;
        }
        camera.pitch = camera.pitch.clamp(-self.pitch_limit, self.pitch_limit);

        let local = self.direction(input);
        if local == Vec3::ZERO {
            return;
        }
        let mut speed = self.speed;
        if input.is_key_pressed(self.boost_key) {
            speed *= self.boost_factor;
        }
        let world = camera.right() * local.x
            + camera.up.normalize_or_zero() * local.y
            + camera.look_direction() * local.z;
        camera.position += world * speed * dt;
    }
}

impl Default for FlyController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(keys: &[KeyCode]) -> InputState {
        let mut input = InputState::new();
        for k in keys {
            input.update_key(*k, true);
        }
        input
    }

    #[test]
    fn forward_moves_along_look_direction() {
        let ctl = FlyController::new();
        let mut cam = Camera::default();
        let start = cam.position;
        ctl.update(&mut cam, &held(&[KeyCode::KeyW]), 1.0);
        assert!((cam.position - (start + Vec3::Z * 4.0)).length() < 1e-4);
    }

    #[test]
    fn boost_multiplies_speed() {
        let ctl = FlyController::new();
        let mut cam = Camera::default();
        let start = cam.position;
        ctl.update(&mut cam, &held(&[KeyCode::Space, KeyCode::KeyR]), 0.5);
        assert!((cam.position - (start + Vec3::Y * 16.0)).length() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let ctl = FlyController::new();
        let mut cam = Camera::default();
        for _ in 0..10 {
            ctl.update(&mut cam, &held(&[KeyCode::ArrowUp]), 1.0);
        }
        assert_eq!(cam.pitch, 89.0);
        assert!(cam.look_direction().y > 0.99);
    }

    #[test]
    fn opposite_keys_cancel() {
        let ctl = FlyController::new();
        let mut cam = Camera::default();
        let start = cam.position;
        ctl.update(&mut cam, &held(&[KeyCode::KeyA, KeyCode::KeyD]), 1.0);
        assert_eq!(cam.position, start);
    }
}
