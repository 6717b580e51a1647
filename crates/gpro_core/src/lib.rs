//! `gpro_core`: passive data shared by the renderer and the application.
//!
//! | Module       | Responsibility                                          |
//! |--------------|---------------------------------------------------------|
//! | `geometry`   | `Vertex`, `Mesh`, `MeshBuilder`, `Aabb`, primitives     |
//! | `transform`  | Euler `Transform` and its GPU form                      |
//! | `scene`      | `DrawableObject`, `Drawable`, `Material`, `Scene` arena |
//! | `camera`     | `Camera`, `Frustum`, GPU camera/frustum uniforms        |
//! | `light`      | Point lights uploaded to the shading pass               |
//! | `time`       | Frame clock                                             |
//! | `input`      | Keyboard state (feature `input`)                        |
//! | `controller` | Fly camera controller (feature `input`)                 |
//! | `context`    | wgpu device/queue context (feature `gpu`)               |

pub mod camera;
pub mod error;
pub mod geometry;
pub mod light;
pub mod scene;
pub mod time;
pub mod transform;

#[cfg(feature = "gpu")]
pub mod context;

#[cfg(feature = "input")]
pub mod controller;
#[cfg(feature = "input")]
pub mod input;

pub use camera::{Camera, CameraUniform, Frustum, GpuFrustum};
pub use error::GeometryError;
pub use geometry::{Aabb, GpuAabb, Mesh, MeshBuilder, Vertex};
pub use light::Light;
pub use scene::{Drawable, DrawableObject, Material, MaterialImage, ObjectId, Scene};
pub use time::{Time, TimeClock};
pub use transform::{InstanceTransform, Transform};

#[cfg(feature = "input")]
pub use controller::FlyController;
#[cfg(feature = "input")]
pub use input::{InputState, KeyCode};

pub use glam;

#[cfg(feature = "gpu")]
pub use context::{ContextError, EngineContext};
