//! Scene arena: the append-only list of authored drawables.
//!
//! Objects are addressed by a dense [`ObjectId`] (their position in the
//! arena) so other layers can keep integer back-references instead of
//! pointers.  Newly added objects queue up until the renderer drains them;
//! removal is not supported.

pub mod drawable;
pub mod material;

use std::collections::HashMap;

pub use drawable::{Drawable, DrawableObject};
pub use material::{Material, MaterialImage};

/// Stable index of a drawable inside a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl ObjectId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<Drawable>,
    names: HashMap<String, ObjectId>,
    /// Objects before this position have already been handed out.
    admitted: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a drawable and returns its id.
    pub fn add(&mut self, drawable: impl Into<Drawable>) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(drawable.into());
        id
    }

    /// Appends a drawable under a unique name.  Returns `None` (and drops the
    /// drawable) when the name is already taken.
    pub fn add_named(
        &mut self,
        name: impl Into<String>,
        drawable: impl Into<Drawable>,
    ) -> Option<ObjectId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return None;
        }
        let id = self.add(drawable);
        self.names.insert(name, id);
        Some(id)
    }

    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.names.get(name).copied()
    }

    pub fn get(&self, id: ObjectId) -> Option<&Drawable> {
        self.objects.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of objects not yet handed out by [`Scene::drain_pending`].
    pub fn pending_count(&self) -> usize {
        self.objects.len() - self.admitted
    }

    /// Hands out every object added since the previous call, in insertion
    /// order.
    pub fn drain_pending(&mut self) -> impl Iterator<Item = (ObjectId, &Drawable)> + '_ {
        let start = self.admitted;
        self.admitted = self.objects.len();
        self.objects[start..]
            .iter()
            .enumerate()
            .map(move |(i, d)| (ObjectId((start + i) as u32), d))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::geometry::primitives;
    use crate::transform::Transform;

    fn drawable() -> DrawableObject {
        DrawableObject::new(
            Arc::new(primitives::cube()),
            vec![Transform::IDENTITY],
            Material::solid("grey", [128, 128, 128, 255]),
        )
        .unwrap()
    }

    #[test]
    fn pending_objects_are_handed_out_once() {
        let mut scene = Scene::new();
        scene.add(drawable());
        scene.add(drawable());
        let ids: Vec<_> = scene.drain_pending().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![ObjectId(0), ObjectId(1)]);
        assert_eq!(scene.drain_pending().count(), 0);

        scene.add(drawable());
        assert_eq!(scene.pending_count(), 1);
        let ids: Vec<_> = scene.drain_pending().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![ObjectId(2)]);
    }

    #[test]
    fn names_are_unique() {
        let mut scene = Scene::new();
        assert_eq!(scene.add_named("crate", drawable()), Some(ObjectId(0)));
        assert_eq!(scene.add_named("crate", drawable()), None);
        assert_eq!(scene.find("crate"), Some(ObjectId(0)));
        assert_eq!(scene.len(), 1);
    }
}
