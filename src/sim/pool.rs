//! Free lists of retired entities, keyed by colour and style
//!
//! Live entities are owned by the active lists in `GameState`; retired ones
//! are moved here, so an entity is always in exactly one place.

use super::entity::{Color, Style};

const SLOTS: usize = Color::ALL.len() * 2;

/// Something that can be parked in a [`StylePool`]
pub trait Poolable {
    fn pool_key(&self) -> (Color, Style);

    /// Restore fresh kinematic state before the entity is parked
    fn reset(&mut self);
}

#[derive(Debug, Clone)]
pub struct StylePool<T> {
    free: [Vec<T>; SLOTS],
}

impl<T> Default for StylePool<T> {
    fn default() -> Self {
        Self {
            free: std::array::from_fn(|_| Vec::new()),
        }
    }
}

#[inline]
fn slot(color: Color, style: Style) -> usize {
    color.index() * 2 + style.index()
}

impl<T: Poolable> StylePool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse a parked entity of this colour and style, if any
    pub fn take(&mut self, color: Color, style: Style) -> Option<T> {
        self.free[slot(color, style)].pop()
    }

    /// Reuse a parked entity or build a new one
    pub fn take_or_else(&mut self, color: Color, style: Style, make: impl FnOnce() -> T) -> T {
        self.take(color, style).unwrap_or_else(make)
    }

    /// Reset and park an entity
    pub fn put(&mut self, mut item: T) {
        item.reset();
        let (color, style) = item.pool_key();
        self.free[slot(color, style)].push(item);
    }

    /// Total parked entities across all slots
    pub fn len(&self) -> usize {
        self.free.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Entity, Kinematics, Target};
    use crate::sim::mesh::build_cube;
    use glam::Vec3;
    use proptest::prelude::*;
    use std::rc::Rc;

    #[test]
    fn test_pool_keys_are_separate() {
        let mesh = Rc::new(build_cube(1.0));
        let mut pool = StylePool::new();
        pool.put(Entity::new(mesh.clone(), Color::Blue, Style::Wireframe));
        assert_eq!(pool.len(), 1);
        assert!(pool.take(Color::Blue, Style::Solid).is_none());
        assert!(pool.take(Color::Green, Style::Wireframe).is_none());
        let e = pool.take(Color::Blue, Style::Wireframe);
        assert!(e.is_some());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_take_or_else_builds_on_miss() {
        let mesh = Rc::new(build_cube(1.0));
        let mut pool: StylePool<Target> = StylePool::new();
        let t = pool.take_or_else(Color::Pink, Style::Solid, || {
            Target::new(mesh.clone(), Color::Pink, Style::Solid)
        });
        assert_eq!(t.entity.color, Color::Pink);
    }

    proptest! {
        #[test]
        fn test_pooled_target_comes_back_fresh(
            px in -500.0f32..500.0, vy in -30.0f32..30.0,
            rz in -6.0f32..6.0, sx in -0.3f32..0.3,
        ) {
            let mesh = Rc::new(build_cube(1.0));
            let mut pool = StylePool::new();
            let mut t = Target::new(mesh, Color::Orange, Style::Solid);
            t.entity.motion = Kinematics {
                position: Vec3::new(px, 0.0, 0.0),
                velocity: Vec3::new(0.0, vy, 0.0),
                rotation: Vec3::new(0.0, 0.0, rz),
                spin: Vec3::new(sx, sx, 0.0),
                scale: Vec3::ONE,
            };
            t.hit = true;
            pool.put(t);
            let back = pool.take(Color::Orange, Style::Solid);
            prop_assert!(back.is_some());
            if let Some(back) = back {
                prop_assert_eq!(back.entity.motion, Kinematics::default());
                prop_assert!(!back.hit);
            }
        }
    }
}
