//! Scene assembly: flattens live entities into sorted, projected draw lists
//!
//! There is no depth buffer, so faces are drawn back to front (painter's
//! algorithm). Buffers are cleared and refilled each frame, keeping their
//! capacity.

use glam::Vec3;

use super::entity::{Color, Entity, Style};
use super::mesh::Face;
use super::transform::{face_normal, project_in_place, shadow_point};
use crate::consts::*;

const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, CAMERA_DISTANCE);

/// A face plus the per-frame state needed to shade it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFace {
    /// Indices into `Scene::vertices`
    pub face: Face,
    pub color: Color,
    pub style: Style,
    pub stroke_width: f32,
    /// World-space centroid
    pub middle: Vec3,
    /// Distance from the camera to `middle`
    pub depth: f32,
    pub normal_world: Vec3,
    /// Normal after projection; `z < 0` faces away from the viewer
    pub normal_camera: Vec3,
}

impl SceneFace {
    #[inline]
    pub fn is_back_facing(&self) -> bool {
        self.normal_camera.z < 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowFace {
    /// Indices into `Scene::shadow_vertices`
    pub face: Face,
    pub style: Style,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Screen-space x/y after `rebuild`; `z` keeps world depth
    pub vertices: Vec<Vec3>,
    pub faces: Vec<SceneFace>,
    pub shadow_vertices: Vec<Vec3>,
    pub shadow_faces: Vec<ShadowFace>,
}

fn centroid(vertices: &[Vec3], face: &Face) -> Vec3 {
    let idx = face.indices();
    idx.iter().map(|i| vertices[*i]).sum::<Vec3>() / idx.len() as f32
}

fn normal(vertices: &[Vec3], face: &Face) -> Vec3 {
    let idx = face.indices();
    face_normal(vertices[idx[0]], vertices[idx[1]], vertices[idx[2]])
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.shadow_vertices.clear();
        self.shadow_faces.clear();
    }

    fn push_entity(&mut self, entity: &Entity) {
        let base = self.vertices.len();
        self.vertices.extend_from_slice(&entity.vertices);
        self.shadow_vertices.extend_from_slice(&entity.shadow_vertices);
        for face in &entity.mesh.faces {
            let face = face.offset(base);
            self.faces.push(SceneFace {
                face,
                color: entity.color,
                style: entity.style,
                stroke_width: entity.stroke_width,
                middle: Vec3::ZERO,
                depth: 0.0,
                normal_world: Vec3::ZERO,
                normal_camera: Vec3::ZERO,
            });
            self.shadow_faces.push(ShadowFace {
                face,
                style: entity.style,
            });
        }
    }

    /// Rebuild from already-transformed entities, in draw-priority order
    pub fn rebuild<'a>(&mut self, entities: impl IntoIterator<Item = &'a Entity>) {
        self.clear();
        for entity in entities {
            self.push_entity(entity);
        }

        for f in &mut self.faces {
            f.normal_world = normal(&self.vertices, &f.face);
            f.middle = centroid(&self.vertices, &f.face);
            f.depth = (f.middle - CAMERA_POSITION).length();
        }
        // Stable, so coplanar faces keep entity order
        self.faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        self.vertices.iter_mut().for_each(project_in_place);
        for f in &mut self.faces {
            f.normal_camera = normal(&self.vertices, &f.face);
        }

        for v in &mut self.shadow_vertices {
            *v = shadow_point(*v);
            project_in_place(v);
        }
    }

    /// Screen-space corners of a face
    pub fn face_points<'a>(&'a self, face: &'a Face) -> impl Iterator<Item = Vec3> + 'a {
        face.indices().iter().map(|i| self.vertices[*i])
    }

    pub fn shadow_points<'a>(&'a self, face: &'a Face) -> impl Iterator<Item = Vec3> + 'a {
        face.indices().iter().map(|i| self.shadow_vertices[*i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mesh::build_cube;
    use proptest::prelude::*;
    use std::rc::Rc;

    fn cube_at(position: Vec3, rotation: Vec3) -> Entity {
        let mut e = Entity::new(Rc::new(build_cube(TARGET_RADIUS)), Color::Green, Style::Solid);
        e.motion.position = position;
        e.motion.rotation = rotation;
        e.transform();
        e
    }

    #[test]
    fn test_far_faces_come_first() {
        let near = cube_at(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO);
        let far = cube_at(Vec3::new(0.0, 0.0, -300.0), Vec3::ZERO);
        let mut scene = Scene::new();
        scene.rebuild([&near, &far]);
        assert_eq!(scene.faces.len(), 12);
        assert_eq!(scene.shadow_faces.len(), 12);
        // All six far faces are deeper than any near face
        assert!(scene.faces[..6].iter().all(|f| f.middle.z < 0.0));
        assert!(scene.faces[6..].iter().all(|f| f.middle.z > 0.0));
    }

    #[test]
    fn test_backface_flags() {
        let cube = cube_at(Vec3::ZERO, Vec3::ZERO);
        let mut scene = Scene::new();
        scene.rebuild([&cube]);
        let front = scene.faces.iter().find(|f| f.normal_world.z > 0.9);
        let back = scene.faces.iter().find(|f| f.normal_world.z < -0.9);
        assert!(front.is_some_and(|f| !f.is_back_facing()));
        assert!(back.is_some_and(|f| f.is_back_facing()));
        // Back face is farthest, front face nearest
        assert!(scene.faces[0].normal_world.z < -0.9);
        assert!(scene.faces[5].normal_world.z > 0.9);
    }

    #[test]
    fn test_shadows_sit_below_and_behind() {
        let cube = cube_at(Vec3::new(0.0, -200.0, 0.0), Vec3::ZERO);
        let mut scene = Scene::new();
        scene.rebuild([&cube]);
        for (v, s) in scene.vertices.iter().zip(&scene.shadow_vertices) {
            assert!((s.z - BACKBOARD_Z).abs() < 1e-2);
            assert!(s.y > v.y);
        }
    }

    #[test]
    fn test_rebuild_reuses_buffers() {
        let cube = cube_at(Vec3::ZERO, Vec3::ZERO);
        let mut scene = Scene::new();
        scene.rebuild([&cube]);
        scene.rebuild([&cube]);
        assert_eq!(scene.vertices.len(), 8);
        scene.rebuild(std::iter::empty());
        assert!(scene.faces.is_empty());
    }

    proptest! {
        #[test]
        fn test_depth_sorted_back_to_front(
            poses in prop::collection::vec(
                ((-400.0f32..400.0, -400.0f32..400.0, -380.0f32..500.0), (-3.2f32..3.2, -3.2f32..3.2, -3.2f32..3.2)),
                1..6,
            )
        ) {
            let entities: Vec<Entity> = poses
                .into_iter()
                .map(|((x, y, z), (rx, ry, rz))| cube_at(Vec3::new(x, y, z), Vec3::new(rx, ry, rz)))
                .collect();
            let mut scene = Scene::new();
            scene.rebuild(&entities);
            for pair in scene.faces.windows(2) {
                prop_assert!(pair[0].depth >= pair[1].depth);
            }
        }
    }
}
