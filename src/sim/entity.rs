//! Renderable, simulated objects: targets, fragments, sparks and the swipe trail

use std::rc::Rc;

use glam::{Vec2, Vec3};

use super::mesh::Mesh;
use super::pool::Poolable;
use super::transform::{project, transform_points};

/// Palette colour of a target or fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Blue,
    Green,
    Pink,
    Orange,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Blue, Color::Green, Color::Pink, Color::Orange];

    /// Colours a normal target can spawn with (pink is reserved for strong targets)
    pub const BASE: [Color; 3] = [Color::Blue, Color::Green, Color::Orange];

    pub fn index(self) -> usize {
        match self {
            Color::Blue => 0,
            Color::Green => 1,
            Color::Pink => 2,
            Color::Orange => 3,
        }
    }
}

/// How an entity's faces are rasterized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    #[default]
    Solid,
    /// Outlines only; marks the slow-motion variant
    Wireframe,
}

impl Style {
    pub fn index(self) -> usize {
        match self {
            Style::Solid => 0,
            Style::Wireframe => 1,
        }
    }
}

/// Position, rotation and scale plus their rates of change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler angles (radians), applied X then Y then Z
    pub rotation: Vec3,
    /// Angular velocity (radians per reference frame)
    pub spin: Vec3,
    pub scale: Vec3,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            spin: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Kinematics {
    /// Advance position and rotation by `sim_speed` reference frames
    #[inline]
    pub fn integrate(&mut self, sim_speed: f32) {
        self.position += self.velocity * sim_speed;
        self.rotation += self.spin * sim_speed;
    }

    /// Pose one reference frame ago (velocities unchanged)
    pub fn previous(&self) -> Kinematics {
        Kinematics {
            position: self.position - self.velocity,
            rotation: self.rotation - self.spin,
            ..*self
        }
    }
}

/// A mesh instance with its own world-space vertex buffers
#[derive(Debug, Clone)]
pub struct Entity {
    pub mesh: Rc<Mesh>,
    /// Mesh vertices after `transform()`; derived, never authoritative
    pub vertices: Vec<Vec3>,
    /// Copy of `vertices` that scene assembly flattens onto the backboard
    pub shadow_vertices: Vec<Vec3>,
    pub color: Color,
    pub style: Style,
    /// Outline width for every face (0 = no outline)
    pub stroke_width: f32,
    pub motion: Kinematics,
    /// Screen-space position of the entity origin
    pub projected: Vec2,
}

impl Entity {
    pub fn new(mesh: Rc<Mesh>, color: Color, style: Style) -> Self {
        let vertices = mesh.vertices.clone();
        let shadow_vertices = mesh.vertices.clone();
        Self {
            mesh,
            vertices,
            shadow_vertices,
            color,
            style,
            stroke_width: if style == Style::Wireframe { 2.0 } else { 0.0 },
            motion: Kinematics::default(),
            projected: Vec2::ZERO,
        }
    }

    /// Recompute world-space vertices (and the shadow copy) from the current pose
    pub fn transform(&mut self) {
        let m = &self.motion;
        transform_points(&self.mesh.vertices, &mut self.vertices, m.position, m.rotation, m.scale);
        self.shadow_vertices.copy_from_slice(&self.vertices);
    }

    /// Project the entity origin to the screen
    pub fn project(&mut self) {
        self.projected = project(self.motion.position);
    }

    pub fn reset(&mut self) {
        self.motion = Kinematics::default();
        self.projected = Vec2::ZERO;
    }
}

/// A swipeable cube
#[derive(Debug, Clone)]
pub struct Target {
    pub entity: Entity,
    pub health: u32,
    pub max_health: u32,
    /// Already hit during the current swipe pass
    pub hit: bool,
    pub spawn_y: f32,
    pub min_y: f32,
    /// Rose far enough before falling that dropping out counts as a miss
    pub has_peaked: bool,
}

impl Target {
    pub fn new(mesh: Rc<Mesh>, color: Color, style: Style) -> Self {
        Self {
            entity: Entity::new(mesh, color, style),
            health: 1,
            max_health: 1,
            hit: false,
            spawn_y: 0.0,
            min_y: 0.0,
            has_peaked: false,
        }
    }

    #[inline]
    pub fn motion(&self) -> &Kinematics {
        &self.entity.motion
    }

    #[inline]
    pub fn motion_mut(&mut self) -> &mut Kinematics {
        &mut self.entity.motion
    }

    /// Solid targets show remaining extra health as a thick glue outline
    pub fn update_glue(&mut self) {
        if self.entity.style == Style::Solid {
            self.entity.stroke_width = self.health.saturating_sub(1) as f32;
        }
    }

    /// Place at a launch position and start apex tracking from there
    pub fn launch(&mut self, position: Vec3, velocity: Vec3) {
        let m = self.motion_mut();
        m.position = position;
        m.velocity = velocity;
        self.spawn_y = position.y;
        self.min_y = position.y;
        self.has_peaked = false;
    }
}

impl Poolable for Target {
    fn pool_key(&self) -> (Color, Style) {
        (self.entity.color, self.entity.style)
    }

    fn reset(&mut self) {
        self.entity.reset();
        self.hit = false;
        self.has_peaked = false;
    }
}

/// Debris cube thrown out when a target is destroyed
pub type Fragment = Entity;

impl Poolable for Entity {
    fn pool_key(&self) -> (Color, Style) {
        (self.color, self.style)
    }

    fn reset(&mut self) {
        Entity::reset(self);
    }
}

/// Screen-space impact particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spark {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
}

/// Entry in the rolling pointer trail
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrailPoint {
    Point { pos: Vec2, life: f32 },
    /// Pointer was released; consecutive points across a break aren't joined
    Break { life: f32 },
}

impl TrailPoint {
    pub fn life(&self) -> f32 {
        match self {
            TrailPoint::Point { life, .. } | TrailPoint::Break { life } => *life,
        }
    }

    pub fn life_mut(&mut self) -> &mut f32 {
        match self {
            TrailPoint::Point { life, .. } | TrailPoint::Break { life } => life,
        }
    }

    pub fn pos(&self) -> Option<Vec2> {
        match self {
            TrailPoint::Point { pos, .. } => Some(*pos),
            TrailPoint::Break { .. } => None,
        }
    }
}
