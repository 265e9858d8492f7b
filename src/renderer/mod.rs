//! 2D rendering module
//!
//! Draws the scene back to front onto any [`Surface`]: backboard shadows,
//! then faces, sparks and the swipe trail. Coordinates are scene units with
//! the origin at the view centre; the surface owns the pixel transform.

pub mod colors;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use glam::Vec2;

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{GameState, Style, TrailPoint};
use colors::{GLUE, Rgba, SHADOW, SPARK, TRAIL, face_lightness, palette, shade};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
}

/// Minimal immediate-mode drawing target
pub trait Surface {
    /// Global opacity for subsequent draws
    fn set_alpha(&mut self, alpha: f32);
    /// Closed polygon, filled and/or outlined
    fn polygon(&mut self, points: &[Vec2], fill: Option<Rgba>, stroke: Option<Stroke>);
    /// Unconnected line segments sharing one stroke
    fn lines(&mut self, segments: &[(Vec2, Vec2)], stroke: Stroke);
}

/// Draw one frame of `state`
pub fn draw(surface: &mut impl Surface, state: &GameState, settings: &Settings) {
    let scene = &state.scene;
    let mut points: Vec<Vec2> = Vec::with_capacity(4);

    if settings.draw_shadows() {
        for shadow in &scene.shadow_faces {
            points.clear();
            points.extend(scene.shadow_points(&shadow.face).map(|p| p.truncate()));
            match shadow.style {
                Style::Wireframe => surface.polygon(
                    &points,
                    None,
                    Some(Stroke {
                        color: SHADOW,
                        width: 2.0,
                    }),
                ),
                Style::Solid => surface.polygon(&points, Some(SHADOW), None),
            }
        }
    }

    for face in &scene.faces {
        let back = face.is_back_facing();
        if back && face.style == Style::Solid {
            continue;
        }

        let base = palette(face.color);
        let fill = (face.style == Style::Solid).then(|| shade(base, face_lightness(face.normal_world)));
        let stroke = (face.stroke_width > 0.0).then(|| {
            if back {
                Stroke {
                    color: shade(base, 0.4),
                    width: face.stroke_width * 0.5,
                }
            } else {
                Stroke {
                    color: if face.style == Style::Wireframe { base } else { GLUE },
                    width: face.stroke_width,
                }
            }
        });

        // Fade faces that get close to the camera
        let fading = face.middle.z > CAMERA_FADE_START_Z;
        if fading {
            let alpha = 1.0 - (face.middle.z - CAMERA_FADE_START_Z) / CAMERA_FADE_RANGE;
            if alpha <= 0.0 {
                continue;
            }
            surface.set_alpha(alpha);
        }

        points.clear();
        points.extend(scene.face_points(&face.face).map(|p| p.truncate()));
        surface.polygon(&points, fill, stroke);

        if fading {
            surface.set_alpha(1.0);
        }
    }

    if !state.sparks.is_empty() {
        let segments: Vec<(Vec2, Vec2)> = state
            .sparks
            .iter()
            .map(|s| {
                let tail = (s.life / s.max_life).sqrt() * 1.5;
                (s.pos, s.pos - s.vel * tail)
            })
            .collect();
        surface.lines(
            &segments,
            Stroke {
                color: SPARK,
                width: 2.2,
            },
        );
    }

    if settings.touch_trail {
        let trail = &state.trail;
        for (prev, point) in trail.iter().zip(trail.iter().skip(1)) {
            let (TrailPoint::Point { pos: from, .. }, TrailPoint::Point { pos: to, life }) = (prev, point)
            else {
                continue;
            };
            surface.lines(
                &[(*from, *to)],
                Stroke {
                    color: TRAIL,
                    width: 7.0 * life / TOUCH_POINT_LIFE,
                },
            );
        }
    }
}
