//! Palette and face shading

use crate::sim::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS color string, e.g. `rgba(170,221,255,0.9)`
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("rgb({},{},{})", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

pub const BLUE: Rgba = Rgba::rgb(0x67, 0xd7, 0xf0);
pub const GREEN: Rgba = Rgba::rgb(0xa6, 0xe0, 0x2c);
pub const PINK: Rgba = Rgba::rgb(0xfa, 0x24, 0x73);
pub const ORANGE: Rgba = Rgba::rgb(0xfe, 0x95, 0x22);

/// Stroke binding a damaged solid target together
pub const GLUE: Rgba = Rgba::rgb(170, 221, 255);
pub const SHADOW: Rgba = Rgba::rgb(0x26, 0x2e, 0x36);
pub const SPARK: Rgba = Rgba::rgba(170, 221, 255, 0.9);
pub const TRAIL: Rgba = Rgba::rgba(170, 221, 255, 0.62);

pub fn palette(color: Color) -> Rgba {
    match color {
        Color::Blue => BLUE,
        Color::Green => GREEN,
        Color::Pink => PINK,
        Color::Orange => ORANGE,
    }
}

/// Darken toward black below 0.5 and lighten toward white above
pub fn shade(color: Rgba, lightness: f32) -> Rgba {
    let (other, mix) = if lightness < 0.5 {
        (0.0, 1.0 - lightness * 2.0)
    } else {
        (255.0, lightness * 2.0 - 1.0)
    };
    let channel = |c: u8| crate::lerp(c as f32, other, mix.clamp(0.0, 1.0)) as u8;
    Rgba {
        r: channel(color.r),
        g: channel(color.g),
        b: channel(color.b),
        a: color.a,
    }
}

/// Light from above and in front; faces pointing down stay dark
pub fn face_lightness(normal_world: glam::Vec3) -> f32 {
    let l = normal_world.y * 0.5 + normal_world.z * -0.5;
    if l > 0.0 {
        0.1
    } else {
        (l.powi(32) - l) / 2.0 * 0.9 + 0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_shade_extremes() {
        assert_eq!(shade(PINK, 0.5), PINK);
        assert_eq!(shade(PINK, 0.0), Rgba::rgb(0, 0, 0));
        assert_eq!(shade(PINK, 1.0), Rgba::rgb(255, 255, 255));
        let dark = shade(BLUE, 0.4);
        assert!(dark.r < BLUE.r && dark.g < BLUE.g);
    }

    #[test]
    fn test_lightness() {
        // Facing the camera
        assert!((face_lightness(Vec3::Z) - 0.325).abs() < 1e-4);
        // Facing the floor
        assert_eq!(face_lightness(Vec3::Y), 0.1);
    }

    #[test]
    fn test_css() {
        assert_eq!(GLUE.to_css(), "rgb(170,221,255)");
        assert_eq!(SPARK.to_css(), "rgba(170,221,255,0.9)");
        assert_eq!(palette(Color::Orange), ORANGE);
    }
}
