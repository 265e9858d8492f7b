//! Per-frame simulation step
//!
//! Advances time dilation, the swipe trail, spawning, target/fragment/spark
//! motion and hit resolution, then rebuilds the draw lists. Velocities are
//! per reference frame and scaled by `FrameStep::sim_speed`.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::entity::{Spark, Style, Target, TrailPoint};
use super::spawn::spawn_delay;
use super::state::{GameEvent, GameState};
use super::transform::{euler_matrix, project, transform_point};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::random_between;

/// Pointer state sampled at the top of a frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// View size in scene units
    pub width: f32,
    pub height: f32,
    pub pointer_down: bool,
    /// Pointer position in scene units, origin at the view centre
    pub pointer: Vec2,
    /// Pointer was released since the last tick
    pub touch_break: bool,
}

/// Time scales for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStep {
    /// Frame length in reference frames
    pub lag: f32,
    /// Dilated frame length in ms
    pub sim_time: f32,
    /// Dilated frame length in reference frames
    pub sim_speed: f32,
}

impl FrameStep {
    pub fn new(frame_ms: f32, game_speed: f32) -> Self {
        let lag = frame_ms / REFERENCE_FRAME_MS;
        Self {
            lag,
            sim_time: game_speed * frame_ms,
            sim_speed: game_speed * lag,
        }
    }
}

/// Pointer movement since the last trail point
#[derive(Debug, Clone, Copy, Default)]
struct Swipe {
    delta: Vec2,
    speed: f32,
    /// Delta compensated for time dilation
    delta_scaled: Vec2,
    speed_scaled: f32,
    force: f32,
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    left: f32,
    right: f32,
    ceiling: f32,
    /// Targets below this are gone
    floor: f32,
}

/// Advance the game by one display frame of `frame_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, frame_ms: f32) {
    let step = FrameStep::new(frame_ms, state.game_speed);
    state.session.time += step.sim_time;
    update_game_speed(state, input.pointer_down, &step);

    let center = Vec2::new(input.width, input.height) * 0.5;
    let bounds = Bounds {
        left: -center.x + TARGET_RADIUS,
        right: center.x - TARGET_RADIUS,
        ceiling: -center.y - CEILING_MARGIN,
        floor: center.y + TARGET_HIT_RADIUS * 2.0,
    };

    let swipe = update_trail(state, input, &step);
    spawn_targets(state, center, &step, &bounds);
    update_targets(state, input.pointer, &swipe, &step, &bounds);
    update_fragments(state, input.width, center, &step, &bounds);
    update_sparks(state, &step);

    let GameState {
        scene,
        targets,
        fragments,
        ..
    } = state;
    scene.rebuild(targets.iter().map(|t| &t.entity).chain(fragments.iter()));
}

fn update_game_speed(state: &mut GameState, pointer_down: bool, step: &FrameStep) {
    let target_speed = if state.slowmo_remaining > 0.0 {
        state.slowmo_remaining = (state.slowmo_remaining - step.sim_time).max(0.0);
        if pointer_down {
            SLOWMO_SPEED_POINTER_DOWN
        } else {
            SLOWMO_SPEED
        }
    } else if state.is_menu_visible() && pointer_down {
        MENU_PEEK_SPEED
    } else {
        1.0
    };
    state.game_speed += (target_speed - state.game_speed) / SPEED_EASE * step.lag;
    state.game_speed = state.game_speed.clamp(0.0, 1.0);
}

/// Age the trail, append the pointer, and measure the swipe
fn update_trail(state: &mut GameState, input: &TickInput, step: &FrameStep) -> Swipe {
    if input.touch_break {
        state.trail.push_back(TrailPoint::Break {
            life: TOUCH_POINT_LIFE,
        });
    }

    let force = 1.0 / (step.sim_speed * 0.75 + 0.25);
    let mut swipe = Swipe {
        force,
        ..Default::default()
    };
    if input.pointer_down {
        if let Some(last) = state.trail.back().and_then(TrailPoint::pos) {
            swipe.delta = input.pointer - last;
            swipe.delta_scaled = swipe.delta * force;
        }
    }
    swipe.speed = swipe.delta.length();
    swipe.speed_scaled = swipe.speed * force;

    for p in state.trail.iter_mut() {
        *p.life_mut() -= step.sim_time;
    }
    if input.pointer_down {
        state.trail.push_back(TrailPoint::Point {
            pos: input.pointer,
            life: TOUCH_POINT_LIFE,
        });
    }
    while state.trail.front().is_some_and(|p| p.life() <= 0.0) {
        state.trail.pop_front();
    }
    swipe
}

fn spawn_targets(state: &mut GameState, center: Vec2, step: &FrameStep, bounds: &Bounds) {
    state.spawn_timer -= step.sim_time;
    if state.spawn_timer > 0.0 {
        return;
    }
    if state.spawn_extra > 0 {
        state.spawn_extra -= 1;
        state.spawn_timer = SPAWN_EXTRA_DELAY;
    } else {
        state.spawn_timer = spawn_delay(state.session.cube_count);
    }

    let mut target = state.acquire_target();
    let radius = (center.x * 0.8).min(MAX_SPAWN_X);
    let x = random_between(&mut state.rng, -radius, radius);
    let z = random_between(&mut state.rng, -TARGET_RADIUS, TARGET_RADIUS);
    // Drift back toward the centre
    let drift = state.rng.random::<f32>() * (x * -2.0 / 120.0);
    target.launch(
        Vec3::new(x, bounds.floor, z),
        Vec3::new(drift, TARGET_LAUNCH_SPEED, 0.0),
    );
    state.targets.push(target);
}

fn integrate_target(target: &mut Target, bounds: &Bounds, sim_speed: f32) {
    let m = &mut target.entity.motion;
    m.integrate(sim_speed);
    if m.position.y < bounds.ceiling {
        m.position.y = bounds.ceiling;
        m.velocity.y = 0.0;
    }
    if m.position.x < bounds.left {
        m.position.x = bounds.left;
        m.velocity.x *= -BOUND_DAMPING;
    } else if m.position.x > bounds.right {
        m.position.x = bounds.right;
        m.velocity.x *= -BOUND_DAMPING;
    }
    if m.position.z < BACKBOARD_Z {
        m.position.z = BACKBOARD_Z;
        m.velocity.z *= -BOUND_DAMPING;
    }

    target.min_y = target.min_y.min(m.position.y);
    m.velocity.y += GRAVITY * sim_speed;
    if !target.has_peaked
        && m.velocity.y > 0.0
        && target.spawn_y - target.min_y >= TARGET_APEX_THRESHOLD
    {
        target.has_peaked = true;
    }

    target.entity.transform();
    target.entity.project();
}

/// First point along this frame's pointer path within reach of `anchor`
///
/// Faster swipes are sampled more densely so they can't skip past a target.
fn find_contact(pointer: Vec2, swipe: &Swipe, anchor: Vec2) -> Option<Vec2> {
    let samples = (swipe.speed / TARGET_RADIUS * 2.0).ceil() as u32;
    (1..=samples)
        .map(|i| pointer - swipe.delta * (1.0 - i as f32 / samples as f32))
        .find(|p| p.distance(anchor) <= TARGET_HIT_RADIUS)
}

fn update_targets(state: &mut GameState, pointer: Vec2, swipe: &Swipe, step: &FrameStep, bounds: &Bounds) {
    for i in (0..state.targets.len()).rev() {
        let target = &mut state.targets[i];
        integrate_target(target, bounds, step.sim_speed);

        if target.motion().position.y > bounds.floor {
            let peaked = target.has_peaked;
            let target = state.targets.remove(i);
            state.target_pool.put(target);
            if state.is_in_game() && peaked {
                state.end_game();
            }
            continue;
        }

        match find_contact(pointer, swipe, target.entity.projected) {
            Some(contact) => {
                if !target.hit {
                    resolve_hit(state, i, contact, swipe);
                }
            }
            None => target.hit = false,
        }
    }
}

fn resolve_hit(state: &mut GameState, index: usize, contact: Vec2, swipe: &Swipe) {
    let target = &mut state.targets[index];
    target.hit = true;
    let m = target.motion_mut();
    m.velocity.x += swipe.delta_scaled.x * HIT_DAMPENING;
    m.velocity.y += swipe.delta_scaled.y * HIT_DAMPENING;
    m.spin.x += swipe.delta_scaled.y * 0.001;
    m.spin.y += swipe.delta_scaled.x * 0.001;
    let spark_speed = 7.0 + swipe.speed_scaled * 0.125;

    if swipe.speed_scaled <= MIN_POINTER_SPEED {
        state.increment_score(SCORE_GRAZE);
        state.events.push(GameEvent::Sound(SoundEffect::Graze));
        spark_burst(state, contact, 3, spark_speed);
        return;
    }

    target.health = target.health.saturating_sub(1);
    let destroyed = target.health == 0;
    state.increment_score(SCORE_HIT);
    state.events.push(GameEvent::Sound(SoundEffect::Slice));

    if !destroyed {
        spark_burst(state, contact, 8, spark_speed);
        glue_shed_sparks(state, index);
        state.targets[index].update_glue();
        return;
    }

    let target = state.targets.remove(index);
    state.increment_cube_count(1);
    create_burst(state, &target, swipe.force);
    spark_burst(state, contact, 8, spark_speed);
    state.events.push(GameEvent::Sound(SoundEffect::Smash));
    if target.entity.style == Style::Wireframe {
        state.slowmo_remaining = SLOWMO_DURATION;
        state.spawn_timer = 0.0;
        state.spawn_extra = SPAWN_EXTRA_COUNT;
        state.events.push(GameEvent::Sound(SoundEffect::SlowMotion));
        log::debug!("Slow motion triggered at {:.0} ms", state.session.time);
    }
    state.target_pool.put(target);
}

/// Break a target into a fragment per Menger cell, thrown outward
fn create_burst(state: &mut GameState, target: &Target, force: f32) {
    let now = *target.motion();
    let prev = now.previous();
    let rot_now = euler_matrix(now.rotation);
    let rot_prev = euler_matrix(prev.rotation);
    let speed = 2.0 * force;

    for k in 0..state.meshes.burst_offsets.len() {
        let offset = state.meshes.burst_offsets[k];
        let position = transform_point(offset, now.position, &rot_now, Vec3::ONE);
        let prev_position = transform_point(offset, prev.position, &rot_prev, Vec3::ONE);
        let normal = rot_now * state.meshes.burst_normals[k];
        let jitter = Vec3::new(
            state.rng.random::<f32>(),
            state.rng.random::<f32>(),
            state.rng.random::<f32>(),
        );

        let mut frag = state.acquire_fragment(target.entity.color, target.entity.style);
        frag.motion.position = position;
        frag.motion.rotation = now.rotation;
        frag.motion.velocity = (position - prev_position) + normal * speed + jitter * speed;
        frag.motion.spin = frag.motion.velocity * 0.015;
        state.fragments.push(frag);
    }
}

fn make_spark(state: &mut GameState, pos: Vec2, vel: Vec2) -> Spark {
    let life = random_between(&mut state.rng, 200.0, 300.0);
    Spark {
        pos: pos + vel * 0.5,
        vel,
        life,
        max_life: life,
    }
}

/// `count` sparks spread evenly around a circle, with jittered angle and speed
fn spark_burst(state: &mut GameState, pos: Vec2, count: u32, max_speed: f32) {
    let angle_inc = std::f32::consts::TAU / count as f32;
    for i in 0..count {
        let angle = i as f32 * angle_inc + angle_inc * state.rng.random::<f32>();
        let speed = (1.0 - state.rng.random::<f32>().powi(3)) * max_speed;
        let spark = make_spark(state, pos, Vec2::new(angle.sin(), angle.cos()) * speed);
        state.push_spark(spark);
    }
}

/// Sparks from a random subset of a damaged target's vertices
fn glue_shed_sparks(state: &mut GameState, index: usize) {
    let count = state.targets[index].entity.vertices.len();
    for v in 0..count {
        if state.rng.random::<f32>() >= 0.4 {
            continue;
        }
        let at = project(state.targets[index].entity.vertices[v]);
        let vel = Vec2::new(
            random_between(&mut state.rng, -12.0, 12.0),
            random_between(&mut state.rng, -12.0, 12.0),
        );
        let spark = make_spark(state, at, vel);
        state.push_spark(spark);
    }
}

fn update_fragments(state: &mut GameState, width: f32, center: Vec2, step: &FrameStep, bounds: &Bounds) {
    let drag = 1.0 - AIR_DRAG * step.sim_speed;
    let backboard = BACKBOARD_Z + FRAG_RADIUS;

    for i in (0..state.fragments.len()).rev() {
        let frag = &mut state.fragments[i];
        let m = &mut frag.motion;
        m.integrate(step.sim_speed);
        m.velocity *= drag;
        if m.position.y < bounds.ceiling {
            m.position.y = bounds.ceiling;
            m.velocity.y = 0.0;
        }
        if m.position.z < backboard {
            m.position.z = backboard;
            m.velocity.z *= -BOUND_DAMPING;
        }
        m.velocity.y += GRAVITY * step.sim_speed;
        frag.transform();
        frag.project();

        let gone = frag.projected.y > center.y + TARGET_HIT_RADIUS
            || frag.projected.x.abs() > width
            || frag.motion.position.z > CAMERA_FADE_END_Z;
        if gone {
            let frag = state.fragments.remove(i);
            state.fragment_pool.put(frag);
        }
    }
}

fn update_sparks(state: &mut GameState, step: &FrameStep) {
    let drag = 1.0 - AIR_DRAG_SPARK * step.sim_speed;
    state.sparks.retain_mut(|spark| {
        spark.life -= step.sim_time;
        if spark.life <= 0.0 {
            return false;
        }
        spark.pos += spark.vel * step.sim_speed;
        spark.vel *= drag;
        spark.vel.y += GRAVITY * step.sim_speed;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Color;
    use crate::sim::state::{GameMode, MenuState};

    const FRAME: f32 = REFERENCE_FRAME_MS;

    fn view(pointer_down: bool, pointer: Vec2) -> TickInput {
        TickInput {
            width: 1600.0,
            height: 1000.0,
            pointer_down,
            pointer,
            touch_break: false,
        }
    }

    fn playing_state() -> GameState {
        let mut state = GameState::new(42);
        state.start_game(GameMode::Ranked);
        // Keep spawns out of the way
        state.spawn_timer = 1.0e9;
        state
    }

    fn place_target(state: &mut GameState, color: Color, style: Style, health: u32) {
        let mut t = Target::new(state.meshes.target.clone(), color, style);
        t.health = health;
        t.max_health = health;
        t.update_glue();
        t.launch(Vec3::ZERO, Vec3::ZERO);
        state.targets.push(t);
    }

    fn recenter(state: &mut GameState) {
        if let Some(t) = state.targets.first_mut() {
            t.entity.motion.position = Vec3::ZERO;
            t.entity.motion.velocity = Vec3::ZERO;
        }
    }

    /// Release, press left of centre, then drag across to `to_x`
    fn swipe(state: &mut GameState, from_x: f32, to_x: f32) {
        let mut release = view(false, Vec2::ZERO);
        release.touch_break = true;
        tick(state, &release, FRAME);
        tick(state, &view(true, Vec2::new(from_x, 0.0)), FRAME);
        recenter(state);
        tick(state, &view(true, Vec2::new(to_x, 0.0)), FRAME);
    }

    #[test]
    fn test_frame_step() {
        let step = FrameStep::new(REFERENCE_FRAME_MS, 1.0);
        assert!((step.lag - 1.0).abs() < 1e-6);
        assert!((step.sim_speed - 1.0).abs() < 1e-6);
        let step = FrameStep::new(34.0, 0.5);
        assert_eq!(step.sim_time, 17.0);
    }

    #[test]
    fn test_strong_target_takes_three_hits() {
        let mut state = playing_state();
        place_target(&mut state, Color::Pink, Style::Solid, 3);

        swipe(&mut state, -100.0, 100.0);
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.targets[0].health, 2);
        assert_eq!(state.targets[0].entity.stroke_width, 1.0);
        assert_eq!(state.session.score, 10);

        swipe(&mut state, -100.0, 100.0);
        assert_eq!(state.targets[0].health, 1);
        assert_eq!(state.session.score, 20);
        assert_eq!(state.session.cube_count, 0);

        swipe(&mut state, -100.0, 100.0);
        assert!(state.targets.is_empty());
        assert_eq!(state.session.score, 30);
        assert_eq!(state.session.cube_count, 1);
        assert_eq!(state.fragments.len(), 20);
        assert!(!state.sparks.is_empty());
        assert_eq!(state.target_pool.len(), 1);
        assert!(state.take_events().contains(&GameEvent::Sound(SoundEffect::Smash)));
        assert!(!state.scene.faces.is_empty());
    }

    #[test]
    fn test_grazes_never_damage() {
        let mut state = playing_state();
        place_target(&mut state, Color::Pink, Style::Solid, 3);

        for _ in 0..4 {
            swipe(&mut state, -20.0, 20.0);
        }
        assert_eq!(state.targets[0].health, 3);
        assert_eq!(state.session.score, 20);

        for hit in 1..=3 {
            swipe(&mut state, -100.0, 100.0);
            // A graze between solid hits changes nothing
            if hit < 3 {
                swipe(&mut state, -20.0, 20.0);
                assert_eq!(state.targets[0].health, 3 - hit);
            }
        }
        assert!(state.targets.is_empty());
        assert_eq!(state.session.cube_count, 1);
    }

    #[test]
    fn test_hit_counts_once_per_pass() {
        let mut state = playing_state();
        place_target(&mut state, Color::Pink, Style::Solid, 3);
        swipe(&mut state, -100.0, 100.0);
        assert_eq!(state.targets[0].health, 2);
        // Keep dragging through the target without leaving it
        recenter(&mut state);
        tick(&mut state, &view(true, Vec2::new(-40.0, 0.0)), FRAME);
        assert_eq!(state.targets[0].health, 2);
    }

    #[test]
    fn test_slow_motion_target() {
        let mut state = playing_state();
        place_target(&mut state, Color::Blue, Style::Wireframe, 1);
        swipe(&mut state, -100.0, 100.0);

        assert!(state.targets.is_empty());
        assert_eq!(state.slowmo_remaining, SLOWMO_DURATION);
        assert_eq!(state.spawn_extra, 2);
        assert_eq!(state.spawn_timer, 0.0);

        tick(&mut state, &view(false, Vec2::ZERO), FRAME);
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.spawn_extra, 1);
        assert!(state.game_speed < 1.0);
        assert!(state.slowmo_remaining < SLOWMO_DURATION);
    }

    fn ease_speed(state: &mut GameState, input: &TickInput) -> f32 {
        for _ in 0..400 {
            tick(state, input, FRAME);
        }
        state.game_speed
    }

    #[test]
    fn test_time_dilation_targets() {
        let mut state = playing_state();
        state.slowmo_remaining = 1.0e9;
        let pressed = view(true, Vec2::ZERO);
        let released = view(false, Vec2::ZERO);

        assert!((ease_speed(&mut state, &pressed) - SLOWMO_SPEED_POINTER_DOWN).abs() < 1e-3);
        assert!((ease_speed(&mut state, &released) - SLOWMO_SPEED).abs() < 1e-3);

        // Holding the pointer behind a menu peeks at a crawl
        state.slowmo_remaining = 0.0;
        state.pause();
        assert!((ease_speed(&mut state, &pressed) - MENU_PEEK_SPEED).abs() < 1e-3);
        assert!((ease_speed(&mut state, &released) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_debris_retires() {
        let mut state = playing_state();
        place_target(&mut state, Color::Green, Style::Solid, 1);
        swipe(&mut state, -100.0, 100.0);
        assert_eq!(state.fragments.len(), 20);
        assert!(!state.sparks.is_empty());

        for _ in 0..600 {
            tick(&mut state, &view(false, Vec2::ZERO), FRAME);
            if state.fragments.is_empty() && state.sparks.is_empty() {
                break;
            }
        }
        assert!(state.fragments.is_empty());
        assert!(state.sparks.is_empty());
        assert_eq!(state.fragment_pool.len(), 20);
        assert!(!state.game_over);
    }

    #[test]
    fn test_peaked_target_ends_game() {
        let mut state = playing_state();
        place_target(&mut state, Color::Green, Style::Solid, 1);
        state.targets[0].launch(Vec3::new(0.0, 500.0, 0.0), Vec3::new(0.0, TARGET_LAUNCH_SPEED, 0.0));

        for _ in 0..400 {
            tick(&mut state, &view(false, Vec2::ZERO), FRAME);
            if state.game_over {
                break;
            }
        }
        assert!(state.game_over);
        assert_eq!(state.menu, MenuState::Score);
        assert!(state.targets.is_empty());
    }

    #[test]
    fn test_unpeaked_target_is_recycled() {
        let mut state = playing_state();
        place_target(&mut state, Color::Green, Style::Solid, 1);
        state.targets[0].launch(Vec3::new(0.0, 595.0, 0.0), Vec3::new(0.0, 5.0, 0.0));

        for _ in 0..10 {
            tick(&mut state, &view(false, Vec2::ZERO), FRAME);
        }
        assert!(state.targets.is_empty());
        assert!(!state.game_over);
        assert_eq!(state.menu, MenuState::None);
        assert_eq!(state.target_pool.len(), 1);
    }

    #[test]
    fn test_double_strong_follows_score() {
        let mut state = playing_state();
        state.session.score = 2001;
        let t = state.acquire_target();
        state.target_pool.put(t);
        assert_eq!(state.selector.strong.cooldown.units(), 2);

        state.session.score = 0;
        let t = state.acquire_target();
        state.target_pool.put(t);
        assert_eq!(state.selector.strong.cooldown.units(), 1);
    }

    #[test]
    fn test_spawns_on_schedule() {
        let mut state = GameState::new(7);
        state.start_game(GameMode::Casual);
        assert_eq!(state.spawn_timer, 1400.0);
        // 1400 ms at 16.67 ms per frame
        for _ in 0..83 {
            tick(&mut state, &view(false, Vec2::ZERO), FRAME);
        }
        assert!(state.targets.is_empty());
        tick(&mut state, &view(false, Vec2::ZERO), FRAME);
        assert_eq!(state.targets.len(), 1);
        let t = &state.targets[0];
        assert!(t.motion().velocity.y < 0.0);
        assert!(t.motion().position.x.abs() <= MAX_SPAWN_X);
    }

    #[test]
    fn test_trail_ages_out() {
        let mut state = playing_state();
        tick(&mut state, &view(true, Vec2::new(1.0, 1.0)), FRAME);
        tick(&mut state, &view(true, Vec2::new(2.0, 1.0)), FRAME);
        assert_eq!(state.trail.len(), 2);
        let mut release = view(false, Vec2::ZERO);
        release.touch_break = true;
        tick(&mut state, &release, FRAME);
        assert!(matches!(state.trail.back(), Some(TrailPoint::Break { .. })));
        for _ in 0..10 {
            tick(&mut state, &view(false, Vec2::ZERO), FRAME);
        }
        assert!(state.trail.is_empty());
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut state = GameState::new(2024);
            state.start_game(GameMode::Ranked);
            for i in 0..600 {
                let x = ((i % 20) as f32 - 10.0) * 40.0;
                tick(&mut state, &view(i % 3 != 0, Vec2::new(x, 0.0)), FRAME);
            }
            (
                state.session.score,
                state.session.cube_count,
                state.targets.iter().map(|t| t.motion().position).collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(), run());
    }
}
