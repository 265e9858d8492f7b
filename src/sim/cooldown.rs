//! Rate limiting for special target variants
//!
//! A cooldown holds `units` charges that refill one per `recharge_time` ms
//! of simulation time. It is tracked as a single "time remaining" counter
//! rather than per-charge timers.

use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Cooldown {
    recharge_time: f32,
    units: u32,
    initial: (f32, u32),
    time_remaining: f32,
    last_time: f32,
}

impl Cooldown {
    pub fn new(recharge_time: f32, units: u32) -> Self {
        Self {
            recharge_time,
            units,
            initial: (recharge_time, units),
            time_remaining: 0.0,
            last_time: 0.0,
        }
    }

    pub fn recharge_time(&self) -> f32 {
        self.recharge_time
    }

    pub fn units(&self) -> u32 {
        self.units
    }

    fn update_time(&mut self, now: f32) {
        if now < self.last_time {
            // Clock went backwards (new session); start fully charged
            self.time_remaining = 0.0;
        } else {
            self.time_remaining = (self.time_remaining - (now - self.last_time)).max(0.0);
        }
        self.last_time = now;
    }

    /// At least one charge is available at simulation time `now`
    pub fn can_use(&mut self, now: f32) -> bool {
        self.update_time(now);
        self.time_remaining <= self.recharge_time * self.units.saturating_sub(1) as f32
    }

    /// Spend a charge if one is available
    pub fn use_if_able(&mut self, now: f32) -> bool {
        let usable = self.can_use(now);
        if usable {
            self.time_remaining += self.recharge_time;
        }
        usable
    }

    /// Change recharge time and/or capacity without losing accumulated cooldown
    pub fn mutate(&mut self, recharge_time: Option<f32>, units: Option<u32>) {
        if let Some(recharge_time) = recharge_time {
            self.time_remaining = (self.time_remaining - (self.recharge_time - recharge_time)).max(0.0);
            self.recharge_time = recharge_time;
        }
        if let Some(units) = units {
            self.units = units;
        }
    }

    /// Fully charged, clock at zero, original configuration
    pub fn reset(&mut self) {
        (self.recharge_time, self.units) = self.initial;
        self.time_remaining = 0.0;
        self.last_time = 0.0;
    }
}

/// Partial reconfiguration of a [`Spawner`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnerMutation {
    pub chance: Option<f32>,
    pub recharge_time: Option<f32>,
    pub units: Option<u32>,
}

/// A random roll gated by a cooldown
#[derive(Debug, Clone, PartialEq)]
pub struct Spawner {
    chance: f32,
    initial_chance: f32,
    pub cooldown: Cooldown,
}

impl Spawner {
    pub fn new(chance: f32, recharge_time: f32, units: u32) -> Self {
        Self {
            chance,
            initial_chance: chance,
            cooldown: Cooldown::new(recharge_time, units),
        }
    }

    pub fn chance(&self) -> f32 {
        self.chance
    }

    /// Roll, then spend a charge only if the roll succeeded
    pub fn should_spawn<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f32) -> bool {
        rng.random::<f32>() <= self.chance && self.cooldown.use_if_able(now)
    }

    pub fn mutate(&mut self, mutation: SpawnerMutation) {
        if let Some(chance) = mutation.chance {
            self.chance = chance;
        }
        self.cooldown.mutate(mutation.recharge_time, mutation.units);
    }

    pub fn reset(&mut self) {
        self.chance = self.initial_chance;
        self.cooldown.reset();
    }
}
