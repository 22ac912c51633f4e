//! Per-tick control intents and the sources that produce them

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Controls sampled for one simulation tick. Everything but `fire_released`
/// is level-triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub turret_left: bool,
    pub turret_right: bool,
    /// The fire control went from held to released since the last tick.
    pub fire_released: bool,
}

/// Converts a held/not-held fire control into a release edge.
#[derive(Debug, Default)]
pub struct FireTrigger {
    was_down: bool,
}

impl FireTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only on the tick the control is let go.
    pub fn update(&mut self, down: bool) -> bool {
        let released = self.was_down && !down;
        self.was_down = down;
        released
    }
}

/// Anything able to drive the local tank: a keyboard mapping, a replay, a bot.
pub trait InputSource {
    fn sample(&mut self) -> InputState;
}

const FIRE_HOLD_TICKS: u32 = 5;

/// Seeded random driver used by the headless client. Keeps one driving
/// intent for a random stretch of ticks, then picks another.
pub struct PatrolInput {
    rng: StdRng,
    intent: InputState,
    intent_ticks_left: u32,
    fire_held_for: u32,
    trigger: FireTrigger,
}

impl PatrolInput {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            intent: InputState::default(),
            intent_ticks_left: 0,
            fire_held_for: 0,
            trigger: FireTrigger::new(),
        }
    }

    fn next_intent(&mut self) -> InputState {
        let forward = self.rng.gen_bool(0.7);
        let turning = self.rng.gen_range(0..3);
        let turret = self.rng.gen_range(0..3);

        InputState {
            forward,
            backward: !forward && self.rng.gen_bool(0.5),
            left: turning == 1,
            right: turning == 2,
            turret_left: turret == 1,
            turret_right: turret == 2,
            fire_released: false,
        }
    }
}

impl InputSource for PatrolInput {
    fn sample(&mut self) -> InputState {
        if self.intent_ticks_left == 0 {
            self.intent = self.next_intent();
            self.intent_ticks_left = self.rng.gen_range(20..80);
        }
        self.intent_ticks_left -= 1;

        let fire_down = if self.fire_held_for > 0 {
            self.fire_held_for += 1;
            self.fire_held_for <= FIRE_HOLD_TICKS
        } else {
            self.rng.gen_bool(0.02)
        };
        if fire_down && self.fire_held_for == 0 {
            self.fire_held_for = 1;
        }
        if !fire_down {
            self.fire_held_for = 0;
        }

        InputState {
            fire_released: self.trigger.update(fire_down),
            ..self.intent
        }
    }
}
