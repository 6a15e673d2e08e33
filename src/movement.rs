//! Pointer motion generator.
//!
//! ```text
//!            enable                 burst exhausted
//!   Idle ───────────────► Shaking ─────────────────► Drifting
//!    ▲                       │                          │
//!    └───────── disable ─────┴──────────────────────────┘
//! ```
//!
//! - **Shaking**: a short burst of random small steps, one every
//!   `shake_step_delay_ms`, never a zero vector.
//! - **Drifting**: a single-pixel nudge every `drift_period_ms`, alternating
//!   between the X and Y axes.
//! - **Idle**: nothing, ever.
//!
//! Enabling anchors the drift cadence one full period in the past, so the
//! first nudge is due as soon as the burst is over.

use rand_core::RngCore;

use crate::clock::{elapsed, Millis};
use crate::config;

/// One relative motion sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Motion {
    pub dx: i8,
    pub dy: i8,
}

impl Motion {
    pub const fn new(dx: i8, dy: i8) -> Self {
        Self { dx, dy }
    }

    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    const fn flip(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    const fn unit(self) -> Motion {
        match self {
            Axis::X => Motion::new(1, 0),
            Axis::Y => Motion::new(0, 1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShakeSession {
    pub start: Millis,
    pub step: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MovementMode {
    Idle,
    Shaking(ShakeSession),
    Drifting,
}

/// Where a produced sample came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleKind {
    Shake,
    Nudge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    pub motion: Motion,
    pub kind: SampleKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovementConfig {
    pub shake_steps: u8,
    pub shake_step_delay_ms: u32,
    /// Each shake axis is drawn from `-shake_range..=shake_range`.
    pub shake_range: i8,
    pub drift_period_ms: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            shake_steps: config::SHAKE_STEPS,
            shake_step_delay_ms: config::SHAKE_STEP_DELAY_MS,
            shake_range: config::SHAKE_RANGE,
            drift_period_ms: config::DRIFT_PERIOD_MS,
        }
    }
}

pub struct MovementGenerator<R> {
    config: MovementConfig,
    mode: MovementMode,
    last_drift: Millis,
    next_axis: Axis,
    rng: R,
}

impl<R: RngCore> MovementGenerator<R> {
    pub fn new(config: MovementConfig, rng: R) -> Self {
        Self {
            config,
            mode: MovementMode::Idle,
            last_drift: 0,
            next_axis: Axis::X,
            rng,
        }
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.mode, MovementMode::Idle)
    }

    /// Axis the next drift nudge will use.
    pub fn next_axis(&self) -> Axis {
        self.next_axis
    }

    /// Start a shake burst and make the first drift nudge due immediately.
    pub fn enable(&mut self, now: Millis) {
        self.last_drift = now.wrapping_sub(self.config.drift_period_ms);
        self.mode = MovementMode::Shaking(ShakeSession {
            start: now,
            step: 0,
        });
        debug!("movement: shake burst started");
    }

    /// Drop any burst in progress and go quiet.
    pub fn disable(&mut self) {
        self.mode = MovementMode::Idle;
    }

    /// Advance the state machine and return the sample due at `now`, if any.
    pub fn next_sample(&mut self, now: Millis) -> Option<Sample> {
        match self.mode {
            MovementMode::Idle => None,
            MovementMode::Shaking(mut session) => {
                let due = u32::from(session.step).saturating_mul(self.config.shake_step_delay_ms);
                if elapsed(now, session.start) < due {
                    return None;
                }

                if session.step < self.config.shake_steps {
                    session.step += 1;
                    self.mode = MovementMode::Shaking(session);
                    return Some(Sample {
                        motion: self.shake_motion(),
                        kind: SampleKind::Shake,
                    });
                }

                debug!("movement: shake burst finished");
                self.mode = MovementMode::Drifting;
                self.drift(now)
            }
            MovementMode::Drifting => self.drift(now),
        }
    }

    fn drift(&mut self, now: Millis) -> Option<Sample> {
        if elapsed(now, self.last_drift) < self.config.drift_period_ms {
            return None;
        }

        let motion = self.next_axis.unit();
        self.next_axis = self.next_axis.flip();
        self.last_drift = now;
        Some(Sample {
            motion,
            kind: SampleKind::Nudge,
        })
    }

    fn shake_motion(&mut self) -> Motion {
        let dx = self.draw();
        let dy = self.draw();
        if dx == 0 && dy == 0 {
            Motion::new(1, 0)
        } else {
            Motion::new(dx, dy)
        }
    }

    fn draw(&mut self) -> i8 {
        let range = i32::from(self.config.shake_range.max(0));
        let span = (2 * range + 1) as u32;
        ((self.rng.next_u32() % span) as i32 - range) as i8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Replays a fixed list of raw draws, then repeats the last one.
    struct Scripted {
        draws: &'static [u32],
        at: usize,
    }

    impl Scripted {
        fn new(draws: &'static [u32]) -> Self {
            Self { draws, at: 0 }
        }
    }

    impl RngCore for Scripted {
        fn next_u32(&mut self) -> u32 {
            let idx = self.at.min(self.draws.len() - 1);
            self.at += 1;
            self.draws[idx]
        }

        fn next_u64(&mut self) -> u64 {
            u64::from(self.next_u32())
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for byte in dest {
                *byte = self.next_u32() as u8;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn generator(seed: u64) -> MovementGenerator<SmallRng> {
        MovementGenerator::new(MovementConfig::default(), SmallRng::seed_from_u64(seed))
    }

    #[test]
    fn idle_never_moves() {
        let mut mover = generator(1);
        for t in (0..2_000_000).step_by(10_000) {
            assert_eq!(mover.next_sample(t), None);
        }
    }

    #[test]
    fn shake_burst_yields_five_nonzero_small_steps() {
        let mut mover = generator(7);
        mover.enable(1_000);

        let mut shakes = 0;
        for i in 0..5u32 {
            let sample = mover.next_sample(1_000 + i * 20).expect("shake step due");
            assert_eq!(sample.kind, SampleKind::Shake);
            assert!(!sample.motion.is_zero());
            assert!((-3..=3).contains(&sample.motion.dx));
            assert!((-3..=3).contains(&sample.motion.dy));
            shakes += 1;
        }
        assert_eq!(shakes, 5);
    }

    #[test]
    fn shake_steps_wait_for_their_slot() {
        let mut mover = generator(3);
        mover.enable(0);
        assert!(mover.next_sample(0).is_some());
        assert_eq!(mover.next_sample(10), None);
        assert_eq!(mover.next_sample(19), None);
        assert!(mover.next_sample(20).is_some());
        assert_eq!(mover.next_sample(30), None);
    }

    #[test]
    fn zero_draw_is_coerced_to_unit_x() {
        // 3 % 7 - 3 == 0 on both axes.
        let mut mover = MovementGenerator::new(MovementConfig::default(), Scripted::new(&[3]));
        mover.enable(0);
        let sample = mover.next_sample(0).unwrap();
        assert_eq!(sample.motion, Motion::new(1, 0));
    }

    #[test]
    fn draw_covers_both_ends_of_range() {
        let mut mover = MovementGenerator::new(MovementConfig::default(), Scripted::new(&[0, 6]));
        mover.enable(0);
        assert_eq!(mover.next_sample(0).unwrap().motion, Motion::new(-3, 3));
    }

    #[test]
    fn first_nudge_follows_burst_then_waits_full_period() {
        let mut mover = generator(11);
        mover.enable(0);
        for i in 0..5u32 {
            assert_eq!(mover.next_sample(i * 20).unwrap().kind, SampleKind::Shake);
        }
        // Still shaking until the sixth slot comes round.
        assert_eq!(mover.next_sample(90), None);
        assert!(matches!(mover.mode(), MovementMode::Shaking(_)));

        let nudge = mover.next_sample(100).unwrap();
        assert_eq!(nudge.kind, SampleKind::Nudge);
        assert_eq!(nudge.motion, Motion::new(1, 0));
        assert_eq!(mover.mode(), MovementMode::Drifting);

        assert_eq!(mover.next_sample(110), None);
        assert_eq!(mover.next_sample(100 + 599_999), None);
        let next = mover.next_sample(100 + 600_000).unwrap();
        assert_eq!(next.motion, Motion::new(0, 1));
    }

    #[test]
    fn nudges_alternate_axes() {
        let mut mover = generator(5);
        mover.enable(0);
        let mut t = 0;
        let first = loop {
            if let Some(sample) = mover.next_sample(t) {
                if sample.kind == SampleKind::Nudge {
                    break sample.motion;
                }
            }
            t += 10;
        };

        let mut previous = first;
        for k in 1..6u32 {
            let nudge = mover.next_sample(t + k * 600_000).unwrap().motion;
            assert_eq!(nudge.dx + nudge.dy, 1);
            assert_ne!(previous, nudge);
            previous = nudge;
        }
    }

    #[test]
    fn disable_discards_burst() {
        let mut mover = generator(9);
        mover.enable(0);
        assert!(mover.next_sample(0).is_some());
        mover.disable();
        assert_eq!(mover.mode(), MovementMode::Idle);
        assert!(!mover.is_enabled());
        for t in (20..1_300_000).step_by(20) {
            assert_eq!(mover.next_sample(t), None);
        }
    }

    #[test]
    fn reenable_restarts_burst_and_keeps_axis() {
        let mut mover = generator(13);
        mover.enable(0);
        let mut t = 0;
        while mover.next_sample(t).map(|s| s.kind) != Some(SampleKind::Nudge) {
            t += 10;
        }
        assert_eq!(mover.next_axis(), Axis::Y);

        mover.disable();
        mover.enable(t + 1_000);
        assert!(matches!(
            mover.mode(),
            MovementMode::Shaking(ShakeSession { step: 0, .. })
        ));
        assert_eq!(mover.next_axis(), Axis::Y);
    }

    #[test]
    fn drift_cadence_across_counter_wrap() {
        let config = MovementConfig {
            shake_steps: 0,
            ..MovementConfig::default()
        };
        let mut mover = MovementGenerator::new(config, SmallRng::seed_from_u64(0));
        let start = u32::MAX - 100;
        mover.enable(start);
        // No burst: falls straight through to the due nudge.
        assert_eq!(mover.next_sample(start).unwrap().kind, SampleKind::Nudge);
        let next = start.wrapping_add(600_000);
        assert_eq!(mover.next_sample(next.wrapping_sub(1)), None);
        assert!(mover.next_sample(next).is_some());
    }
}
