//! Discrete Event Scheduler.
//!
//! This module owns simulated time. It provides:
//! 1. **Clock:** The cycle counter advanced once per machine cycle.
//! 2. **Event Slots:** Next-event times for the timer, disk, serial input and serial
//!    output, each a cycle count or `NEVER`.
//! 3. **Jitter:** The Park-Miller minimal standard generator, so a run is a pure
//!    function of the seed and the sequence of draws.

use tracing::debug;

use crate::common::constants::NEVER;

/// Park-Miller modulus (2^31 - 1).
const RNG_MODULUS: i64 = 2_147_483_647;
/// Park-Miller multiplier.
const RNG_MULTIPLIER: i64 = 16_807;

/// Park-Miller minimal standard pseudo-random generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Random {
    state: i64,
}

impl Random {
    /// Creates a generator; a seed of 0 (a fixed point) is replaced by 1.
    pub fn new(seed: u32) -> Self {
        let state = i64::from(seed) % RNG_MODULUS;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Advances the generator and returns the next value in `1..2^31-1`.
    pub fn next_value(&mut self) -> u32 {
        self.state = (self.state * RNG_MULTIPLIER) % RNG_MODULUS;
        self.state as u32
    }

    /// Returns a value in `low..=high`; `low` itself when the range is empty.
    pub fn between(&mut self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        let draw = u64::from(self.next_value());
        match (high - low).checked_add(1) {
            Some(span) => low + draw % span,
            None => low.saturating_add(draw),
        }
    }
}

/// The simulated clock and the four event slots.
#[derive(Clone, Debug)]
pub struct Scheduler {
    /// Current cycle.
    pub now: u64,
    /// Next timer expiry.
    pub timer: u64,
    /// Next disk completion.
    pub disk: u64,
    /// Next host keyboard poll.
    pub serial_in: u64,
    /// Next serial transmission completion.
    pub serial_out: u64,
    /// Jitter generator.
    pub rng: Random,
}

impl Scheduler {
    /// Creates an idle scheduler at cycle 0.
    pub fn new(seed: u32) -> Self {
        Self {
            now: 0,
            timer: NEVER,
            disk: NEVER,
            serial_in: NEVER,
            serial_out: NEVER,
            rng: Random::new(seed),
        }
    }

    /// Returns every slot to `NEVER`, rewinds the clock and reseeds the generator.
    pub fn reset(&mut self, seed: u32) {
        *self = Self::new(seed);
    }

    /// The earliest scheduled event, or `NEVER`.
    #[inline]
    pub fn next_event(&self) -> u64 {
        self.timer
            .min(self.disk)
            .min(self.serial_in)
            .min(self.serial_out)
    }

    /// Whether any event is due at the current cycle.
    #[inline]
    pub fn is_due(&self) -> bool {
        self.now >= self.next_event()
    }

    /// A delay of `base` plus up to `jitter` cycles.
    pub fn delay(&mut self, base: u64, jitter: u64) -> u64 {
        base.saturating_add(self.rng.between(0, jitter))
    }

    /// The absolute time `base + jitter` cycles from now.
    pub fn after(&mut self, base: u64, jitter: u64) -> u64 {
        let delay = self.delay(base, jitter);
        self.now.saturating_add(delay)
    }

    /// Moves the clock to just before the next event so the following cycle fires it.
    ///
    /// # Returns
    ///
    /// The number of cycles skipped, or `None` when nothing is scheduled.
    pub fn fast_forward(&mut self) -> Option<u64> {
        let next = self.next_event();
        if next == NEVER {
            return None;
        }
        let target = next.saturating_sub(1);
        if target <= self.now {
            return Some(0);
        }
        let skipped = target - self.now;
        debug!(from = self.now, to = target, "scheduler fast-forward");
        self.now = target;
        Some(skipped)
    }
}
