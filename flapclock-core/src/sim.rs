//! Simulated motor rig for host-side testing
//!
//! [`SimRig`] stands in for one wheel: it watches the four coil lines,
//! decodes the half-step pattern and moves a physical step position by one
//! for every adjacent phase change. The rotor only follows a settled
//! pattern: one where every line has been driven since the last settle.
//! Intermediate levels while the lines are written one at a time never
//! move it. The endstop reads triggered while the
//! position is inside a small window at the start of each revolution.
//!
//! Everything uses interior mutability so the pins handed to an
//! [`AxisController`](crate::AxisController) and the test body can share one rig.

use core::cell::Cell;

use flapclock_hal::{InputPin, Monotonic, OutputPin};

use crate::stepper::phase::{self, PHASE_COUNT};
use crate::time::{TimeSource, WallTime};

/// Steps at the start of a revolution during which the endstop triggers
pub const DEFAULT_ENDSTOP_WINDOW: u32 = 8;

/// Simulated wheel driven by four coil lines
#[derive(Debug)]
pub struct SimRig {
    coils: Cell<[bool; 4]>,
    /// Lines driven since the pattern last settled (bit per line)
    written: Cell<u8>,
    /// Rotor phase the mechanism last settled on
    rotor_phase: Cell<u8>,
    position: Cell<i64>,
    steps_taken: Cell<u64>,
    steps_per_revolution: u32,
    window: u32,
    mirrored: bool,
    endstop_override: Cell<Option<bool>>,
    endstop_connected: Cell<bool>,
}

impl SimRig {
    /// Rig with the given revolution length, resting on the endstop
    pub fn new(steps_per_revolution: u32) -> Self {
        Self {
            coils: Cell::new([false; 4]),
            written: Cell::new(0),
            rotor_phase: Cell::new(0),
            position: Cell::new(0),
            steps_taken: Cell::new(0),
            steps_per_revolution: steps_per_revolution.max(1),
            window: DEFAULT_ENDSTOP_WINDOW,
            mirrored: false,
            endstop_override: Cell::new(None),
            endstop_connected: Cell::new(true),
        }
    }

    /// Set the endstop window width in steps
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    /// Mechanism wired mirrored: decreasing phases move it forward
    pub fn mirrored(mut self) -> Self {
        self.mirrored = true;
        self
    }

    /// Coil line pins (IN1..IN4)
    pub fn coils(&self) -> [SimCoil<'_>; 4] {
        [0, 1, 2, 3].map(|line| SimCoil {
            rig: self,
            line,
            level: false,
        })
    }

    /// Active-low endstop input (pulled up, low when triggered)
    pub fn endstop(&self) -> SimEndstop<'_> {
        SimEndstop {
            rig: self,
            active_low: true,
        }
    }

    /// Active-high endstop input
    pub fn endstop_active_high(&self) -> SimEndstop<'_> {
        SimEndstop {
            rig: self,
            active_low: false,
        }
    }

    /// Physical position in steps (unbounded)
    pub fn position(&self) -> i64 {
        self.position.get()
    }

    /// Move the mechanism by hand
    pub fn set_position(&self, position: i64) {
        self.position.set(position);
    }

    /// Lose (negative) or gain steps without the controller knowing
    pub fn slip(&self, steps: i64) {
        self.position.set(self.position.get() + steps);
    }

    /// Physical steps taken in either direction
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken.get()
    }

    /// Revolution length
    pub fn steps_per_revolution(&self) -> u32 {
        self.steps_per_revolution
    }

    /// Current coil levels
    pub fn coil_levels(&self) -> [bool; 4] {
        self.coils.get()
    }

    /// Force the endstop reading (`None` restores the physical reading)
    pub fn force_endstop(&self, triggered: Option<bool>) {
        self.endstop_override.set(triggered);
    }

    /// Simulate a broken endstop wire (never triggers)
    pub fn disconnect_endstop(&self) {
        self.endstop_connected.set(false);
    }

    /// Reconnect the endstop
    pub fn connect_endstop(&self) {
        self.endstop_connected.set(true);
    }

    /// Whether the endstop sensor is triggered
    pub fn endstop_triggered(&self) -> bool {
        if let Some(forced) = self.endstop_override.get() {
            return forced;
        }
        let angle = self.position.get().rem_euclid(self.steps_per_revolution as i64);
        self.endstop_connected.get() && angle < self.window as i64
    }

    fn write(&self, line: usize, high: bool) {
        let bit = 1u8 << line;
        // Rewriting a line starts the next pattern
        if self.written.get() & bit != 0 {
            self.settle();
        }

        let mut coils = self.coils.get();
        coils[line] = high;
        self.coils.set(coils);
        self.written.set(self.written.get() | bit);

        if self.written.get() == 0b1111 {
            self.settle();
        }
    }

    fn settle(&self) {
        self.written.set(0);

        // Released or invalid patterns leave the rotor where it is
        let Some(next) = phase::decode(self.coils.get()) else {
            return;
        };
        let delta = (next + PHASE_COUNT - self.rotor_phase.get()) % PHASE_COUNT;
        let step: i64 = match delta {
            1 => 1,
            d if d == PHASE_COUNT - 1 => -1,
            _ => return,
        };
        self.rotor_phase.set(next);
        let step = if self.mirrored { -step } else { step };
        self.position.set(self.position.get() + step);
        self.steps_taken.set(self.steps_taken.get() + 1);
    }
}

/// One coil line of a [`SimRig`]
#[derive(Debug)]
pub struct SimCoil<'a> {
    rig: &'a SimRig,
    line: usize,
    level: bool,
}

impl OutputPin for SimCoil<'_> {
    fn set_high(&mut self) {
        self.level = true;
        self.rig.write(self.line, true);
    }

    fn set_low(&mut self) {
        self.level = false;
        self.rig.write(self.line, false);
    }

    fn is_set_high(&self) -> bool {
        self.level
    }
}

/// Endstop input of a [`SimRig`]
#[derive(Debug, Clone, Copy)]
pub struct SimEndstop<'a> {
    rig: &'a SimRig,
    active_low: bool,
}

impl InputPin for SimEndstop<'_> {
    fn is_high(&self) -> bool {
        self.rig.endstop_triggered() != self.active_low
    }
}

/// Monotonic clock that advances a fixed amount on every read
///
/// Blocking loops read the clock each iteration, so simulated time passes
/// as they spin.
#[derive(Debug)]
pub struct SimClock {
    micros: Cell<u64>,
    step_us: u32,
}

impl SimClock {
    /// Clock at zero advancing `step_us` per read
    pub fn new(step_us: u32) -> Self {
        Self::starting_at(0, step_us)
    }

    /// Clock starting at `micros`
    pub fn starting_at(micros: u64, step_us: u32) -> Self {
        Self {
            micros: Cell::new(micros),
            step_us,
        }
    }

    /// Move time forward without a read
    pub fn advance(&self, micros: u64) {
        self.micros.set(self.micros.get() + micros);
    }

    /// Total simulated microseconds
    pub fn elapsed_micros(&self) -> u64 {
        self.micros.get()
    }

    fn read(&self) -> u64 {
        let now = self.micros.get();
        self.micros.set(now + self.step_us as u64);
        now
    }
}

impl Monotonic for SimClock {
    fn now_micros(&self) -> u32 {
        self.read() as u32
    }

    fn now_millis(&self) -> u32 {
        (self.read() / 1000) as u32
    }
}

/// Settable wall-clock source
#[derive(Debug, Default)]
pub struct SimTimeSource {
    now: Cell<Option<WallTime>>,
}

impl SimTimeSource {
    /// Source returning `now`
    pub fn new(now: Option<WallTime>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Replace the reading
    pub fn set(&self, now: Option<WallTime>) {
        self.now.set(now);
    }
}

impl TimeSource for SimTimeSource {
    fn now(&self) -> Option<WallTime> {
        self.now.get()
    }
}
