//! Frame timing and the video-driven interrupt schedule.
//!
//! The video counter requests two interrupts per frame: `RST 1` when the
//! beam reaches the middle of the screen (scanline 96) and `RST 2` at the
//! start of vertical blank (scanline 224). The game uses them to redraw the
//! half of the screen the beam is not currently scanning. Since both fall
//! exactly half a frame apart in CPU time, the schedule is two equal
//! intervals.

// CPU clock:     19.968 MHz / 10 = 1.9968 MHz
// Refresh:       60 Hz
// Frame:         1,996,800 / 60 = 33,280 CPU cycles

pub const CPU_CLOCK_HZ: u32 = 1_996_800;
pub const FRAME_RATE_HZ: u32 = 60;
pub const CYCLES_PER_FRAME: u32 = CPU_CLOCK_HZ / FRAME_RATE_HZ;
pub const HALF_FRAME_CYCLES: u32 = CYCLES_PER_FRAME / 2;

/// One entry of the per-frame interrupt table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledInterrupt {
    /// RST number; the CPU jumps to `vector * 8`.
    pub vector: u8,
    /// Cycles from the previous event to this one.
    pub interval: u32,
}

pub const FRAME_EVENTS: [ScheduledInterrupt; 2] = [
    ScheduledInterrupt {
        vector: 1,
        interval: HALF_FRAME_CYCLES,
    },
    ScheduledInterrupt {
        vector: 2,
        interval: HALF_FRAME_CYCLES,
    },
];

/// Counts CPU cycles down to the next scheduled interrupt.
///
/// The countdown is signed: an instruction that crosses an event leaves it
/// negative, and that overshoot is subtracted from the next interval instead
/// of being lost, so events never drift against the cycle count.
#[derive(Debug, Clone)]
pub struct InterruptScheduler {
    events: &'static [ScheduledInterrupt],
    next: usize,
    countdown: i64,
}

impl Default for InterruptScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptScheduler {
    pub fn new() -> Self {
        Self::with_events(&FRAME_EVENTS)
    }

    /// A scheduler cycling through `events`, which must not be empty.
    pub fn with_events(events: &'static [ScheduledInterrupt]) -> Self {
        assert!(!events.is_empty(), "interrupt schedule needs at least one event");
        Self {
            events,
            next: 0,
            countdown: events[0].interval as i64,
        }
    }

    /// Consume `cycles`, calling `fire(vector)` for every event reached.
    pub fn advance(&mut self, cycles: u32, mut fire: impl FnMut(u8)) {
        self.countdown -= cycles as i64;
        while self.countdown <= 0 {
            let vector = self.events[self.next].vector;
            self.next = (self.next + 1) % self.events.len();
            self.countdown += self.events[self.next].interval as i64;
            fire(vector);
        }
    }

    /// Vector of the next event to fire.
    pub fn next_vector(&self) -> u8 {
        self.events[self.next].vector
    }

    /// Cycles remaining until the next event.
    pub fn cycles_until_next(&self) -> i64 {
        self.countdown
    }

    pub fn reset(&mut self) {
        self.next = 0;
        self.countdown = self.events[0].interval as i64;
    }
}
