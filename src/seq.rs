use crate::pattern::PATTERN_LEN;
use crate::SAMPLE_RATE;

pub const MIN_BPM: u16 = 60;
pub const MAX_BPM: u16 = 200;

/// Milliseconds between steps at sixteenth-note resolution.
pub fn tick_interval_ms(bpm: u16) -> f64 {
    60_000.0 / (bpm as f64 * 4.0)
}

fn tick_interval_samples(bpm: u16) -> usize {
    (tick_interval_ms(bpm) / 1000.0 * SAMPLE_RATE).round() as usize
}

/// Audio-plane step clock. The engine calls `advance` before each sub-block
/// and renders at most `block_len` frames, which keeps ticks sample-accurate
/// within the callback buffer.
///
/// Two deliberate behaviors: the tick interval is computed once on the
/// stopped-to-running edge, so a tempo change while running only takes
/// effect after the next stop/start; and the step index is zeroed when
/// stopping, not when starting.
pub struct Sequencer {
    step: usize,
    running: bool,
    interval: usize,
    until_tick: usize,
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            step: 0,
            running: false,
            interval: 0,
            until_tick: 0,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Handle transport edges and return the step to trigger if a tick is
    /// due right now. The returned step is the one that sounds; the index
    /// then moves to the next column. The first tick fires immediately on
    /// start, so step 0 sounds the moment the transport starts.
    pub fn advance(&mut self, running: bool, bpm: u16) -> Option<usize> {
        if running && !self.running {
            self.running = true;
            self.interval = tick_interval_samples(bpm);
            self.until_tick = 0;
        } else if !running && self.running {
            self.running = false;
            self.step = 0;
        }

        if self.running && self.until_tick == 0 {
            let step = self.step;
            self.step = (self.step + 1) % PATTERN_LEN;
            self.until_tick = self.interval;
            return Some(step);
        }
        None
    }

    /// How many frames may be rendered before the next tick is due.
    pub fn block_len(&mut self, remaining: usize) -> usize {
        if !self.running {
            return remaining;
        }
        let n = usize::min(remaining, self.until_tick);
        self.until_tick -= n;
        n
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}
