use crate::drums::DrumVoice;
use rand::Rng;

pub const PATTERN_LEN: usize = 16;
pub const NUM_LANES: usize = 4;

/// The four sequenced lanes. The array order is also the trigger order on
/// each step: kick first, open hat last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Kick,
    Snare,
    Hihat,
    Openhat,
}

impl Lane {
    pub const ALL: [Lane; NUM_LANES] = [Lane::Kick, Lane::Snare, Lane::Hihat, Lane::Openhat];

    pub fn voice(&self) -> DrumVoice {
        match self {
            Lane::Kick => DrumVoice::Kick,
            Lane::Snare => DrumVoice::Snare,
            Lane::Hihat => DrumVoice::Hihat,
            Lane::Openhat => DrumVoice::Openhat,
        }
    }

    /// Default sequencer velocity per lane; pads played by hand use full
    /// velocity instead.
    pub fn velocity(&self) -> f32 {
        match self {
            Lane::Kick => 1.0,
            Lane::Snare => 0.8,
            Lane::Hihat => 0.6,
            Lane::Openhat => 0.7,
        }
    }
}

/// One bar of sixteenth notes for all four lanes. Cheap to clone; the active
/// pattern is swapped wholesale between the control and audio planes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrumPattern {
    steps: [[bool; PATTERN_LEN]; NUM_LANES],
}

impl DrumPattern {
    pub fn empty() -> Self {
        Self {
            steps: [[false; PATTERN_LEN]; NUM_LANES],
        }
    }

    pub fn get(&self, lane: Lane, step: usize) -> bool {
        self.steps[lane as usize][step]
    }

    pub fn set(&mut self, lane: Lane, step: usize, on: bool) {
        self.steps[lane as usize][step] = on;
    }

    pub fn toggle(&mut self, lane: Lane, step: usize) {
        self.steps[lane as usize][step] = !self.steps[lane as usize][step];
    }

    pub fn clear(&mut self) {
        self.steps = [[false; PATTERN_LEN]; NUM_LANES];
    }

    pub fn is_empty(&self) -> bool {
        self.steps.iter().flatten().all(|&s| !s)
    }

    pub fn count(&self, lane: Lane) -> usize {
        self.steps[lane as usize].iter().filter(|&&s| s).count()
    }

    /// Four-on-the-floor kick with extra hits, backbeat snare, offbeat
    /// hihats and a rare open hat.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        for i in 0..PATTERN_LEN {
            self.steps[Lane::Kick as usize][i] = i % 4 == 0 || rng.gen::<f64>() > 0.7;
            self.steps[Lane::Snare as usize][i] = i % 8 == 4;
            self.steps[Lane::Hihat as usize][i] = rng.gen::<f64>() > 0.5;
            self.steps[Lane::Openhat as usize][i] = rng.gen::<f64>() > 0.9;
        }
    }
}

impl Default for DrumPattern {
    /// The seed pattern the workstation boots with: steady techno kick,
    /// snare on 5 and 13, offbeat hats, one open hat at the bar's end.
    fn default() -> Self {
        const K: bool = true;
        const O: bool = false;
        Self {
            steps: [
                [K, O, O, O, K, O, O, O, K, O, O, O, K, O, O, O],
                [O, O, O, O, K, O, O, O, O, O, O, O, K, O, O, O],
                [O, O, K, O, O, O, K, O, O, O, K, O, O, O, K, O],
                [O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, K],
            ],
        }
    }
}
