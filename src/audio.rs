use crate::SAMPLE_RATE;

/// Mono sample buffer. The engine mixes everything onto a single bus; the
/// host duplicates it to however many channels the output device has.
pub type Buffer = Vec<f32>;

pub fn db_to_amp(db: f64) -> f64 {
    f64::powf(10.0, db / 20.0)
}

// TODO: consider recalculating the sum every so often to prevent floating
// point inaccuracies over time
pub struct Rms {
    squared: Vec<f32>,
    sum: f32,
    position: usize,
    window_length: usize,
}

impl Rms {
    pub fn new(window_size: usize) -> Self {
        Self {
            squared: vec![0.0; window_size],
            sum: 0.0,
            position: 0,
            window_length: 0,
        }
    }

    pub fn add_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.sum -= self.squared[self.position];
            let squared = sample * sample;
            self.sum += squared;
            self.squared[self.position] = squared;
            self.position += 1;
            if self.position >= self.squared.len() {
                self.position = 0;
            }
            self.window_length = usize::min(self.window_length + 1, self.squared.len());
        }
    }

    pub fn value(&self) -> f32 {
        if self.window_length == 0 {
            return 0.0;
        }
        (self.sum.max(0.0) / self.window_length as f32).sqrt()
    }
}

/// Peak limiter on the master bus. A one-pole envelope follower tracks the
/// rectified input; whenever it exceeds the threshold the gain is reduced to
/// keep the output at the threshold. Fast attack so transients from stacked
/// drum hits can't clip, slower release so the gain recovers smoothly.
pub struct Limiter {
    threshold: f32,
    attack: f32,
    release: f32,
    envelope: f32,
}

impl Limiter {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            attack: coefficient(0.002),
            release: coefficient(0.1),
            envelope: 0.0,
        }
    }

    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            let peak = sample.abs();
            let coeff = if peak > self.envelope {
                self.attack
            } else {
                self.release
            };
            self.envelope = coeff * self.envelope + (1.0 - coeff) * peak;
            if self.envelope > self.threshold {
                *sample *= self.threshold / self.envelope;
            }
        }
    }
}

fn coefficient(time_secs: f64) -> f32 {
    f64::exp(-1.0 / (time_secs * SAMPLE_RATE)) as f32
}
