use crate::SAMPLE_RATE;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Lowpass,
    Highpass,
    Bandpass,
}

/// Resonant biquad (RBJ audio EQ cookbook coefficients), direct form 1.
/// One instance per voice; coefficients are fixed at construction since
/// presets are immutable.
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    pub fn new(kind: FilterKind, cutoff: f64, q: f64) -> Self {
        let nyquist = SAMPLE_RATE / 2.0;
        let cutoff = cutoff.clamp(10.0, nyquist - 1.0);
        let q = q.max(0.05);

        let w0 = 2.0 * PI * cutoff / SAMPLE_RATE;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);

        let (b0, b1, b2) = match kind {
            FilterKind::Lowpass => {
                let b1 = 1.0 - cos_w0;
                (b1 / 2.0, b1, b1 / 2.0)
            }
            FilterKind::Highpass => {
                let b1 = -(1.0 + cos_w0);
                (-b1 / 2.0, b1, -b1 / 2.0)
            }
            FilterKind::Bandpass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let x0 = input as f64;
        let y0 = self.b0 * x0 + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x0;
        self.y2 = self.y1;
        self.y1 = y0;
        y0 as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(filter: &mut Biquad, input: f32, n: usize) -> f32 {
        let mut out = 0.0;
        for _ in 0..n {
            out = filter.process(input);
        }
        out
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut f = Biquad::new(FilterKind::Lowpass, 1000.0, 0.707);
        let out = settle(&mut f, 1.0, 4096);
        assert!((out - 1.0).abs() < 1e-3);
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut f = Biquad::new(FilterKind::Highpass, 1000.0, 0.707);
        let out = settle(&mut f, 1.0, 4096);
        assert!(out.abs() < 1e-3);
    }

    #[test]
    fn bandpass_blocks_dc() {
        let mut f = Biquad::new(FilterKind::Bandpass, 1000.0, 2.0);
        let out = settle(&mut f, 1.0, 4096);
        assert!(out.abs() < 1e-3);
    }

    #[test]
    fn cutoff_is_clamped_below_nyquist() {
        // Would blow up with an unclamped cutoff; just has to stay finite.
        let mut f = Biquad::new(FilterKind::Lowpass, 96_000.0, 0.707);
        let out = settle(&mut f, 1.0, 256);
        assert!(out.is_finite());
    }
}
