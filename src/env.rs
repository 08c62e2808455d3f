/// Gain envelope for a scheduled note of known length.
///
/// Four breakpoints: silence to `peak` over the attack, `peak` down to the
/// sustain level over the decay, a flat hold, then a ramp to zero over the
/// release that ends exactly at `duration`. When attack + decay + release
/// don't fit in the requested duration the later segments are clamped so the
/// envelope still reaches zero at `duration`.
#[derive(Debug, Clone, Copy)]
pub struct NoteEnvelope {
    peak: f32,
    sustain_level: f32,
    attack_end: f64,
    decay_end: f64,
    release_start: f64,
    duration: f64,
}

impl NoteEnvelope {
    /// `peak` is the full gain of the note (velocity times preset volume);
    /// `sustain` is the usual 0..1 fraction of it.
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64, duration: f64, peak: f32) -> Self {
        let duration = duration.max(0.0);
        let attack_end = attack.max(0.0).min(duration);
        let decay_end = (attack_end + decay.max(0.0)).min(duration);
        let release_start = (duration - release.max(0.0)).max(decay_end);
        Self {
            peak,
            sustain_level: peak * sustain.clamp(0.0, 1.0) as f32,
            attack_end,
            decay_end,
            release_start,
            duration,
        }
    }

    /// Gain at `t` seconds after the note started. Zero at and after
    /// `duration`.
    pub fn value(&self, t: f64) -> f32 {
        if t < 0.0 || t >= self.duration {
            return 0.0;
        }
        if t < self.attack_end {
            return self.peak * (t / self.attack_end) as f32;
        }
        if t < self.decay_end {
            let frac = ((t - self.attack_end) / (self.decay_end - self.attack_end)) as f32;
            return self.peak + (self.sustain_level - self.peak) * frac;
        }
        if t < self.release_start {
            return self.sustain_level;
        }
        let remaining = self.duration - self.release_start;
        if remaining <= 0.0 {
            return 0.0;
        }
        self.sustain_level * (1.0 - ((t - self.release_start) / remaining) as f32)
    }

    pub fn is_finished(&self, t: f64) -> bool {
        t >= self.duration
    }
}
