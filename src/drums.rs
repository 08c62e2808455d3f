use crate::audio::Buffer;
use crate::SAMPLE_RATE;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

/// Noise buffers are rendered once at init from this seed, so every trigger
/// of a given drum sounds identical for the lifetime of the process.
pub const DEFAULT_SEED: u64 = 0x6472756d;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrumVoice {
    Kick,
    Snare,
    Hihat,
    Openhat,
    Crash,
    Clap,
    Ride,
    Perc,
}

pub const NUM_DRUM_VOICES: usize = 8;

impl DrumVoice {
    pub const ALL: [DrumVoice; NUM_DRUM_VOICES] = [
        DrumVoice::Kick,
        DrumVoice::Snare,
        DrumVoice::Hihat,
        DrumVoice::Openhat,
        DrumVoice::Crash,
        DrumVoice::Clap,
        DrumVoice::Ride,
        DrumVoice::Perc,
    ];

    /// Accepts the pad labels of the workstation UI as well as plain
    /// identifiers ("HI-HAT" and "hihat" are the same voice).
    pub fn from_name(name: &str) -> Option<DrumVoice> {
        let name = name.trim().to_ascii_lowercase().replace(['-', ' ', '_'], "");
        match name.as_str() {
            "kick" => Some(DrumVoice::Kick),
            "snare" => Some(DrumVoice::Snare),
            "hihat" => Some(DrumVoice::Hihat),
            "openhat" => Some(DrumVoice::Openhat),
            "crash" => Some(DrumVoice::Crash),
            "clap" => Some(DrumVoice::Clap),
            "ride" => Some(DrumVoice::Ride),
            "perc" => Some(DrumVoice::Perc),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DrumVoice::Kick => "kick",
            DrumVoice::Snare => "snare",
            DrumVoice::Hihat => "hihat",
            DrumVoice::Openhat => "openhat",
            DrumVoice::Crash => "crash",
            DrumVoice::Clap => "clap",
            DrumVoice::Ride => "ride",
            DrumVoice::Perc => "perc",
        }
    }
}

/// One pre-rendered mono buffer per percussion voice. Built once at engine
/// construction, read-only afterwards; triggers only scale playback by
/// velocity, never touch the buffers.
pub struct DrumKit {
    buffers: [Buffer; NUM_DRUM_VOICES],
}

impl DrumKit {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            buffers: [
                render_kick(&mut rng),
                render_snare(&mut rng),
                render_hihat(&mut rng),
                render_openhat(&mut rng),
                render_crash(&mut rng),
                render_clap(&mut rng),
                render_ride(&mut rng),
                render_perc(&mut rng),
            ],
        }
    }

    pub fn buffer(&self, voice: DrumVoice) -> &[f32] {
        &self.buffers[voice as usize]
    }
}

impl Default for DrumKit {
    fn default() -> Self {
        Self::new()
    }
}

fn samples(seconds: f64) -> usize {
    (seconds * SAMPLE_RATE) as usize
}

fn render(seconds: f64, mut formula: impl FnMut(f64) -> f64) -> Buffer {
    let len = samples(seconds);
    let mut buf = Vec::with_capacity(len);
    for i in 0..len {
        let t = i as f64 / SAMPLE_RATE;
        buf.push(formula(t) as f32);
    }
    buf
}

fn noise(rng: &mut StdRng) -> f64 {
    rng.gen_range(-1.0..1.0)
}

/// Decaying sine whose pitch itself drops exponentially from 60 Hz, plus a
/// short high-frequency click for the beater transient.
fn render_kick(_rng: &mut StdRng) -> Buffer {
    render(0.5, |t| {
        let body = (TAU * 60.0 * f64::exp(-4.0 * t) * t).sin();
        let click = (TAU * 2500.0 * t).sin() * f64::exp(-120.0 * t) * 0.4;
        (body + click) * f64::exp(-8.0 * t)
    })
}

fn render_snare(rng: &mut StdRng) -> Buffer {
    render(0.2, |t| {
        let tone = (TAU * 200.0 * t).sin() * 0.3;
        let rattle = noise(rng) * 0.7;
        (tone + rattle) * f64::exp(-15.0 * t)
    })
}

/// The ramp-up factor approximates a high-pass: it suppresses the lowest
/// part of the burst where the noise energy would sound boxy.
fn render_hihat(rng: &mut StdRng) -> Buffer {
    render(0.1, |t| {
        noise(rng) * (1.0 - f64::exp(-100.0 * t)) * f64::exp(-25.0 * t)
    })
}

fn render_openhat(rng: &mut StdRng) -> Buffer {
    render(0.3, |t| {
        let sizzle = noise(rng) * 0.7;
        let metal = (TAU * 3000.0 * t).sin() * 0.3;
        (sizzle + metal) * f64::exp(-8.0 * t)
    })
}

fn render_crash(rng: &mut StdRng) -> Buffer {
    render(1.0, |t| {
        let wash = noise(rng) * 0.8;
        let shimmer = (TAU * 5000.0 * t).sin() * 0.2;
        (wash + shimmer) * f64::exp(-3.0 * t)
    })
}

/// Four overlapping noise bursts, each with its own fast decay, spread a few
/// milliseconds apart the way a real clap smears individual hand hits.
const CLAP_OFFSETS: [f64; 4] = [0.0, 0.010, 0.030, 0.050];

fn render_clap(rng: &mut StdRng) -> Buffer {
    render(0.2, |t| {
        let mut sample = 0.0;
        for offset in CLAP_OFFSETS {
            if t >= offset {
                sample += noise(rng) * 0.5 * f64::exp(-100.0 * (t - offset));
            }
        }
        sample
    })
}

fn render_ride(rng: &mut StdRng) -> Buffer {
    render(0.8, |t| {
        let ping = (TAU * 2000.0 * t).sin() * 0.4;
        let sizzle = noise(rng) * 0.3;
        (ping + sizzle) * f64::exp(-2.0 * t)
    })
}

fn render_perc(rng: &mut StdRng) -> Buffer {
    render(0.3, |t| {
        let tone = (TAU * 400.0 * t).sin() * 0.8;
        let wood = noise(rng) * 0.2;
        (tone + wood) * f64::exp(-12.0 * t)
    })
}
