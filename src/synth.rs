use crate::env::NoteEnvelope;
use crate::filter::{Biquad, FilterKind};
use crate::SAMPLE_RATE;
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
    Square,
    Triangle,
}

/// Immutable voice template. Loaded by name into the current-preset slot;
/// a copy travels with every note trigger so the audio thread never has to
/// look anything up.
#[derive(Debug, Clone, Copy)]
pub struct SynthPreset {
    pub name: &'static str,
    pub waveform: Waveform,
    pub filter: FilterKind,
    pub cutoff: f64,
    pub resonance: f64,
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
    pub distortion: f64,
    pub volume: f64,
}

pub const PRESETS: [SynthPreset; 6] = [
    SynthPreset {
        name: "Acid Bass",
        waveform: Waveform::Sawtooth,
        filter: FilterKind::Lowpass,
        cutoff: 800.0,
        resonance: 8.0,
        attack: 0.005,
        decay: 0.15,
        sustain: 0.4,
        release: 0.1,
        distortion: 0.4,
        volume: 0.8,
    },
    SynthPreset {
        name: "Lead Pluck",
        waveform: Waveform::Square,
        filter: FilterKind::Lowpass,
        cutoff: 2500.0,
        resonance: 2.0,
        attack: 0.001,
        decay: 0.2,
        sustain: 0.2,
        release: 0.1,
        distortion: 0.15,
        volume: 0.7,
    },
    SynthPreset {
        name: "Warm Pad",
        waveform: Waveform::Triangle,
        filter: FilterKind::Lowpass,
        cutoff: 1200.0,
        resonance: 0.7,
        attack: 0.4,
        decay: 0.3,
        sustain: 0.8,
        release: 0.6,
        distortion: 0.0,
        volume: 0.6,
    },
    SynthPreset {
        name: "Analog Brass",
        waveform: Waveform::Sawtooth,
        filter: FilterKind::Lowpass,
        cutoff: 1800.0,
        resonance: 1.2,
        attack: 0.08,
        decay: 0.2,
        sustain: 0.7,
        release: 0.25,
        distortion: 0.2,
        volume: 0.7,
    },
    SynthPreset {
        name: "Digital Bell",
        waveform: Waveform::Sine,
        filter: FilterKind::Bandpass,
        cutoff: 2000.0,
        resonance: 4.0,
        attack: 0.001,
        decay: 0.5,
        sustain: 0.1,
        release: 0.4,
        distortion: 0.05,
        volume: 0.6,
    },
    SynthPreset {
        name: "Sub Bass",
        waveform: Waveform::Sine,
        filter: FilterKind::Lowpass,
        cutoff: 300.0,
        resonance: 0.7,
        attack: 0.01,
        decay: 0.1,
        sustain: 0.9,
        release: 0.15,
        distortion: 0.1,
        volume: 0.9,
    },
];

pub fn find_preset(name: &str) -> Option<&'static SynthPreset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Everything the engine needs to start one note. Copied by value through
/// the command queue so the audio thread never looks anything up.
#[derive(Debug, Clone, Copy)]
pub struct NoteParams {
    pub frequency: f64,
    pub duration: f64,
    pub velocity: f32,
    /// Seconds of silence before the note starts, for strummed chords.
    pub delay: f64,
    pub preset: SynthPreset,
}

/// The chord bank: minor-leaning voicings played from the pad grid, all in
/// octave 4.
#[derive(Debug, Clone, Copy)]
pub struct Chord {
    pub name: &'static str,
    pub notes: &'static [&'static str],
}

pub const CHORDS: [Chord; 9] = [
    Chord { name: "C MIN", notes: &["C", "Eb", "G"] },
    Chord { name: "F MIN", notes: &["F", "Ab", "C"] },
    Chord { name: "G MIN", notes: &["G", "Bb", "D"] },
    Chord { name: "A MIN", notes: &["A", "C", "E"] },
    Chord { name: "D MIN", notes: &["D", "F", "A"] },
    Chord { name: "E MIN", notes: &["E", "G", "B"] },
    Chord { name: "C MIN7", notes: &["C", "Eb", "G", "Bb"] },
    Chord { name: "F MIN7", notes: &["F", "Ab", "C", "Eb"] },
    Chord { name: "B DIM", notes: &["B", "D", "F"] },
];

pub fn find_chord(name: &str) -> Option<&'static Chord> {
    CHORDS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Semitone index within an octave for a note name, sharps and flats both
/// accepted ("C#" and "Db" are the same key).
pub fn note_semitone(name: &str) -> Option<usize> {
    match name.trim().to_ascii_uppercase().as_str() {
        "C" => Some(0),
        "C#" | "DB" => Some(1),
        "D" => Some(2),
        "D#" | "EB" => Some(3),
        "E" => Some(4),
        "F" => Some(5),
        "F#" | "GB" => Some(6),
        "G" => Some(7),
        "G#" | "AB" => Some(8),
        "A" => Some(9),
        "A#" | "BB" => Some(10),
        "B" => Some(11),
        _ => None,
    }
}

/// Frequency of a key on the virtual keyboard. `note_index` 0..12 counts
/// semitones up from C, `octave` follows scientific pitch notation, so
/// (9, 4) is A4 = 440 Hz and (0, 4) is middle C.
pub fn key_frequency(note_index: usize, octave: u32) -> f64 {
    let semitones = (octave as i32 - 4) * 12 + note_index as i32 - 9;
    440.0 * f64::powf(2.0, semitones as f64 / 12.0)
}

const CURVE_LEN: usize = 257;

/// Nonlinear waveshaping stage, evaluated through a fixed-resolution lookup
/// table so every voice pays the same constant cost. The transfer curve is
/// `(1 + k)·x / (1 + k·|x|)` with `k = 20·amount`: identity at amount 0,
/// approaching a hard clip as the amount goes to 1. Deterministic for a
/// given amount.
#[derive(Debug, Clone, Copy)]
pub struct Waveshaper {
    curve: [f32; CURVE_LEN],
}

impl Waveshaper {
    pub fn new(amount: f64) -> Self {
        let k = 20.0 * amount.clamp(0.0, 1.0);
        let mut curve = [0.0; CURVE_LEN];
        for (i, entry) in curve.iter_mut().enumerate() {
            let x = i as f64 * 2.0 / (CURVE_LEN - 1) as f64 - 1.0;
            *entry = ((1.0 + k) * x / (1.0 + k * x.abs())) as f32;
        }
        Self { curve }
    }

    pub fn apply(&self, sample: f32) -> f32 {
        let x = sample.clamp(-1.0, 1.0);
        let pos = (x + 1.0) * 0.5 * (CURVE_LEN - 1) as f32;
        let idx = pos as usize;
        if idx >= CURVE_LEN - 1 {
            return self.curve[CURVE_LEN - 1];
        }
        let frac = pos - idx as f32;
        self.curve[idx] + (self.curve[idx + 1] - self.curve[idx]) * frac
    }
}

/// One playing note: oscillator -> resonant filter -> waveshaper -> envelope.
/// Ephemeral; lives in a fixed pool slot and frees itself when the envelope
/// runs out.
#[derive(Debug, Clone, Copy)]
pub struct SynthVoice {
    active: bool,
    waveform: Waveform,
    phase: f64,
    phase_inc: f64,
    filter: Biquad,
    shaper: Waveshaper,
    env: NoteEnvelope,
    delay: usize,
    position: u64,
}

impl SynthVoice {
    pub fn silent() -> Self {
        Self {
            active: false,
            waveform: Waveform::Sine,
            phase: 0.0,
            phase_inc: 0.0,
            filter: Biquad::new(FilterKind::Lowpass, 1000.0, 0.707),
            shaper: Waveshaper::new(0.0),
            env: NoteEnvelope::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            delay: 0,
            position: 0,
        }
    }

    pub fn start(params: &NoteParams) -> Self {
        let preset = params.preset;
        let peak = params.velocity * preset.volume as f32;
        Self {
            active: true,
            waveform: preset.waveform,
            phase: 0.0,
            phase_inc: params.frequency / SAMPLE_RATE,
            filter: Biquad::new(preset.filter, preset.cutoff, preset.resonance),
            shaper: Waveshaper::new(preset.distortion),
            env: NoteEnvelope::new(
                preset.attack,
                preset.decay,
                preset.sustain,
                preset.release,
                params.duration,
                peak,
            ),
            delay: (params.delay.max(0.0) * SAMPLE_RATE) as usize,
            position: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Add this voice's output to `buffer`. Clears the active flag once the
    /// envelope has finished.
    pub fn render(&mut self, buffer: &mut [f32]) {
        if !self.active {
            return;
        }
        for out in buffer.iter_mut() {
            if self.delay > 0 {
                self.delay -= 1;
                continue;
            }
            let t = self.position as f64 / SAMPLE_RATE;
            if self.env.is_finished(t) {
                self.active = false;
                return;
            }
            let raw = oscillator_sample(self.waveform, self.phase);
            let filtered = self.filter.process(raw);
            let shaped = self.shaper.apply(filtered);
            *out += shaped * self.env.value(t);

            self.phase += self.phase_inc;
            self.phase -= self.phase.floor();
            self.position += 1;
        }
    }
}

fn oscillator_sample(waveform: Waveform, phase: f64) -> f32 {
    let sample = match waveform {
        Waveform::Sine => (phase * TAU).sin(),
        Waveform::Sawtooth => 2.0 * phase - 1.0,
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => {
            if phase < 0.5 {
                4.0 * phase - 1.0
            } else {
                3.0 - 4.0 * phase
            }
        }
    };
    sample as f32
}
