pub mod audio;
pub mod drums;
pub mod engine;
pub mod env;
pub mod error;
pub mod filter;
pub mod host;
pub mod loops;
pub mod pattern;
pub mod prompt;
pub mod seq;
pub mod state;
pub mod synth;
pub mod workstation;

// Keep https://github.com/RustAudio/cpal/issues/508 in mind
// when changing the sample rate.
pub const SAMPLE_RATE: f64 = 44100.0;
pub const FRAMES_PER_BUFFER: usize = 128;

// Allocate a larger buffer size, because sometimes cpal requests more than the
// configured buffer size when switching the output device.
pub const INTERNAL_BUFFER_SIZE: usize = 4 * FRAMES_PER_BUFFER;

// Ephemeral voices come from fixed pools so the audio callback never
// allocates. Triggers that overflow a pool are dropped with a warning.
pub const MAX_DRUM_HITS: usize = 32;
pub const MAX_SYNTH_VOICES: usize = 16;
