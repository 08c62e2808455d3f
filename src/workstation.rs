use rand::thread_rng;

use crate::drums::DrumVoice;
use crate::engine::Engine;
use crate::error::Error;
use crate::host::Host;
use crate::loops::LoopStation;
use crate::pattern::{DrumPattern, Lane, PATTERN_LEN};
use crate::prompt::Hints;
use crate::seq::{MAX_BPM, MIN_BPM};
use crate::state::{controls, Control, SharedState};
use crate::synth::{find_chord, key_frequency, note_semitone, NoteParams, PRESETS};

const DEFAULT_NOTE_DURATION: f64 = 0.5;
const DEFAULT_NOTE_VELOCITY: f32 = 0.8;
const NOTES_PER_OCTAVE: usize = 12;
const MIN_OCTAVE: u32 = 1;
const MAX_OCTAVE: u32 = 7;

/// Chord tones are strummed this far apart.
const CHORD_STAGGER: f64 = 0.05;
const CHORD_NOTE_DURATION: f64 = 1.0;
const CHORD_OCTAVE: u32 = 4;

/// The control-plane facade. Owns the loop station and the control side of
/// the shared state; the paired `Engine` renders on the audio plane.
///
/// Playback is gated behind `initialize_audio` (or `initialize_offline` for
/// headless rendering): until then every trigger is refused with
/// `Error::NotInitialized` and nothing sounds.
pub struct Workstation {
    control: Control,
    loops: LoopStation,
    host: Option<Host>,
}

impl Workstation {
    pub fn new() -> (Workstation, Engine) {
        let (control, engine_control) = controls();
        let workstation = Workstation {
            control,
            loops: LoopStation::new(),
            host: None,
        };
        (workstation, Engine::new(engine_control))
    }

    /// Open the output device and hand the engine to its callback. Fails
    /// without side effects if no device is available; retrying with a new
    /// engine is fine.
    pub fn initialize_audio(&mut self, engine: Engine) -> Result<(), Error> {
        let host = Host::run(engine).map_err(|e| Error::InitFailed(e.to_string()))?;
        self.host = Some(host);
        self.control.set_initialized(true);
        Ok(())
    }

    /// Mark the audio plane ready without opening a device. The caller keeps
    /// the engine and drives `Engine::process` itself.
    pub fn initialize_offline(&mut self) {
        self.control.set_initialized(true);
    }

    pub fn trigger_drum(&mut self, name: &str) -> Result<(), Error> {
        let voice =
            DrumVoice::from_name(name).ok_or_else(|| Error::UnknownVoice(name.to_string()))?;
        self.trigger(voice, 1.0)
    }

    pub fn trigger(&mut self, voice: DrumVoice, velocity: f32) -> Result<(), Error> {
        if !self.control.is_initialized() {
            return Err(Error::NotInitialized);
        }
        if let Err(e) = self.control.trigger_drum(voice, velocity.clamp(0.0, 1.0)) {
            eprintln!("dropped drum trigger: {}", e);
        }
        Ok(())
    }

    pub fn toggle_step(&mut self, lane: Lane, step: usize) -> Result<(), Error> {
        if step >= PATTERN_LEN {
            return Err(Error::InvalidParameter {
                name: "step",
                value: step as f64,
            });
        }
        self.control.update_pattern(|p| p.toggle(lane, step));
        Ok(())
    }

    /// Tempo is clamped into [60, 200]. A change while the transport runs
    /// takes effect from the next stop/start cycle, matching the clock's
    /// cached interval.
    pub fn set_tempo(&mut self, bpm: u16) {
        self.control.set_bpm(bpm.clamp(MIN_BPM, MAX_BPM));
    }

    pub fn toggle_sequencer(&mut self) -> Result<(), Error> {
        if !self.control.is_initialized() {
            return Err(Error::NotInitialized);
        }
        if self.control.is_running() {
            self.control.set_running(false);
            self.control.reset_step();
        } else {
            self.control.set_running(true);
        }
        Ok(())
    }

    pub fn record_loop(&mut self, id: usize) -> Result<(), Error> {
        self.loops.record(id, &mut self.control)
    }

    pub fn play_loop(&mut self, id: usize) -> Result<(), Error> {
        if !self.control.is_initialized() {
            return Err(Error::NotInitialized);
        }
        self.loops.play(id, &mut self.control)
    }

    pub fn clear_loop(&mut self, id: usize) -> Result<(), Error> {
        self.loops.clear(id)
    }

    /// Master volume comes in as a 0..=100 fader value.
    pub fn set_master_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.control.set_master_volume(volume as f64 / 100.0);
    }

    pub fn load_preset(&mut self, name: &str) -> Result<(), Error> {
        let index = PRESETS
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownVoice(name.to_string()))?;
        self.control.set_preset_index(index);
        Ok(())
    }

    pub fn play_note(&mut self, frequency: f64, duration: f64, velocity: f32) -> Result<(), Error> {
        if !self.control.is_initialized() {
            return Err(Error::NotInitialized);
        }
        if frequency <= 0.0 || !frequency.is_finite() {
            return Err(Error::InvalidParameter {
                name: "frequency",
                value: frequency,
            });
        }
        if duration <= 0.0 || !duration.is_finite() {
            return Err(Error::InvalidParameter {
                name: "duration",
                value: duration,
            });
        }
        let params = NoteParams {
            frequency,
            duration,
            velocity: velocity.clamp(0.0, 1.0),
            delay: 0.0,
            preset: self.control.preset(),
        };
        if let Err(e) = self.control.play_note(params) {
            eprintln!("dropped note: {}", e);
        }
        Ok(())
    }

    /// Play a chord from the bank, each tone offset by the strum interval.
    pub fn play_chord(&mut self, name: &str) -> Result<(), Error> {
        if !self.control.is_initialized() {
            return Err(Error::NotInitialized);
        }
        let chord = find_chord(name).ok_or_else(|| Error::UnknownVoice(name.to_string()))?;
        let preset = self.control.preset();
        for (i, note) in chord.notes.iter().enumerate() {
            let semitone = match note_semitone(note) {
                Some(s) => s,
                None => continue,
            };
            let params = NoteParams {
                frequency: key_frequency(semitone, CHORD_OCTAVE),
                duration: CHORD_NOTE_DURATION,
                velocity: DEFAULT_NOTE_VELOCITY,
                delay: i as f64 * CHORD_STAGGER,
                preset,
            };
            if let Err(e) = self.control.play_note(params) {
                eprintln!("dropped chord tone: {}", e);
            }
        }
        Ok(())
    }

    /// Play a key of the virtual keyboard: `note_index` 0..12 within
    /// `octave` 1..=7, equal temperament around A4 = 440 Hz.
    pub fn play_key(&mut self, note_index: usize, octave: u32) -> Result<(), Error> {
        if note_index >= NOTES_PER_OCTAVE {
            return Err(Error::InvalidParameter {
                name: "note index",
                value: note_index as f64,
            });
        }
        if !(MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
            return Err(Error::InvalidParameter {
                name: "octave",
                value: octave as f64,
            });
        }
        let frequency = key_frequency(note_index, octave);
        self.play_note(frequency, DEFAULT_NOTE_DURATION, DEFAULT_NOTE_VELOCITY)
    }

    pub fn clear_pattern(&mut self) {
        self.control.update_pattern(|p| p.clear());
    }

    pub fn randomize_pattern(&mut self) {
        let mut rng = thread_rng();
        self.control.update_pattern(|p| p.randomize(&mut rng));
    }

    /// Apply hints from the external prompt classifier: tempo, and a preset
    /// choice for the handful of genres the classifier knows.
    pub fn apply_hints(&mut self, hints: &Hints) {
        if let Some(bpm) = hints.bpm {
            self.set_tempo(bpm);
        }
        if let Some(genre) = &hints.genre {
            let genre = genre.to_lowercase();
            let preset = if genre.contains("techno") || genre.contains("acid") {
                Some("Acid Bass")
            } else if genre.contains("ambient") {
                Some("Warm Pad")
            } else {
                None
            };
            if let Some(name) = preset {
                let _ = self.load_preset(name);
            }
        }
    }

    pub fn pattern(&self) -> DrumPattern {
        (*self.control.pattern()).clone()
    }

    pub fn tempo(&self) -> u16 {
        self.control.bpm()
    }

    pub fn is_playing(&self) -> bool {
        self.control.is_running()
    }

    pub fn current_step(&self) -> usize {
        self.control.current_step()
    }

    /// Master bus RMS level as last published by the engine.
    pub fn meter(&mut self) -> f32 {
        self.control.engine_state().level
    }

    pub fn loops(&self) -> &LoopStation {
        &self.loops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> (Workstation, Engine) {
        let (mut ws, engine) = Workstation::new();
        ws.initialize_offline();
        (ws, engine)
    }

    #[test]
    fn triggers_refused_before_initialization() {
        let (mut ws, mut engine) = Workstation::new();
        assert!(matches!(
            ws.trigger_drum("kick"),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            ws.play_note(440.0, 0.5, 1.0),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(ws.toggle_sequencer(), Err(Error::NotInitialized)));

        // nothing queued, nothing rendered
        ws.clear_pattern();
        let mut buf = vec![0.0; 1024];
        engine.process(&mut buf);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn unknown_drum_name_is_reported() {
        let (mut ws, _engine) = offline();
        assert!(matches!(
            ws.trigger_drum("cowbell"),
            Err(Error::UnknownVoice(_))
        ));
    }

    #[test]
    fn drum_names_with_punctuation_resolve() {
        let (mut ws, _engine) = offline();
        assert!(ws.trigger_drum("HI-HAT").is_ok());
        assert!(ws.trigger_drum("open hat").is_ok());
    }

    #[test]
    fn double_toggle_restores_the_cell() {
        let (mut ws, _engine) = offline();
        let before = ws.pattern().get(Lane::Snare, 5);
        ws.toggle_step(Lane::Snare, 5).unwrap();
        assert_ne!(ws.pattern().get(Lane::Snare, 5), before);
        ws.toggle_step(Lane::Snare, 5).unwrap();
        assert_eq!(ws.pattern().get(Lane::Snare, 5), before);
    }

    #[test]
    fn toggle_step_rejects_out_of_range() {
        let (mut ws, _engine) = offline();
        assert!(ws.toggle_step(Lane::Kick, PATTERN_LEN).is_err());
    }

    #[test]
    fn tempo_is_clamped() {
        let (mut ws, _engine) = offline();
        ws.set_tempo(30);
        assert_eq!(ws.tempo(), MIN_BPM);
        ws.set_tempo(500);
        assert_eq!(ws.tempo(), MAX_BPM);
        ws.set_tempo(140);
        assert_eq!(ws.tempo(), 140);
    }

    #[test]
    fn start_then_stop_leaves_step_at_zero() {
        let (mut ws, _engine) = offline();
        ws.toggle_sequencer().unwrap();
        assert!(ws.is_playing());
        ws.toggle_sequencer().unwrap();
        assert!(!ws.is_playing());
        assert_eq!(ws.current_step(), 0);
    }

    #[test]
    fn invalid_note_parameters_are_rejected() {
        let (mut ws, _engine) = offline();
        assert!(ws.play_note(-1.0, 0.5, 1.0).is_err());
        assert!(ws.play_note(440.0, 0.0, 1.0).is_err());
        assert!(ws.play_key(12, 4).is_err());
        assert!(ws.play_key(9, 4).is_ok());
    }

    #[test]
    fn play_key_bounds_the_octave() {
        let (mut ws, _engine) = offline();
        assert!(matches!(
            ws.play_key(0, 0),
            Err(Error::InvalidParameter { name: "octave", .. })
        ));
        assert!(matches!(
            ws.play_key(0, 8),
            Err(Error::InvalidParameter { name: "octave", .. })
        ));
        assert!(ws.play_key(0, 1).is_ok());
        assert!(ws.play_key(11, 7).is_ok());
    }

    #[test]
    fn chords_play_from_the_bank_and_are_gated() {
        let (mut ws, mut engine) = offline();
        ws.clear_pattern();
        assert!(matches!(
            ws.play_chord("Z MAJ"),
            Err(Error::UnknownVoice(_))
        ));

        ws.play_chord("C MIN7").unwrap();
        // the root sounds immediately, the other tones follow staggered
        let mut opening = vec![0.0; 1024];
        engine.process(&mut opening);
        assert!(opening.iter().any(|&s| s != 0.0));

        let (mut ws2, _engine2) = Workstation::new();
        assert!(matches!(ws2.play_chord("C MIN"), Err(Error::NotInitialized)));
    }

    #[test]
    fn loop_round_trip_restores_the_pattern() {
        let (mut ws, _engine) = offline();
        ws.clear_pattern();
        ws.toggle_step(Lane::Kick, 0).unwrap();
        ws.toggle_step(Lane::Hihat, 2).unwrap();
        ws.set_tempo(174);
        let captured = ws.pattern();

        ws.record_loop(0).unwrap();
        ws.record_loop(0).unwrap();

        ws.clear_pattern();
        ws.set_tempo(120);
        ws.play_loop(0).unwrap();

        assert_eq!(ws.pattern(), captured);
        assert_eq!(ws.tempo(), 174);
        assert!(ws.is_playing());
    }

    #[test]
    fn unknown_preset_is_reported() {
        let (mut ws, _engine) = offline();
        assert!(ws.load_preset("Hoover").is_err());
        assert!(ws.load_preset("acid bass").is_ok());
    }

    #[test]
    fn hints_drive_tempo_and_preset() {
        let (mut ws, _engine) = offline();
        let hints = Hints::new().with_bpm(145).with_genre("dark acid techno");
        ws.apply_hints(&hints);
        assert_eq!(ws.tempo(), 145);
        ws.apply_hints(&Hints::new().with_bpm(999));
        assert_eq!(ws.tempo(), MAX_BPM);
    }

    #[test]
    fn randomize_keeps_downbeat_kick() {
        let (mut ws, _engine) = offline();
        for _ in 0..8 {
            ws.randomize_pattern();
            assert!(ws.pattern().get(Lane::Kick, 0));
        }
    }
}
