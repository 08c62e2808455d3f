use crate::audio::{Limiter, Rms};
use crate::drums::{DrumKit, DrumVoice};
use crate::pattern::Lane;
use crate::seq::Sequencer;
use crate::state::{EngineCommand, EngineControl, EngineState, SharedState};
use crate::synth::SynthVoice;
use crate::{MAX_DRUM_HITS, MAX_SYNTH_VOICES, SAMPLE_RATE};

const RMS_WINDOW_SIZE: usize = SAMPLE_RATE as usize / 10 * 3;
const LIMITER_THRESHOLD: f32 = 0.95;

/// Pads are played back at most at this fraction of full scale so stacked
/// hits leave headroom before the limiter.
const DRUM_TRIGGER_SCALE: f32 = 0.8;

/// One-shot playback of a pre-rendered drum buffer through a gain.
#[derive(Debug, Clone, Copy)]
struct DrumHit {
    voice: DrumVoice,
    position: usize,
    gain: f32,
    active: bool,
}

impl DrumHit {
    const IDLE: DrumHit = DrumHit {
        voice: DrumVoice::Kick,
        position: 0,
        gain: 0.0,
        active: false,
    };
}

/// Audio-plane renderer. Runs inside the output stream callback (or is
/// driven directly for offline rendering); everything it needs is owned or
/// reached through the lock-free `EngineControl`, and `process` never
/// allocates.
pub struct Engine {
    ctrl: EngineControl,
    kit: DrumKit,
    seq: Sequencer,
    hits: [DrumHit; MAX_DRUM_HITS],
    voices: [SynthVoice; MAX_SYNTH_VOICES],
    limiter: Limiter,
    rms: Rms,
}

impl Engine {
    pub fn new(ctrl: EngineControl) -> Engine {
        Self {
            ctrl,
            kit: DrumKit::new(),
            seq: Sequencer::new(),
            hits: [DrumHit::IDLE; MAX_DRUM_HITS],
            voices: [SynthVoice::silent(); MAX_SYNTH_VOICES],
            limiter: Limiter::new(LIMITER_THRESHOLD),
            rms: Rms::new(RMS_WINDOW_SIZE),
        }
    }

    /// Render one buffer of the master bus. Ticks of the step clock land
    /// sample-accurately inside the buffer by rendering in sub-blocks, the
    /// same way the pattern clock of a tracker slices its callback.
    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = 0.0;
        }
        self.run_commands();

        let running = self.ctrl.is_running();
        let bpm = self.ctrl.bpm();

        let mut offset = 0;
        while offset < buffer.len() {
            if let Some(step) = self.seq.advance(running, bpm) {
                let pattern = self.ctrl.pattern();
                for lane in Lane::ALL {
                    if pattern.get(lane, step) {
                        self.trigger_drum(lane.voice(), lane.velocity());
                    }
                }
                self.ctrl.set_step(self.seq.step());
            }

            let n = self.seq.block_len(buffer.len() - offset);
            if n == 0 {
                continue;
            }
            let block = &mut buffer[offset..offset + n];
            self.render_hits(block);
            for voice in &mut self.voices {
                voice.render(block);
            }
            offset += n;
        }

        let gain = self.ctrl.master_volume() as f32;
        for sample in buffer.iter_mut() {
            *sample *= gain;
        }
        self.limiter.process(buffer);

        self.rms.add_samples(buffer);
        self.ctrl.publish(EngineState {
            step: self.seq.step(),
            level: self.rms.value(),
        });
    }

    fn run_commands(&mut self) {
        while let Some(cmd) = self.ctrl.command() {
            match cmd {
                EngineCommand::TriggerDrum { voice, velocity } => {
                    self.trigger_drum(voice, velocity);
                }
                EngineCommand::PlayNote(params) => {
                    match self.voices.iter_mut().find(|v| !v.is_active()) {
                        Some(slot) => *slot = SynthVoice::start(&params),
                        None => eprintln!("dropped note, voice pool exhausted"),
                    }
                }
            }
        }
    }

    fn trigger_drum(&mut self, voice: DrumVoice, velocity: f32) {
        match self.hits.iter_mut().find(|h| !h.active) {
            Some(slot) => {
                *slot = DrumHit {
                    voice,
                    position: 0,
                    gain: velocity * DRUM_TRIGGER_SCALE,
                    active: true,
                };
            }
            None => eprintln!("dropped drum hit, pool exhausted"),
        }
    }

    fn render_hits(&mut self, block: &mut [f32]) {
        for hit in &mut self.hits {
            if !hit.active {
                continue;
            }
            let sample_buf = self.kit.buffer(hit.voice);
            let n = usize::min(block.len(), sample_buf.len() - hit.position);
            for (out, &sample) in block[..n].iter_mut().zip(&sample_buf[hit.position..]) {
                *out += sample * hit.gain;
            }
            hit.position += n;
            if hit.position >= sample_buf.len() {
                hit.active = false;
            }
        }
    }
}
