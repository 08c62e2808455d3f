use crate::drums::DrumVoice;
use crate::pattern::DrumPattern;
use crate::synth::{NoteParams, SynthPreset, PRESETS};
use anyhow::{anyhow, Result};
use atomic_float::AtomicF64;
use basedrop::{Collector, Shared, SharedCell};
use ringbuf::{Consumer, Producer, RingBuffer};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;
use triple_buffer::{Input, Output, TripleBuffer};

const COMMAND_QUEUE_LEN: usize = 64;

/// One-shot events from the control plane to the audio plane. Everything a
/// command needs is embedded by value so handling it never allocates.
pub enum EngineCommand {
    TriggerDrum { voice: DrumVoice, velocity: f32 },
    PlayNote(NoteParams),
}

/// Snapshot the engine publishes after every callback, for meters and step
/// displays.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineState {
    pub step: usize,
    pub level: f32,
}

pub struct Store {
    bpm: AtomicU16,
    running: AtomicBool,
    initialized: AtomicBool,
    current_step: AtomicUsize,
    master_volume: AtomicF64,
    preset: AtomicUsize,
    pattern: SharedCell<DrumPattern>,
}

pub trait SharedState {
    fn store(&self) -> &Arc<Store>;

    fn bpm(&self) -> u16 {
        self.store().bpm.load(Ordering::Relaxed)
    }

    fn is_running(&self) -> bool {
        self.store().running.load(Ordering::Relaxed)
    }

    fn is_initialized(&self) -> bool {
        self.store().initialized.load(Ordering::Relaxed)
    }

    fn current_step(&self) -> usize {
        self.store().current_step.load(Ordering::Relaxed)
    }

    fn master_volume(&self) -> f64 {
        self.store().master_volume.load(Ordering::Relaxed)
    }

    fn preset(&self) -> SynthPreset {
        PRESETS[self.store().preset.load(Ordering::Relaxed) % PRESETS.len()]
    }

    fn pattern(&self) -> Shared<DrumPattern> {
        self.store().pattern.get()
    }
}

pub fn controls() -> (Control, EngineControl) {
    let collector = Collector::new();
    let store = Arc::new(Store {
        bpm: AtomicU16::new(128),
        running: AtomicBool::new(false),
        initialized: AtomicBool::new(false),
        current_step: AtomicUsize::new(0),
        master_volume: AtomicF64::new(0.7),
        preset: AtomicUsize::new(0),
        pattern: SharedCell::new(Shared::new(&collector.handle(), DrumPattern::default())),
    });
    let (producer, consumer) = RingBuffer::<EngineCommand>::new(COMMAND_QUEUE_LEN).split();
    let (state_in, state_out) = TripleBuffer::<EngineState>::default().split();

    let control = Control {
        store: store.clone(),
        producer,
        collector,
        state_out,
    };
    let engine_control = EngineControl {
        store,
        consumer,
        state_in,
    };
    (control, engine_control)
}

/// Control-plane handle, owned by the workstation facade.
pub struct Control {
    store: Arc<Store>,
    producer: Producer<EngineCommand>,
    collector: Collector,
    state_out: Output<EngineState>,
}

impl Control {
    pub fn set_bpm(&self, bpm: u16) {
        self.store.bpm.store(bpm, Ordering::Relaxed)
    }

    pub fn set_running(&self, running: bool) {
        self.store.running.store(running, Ordering::Relaxed)
    }

    pub fn set_initialized(&self, initialized: bool) {
        self.store.initialized.store(initialized, Ordering::Relaxed)
    }

    pub fn set_master_volume(&self, volume: f64) {
        self.store.master_volume.store(volume, Ordering::Relaxed)
    }

    pub fn set_preset_index(&self, index: usize) {
        self.store.preset.store(index, Ordering::Relaxed)
    }

    pub fn reset_step(&self) {
        self.store.current_step.store(0, Ordering::Relaxed)
    }

    pub fn update_pattern<F>(&mut self, f: F)
    where
        F: FnOnce(&mut DrumPattern),
    {
        let mut pattern = (*self.store.pattern.get()).clone();
        f(&mut pattern);
        self.store
            .pattern
            .set(Shared::new(&self.collector.handle(), pattern));
        self.collector.collect();
    }

    pub fn set_pattern(&mut self, pattern: DrumPattern) {
        self.update_pattern(|p| *p = pattern);
    }

    pub fn trigger_drum(&mut self, voice: DrumVoice, velocity: f32) -> Result<()> {
        self.push(EngineCommand::TriggerDrum { voice, velocity })
    }

    pub fn play_note(&mut self, params: NoteParams) -> Result<()> {
        self.push(EngineCommand::PlayNote(params))
    }

    fn push(&mut self, cmd: EngineCommand) -> Result<()> {
        if self.producer.push(cmd).is_err() {
            Err(anyhow!("unable to send message to engine"))
        } else {
            Ok(())
        }
    }

    pub fn engine_state(&mut self) -> EngineState {
        *self.state_out.read()
    }
}

impl SharedState for Control {
    fn store(&self) -> &Arc<Store> {
        &self.store
    }
}

/// Audio-plane handle, owned by the engine.
pub struct EngineControl {
    store: Arc<Store>,
    consumer: Consumer<EngineCommand>,
    state_in: Input<EngineState>,
}

impl EngineControl {
    pub fn command(&mut self) -> Option<EngineCommand> {
        self.consumer.pop()
    }

    pub fn set_step(&self, step: usize) {
        self.store.current_step.store(step, Ordering::Relaxed)
    }

    pub fn publish(&mut self, state: EngineState) {
        let buf = self.state_in.input_buffer();
        *buf = state;
        self.state_in.publish();
    }
}

impl SharedState for EngineControl {
    fn store(&self) -> &Arc<Store> {
        &self.store
    }
}
