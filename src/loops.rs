use crate::error::Error;
use crate::pattern::DrumPattern;
use crate::state::{Control, SharedState};

pub const NUM_LOOPS: usize = 3;

/// One loop slot: a snapshot of the drum pattern and the tempo it was
/// captured at, plus its transport flags.
#[derive(Debug, Clone)]
struct LoopSlot {
    name: String,
    pattern: DrumPattern,
    bpm: u16,
    recording: bool,
    playing: bool,
    empty: bool,
}

impl LoopSlot {
    fn new(id: usize) -> Self {
        Self {
            name: format!("Loop {}", id + 1),
            pattern: DrumPattern::empty(),
            bpm: 128,
            recording: false,
            playing: false,
            empty: true,
        }
    }

    fn reset(&mut self) {
        self.pattern = DrumPattern::empty();
        self.bpm = 128;
        self.recording = false;
        self.playing = false;
        self.empty = true;
    }
}

/// Three-slot loop station. Slots capture the live pattern and tempo when a
/// recording is stopped, and playing a slot loads that snapshot back and
/// drives the transport. At most one slot records or plays at a time.
pub struct LoopStation {
    slots: [LoopSlot; NUM_LOOPS],
}

impl LoopStation {
    pub fn new() -> Self {
        Self {
            slots: [LoopSlot::new(0), LoopSlot::new(1), LoopSlot::new(2)],
        }
    }

    fn check_slot(&self, id: usize) -> Result<(), Error> {
        if id < NUM_LOOPS {
            Ok(())
        } else {
            Err(Error::InvalidParameter {
                name: "loop slot",
                value: id as f64,
            })
        }
    }

    /// Toggle recording on a slot. Arming stops any other recording; the
    /// pattern and tempo are snapshotted when recording is stopped, not when
    /// it starts.
    pub fn record(&mut self, id: usize, control: &mut Control) -> Result<(), Error> {
        self.check_slot(id)?;
        let was_recording = self.slots[id].recording;
        for slot in &mut self.slots {
            slot.recording = false;
        }
        let slot = &mut self.slots[id];
        if was_recording {
            slot.pattern = (*control.pattern()).clone();
            slot.bpm = control.bpm();
            slot.empty = false;
        } else {
            slot.recording = true;
        }
        Ok(())
    }

    /// Toggle playback of a slot. Starting loads the slot's pattern and
    /// tempo and starts the transport if it is stopped; stopping halts the
    /// transport. Empty slots are ignored.
    pub fn play(&mut self, id: usize, control: &mut Control) -> Result<(), Error> {
        self.check_slot(id)?;
        if self.slots[id].empty {
            return Ok(());
        }
        let was_playing = self.slots[id].playing;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.playing = i == id && !was_playing;
        }
        if !was_playing {
            control.set_pattern(self.slots[id].pattern.clone());
            control.set_bpm(self.slots[id].bpm);
            if !control.is_running() {
                control.set_running(true);
            }
        } else if control.is_running() {
            control.set_running(false);
            control.reset_step();
        }
        Ok(())
    }

    /// Reset a slot back to empty, stopping it if it was active.
    pub fn clear(&mut self, id: usize) -> Result<(), Error> {
        self.check_slot(id)?;
        self.slots[id].reset();
        Ok(())
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.slots.get(id).map(|s| s.name.as_str())
    }

    pub fn is_recording(&self, id: usize) -> bool {
        self.slots.get(id).map_or(false, |s| s.recording)
    }

    pub fn is_playing(&self, id: usize) -> bool {
        self.slots.get(id).map_or(false, |s| s.playing)
    }

    pub fn is_empty(&self, id: usize) -> bool {
        self.slots.get(id).map_or(true, |s| s.empty)
    }
}

impl Default for LoopStation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Lane;
    use crate::state::controls;

    #[test]
    fn record_snapshots_on_stop() {
        let (mut control, _engine) = controls();
        let mut station = LoopStation::new();

        station.record(0, &mut control).unwrap();
        assert!(station.is_recording(0));
        assert!(station.is_empty(0));

        control.update_pattern(|p| {
            p.clear();
            p.set(Lane::Snare, 3, true);
        });
        control.set_bpm(150);

        station.record(0, &mut control).unwrap();
        assert!(!station.is_recording(0));
        assert!(!station.is_empty(0));
        assert!(station.slots[0].pattern.get(Lane::Snare, 3));
        assert_eq!(station.slots[0].bpm, 150);
    }

    #[test]
    fn arming_one_slot_disarms_the_others() {
        let (mut control, _engine) = controls();
        let mut station = LoopStation::new();
        station.record(0, &mut control).unwrap();
        station.record(2, &mut control).unwrap();
        assert!(!station.is_recording(0));
        assert!(station.is_recording(2));
    }

    #[test]
    fn play_loads_snapshot_and_starts_transport() {
        let (mut control, _engine) = controls();
        let mut station = LoopStation::new();

        control.update_pattern(|p| {
            p.clear();
            p.set(Lane::Kick, 7, true);
        });
        control.set_bpm(90);
        station.record(1, &mut control).unwrap();
        station.record(1, &mut control).unwrap();

        // change the live state, then recall the loop
        control.update_pattern(|p| p.clear());
        control.set_bpm(128);
        station.play(1, &mut control).unwrap();

        assert!(station.is_playing(1));
        assert!(control.is_running());
        assert_eq!(control.bpm(), 90);
        assert!(control.pattern().get(Lane::Kick, 7));
    }

    #[test]
    fn play_again_stops_the_transport() {
        let (mut control, _engine) = controls();
        let mut station = LoopStation::new();
        station.record(0, &mut control).unwrap();
        station.record(0, &mut control).unwrap();

        station.play(0, &mut control).unwrap();
        station.play(0, &mut control).unwrap();
        assert!(!station.is_playing(0));
        assert!(!control.is_running());
        assert_eq!(control.current_step(), 0);
    }

    #[test]
    fn empty_slot_is_ignored() {
        let (mut control, _engine) = controls();
        let mut station = LoopStation::new();
        station.play(0, &mut control).unwrap();
        assert!(!station.is_playing(0));
        assert!(!control.is_running());
    }

    #[test]
    fn clear_on_empty_slot_is_harmless() {
        let mut station = LoopStation::new();
        station.clear(1).unwrap();
        assert_eq!(station.name(1), Some("Loop 2"));
        assert!(station.is_empty(1));
        assert!(!station.is_recording(1));
        assert!(!station.is_playing(1));
        assert!(station.slots[1].pattern.is_empty());
    }

    #[test]
    fn clear_resets_a_slot() {
        let (mut control, _engine) = controls();
        let mut station = LoopStation::new();
        station.record(2, &mut control).unwrap();
        station.record(2, &mut control).unwrap();
        station.clear(2).unwrap();
        assert!(station.is_empty(2));
        assert!(!station.is_playing(2));
    }

    #[test]
    fn out_of_range_slot_is_an_error() {
        let (mut control, _engine) = controls();
        let mut station = LoopStation::new();
        assert!(station.record(NUM_LOOPS, &mut control).is_err());
    }
}
