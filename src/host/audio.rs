use super::Audio;
use std::cell::RefCell;
use std::rc::Rc;

/// Writes each audio request to a shared log instead of making sound.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    log: Rc<RefCell<Vec<String>>>,
}

impl RecordingAudio {
    pub fn new() -> RecordingAudio {
        RecordingAudio::default()
    }

    /// A handle on the log that stays valid after the player moves into a `Host`.
    pub fn log(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.log)
    }

    fn record(&mut self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl Audio for RecordingAudio {
    fn set_tempo(&mut self, bpm: f64) {
        self.record(format!("TEMPO {}", bpm));
    }

    fn set_volume(&mut self, volume: u8) {
        self.record(format!("VOLUME {}", volume));
    }

    fn set_voice(&mut self, voice: usize) {
        self.record(format!("VOICE {}", voice));
    }

    fn play_sequence(&mut self, voice: usize, mml: &str) {
        self.record(format!("PLAY {} {}", voice, mml));
    }

    fn stop(&mut self) {
        self.record("STOP".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_shared() {
        let mut audio = RecordingAudio::new();
        let log = audio.log();
        audio.set_tempo(120.0);
        audio.play_sequence(0, "CDE");
        audio.stop();
        assert_eq!(*log.borrow(), vec!["TEMPO 120", "PLAY 0 CDE", "STOP"]);
    }
}
