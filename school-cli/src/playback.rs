use school_core::School;

/// Decides, frame by frame, whether the school advances.
///
/// The school itself has no notion of being paused; this is the caller's
/// run state. A pending single-step request always wins over the play flag
/// and is consumed by the frame that honours it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Playback {
    playing: bool,
    step_requested: bool,
}

impl Playback {
    pub fn new(playing: bool) -> Self {
        Self {
            playing,
            step_requested: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_step_requested(&self) -> bool {
        self.step_requested
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn toggle_play(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn request_step(&mut self) {
        self.step_requested = true;
    }

    /// Runs one frame. Returns `true` if the school was stepped.
    pub fn tick(&mut self, school: &mut School) -> bool {
        if self.step_requested {
            self.step_requested = false;
        } else if !self.playing {
            return false;
        }

        let reflected = school.update();
        if reflected > 0 {
            log::debug!("{} fish reflected at the sphere boundary", reflected);
        }
        true
    }
}
