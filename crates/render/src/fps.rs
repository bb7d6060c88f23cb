use std::time::{SystemTime, UNIX_EPOCH};

/// Millisecond part of the current wall-clock second, in `0..1000`.
pub fn subsec_millis_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_millis())
        .unwrap_or(0)
}

/// Frames-per-second counter driven by the sub-second wall clock.
///
/// Frames are tallied until the sub-second timestamp goes backwards, which
/// happens when the wall-clock second rolls over. The tally is then published
/// and reset. The measured window depends on phase and is anywhere in
/// (0, 1000) ms, so the figure is approximate.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    last_millis: u32,
    frames: u32,
    published: Option<u32>,
}

impl FpsCounter {
    /// Start counting from the given sub-second timestamp.
    pub fn new(now_millis: u32) -> Self {
        Self {
            last_millis: now_millis,
            frames: 0,
            published: None,
        }
    }

    /// Count one frame observed at `now_millis`. Returns the published figure
    /// when this frame closed a window.
    pub fn tick(&mut self, now_millis: u32) -> Option<u32> {
        self.frames += 1;
        let rolled_over = self.last_millis > now_millis;
        self.last_millis = now_millis;
        if !rolled_over {
            return None;
        }
        let fps = self.frames;
        self.published = Some(fps);
        self.frames = 0;
        tracing::debug!(fps, "frame rate window closed");
        Some(fps)
    }

    /// Take back the frame counted by the last [`Self::tick`] because it never
    /// reached the screen. Only meaningful right after `tick`.
    pub fn retract(&mut self) {
        if self.frames > 0 {
            self.frames -= 1;
        } else if let Some(fps) = &mut self.published {
            *fps = fps.saturating_sub(1);
        }
    }

    /// Frames tallied in the current window.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn published(&self) -> Option<u32> {
        self.published
    }

    /// Text for the on-screen counter.
    pub fn label(&self) -> String {
        match self.published {
            Some(fps) => format!("{fps} fps"),
            None => "000 fps".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_on_rollover() {
        let mut counter = FpsCounter::new(10);
        assert_eq!(counter.tick(40), None);
        assert_eq!(counter.tick(70), None);
        assert_eq!(counter.frames(), 2);

        assert_eq!(counter.tick(5), Some(3));
        assert_eq!(counter.frames(), 0);
        assert_eq!(counter.published(), Some(3));

        assert_eq!(counter.tick(50), None);
        assert_eq!(counter.frames(), 1);
        assert_eq!(counter.published(), Some(3));
    }

    #[test]
    fn equal_timestamps_do_not_roll_over() {
        let mut counter = FpsCounter::new(500);
        for _ in 0..10 {
            assert_eq!(counter.tick(500), None);
        }
        assert_eq!(counter.frames(), 10);
    }

    #[test]
    fn label_before_and_after_publish() {
        let mut counter = FpsCounter::new(900);
        assert_eq!(counter.label(), "000 fps");
        counter.tick(950);
        counter.tick(20);
        assert_eq!(counter.label(), "2 fps");
    }

    #[test]
    fn retract_undoes_the_last_tick() {
        let mut counter = FpsCounter::new(10);
        counter.tick(40);
        counter.tick(70);
        counter.retract();
        assert_eq!(counter.frames(), 1);

        assert_eq!(counter.tick(5), Some(2));
        counter.retract();
        assert_eq!(counter.published(), Some(1));
        assert_eq!(counter.label(), "1 fps");
    }

    #[test]
    fn wall_clock_is_sub_second() {
        assert!(subsec_millis_now() < 1000);
    }
}
