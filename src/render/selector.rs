use crate::pet::sprite::{Frame, Half, SpriteKey};

/// Frame picked for this render and whether it differs from the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub frame: Frame,
    pub redraw: bool,
}

/// Resolves the pet's sprite key to a concrete frame and suppresses redraws
/// while the frame does not change.
#[derive(Debug, Default)]
pub struct FrameSelector {
    last: Option<Frame>,
}

impl FrameSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame to show for `key`: the first half of the cycle while
    /// `frame_count < frame_min`, the second half after.
    pub fn resolve(key: SpriteKey, frame_count: u32, frame_min: u32) -> Frame {
        let half = if !key.is_animated() {
            None
        } else if frame_count < frame_min {
            Some(Half::First)
        } else {
            Some(Half::Second)
        };
        Frame { key, half }
    }

    /// Resolve and compare against the last selected frame.
    pub fn select(&mut self, key: SpriteKey, frame_count: u32, frame_min: u32) -> Selection {
        let frame = Self::resolve(key, frame_count, frame_min);
        let redraw = self.last != Some(frame);
        if redraw {
            self.last = Some(frame);
        }
        Selection { frame, redraw }
    }

    /// Last frame handed out, if any.
    pub fn current(&self) -> Option<Frame> {
        self.last
    }

    /// Forget the last frame so the next selection redraws.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
