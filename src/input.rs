use glam::DVec2;

/// Cursor position and primary-click edges gathered between ticks.
///
/// winit reports the cursor only while it is over our window, so the screen
/// position is rebuilt from `CursorMoved` (exact, window-relative) and raw
/// `MouseMotion` deltas while the cursor is elsewhere. Platforms with a
/// global cursor query overwrite it with [`InputState::set_cursor`].
pub struct InputState {
    cursor: DVec2,
    inside: bool,
    left_was_down: bool,
    clicked: bool,
}

impl InputState {
    pub fn new(cursor: DVec2) -> Self {
        Self {
            cursor,
            inside: false,
            left_was_down: false,
            clicked: false,
        }
    }

    /// Cursor in screen pixels.
    pub fn cursor(&self) -> DVec2 {
        self.cursor
    }

    pub fn set_cursor(&mut self, pos: DVec2) {
        self.cursor = pos;
    }

    /// `CursorMoved`: `local` is relative to the window's client area at
    /// `window_origin`.
    pub fn cursor_moved(&mut self, window_origin: DVec2, local: DVec2) {
        self.cursor = window_origin + local;
        self.inside = true;
    }

    pub fn cursor_left(&mut self) {
        self.inside = false;
    }

    /// Raw pointer motion. Ignored while `CursorMoved` is authoritative.
    pub fn mouse_motion(&mut self, delta: DVec2) {
        if !self.inside {
            self.cursor += delta;
        }
    }

    /// Primary button state change. A press after a release is one click.
    pub fn primary_button(&mut self, down: bool) {
        if down && !self.left_was_down {
            self.clicked = true;
        }
        self.left_was_down = down;
    }

    /// Whether a click landed since the last call.
    pub fn take_click(&mut self) -> bool {
        std::mem::take(&mut self.clicked)
    }
}
