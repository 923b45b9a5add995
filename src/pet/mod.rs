//! Behavior engine for the desktop cat.
//!
//! Once per tick [`Pet::step`] decides whether the cat rests or chases the
//! cursor. While resting it drifts through a fixed progression of moods
//! (awake, scratch, wash, yawn, sleep) paced by a frame counter; while
//! chasing it runs one of eight compass directions toward the cursor.

pub mod direction;
pub mod sprite;

use glam::DVec2;

use self::direction::{manhattan, Direction};
use self::sprite::{Mood, SpriteKey};

/// Edge length of the sprite art in pixels, before window scaling.
pub const SPRITE_SIZE: u32 = 32;

/// First idle phase of each resting band.
const SCRATCH_PHASE: u32 = 4;
const WASH_PHASE: u32 = 7;
const YAWN_PHASE: u32 = 10;
const SLEEP_PHASE: u32 = 13;

/// Sounds the behavior engine can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Mid-yawn.
    Idle3,
    /// Woken from sleep by the cursor.
    Awake,
    /// Dozed off.
    Sleep,
}

impl SoundCue {
    pub const ALL: [SoundCue; 3] = [Self::Idle3, Self::Awake, Self::Sleep];

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle3 => "idle3",
            Self::Awake => "awake",
            Self::Sleep => "sleep",
        }
    }
}

/// Ticks spent in each half of a two-frame cycle.
///
/// The first frame shows while the counter is below `min`; the cycle rolls
/// over once it passes `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    pub min: u32,
    pub max: u32,
}

impl FrameWindow {
    pub const DEFAULT: FrameWindow = FrameWindow { min: 8, max: 16 };
    pub const YAWN: FrameWindow = FrameWindow { min: 32, max: 64 };
}

/// Static parameters of the behavior engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Pixels moved per tick while chasing.
    pub speed: f64,
    /// Cursor distance below which the cat settles. Equals the on-screen
    /// sprite edge length.
    pub reach: f64,
    /// Pace of every mood except yawning and sleeping.
    pub pace: FrameWindow,
    /// Slower pace used from the first yawn until the cat wakes.
    pub drowsy_pace: FrameWindow,
}

impl Tuning {
    /// Defaults for a sprite drawn at `scale` times its art size.
    pub fn new(speed: f64, scale: f64) -> Self {
        Self {
            speed,
            reach: SPRITE_SIZE as f64 * scale,
            pace: FrameWindow::DEFAULT,
            drowsy_pace: FrameWindow::YAWN,
        }
    }
}

/// Screen rectangle the window must stay inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub origin: DVec2,
    pub size: DVec2,
}

impl Bounds {
    pub fn new(origin: DVec2, size: DVec2) -> Self {
        Self { origin, size }
    }

    pub fn center(&self) -> DVec2 {
        self.origin + self.size * 0.5
    }

    /// Clamp a window's top-left so the whole window stays on this monitor.
    /// A window bigger than the monitor is pinned to the origin.
    pub fn clamp(&self, position: DVec2, window: DVec2) -> DVec2 {
        let max = self.origin + (self.size - window).max(DVec2::ZERO);
        position.clamp(self.origin, max)
    }
}

/// Everything the engine samples from the outside world for one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// Cursor in screen pixels.
    pub cursor: DVec2,
    /// Primary button went down since the previous tick.
    pub clicked: bool,
    /// Window size in screen pixels.
    pub window: DVec2,
    /// Monitor the window lives on.
    pub monitor: Bounds,
}

/// Mutable state of the one cat on screen.
#[derive(Debug, Clone)]
pub struct PetState {
    /// Window top-left in screen pixels.
    pub position: DVec2,
    /// Rest progression counter. 0 means freshly caught up with the cursor.
    pub idle_phase: u32,
    /// Ticks since the current cycle started.
    pub frame_count: u32,
    pub window: FrameWindow,
    pub sprite: SpriteKey,
    /// Paused by the user: stays put whatever the cursor does.
    pub waiting: bool,
}

impl PetState {
    pub fn new(position: DVec2, pace: FrameWindow) -> Self {
        Self {
            position,
            idle_phase: 0,
            frame_count: 0,
            window: pace,
            sprite: SpriteKey::Idle(Mood::Awake),
            waiting: false,
        }
    }

    /// Mood for the current idle phase.
    pub fn mood(&self) -> Mood {
        mood_for_phase(self.idle_phase)
    }

    pub fn is_asleep(&self) -> bool {
        self.idle_phase >= SLEEP_PHASE
    }
}

fn mood_for_phase(phase: u32) -> Mood {
    match phase {
        0..SCRATCH_PHASE => Mood::Awake,
        SCRATCH_PHASE..WASH_PHASE => Mood::Scratch,
        WASH_PHASE..YAWN_PHASE => Mood::Wash,
        YAWN_PHASE..SLEEP_PHASE => Mood::Yawn,
        _ => Mood::Sleep,
    }
}

/// The behavior state machine.
pub struct Pet {
    pub state: PetState,
    tuning: Tuning,
}

impl Pet {
    /// A fresh, awake cat with its window top-left at the monitor center.
    pub fn new(tuning: Tuning, monitor: &Bounds) -> Self {
        Self {
            state: PetState::new(monitor.center(), tuning.pace),
            tuning,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Advance one tick. Returns the sound to play, if any.
    ///
    /// A cycle that overran its window on the previous tick restarts here,
    /// so the overrun count stays visible to the renderer for one frame.
    pub fn step(&mut self, input: &TickInput) -> Option<SoundCue> {
        let mut cue = self.roll_over();
        let s = &mut self.state;

        s.frame_count += 1;
        if s.mood() == Mood::Yawn && s.frame_count == s.window.min {
            cue = Some(SoundCue::Idle3);
        }

        // Keeps the cat from sticking past the screen edge or wandering
        // onto another monitor.
        s.position = input.monitor.clamp(s.position, input.window);

        let center = s.position + input.window * 0.5;
        let offset = input.cursor - center;

        if manhattan(offset) < self.tuning.reach || s.waiting {
            self.rest();
            if input.clicked {
                self.state.waiting = !self.state.waiting;
                log::debug!("waiting: {}", self.state.waiting);
            }
        } else {
            // A cat that just dozed off wakes straight back up; the wake
            // sound replaces the sleep one.
            if self.state.is_asleep() {
                cue = Some(SoundCue::Awake);
            }
            self.chase(offset, input);
        }

        cue
    }

    /// Idle branch: pick the sprite for the current phase.
    fn rest(&mut self) {
        let s = &mut self.state;
        if s.idle_phase == 0 {
            s.idle_phase = 1;
        }
        let mood = s.mood();
        if mood == Mood::Yawn {
            s.window = self.tuning.drowsy_pace;
        }
        s.sprite = SpriteKey::Idle(mood);
    }

    /// Alert branch: reset the rest progression and run at the cursor.
    fn chase(&mut self, offset: DVec2, input: &TickInput) {
        let s = &mut self.state;
        s.idle_phase = 0;
        s.window = self.tuning.pace;

        let dir = Direction::from_offset(offset);
        s.position = input
            .monitor
            .clamp(s.position + dir.step(self.tuning.speed), input.window);
        s.sprite = SpriteKey::Run(dir);
    }

    /// Restart the frame cycle once it passes its window, moving a resting
    /// cat one phase further along.
    fn roll_over(&mut self) -> Option<SoundCue> {
        let s = &mut self.state;
        if s.frame_count <= s.window.max {
            return None;
        }
        s.frame_count = 0;
        if s.idle_phase == 0 {
            return None;
        }

        let before = s.mood();
        s.idle_phase += 1;
        if s.mood() != before {
            log::debug!("mood {:?} -> {:?}", before, s.mood());
        }
        (s.idle_phase == SLEEP_PHASE).then_some(SoundCue::Sleep)
    }
}
