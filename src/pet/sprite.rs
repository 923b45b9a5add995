use std::fmt;

use super::direction::Direction;

/// Resting behaviors, in the order the cat drifts through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Awake,
    Scratch,
    Wash,
    Yawn,
    Sleep,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Self::Awake, Self::Scratch, Self::Wash, Self::Yawn, Self::Sleep];

    pub fn name(self) -> &'static str {
        match self {
            Self::Awake => "awake",
            Self::Scratch => "scratch",
            Self::Wash => "wash",
            Self::Yawn => "yawn",
            Self::Sleep => "sleep",
        }
    }
}

/// Base sprite the pet wants shown. A closed set: every key has art.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Idle(Mood),
    Run(Direction),
}

impl SpriteKey {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle(mood) => mood.name(),
            Self::Run(dir) => dir.name(),
        }
    }

    /// Whether the key alternates between two frames.
    pub fn is_animated(self) -> bool {
        self != Self::Idle(Mood::Awake)
    }
}

/// Which half of a two-frame cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Half {
    First,
    Second,
}

/// A concrete image: a sprite key plus, for animated keys, the cycle half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    pub key: SpriteKey,
    pub half: Option<Half>,
}

/// Number of distinct frames: `awake`, 4 idle moods x 2, 8 directions x 2.
pub const FRAME_COUNT: usize = 1 + 4 * 2 + 8 * 2;

impl Frame {
    /// The static single-frame awake pose.
    pub const AWAKE: Frame = Frame {
        key: SpriteKey::Idle(Mood::Awake),
        half: None,
    };

    /// Every frame with art, in [`Frame::index`] order.
    pub fn all() -> impl Iterator<Item = Frame> {
        let idle = Mood::ALL
            .into_iter()
            .map(SpriteKey::Idle)
            .filter(|k| k.is_animated());
        let run = Direction::ALL.into_iter().map(SpriteKey::Run);
        std::iter::once(Self::AWAKE).chain(idle.chain(run).flat_map(|key| {
            [Half::First, Half::Second].map(move |h| Frame { key, half: Some(h) })
        }))
    }

    /// Dense index in `0..FRAME_COUNT`, used to address per-frame tables.
    pub fn index(self) -> usize {
        let half = match self.half {
            None | Some(Half::First) => 0,
            Some(Half::Second) => 1,
        };
        let slot = match self.key {
            SpriteKey::Idle(Mood::Awake) => return 0,
            SpriteKey::Idle(Mood::Scratch) => 0,
            SpriteKey::Idle(Mood::Wash) => 1,
            SpriteKey::Idle(Mood::Yawn) => 2,
            SpriteKey::Idle(Mood::Sleep) => 3,
            SpriteKey::Run(dir) => 4 + dir as usize,
        };
        1 + slot * 2 + half
    }

    /// Asset name, e.g. `awake`, `scratch1`, `upright2`.
    pub fn name(self) -> String {
        match self.half {
            None => self.key.name().to_string(),
            Some(Half::First) => format!("{}1", self.key.name()),
            Some(Half::Second) => format!("{}2", self.key.name()),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
