use glam::DVec2;
use std::f64::consts::FRAC_1_SQRT_2;

/// One of the eight compass directions the cat can run in.
///
/// Screen space: +x is right, +y is down, so 270 degrees points up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Self::Up,
        Self::UpRight,
        Self::Right,
        Self::DownRight,
        Self::Down,
        Self::DownLeft,
        Self::Left,
        Self::UpLeft,
    ];

    /// Sprite base name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::UpRight => "upright",
            Self::Right => "right",
            Self::DownRight => "downright",
            Self::Down => "down",
            Self::DownLeft => "downleft",
            Self::Left => "left",
            Self::UpLeft => "upleft",
        }
    }

    /// Direction of a screen-space offset.
    pub fn from_offset(offset: DVec2) -> Self {
        Self::from_degrees(angle_degrees(offset))
    }

    /// Map an angle in `[0, 360)` to its 45 degree sector.
    ///
    /// Sectors are half-open `(lo, hi]` with edges on the 22.5 degree marks,
    /// so 292.5 is `Up` and 0 is `Right`. Out-of-range input is wrapped first.
    pub fn from_degrees(angle: f64) -> Self {
        let a = angle.rem_euclid(360.0);
        match a {
            a if a > 337.5 || a <= 22.5 => Self::Right,
            a if a <= 67.5 => Self::DownRight,
            a if a <= 112.5 => Self::Down,
            a if a <= 157.5 => Self::DownLeft,
            a if a <= 202.5 => Self::Left,
            a if a <= 247.5 => Self::UpLeft,
            a if a <= 292.5 => Self::Up,
            _ => Self::UpRight,
        }
    }

    /// Unit step in this direction. Diagonals are `1/sqrt(2)` per axis.
    pub fn unit(self) -> DVec2 {
        let d = FRAC_1_SQRT_2;
        match self {
            Self::Up => DVec2::new(0.0, -1.0),
            Self::UpRight => DVec2::new(d, -d),
            Self::Right => DVec2::new(1.0, 0.0),
            Self::DownRight => DVec2::new(d, d),
            Self::Down => DVec2::new(0.0, 1.0),
            Self::DownLeft => DVec2::new(-d, d),
            Self::Left => DVec2::new(-1.0, 0.0),
            Self::UpLeft => DVec2::new(-d, -d),
        }
    }

    /// Movement for one tick at `speed` pixels per tick.
    pub fn step(self, speed: f64) -> DVec2 {
        self.unit() * speed
    }
}

/// Angle of `offset` in degrees, normalized to `[0, 360)`.
pub fn angle_degrees(offset: DVec2) -> f64 {
    let r = offset.y.atan2(offset.x);
    (r.to_degrees() + 360.0) % 360.0
}

/// `|dx| + |dy|`.
pub fn manhattan(offset: DVec2) -> f64 {
    offset.x.abs() + offset.y.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_edges_belong_to_lower_sector() {
        assert_eq!(Direction::from_degrees(292.5), Direction::Up);
        assert_eq!(Direction::from_degrees(292.6), Direction::UpRight);
        assert_eq!(Direction::from_degrees(22.5), Direction::Right);
        assert_eq!(Direction::from_degrees(337.5), Direction::UpRight);
        assert_eq!(Direction::from_degrees(337.6), Direction::Right);
        assert_eq!(Direction::from_degrees(67.5), Direction::DownRight);
        assert_eq!(Direction::from_degrees(247.5), Direction::UpLeft);
    }

    #[test]
    fn zero_and_full_turn_are_right() {
        assert_eq!(Direction::from_degrees(0.0), Direction::Right);
        assert_eq!(Direction::from_degrees(360.0), Direction::Right);
        assert_eq!(Direction::from_degrees(-0.0), Direction::Right);
    }

    #[test]
    fn every_angle_maps_to_one_direction() {
        let mut seen = std::collections::HashSet::new();
        let mut a = 0.0;
        while a < 360.0 {
            seen.insert(Direction::from_degrees(a));
            a += 0.25;
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn sector_centers() {
        let centers = [
            (270.0, Direction::Up),
            (315.0, Direction::UpRight),
            (0.0, Direction::Right),
            (45.0, Direction::DownRight),
            (90.0, Direction::Down),
            (135.0, Direction::DownLeft),
            (180.0, Direction::Left),
            (225.0, Direction::UpLeft),
        ];
        for (angle, dir) in centers {
            assert_eq!(Direction::from_degrees(angle), dir, "angle {angle}");
        }
    }

    #[test]
    fn angle_is_normalized() {
        assert!((angle_degrees(DVec2::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
        assert!((angle_degrees(DVec2::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert_eq!(angle_degrees(DVec2::ZERO), 0.0);
    }

    #[test]
    fn offsets_pick_screen_directions() {
        assert_eq!(Direction::from_offset(DVec2::new(200.0, 0.0)), Direction::Right);
        assert_eq!(Direction::from_offset(DVec2::new(0.0, -200.0)), Direction::Up);
        assert_eq!(Direction::from_offset(DVec2::new(100.0, -100.0)), Direction::UpRight);
        assert_eq!(Direction::from_offset(DVec2::new(-100.0, 100.0)), Direction::DownLeft);
    }

    #[test]
    fn every_step_has_speed_magnitude() {
        for dir in Direction::ALL {
            let v = dir.step(2.0);
            assert!((v.length() - 2.0).abs() < 1e-9, "{dir:?} moved {}", v.length());
        }
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(manhattan(DVec2::new(-3.0, 4.0)), 7.0);
    }
}
