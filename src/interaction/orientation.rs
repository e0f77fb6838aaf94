//! Discrete facing directions and the rotate transition
//!
//! Facing is an 8-valued cycle starting at north, 45° per step, clockwise.
//! Persisted lists written with the older 4-valued cycle (`up`, `right`,
//! `down`, `left`) still load; those names map onto the cardinal directions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::layout::Point;

/// Facing direction of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    #[serde(alias = "up")]
    North,
    Northeast,
    #[serde(alias = "right")]
    East,
    Southeast,
    #[serde(alias = "down")]
    South,
    Southwest,
    #[serde(alias = "left")]
    West,
    Northwest,
}

impl Facing {
    /// All directions in rotation order
    pub const ALL: [Facing; 8] = [
        Facing::North,
        Facing::Northeast,
        Facing::East,
        Facing::Southeast,
        Facing::South,
        Facing::Southwest,
        Facing::West,
        Facing::Northwest,
    ];

    /// Angle between neighbouring directions
    pub const STEP_DEGREES: f64 = 45.0;

    /// Position in the rotation cycle
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction at `index`, wrapping around the cycle
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// The rotate transition: next direction clockwise, wrapping to north
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Apply the rotate transition `times` times
    pub fn rotated(self, times: usize) -> Self {
        Self::from_index(self.index() + times % Self::ALL.len())
    }

    /// Display angle in degrees, clockwise from north
    pub fn angle_degrees(self) -> f64 {
        self.index() as f64 * Self::STEP_DEGREES
    }

    /// Unit vector in canvas coordinates (y grows downwards)
    pub fn unit_vector(self) -> Point {
        let radians = self.angle_degrees().to_radians();
        Point::new(radians.sin(), -radians.cos())
    }

    pub fn name(self) -> &'static str {
        match self {
            Facing::North => "north",
            Facing::Northeast => "northeast",
            Facing::East => "east",
            Facing::Southeast => "southeast",
            Facing::South => "south",
            Facing::Southwest => "southwest",
            Facing::West => "west",
            Facing::Northwest => "northwest",
        }
    }

    /// Parse a direction name, accepting the legacy 4-direction names
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let facing = match lower.as_str() {
            "north" | "n" | "up" => Facing::North,
            "northeast" | "ne" => Facing::Northeast,
            "east" | "e" | "right" => Facing::East,
            "southeast" | "se" => Facing::Southeast,
            "south" | "s" | "down" => Facing::South,
            "southwest" | "sw" => Facing::Southwest,
            "west" | "w" | "left" => Facing::West,
            "northwest" | "nw" => Facing::Northwest,
            _ => return None,
        };
        Some(facing)
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown direction '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_north() {
        assert_eq!(Facing::default(), Facing::North);
        assert_eq!(Facing::default().angle_degrees(), 0.0);
    }

    #[test]
    fn test_three_rotations_reach_southeast() {
        let facing = Facing::North.next().next().next();
        assert_eq!(facing, Facing::Southeast);
        assert_eq!(facing.angle_degrees(), 135.0);
    }

    #[test]
    fn test_cycle_closes_without_repeats() {
        let mut seen = Vec::new();
        let mut facing = Facing::North;
        for _ in 0..Facing::ALL.len() {
            assert!(!seen.contains(&facing), "{} repeated before cycle closed", facing);
            seen.push(facing);
            facing = facing.next();
        }
        assert_eq!(facing, Facing::North);
    }

    #[test]
    fn test_rotated_matches_repeated_next() {
        for start in Facing::ALL {
            let mut stepped = start;
            for times in 0..20 {
                assert_eq!(start.rotated(times), stepped);
                stepped = stepped.next();
            }
        }
    }

    #[test]
    fn test_angles_step_by_45() {
        let angles: Vec<f64> = Facing::ALL.iter().map(|f| f.angle_degrees()).collect();
        assert_eq!(angles, vec![0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0]);
    }

    #[test]
    fn test_unit_vector_points_up_for_north() {
        let v = Facing::North.unit_vector();
        assert!(v.x.abs() < 1e-9 && (v.y + 1.0).abs() < 1e-9);
        let v = Facing::East.unit_vector();
        assert!((v.x - 1.0).abs() < 1e-9 && v.y.abs() < 1e-9);
    }

    #[test]
    fn test_legacy_names() {
        assert_eq!(Facing::from_name("up"), Some(Facing::North));
        assert_eq!(Facing::from_name("Left"), Some(Facing::West));
        assert_eq!("southwest".parse::<Facing>(), Ok(Facing::Southwest));
        assert!("sideways".parse::<Facing>().is_err());

        let facing: Facing = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(facing, Facing::South);
        assert_eq!(serde_json::to_string(&Facing::Northeast).unwrap(), "\"northeast\"");
    }
}
