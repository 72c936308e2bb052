//! Grid Coordinates
//!
//! Integer tile-grid positions and the compass directions between them.
//!
//! # Example
//!
//! ```
//! use sound_events::{Direction, Tripoint};
//!
//! let listener = Tripoint::new(10, 10, 0);
//! let source = Tripoint::new(10, 4, 0);
//! assert_eq!(listener.grid_distance(source), 6);
//! assert_eq!(Direction::between(listener, source).to_string(), "north");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Tangent of 67.5 degrees, the boundary between a cardinal and a diagonal sector.
const SECTOR_TANGENT: f32 = 2.414_213_5;

/// A position on the tile grid. `y` grows southwards, `z` is the elevation layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Tripoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Tripoint {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chebyshev distance over all three axes.
    pub fn grid_distance(self, other: Tripoint) -> i32 {
        let d = other - self;
        d.x.abs().max(d.y.abs()).max(d.z.abs())
    }

    /// Chebyshev distance on the horizontal plane, ignoring elevation.
    pub fn planar_distance(self, other: Tripoint) -> i32 {
        let d = other - self;
        d.x.abs().max(d.y.abs())
    }

    /// Straight-line distance to a fractional position.
    pub fn euclidean_distance_to(self, x: f32, y: f32, z: f32) -> f32 {
        let dx = x - self.x as f32;
        let dy = y - self.y as f32;
        let dz = z - self.z as f32;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Every point in the `(2 * radius + 1)` square around this one, on the same layer.
    pub fn points_in_radius(self, radius: i32) -> impl Iterator<Item = Tripoint> {
        let radius = radius.max(0);
        (-radius..=radius).flat_map(move |dy| {
            (-radius..=radius).map(move |dx| Tripoint::new(self.x + dx, self.y + dy, self.z))
        })
    }

    /// Compass bearing from this point to `other` in whole degrees, north = 0, clockwise.
    pub fn bearing_to(self, other: Tripoint) -> i32 {
        let d = other - self;
        if d.x == 0 && d.y == 0 {
            return 0;
        }
        let east_based = (d.y as f32).atan2(d.x as f32).to_degrees().round() as i32;
        (east_based + 90).rem_euclid(360)
    }
}

impl Add for Tripoint {
    type Output = Tripoint;

    fn add(self, rhs: Tripoint) -> Tripoint {
        Tripoint::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Tripoint {
    type Output = Tripoint;

    fn sub(self, rhs: Tripoint) -> Tripoint {
        Tripoint::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Tripoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Direction of a sound source relative to the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Above,
    Below,
    Center,
}

impl Direction {
    /// Returns the direction from `from` towards `to`.
    ///
    /// Horizontal offsets win over elevation; a purely vertical offset is
    /// reported as above or below.
    pub fn between(from: Tripoint, to: Tripoint) -> Self {
        let d = to - from;
        if d.x == 0 && d.y == 0 {
            return match d.z.signum() {
                1 => Direction::Above,
                -1 => Direction::Below,
                _ => Direction::Center,
            };
        }

        let ax = d.x.abs() as f32;
        let ay = d.y.abs() as f32;
        if ax > ay * SECTOR_TANGENT {
            if d.x > 0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if ay > ax * SECTOR_TANGENT {
            if d.y > 0 {
                Direction::South
            } else {
                Direction::North
            }
        } else {
            match (d.x > 0, d.y > 0) {
                (true, true) => Direction::SouthEast,
                (true, false) => Direction::NorthEast,
                (false, true) => Direction::SouthWest,
                (false, false) => Direction::NorthWest,
            }
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::NorthEast => "northeast",
            Direction::East => "east",
            Direction::SouthEast => "southeast",
            Direction::South => "south",
            Direction::SouthWest => "southwest",
            Direction::West => "west",
            Direction::NorthWest => "northwest",
            Direction::Above => "above",
            Direction::Below => "below",
            Direction::Center => "center",
        };
        f.write_str(name)
    }
}
