use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// A cell on the character grid. Unbounded; the tank does the clamping.
///
/// Arithmetic saturates at the `i32` limits instead of wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Position) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns a position close to `self`, offset by up to `xfuzz`/`yfuzz`
    /// cells on each axis.
    pub fn fuzz<R: Rng>(self, rng: &mut R, xfuzz: i32, yfuzz: i32) -> Self {
        let xfuzz = xfuzz.saturating_abs();
        let yfuzz = yfuzz.saturating_abs();
        self + Self::new(rng.gen_range(-xfuzz..=xfuzz), rng.gen_range(-yfuzz..=yfuzz))
    }
}

impl Add for Position {
    type Output = Position;
    fn add(self, rhs: Position) -> Position {
        Position::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}
impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        *self = *self + rhs;
    }
}
impl Sub for Position {
    type Output = Position;
    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}
