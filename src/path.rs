use crate::position::Position;
use serde::{Deserialize, Serialize};

/// Which way a fish is facing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Heading {
    Left,
    #[default]
    Right,
}

impl Heading {
    /// Facing for a horizontal displacement; standing still counts as right.
    pub fn from_dx(dx: i32) -> Self {
        if dx < 0 {
            Heading::Left
        } else {
            Heading::Right
        }
    }

    pub fn sign(self) -> i32 {
        match self {
            Heading::Left => -1,
            Heading::Right => 1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
        }
    }
}

/// How far a single hop may travel along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<i32>", into = "Option<i32>")]
pub enum MoveLimit {
    #[default]
    Unlimited,
    Cells(i32),
}

impl MoveLimit {
    /// Non-positive raw limits mean "no limit".
    pub fn from_raw(raw: i32) -> Self {
        if raw > 0 {
            MoveLimit::Cells(raw)
        } else {
            MoveLimit::Unlimited
        }
    }

    /// Pulls `end` in toward `start` so the hop respects the limit, and never
    /// further than [`MAX_HOP`] cells.
    fn clamp(self, start: i32, end: i32) -> i32 {
        let reach = match self {
            MoveLimit::Cells(limit) if limit > 0 => i64::from(limit).min(MAX_HOP),
            _ => MAX_HOP,
        };
        let delta = (i64::from(end) - i64::from(start)).clamp(-reach, reach);
        // Lies between `start` and `end`, so it fits.
        (i64::from(start) + delta) as i32
    }
}

impl From<Option<i32>> for MoveLimit {
    fn from(raw: Option<i32>) -> Self {
        raw.map_or(MoveLimit::Unlimited, MoveLimit::from_raw)
    }
}

impl From<MoveLimit> for Option<i32> {
    fn from(limit: MoveLimit) -> Self {
        match limit {
            MoveLimit::Unlimited => None,
            MoveLimit::Cells(n) => Some(n),
        }
    }
}

/// Longest distance a single plan covers along either axis.
pub const MAX_HOP: i64 = 1 << 12;

pub type Step = (Position, Heading);

/// Rasterizes a line from `from` toward `to` (Bresenham), one entry per cell.
///
/// The endpoint is pulled in per axis when the hop exceeds that axis' limit
/// or [`MAX_HOP`]. Every step carries the same heading, taken from the sign
/// of the clamped horizontal delta. The result always starts at `from` and
/// ends at the clamped endpoint.
pub fn plan(from: Position, to: Position, x_limit: MoveLimit, y_limit: MoveLimit) -> Vec<Step> {
    let end = Position::new(x_limit.clamp(from.x, to.x), y_limit.clamp(from.y, to.y));
    let (x0, y0) = (i64::from(from.x), i64::from(from.y));
    let (x1, y1) = (i64::from(end.x), i64::from(end.y));

    let heading = Heading::from_dx((x1 - x0).signum() as i32);
    let dx = (x1 - x0).abs();
    let step_x = i64::from(heading.sign());
    let dy = -(y1 - y0).abs();
    let step_y = if y0 < y1 { 1 } else { -1 };

    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut steps = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        steps.push((Position::new(x as i32, y as i32), heading));
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += step_x;
        }
        if e2 <= dx {
            err += dx;
            y += step_y;
        }
    }
    steps
}
