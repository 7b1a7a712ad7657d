use super::Outcome;
use crate::board::FoodBoard;
use crate::glyph::Glyph;
use crate::position::Position;
use rand::{seq::SliceRandom, Rng};
use tracing::trace;

const CHAR: &str = "#";
const PIGMENT_POOL: [u8; 3] = [255, 250, 241];
// Food darkens as it ages, down to this palette index.
const DARKEST: u8 = 237;

/// A single food particle sinking toward the tank floor.
#[derive(Clone, Debug)]
pub struct Food {
    pub(crate) position: Position,
    pub(crate) lifetime: u64,
    glyph: Glyph,
    resting_row: Option<i32>,
    is_resting: bool,
    pub(crate) targeters: u32,
    previous_drift: i32,
}

impl Food {
    pub fn new(position: Position) -> Self {
        Self::with_color(position, PIGMENT_POOL[0])
    }

    pub fn with_random_color<R: Rng>(position: Position, rng: &mut R) -> Self {
        let color = *PIGMENT_POOL.choose(rng).unwrap_or(&PIGMENT_POOL[0]);
        Self::with_color(position, color)
    }

    fn with_color(position: Position, color: u8) -> Self {
        Self {
            position,
            lifetime: 0,
            glyph: Glyph::uniform(CHAR, color),
            resting_row: None,
            is_resting: false,
            targeters: 0,
            previous_drift: 0,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn lifetime(&self) -> u64 {
        self.lifetime
    }

    pub fn glyph(&self) -> &Glyph {
        &self.glyph
    }

    pub fn width(&self) -> i32 {
        self.glyph.width()
    }

    pub fn resting_row(&self) -> Option<i32> {
        self.resting_row
    }

    pub(crate) fn set_resting_row(&mut self, row: i32) {
        self.resting_row = Some(row);
    }

    pub fn is_resting(&self) -> bool {
        self.is_resting
    }

    /// How many fish are currently chasing this food.
    pub fn targeters(&self) -> u32 {
        self.targeters
    }

    pub fn translate(&mut self, by: Position) {
        self.position += by;
        if let Some(row) = self.resting_row.as_mut() {
            *row = row.saturating_add(by.y);
        }
    }

    fn brightness(&self) -> u8 {
        255u64.saturating_sub(self.lifetime / 3).max(DARKEST as u64) as u8
    }

    // Alternate between a random sideways nudge and a straight settle.
    fn next_drift<R: Rng>(&self, rng: &mut R) -> i32 {
        if self.previous_drift == 0 {
            rng.gen_range(-1..=1)
        } else {
            0
        }
    }

    pub fn update<R: Rng>(&mut self, board: &FoodBoard, rng: &mut R) -> Outcome {
        let color = self.brightness();
        self.glyph.recolor(color);

        let Some(resting_row) = self.resting_row else {
            return Outcome::Remove;
        };

        if self.is_resting || self.position.y >= resting_row {
            self.is_resting = true;
            return Outcome::Continue;
        }

        let drift = self.next_drift(rng);
        let sink = if rng.gen_range(0..3) == 2 { 1 } else { 0 };
        let next = self.position + Position::new(drift, sink);

        if board.resting_at(next) {
            trace!(x = self.position.x, y = self.position.y, "food settled on a pile");
            self.is_resting = true;
            return Outcome::Continue;
        }

        self.position = next;
        self.previous_drift = drift;
        Outcome::Continue
    }
}
