use super::{EntityId, Outcome};
use crate::board::FoodBoard;
use crate::glyph::{self, Glyph};
use crate::path::{self, Heading, Step};
use crate::position::Position;
use crate::species::Species;
use rand::{seq::SliceRandom, Rng};
use std::collections::VecDeque;
use tracing::trace;

// At most this many fish chase one food item at a time.
const MAX_TARGETERS: u32 = 2;
// How far a fish notices food on its own.
const SIGHT: f64 = 5.0;
// Close enough to eat.
const REACH: f64 = 1.0;
// Idle draws 0..=IDLE_ROLL; anything from IDLE_LIMIT up asks for a new destination.
const IDLE_ROLL: usize = 5;
const IDLE_LIMIT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Target {
    food: EntityId,
    // Whether this fish counts toward the food's targeters.
    claimed: bool,
}

#[derive(Clone, Debug)]
pub struct Fish {
    pub(crate) position: Position,
    pub(crate) lifetime: u64,
    heading: Heading,
    target: Option<Target>,
    path: VecDeque<Step>,
    pigment: Vec<u8>,
    skip_next_step: bool,
    species: Species,
    facing_left: Glyph,
    facing_right: Glyph,
}

impl Fish {
    /// Creates a fish with pigment drawn from the species palette.
    pub fn new<R: Rng>(species: Species, rng: &mut R) -> Self {
        let pigment = (0..species.base_glyph.chars().count())
            .map(|_| species.palette.choose(rng).copied().unwrap_or(15))
            .collect();
        Self::with_pigment(species, pigment)
    }

    pub fn with_pigment(species: Species, pigment: Vec<u8>) -> Self {
        let facing_right = Glyph::pigmented(&species.base_glyph, &pigment);
        let facing_left = Glyph::pigmented(&glyph::mirror(&species.base_glyph), &pigment);
        Self {
            position: Position::default(),
            lifetime: 0,
            heading: Heading::Right,
            target: None,
            path: VecDeque::new(),
            pigment,
            skip_next_step: false,
            species,
            facing_left,
            facing_right,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn lifetime(&self) -> u64 {
        self.lifetime
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target.map(|t| t.food)
    }

    pub fn path(&self) -> impl Iterator<Item = &Step> + '_ {
        self.path.iter()
    }

    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    pub fn pigment(&self) -> &[u8] {
        &self.pigment
    }

    pub fn species(&self) -> &Species {
        &self.species
    }

    pub fn skips_next_step(&self) -> bool {
        self.skip_next_step
    }

    pub fn width(&self) -> i32 {
        self.species.width()
    }

    pub fn glyph(&self) -> &Glyph {
        match self.heading {
            Heading::Left => &self.facing_left,
            Heading::Right => &self.facing_right,
        }
    }

    /// The food this fish holds a claim on, if any.
    pub(crate) fn claimed_target(&self) -> Option<EntityId> {
        self.target.filter(|t| t.claimed).map(|t| t.food)
    }

    /// Points the fish at `food` without claiming it. Returns the food whose
    /// claim the fish gave up, if any.
    pub(crate) fn retarget(&mut self, food: EntityId) -> Option<EntityId> {
        let previous = self.target.replace(Target {
            food,
            claimed: false,
        });
        previous.filter(|t| t.claimed).map(|t| t.food)
    }

    /// Replaces the current path with a fresh line to `destination`.
    pub fn plan_to(&mut self, destination: Position) {
        self.path = path::plan(
            self.position,
            destination,
            self.species.horizontal_move_limit,
            self.species.vertical_move_limit,
        )
        .into();
    }

    pub fn translate(&mut self, by: Position) {
        self.position += by;
        for (position, _) in self.path.iter_mut() {
            *position += by;
        }
        self.skip_next_step = true;
    }

    fn step(&mut self) {
        if let Some((position, heading)) = self.path.pop_front() {
            self.position = position;
            self.heading = heading;
        }
    }

    pub fn update<R: Rng>(&mut self, board: &mut FoodBoard, rng: &mut R) -> Outcome {
        if self.target.is_none() && board.has_food() {
            let spotted = board
                .entries()
                .iter()
                .find(|food| {
                    food.targeters < MAX_TARGETERS
                        && self.position.distance_to(food.position) <= SIGHT
                })
                .map(|food| (food.id, food.position));

            if let Some((food, position)) = spotted {
                trace!(?food, "fish spotted food");
                board.claim(food);
                self.target = Some(Target {
                    food,
                    claimed: true,
                });
                self.plan_to(position);
            }
        }

        if let Some(target) = self.target {
            match board.get(target.food).map(|food| food.position) {
                // Eaten by someone else.
                None => self.target = None,
                Some(position) if self.position.distance_to(position) <= REACH => {
                    if target.claimed {
                        board.release(target.food);
                    }
                    board.consume(target.food);
                    self.target = None;
                    return Outcome::Remove;
                }
                Some(position) => {
                    self.plan_to(position);
                    // The first step is where we stand; take it now so the
                    // regular step below actually moves us.
                    self.step();
                }
            }
        }

        if self.path.is_empty() {
            let roll = rng.gen_range(0..=IDLE_ROLL);
            if roll >= IDLE_LIMIT {
                return Outcome::Remove;
            }

            let mut heading = self.heading;
            for i in 0..roll {
                if i % 3 == 0 {
                    heading = heading.flipped();
                }
                self.path.push_back((self.position, heading));
            }
            return Outcome::Continue;
        }

        if self.skip_next_step {
            self.skip_next_step = false;
            return Outcome::Continue;
        }

        self.step();
        Outcome::Continue
    }
}
