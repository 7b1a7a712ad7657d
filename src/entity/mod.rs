mod fish;
mod food;

pub use fish::Fish;
pub use food::Food;

use crate::board::FoodBoard;
use crate::glyph::Glyph;
use crate::position::Position;
use rand::Rng;
use slotmap::new_key_type;

new_key_type! {
    /// Stable handle into the tank's entity store. Goes stale once the
    /// entity is removed.
    pub struct EntityId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Fish,
    Food,
}

/// What an entity asks of the tank after its update.
///
/// For food `Remove` means "delete me". For a fish it means it has nowhere
/// left to go and the tank should hand it a new destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Remove,
}

#[derive(Clone, Debug)]
pub enum AquariumChild {
    Fish(Fish),
    Food(Food),
}

impl AquariumChild {
    pub fn kind(&self) -> Kind {
        match self {
            AquariumChild::Fish(_) => Kind::Fish,
            AquariumChild::Food(_) => Kind::Food,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            AquariumChild::Fish(fish) => fish.position(),
            AquariumChild::Food(food) => food.position(),
        }
    }

    pub(crate) fn position_mut(&mut self) -> &mut Position {
        match self {
            AquariumChild::Fish(fish) => &mut fish.position,
            AquariumChild::Food(food) => &mut food.position,
        }
    }

    pub fn lifetime(&self) -> u64 {
        match self {
            AquariumChild::Fish(fish) => fish.lifetime(),
            AquariumChild::Food(food) => food.lifetime(),
        }
    }

    pub(crate) fn age(&mut self) {
        match self {
            AquariumChild::Fish(fish) => fish.lifetime += 1,
            AquariumChild::Food(food) => food.lifetime += 1,
        }
    }

    pub fn width(&self) -> i32 {
        match self {
            AquariumChild::Fish(fish) => fish.width(),
            AquariumChild::Food(food) => food.width(),
        }
    }

    pub fn glyph(&self) -> &Glyph {
        match self {
            AquariumChild::Fish(fish) => fish.glyph(),
            AquariumChild::Food(food) => food.glyph(),
        }
    }

    pub fn translate(&mut self, by: Position) {
        match self {
            AquariumChild::Fish(fish) => fish.translate(by),
            AquariumChild::Food(food) => food.translate(by),
        }
    }

    pub fn update<R: Rng>(&mut self, board: &mut FoodBoard, rng: &mut R) -> Outcome {
        match self {
            AquariumChild::Fish(fish) => fish.update(board, rng),
            AquariumChild::Food(food) => food.update(board, rng),
        }
    }

    pub fn as_fish(&self) -> Option<&Fish> {
        match self {
            AquariumChild::Fish(fish) => Some(fish),
            AquariumChild::Food(_) => None,
        }
    }

    pub fn as_food(&self) -> Option<&Food> {
        match self {
            AquariumChild::Food(food) => Some(food),
            AquariumChild::Fish(_) => None,
        }
    }

    pub(crate) fn as_fish_mut(&mut self) -> Option<&mut Fish> {
        match self {
            AquariumChild::Fish(fish) => Some(fish),
            AquariumChild::Food(_) => None,
        }
    }

    pub(crate) fn as_food_mut(&mut self) -> Option<&mut Food> {
        match self {
            AquariumChild::Food(food) => Some(food),
            AquariumChild::Fish(_) => None,
        }
    }
}

impl From<Fish> for AquariumChild {
    fn from(fish: Fish) -> Self {
        AquariumChild::Fish(fish)
    }
}

impl From<Food> for AquariumChild {
    fn from(food: Food) -> Self {
        AquariumChild::Food(food)
    }
}
