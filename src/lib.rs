//! Fish tank simulation engine.
//!
//! An [`Aquarium`] owns fish and food, advances them one tick at a time and
//! hands back positioned glyphs for a host to draw.

pub mod aquarium;
pub mod board;
pub mod entity;
pub mod error;
pub mod glyph;
pub mod path;
pub mod position;
pub mod species;

pub use aquarium::Aquarium;
pub use board::FoodBoard;
pub use entity::{AquariumChild, EntityId, Fish, Food, Kind, Outcome};
pub use error::AquariumError;
pub use glyph::Glyph;
pub use path::{plan, Heading, MoveLimit, Step};
pub use position::Position;
pub use species::Species;
