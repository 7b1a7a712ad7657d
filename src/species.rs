use crate::error::AquariumError;
use crate::path::MoveLimit;
use serde::{Deserialize, Serialize};

/// Everything that makes one kind of fish differ from another. They all run
/// the same state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    /// Fractions of tank height the fish wanders within, top to bottom.
    pub vertical_band: (f64, f64),
    pub base_glyph: String,
    pub palette: Vec<u8>,
    #[serde(default)]
    pub horizontal_move_limit: MoveLimit,
    #[serde(default)]
    pub vertical_move_limit: MoveLimit,
}

impl Species {
    pub fn fish() -> Self {
        Self {
            name: "Fish".to_string(),
            vertical_band: (0.0, 1.0),
            base_glyph: "><'>".to_string(),
            palette: vec![243, 226, 220, 255],
            horizontal_move_limit: MoveLimit::Unlimited,
            vertical_move_limit: MoveLimit::Unlimited,
        }
    }

    pub fn top_dweller() -> Self {
        Self {
            name: "TopDweller".to_string(),
            vertical_band: (0.0, 0.35),
            base_glyph: ">-".to_string(),
            palette: vec![210, 174, 138],
            ..Self::fish()
        }
    }

    pub fn mid_dweller() -> Self {
        Self {
            name: "MidDweller".to_string(),
            vertical_band: (0.3, 0.75),
            palette: vec![34, 70, 106],
            ..Self::fish()
        }
    }

    pub fn bottom_dweller() -> Self {
        Self {
            name: "BottomDweller".to_string(),
            vertical_band: (0.7, 1.0),
            base_glyph: r"\='\\".to_string(),
            palette: vec![33, 79, 105],
            horizontal_move_limit: MoveLimit::Cells(10),
            vertical_move_limit: MoveLimit::Cells(1),
        }
    }

    pub fn width(&self) -> i32 {
        self.base_glyph.chars().count() as i32
    }

    pub fn validate(&self) -> Result<(), AquariumError> {
        let invalid = |reason| AquariumError::InvalidSpecies {
            name: self.name.clone(),
            reason,
        };

        let (low, high) = self.vertical_band;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) {
            return Err(invalid("vertical band must lie within 0.0..=1.0"));
        }
        if low > high {
            return Err(invalid("vertical band is upside down"));
        }
        if self.base_glyph.is_empty() {
            return Err(invalid("base glyph is empty"));
        }
        if self.palette.is_empty() {
            return Err(invalid("palette is empty"));
        }
        Ok(())
    }
}
