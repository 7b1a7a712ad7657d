use crate::entity::EntityId;
use crate::position::Position;

/// What an entity can see of one food item while it updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoodEntry {
    pub id: EntityId,
    pub position: Position,
    pub targeters: u32,
    pub is_resting: bool,
}

/// Snapshot of the tank's food handed to a single entity update.
///
/// Reads go against the snapshot; writes are only recorded here and applied
/// to the tank once the entity's update has returned.
#[derive(Clone, Debug, Default)]
pub struct FoodBoard {
    entries: Vec<FoodEntry>,
    claimed: Vec<EntityId>,
    released: Vec<EntityId>,
    consumed: Vec<EntityId>,
}

/// Mutations recorded on a board, in the order the tank applies them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BoardEffects {
    pub claimed: Vec<EntityId>,
    pub released: Vec<EntityId>,
    pub consumed: Vec<EntityId>,
}

impl FoodBoard {
    pub fn new(entries: Vec<FoodEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Food still present, in container order.
    pub fn entries(&self) -> &[FoodEntry] {
        &self.entries
    }

    pub fn has_food(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Presence-checked lookup. `None` for food that is gone.
    pub fn get(&self, id: EntityId) -> Option<&FoodEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn resting_at(&self, position: Position) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.is_resting && entry.position == position)
    }

    pub fn claim(&mut self, id: EntityId) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) {
            entry.targeters += 1;
            self.claimed.push(id);
        }
    }

    pub fn release(&mut self, id: EntityId) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) {
            entry.targeters = entry.targeters.saturating_sub(1);
            self.released.push(id);
        }
    }

    /// Marks the food as eaten. Returns false when it was already gone.
    pub fn consume(&mut self, id: EntityId) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        self.entries.remove(index);
        self.consumed.push(id);
        true
    }

    pub fn into_effects(self) -> BoardEffects {
        BoardEffects {
            claimed: self.claimed,
            released: self.released,
            consumed: self.consumed,
        }
    }
}
