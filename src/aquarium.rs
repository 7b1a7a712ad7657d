use crate::board::{BoardEffects, FoodBoard, FoodEntry};
use crate::entity::{AquariumChild, EntityId, Fish, Food, Kind, Outcome};
use crate::error::AquariumError;
use crate::glyph::Glyph;
use crate::position::Position;
use crate::species::Species;
use rand::{rngs::StdRng, Rng, SeedableRng};
use slotmap::SlotMap;
use tracing::{debug, trace};

// Share of the fish population that may draw from one point of interest
// before it moves.
const POI_REFRESH_SHARE: f64 = 0.2;
const POI_FUZZ: (i32, i32) = (5, 3);
// Every n-th fish in the fish list is told about freshly dropped food.
const FOOD_BROADCAST_STRIDE: usize = 3;

/// The tank: owns every fish and food item, keeps them inside its walls and
/// advances them one tick per [`Aquarium::update`].
pub struct Aquarium {
    origin: Position,
    width: i32,
    height: i32,
    entities: SlotMap<EntityId, AquariumChild>,
    order: Vec<EntityId>,
    fish_ids: Vec<EntityId>,
    food_ids: Vec<EntityId>,
    rng: StdRng,
    poi: Option<Position>,
    poi_calls: usize,
    ticks: u64,
}

impl Aquarium {
    /// A tank seeded from system entropy.
    pub fn new(origin: Position, width: i32, height: i32) -> Result<Self, AquariumError> {
        Self::with_rng(origin, width, height, StdRng::from_entropy())
    }

    /// A tank whose whole run is reproducible from `seed`.
    pub fn seeded(
        origin: Position,
        width: i32,
        height: i32,
        seed: u64,
    ) -> Result<Self, AquariumError> {
        Self::with_rng(origin, width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        origin: Position,
        width: i32,
        height: i32,
        rng: StdRng,
    ) -> Result<Self, AquariumError> {
        if width <= 0 || height <= 0 {
            return Err(AquariumError::InvalidBounds { width, height });
        }
        debug!(x = origin.x, y = origin.y, width, height, "aquarium created");
        Ok(Self {
            origin,
            width,
            height,
            entities: SlotMap::with_key(),
            order: Vec::new(),
            fish_ids: Vec::new(),
            food_ids: Vec::new(),
            rng,
            poi: None,
            poi_calls: 0,
            ticks: 0,
        })
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Completed calls to [`Aquarium::update`].
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn has_food(&self) -> bool {
        !self.food_ids.is_empty()
    }

    /// Fish in insertion order.
    pub fn fish(&self) -> impl Iterator<Item = &Fish> + '_ {
        self.fish_ids
            .iter()
            .filter_map(|id| self.entities.get(*id))
            .filter_map(AquariumChild::as_fish)
    }

    /// Food in insertion order.
    pub fn food(&self) -> impl Iterator<Item = &Food> + '_ {
        self.food_ids
            .iter()
            .filter_map(|id| self.entities.get(*id))
            .filter_map(AquariumChild::as_food)
    }

    pub fn get(&self, id: EntityId) -> Option<&AquariumChild> {
        self.entities.get(id)
    }

    pub fn fish_mut(&mut self, id: EntityId) -> Option<&mut Fish> {
        self.entities.get_mut(id).and_then(AquariumChild::as_fish_mut)
    }

    /// Adds an entity at the end of the draw/update order.
    ///
    /// Food is given its resting row and announced to every third fish.
    /// Fish added with `randomize_position` are dropped somewhere in their
    /// species' band.
    pub fn add(&mut self, child: impl Into<AquariumChild>, randomize_position: bool) -> EntityId {
        let mut child = child.into();
        match &mut child {
            AquariumChild::Food(food) => food.set_resting_row(self.floor_row()),
            AquariumChild::Fish(fish) if randomize_position => {
                fish.position = self.random_spot(fish.species(), fish.width());
            }
            AquariumChild::Fish(_) => {}
        }

        let kind = child.kind();
        let id = self.entities.insert(child);
        self.order.push(id);
        match kind {
            Kind::Fish => self.fish_ids.push(id),
            Kind::Food => {
                self.food_ids.push(id);
                self.announce_food(id);
            }
        }
        id
    }

    /// Adds a freshly pigmented fish of `species` at a random spot in its band.
    pub fn spawn_fish(&mut self, species: &Species) -> EntityId {
        let fish = Fish::new(species.clone(), &mut self.rng);
        self.add(fish, true)
    }

    /// Drops a food particle at `position`, unless one is already there.
    pub fn drop_food(&mut self, position: Position) -> Option<EntityId> {
        if self.entity_id_at(Kind::Food, position).is_some() {
            return None;
        }
        let food = Food::with_random_color(position, &mut self.rng);
        Some(self.add(food, false))
    }

    /// First entity of `kind` at exactly `position`, in insertion order.
    pub fn get_entity_at(&self, kind: Kind, position: Position) -> Option<&AquariumChild> {
        self.entity_id_at(kind, position).and_then(|id| self.entities.get(id))
    }

    pub fn entity_id_at(&self, kind: Kind, position: Position) -> Option<EntityId> {
        let ids = match kind {
            Kind::Fish => &self.fish_ids,
            Kind::Food => &self.food_ids,
        };
        ids.iter().copied().find(|id| {
            self.entities
                .get(*id)
                .is_some_and(|child| child.position() == position)
        })
    }

    /// Takes an entity out of the tank. A fish gives up its claim on food.
    pub fn remove(&mut self, id: EntityId) -> Option<AquariumChild> {
        let child = self.entities.remove(id)?;
        self.order.retain(|other| *other != id);
        match child.kind() {
            Kind::Fish => self.fish_ids.retain(|other| *other != id),
            Kind::Food => self.food_ids.retain(|other| *other != id),
        }
        if let Some(food) = child.as_fish().and_then(Fish::claimed_target) {
            self.release(food);
        }
        Some(child)
    }

    pub fn clear_food(&mut self) {
        let food = std::mem::take(&mut self.food_ids);
        debug!(count = food.len(), "clearing food");
        for id in food {
            self.entities.remove(id);
        }
        let entities = &self.entities;
        self.order.retain(|id| entities.contains_key(*id));
    }

    /// Moves the tank to `origin`, carrying every entity along.
    pub fn translate(&mut self, origin: Position) {
        let by = origin - self.origin;
        if by == Position::default() {
            return;
        }
        debug!(dx = by.x, dy = by.y, "aquarium moved");
        self.origin = origin;
        for child in self.entities.values_mut() {
            child.translate(by);
        }
    }

    /// A random spot the fish loosely gather around.
    ///
    /// The underlying point moves once a fifth of the fish population has
    /// asked for it; every answer is fuzzed around it.
    pub fn point_of_interest(&mut self) -> Position {
        let budget = (self.fish_ids.len() as f64 * POI_REFRESH_SHARE).ceil() as usize;
        let poi = match self.poi {
            Some(poi) if self.poi_calls < budget => poi,
            _ => {
                let poi = self.origin
                    + Position::new(
                        self.rng.gen_range(0..=self.width),
                        self.rng.gen_range(0..=self.height),
                    );
                trace!(x = poi.x, y = poi.y, "point of interest moved");
                self.poi = Some(poi);
                self.poi_calls = 0;
                poi
            }
        };
        self.poi_calls += 1;
        poi.fuzz(&mut self.rng, POI_FUZZ.0, POI_FUZZ.1)
    }

    /// Advances every entity one tick. Always returns `true`.
    pub fn update(&mut self) -> bool {
        let order = self.order.clone();
        for id in order {
            let mut board = self.food_board(id);
            let Some(child) = self.entities.get_mut(id) else {
                // Eaten earlier this tick.
                continue;
            };
            let kind = child.kind();
            let outcome = child.update(&mut board, &mut self.rng);
            self.commit(board.into_effects());

            match (kind, outcome) {
                (Kind::Food, Outcome::Remove) => {
                    self.remove(id);
                    continue;
                }
                (Kind::Fish, Outcome::Remove) => self.send_wandering(id),
                (_, Outcome::Continue) => {}
            }

            self.clamp(id);
            if let Some(child) = self.entities.get_mut(id) {
                child.age();
            }
        }
        self.ticks += 1;
        true
    }

    /// Positioned glyphs in draw order.
    pub fn get_content(&self) -> Vec<(Position, Glyph)> {
        self.order
            .iter()
            .filter_map(|id| self.entities.get(*id))
            .map(|child| (child.position(), child.glyph().clone()))
            .collect()
    }

    fn floor_row(&self) -> i32 {
        self.origin.y + self.height - 1
    }

    fn band_rows(&self, species: &Species) -> (i32, i32) {
        let (low, high) = species.vertical_band;
        let top = self.origin.y + 1;
        let height = self.height as f64;
        (
            top + (height * low).floor() as i32,
            top + (height * high).floor() as i32,
        )
    }

    fn random_spot(&mut self, species: &Species, width: i32) -> Position {
        let (top, bottom) = self.band_rows(species);
        let bottom = bottom.min(self.floor_row());
        let top = top.min(bottom);
        let left = self.origin.x - 1;
        let right = (self.origin.x + self.width - width).max(left);
        Position::new(
            self.rng.gen_range(left..=right),
            self.rng.gen_range(top..=bottom),
        )
    }

    fn send_wandering(&mut self, id: EntityId) {
        let Some((width, (top, bottom))) = self
            .entities
            .get(id)
            .and_then(AquariumChild::as_fish)
            .map(|fish| (fish.width(), self.band_rows(fish.species())))
        else {
            return;
        };

        let poi = self.point_of_interest();
        let x = poi
            .x
            .min(self.origin.x + self.width - width)
            .max(self.origin.x - 1);
        let y = self.rng.gen_range(top..=bottom.max(top));
        trace!(x, y, "fish heading somewhere new");

        if let Some(fish) = self.fish_mut(id) {
            fish.plan_to(Position::new(x, y));
        }
    }

    fn food_board(&self, updating: EntityId) -> FoodBoard {
        let entries = self
            .food_ids
            .iter()
            .filter(|id| **id != updating)
            .filter_map(|id| {
                let food = self.entities.get(*id)?.as_food()?;
                Some(FoodEntry {
                    id: *id,
                    position: food.position(),
                    targeters: food.targeters(),
                    is_resting: food.is_resting(),
                })
            })
            .collect();
        FoodBoard::new(entries)
    }

    fn commit(&mut self, effects: BoardEffects) {
        for id in effects.claimed {
            if let Some(food) = self.entities.get_mut(id).and_then(AquariumChild::as_food_mut) {
                food.targeters += 1;
            }
        }
        for id in effects.released {
            self.release(id);
        }
        for id in effects.consumed {
            if self.remove(id).is_some() {
                debug!(?id, "food eaten");
            }
        }
    }

    fn release(&mut self, id: EntityId) {
        if let Some(food) = self.entities.get_mut(id).and_then(AquariumChild::as_food_mut) {
            food.targeters = food.targeters.saturating_sub(1);
        }
    }

    fn announce_food(&mut self, food: EntityId) {
        let fish: Vec<EntityId> = self
            .fish_ids
            .iter()
            .step_by(FOOD_BROADCAST_STRIDE)
            .copied()
            .collect();
        for id in fish {
            if let Some(previous) = self.fish_mut(id).and_then(|fish| fish.retarget(food)) {
                self.release(previous);
            }
        }
    }

    fn clamp(&mut self, id: EntityId) {
        let (left, top) = (self.origin.x - 1, self.origin.y);
        let (right_edge, bottom) = (self.origin.x + self.width + 1, self.floor_row());
        if let Some(child) = self.entities.get_mut(id) {
            let right = right_edge - child.width();
            let position = child.position_mut();
            position.x = position.x.min(right).max(left);
            position.y = position.y.min(bottom).max(top);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tank() -> Aquarium {
        Aquarium::seeded(Position::new(10, 10), 65, 30, 7).unwrap()
    }

    fn fish_at(x: i32, y: i32) -> Fish {
        Fish::with_pigment(Species::fish(), vec![243]).with_position(Position::new(x, y))
    }

    #[test]
    fn rejects_empty_tanks() {
        assert_eq!(
            Aquarium::new(Position::default(), 0, 5).err(),
            Some(AquariumError::InvalidBounds {
                width: 0,
                height: 5
            })
        );
        assert!(Aquarium::seeded(Position::default(), 5, -1, 1).is_err());
    }

    #[test]
    fn food_gets_resting_row_on_add() {
        let mut tank = tank();
        let id = tank.drop_food(Position::new(20, 12)).unwrap();
        let food = tank.get(id).and_then(AquariumChild::as_food).unwrap();
        assert_eq!(food.resting_row(), Some(39));
    }

    #[test]
    fn drop_food_is_idempotent_per_cell() {
        let mut tank = tank();
        let spot = Position::new(30, 15);
        assert!(tank.drop_food(spot).is_some());
        assert!(tank.drop_food(spot).is_none());
        assert_eq!(tank.food().count(), 1);
    }

    #[test]
    fn broadcast_reaches_every_third_fish() {
        let mut tank = tank();
        let fish: Vec<EntityId> = (0..7).map(|i| tank.add(fish_at(12 + i, 20), false)).collect();
        let food = tank.drop_food(Position::new(40, 11)).unwrap();

        for (i, id) in fish.iter().enumerate() {
            let target = tank.get(*id).and_then(AquariumChild::as_fish).unwrap().target();
            if i % 3 == 0 {
                assert_eq!(target, Some(food));
            } else {
                assert_eq!(target, None);
            }
        }
        assert_eq!(tank.food().next().unwrap().targeters(), 0);
    }

    #[test]
    fn broadcast_releases_previous_claim() {
        let mut tank = tank();
        // Food first, so the fish has to spot it on its own and claim it.
        let first = tank.drop_food(Position::new(23, 20)).unwrap();
        let fish = tank.add(fish_at(20, 20), false);
        tank.update();
        assert_eq!(tank.food().next().unwrap().targeters(), 1);

        tank.drop_food(Position::new(60, 11)).unwrap();
        let first = tank.get(first).and_then(AquariumChild::as_food).unwrap();
        assert_eq!(first.targeters(), 0);
        assert_ne!(tank.get(fish).and_then(AquariumChild::as_fish).unwrap().target(), None);
    }

    #[test]
    fn lookup_by_kind_and_position() {
        let mut tank = tank();
        let fish = tank.add(fish_at(20, 20), false);
        let food = tank.add(Food::new(Position::new(20, 20)), false);

        assert_eq!(tank.entity_id_at(Kind::Fish, Position::new(20, 20)), Some(fish));
        assert_eq!(tank.entity_id_at(Kind::Food, Position::new(20, 20)), Some(food));
        assert!(tank.get_entity_at(Kind::Food, Position::new(21, 20)).is_none());
        assert_eq!(
            tank.get_entity_at(Kind::Fish, Position::new(20, 20)).map(AquariumChild::kind),
            Some(Kind::Fish)
        );
    }

    #[test]
    fn randomized_fish_land_in_their_band() {
        let mut tank = tank();
        for _ in 0..50 {
            let id = tank.spawn_fish(&Species::top_dweller());
            let p = tank.get(id).unwrap().position();
            assert!((11..=11 + 10).contains(&p.y), "{p:?}");
            assert!((9..=10 + 65 - 2).contains(&p.x), "{p:?}");
        }
    }

    #[test]
    fn point_of_interest_refreshes_after_budget() {
        let mut tank = tank();
        for i in 0..10 {
            tank.add(fish_at(20 + i, 20), false);
        }
        // Budget is ceil(0.2 * 10) = 2 calls per point.
        tank.point_of_interest();
        let first = tank.poi;
        tank.point_of_interest();
        assert_eq!(tank.poi, first);
        assert_eq!(tank.poi_calls, 2);
        tank.point_of_interest();
        assert_eq!(tank.poi_calls, 1);

        for _ in 0..20 {
            let p = tank.point_of_interest();
            let centre = tank.poi.unwrap();
            assert!((p.x - centre.x).abs() <= 5 && (p.y - centre.y).abs() <= 3);
            assert!(centre.x >= 10 && centre.x <= 75 && centre.y >= 10 && centre.y <= 40);
        }
    }

    #[test]
    fn update_clamps_and_ages() {
        let mut tank = tank();
        let far = tank.add(fish_at(500, -500), false);
        let food = tank.add(Food::new(Position::new(-40, 100)), false);

        assert!(tank.update());

        let fish = tank.get(far).unwrap();
        assert!(fish.position().x <= 10 + 65 - 4 + 1);
        assert!(fish.position().y >= 10);
        assert_eq!(fish.lifetime(), 1);

        let food = tank.get(food).unwrap();
        assert_eq!(food.position().x, 9);
        assert_eq!(food.position().y, 39);
        assert_eq!(tank.ticks(), 1);
    }

    #[test]
    fn removing_a_fish_releases_its_claim() {
        let mut tank = tank();
        tank.add(Food::new(Position::new(23, 20)), false);
        let fish = tank.add(fish_at(20, 20), false);
        tank.update();
        assert_eq!(tank.food().next().unwrap().targeters(), 1);

        assert!(tank.remove(fish).is_some());
        assert!(tank.remove(fish).is_none());
        assert_eq!(tank.food().next().unwrap().targeters(), 0);
        assert_eq!(tank.fish().count(), 0);
        assert_eq!(tank.len(), 1);
    }

    #[test]
    fn clear_food_keeps_fish() {
        let mut tank = tank();
        tank.add(fish_at(20, 20), false);
        tank.drop_food(Position::new(30, 12));
        tank.drop_food(Position::new(31, 12));
        tank.clear_food();
        assert!(!tank.has_food());
        assert_eq!(tank.len(), 1);
        assert_eq!(tank.get_content().len(), 1);
    }

    #[test]
    fn translate_moves_everything() {
        let mut tank = tank();
        let fish = tank.add(fish_at(20, 20), false);
        let food = tank.drop_food(Position::new(30, 12)).unwrap();
        tank.translate(Position::new(15, 13));

        assert_eq!(tank.origin(), Position::new(15, 13));
        assert_eq!(tank.get(fish).unwrap().position(), Position::new(25, 23));
        let food = tank.get(food).and_then(AquariumChild::as_food).unwrap();
        assert_eq!(food.position(), Position::new(35, 15));
        assert_eq!(food.resting_row(), Some(42));
    }
}
