use fishtank::{Aquarium, AquariumChild, Fish, Food, Kind, Position, Species};
use proptest::prelude::*;

fn standard_tank(seed: u64) -> Aquarium {
    Aquarium::seeded(Position::new(10, 10), 65, 30, seed).unwrap()
}

fn fish_at(species: Species, x: i32, y: i32) -> Fish {
    Fish::with_pigment(species, vec![243, 226, 220, 255]).with_position(Position::new(x, y))
}

fn assert_in_bounds(tank: &Aquarium) {
    let o = tank.origin();
    for (position, glyph) in tank.get_content() {
        assert!(
            position.x >= o.x - 1 && position.x <= o.x + tank.width() - glyph.width() + 1,
            "x out of bounds: {position:?}"
        );
        assert!(
            position.y >= o.y && position.y <= o.y + tank.height() - 1,
            "y out of bounds: {position:?}"
        );
    }
}

#[test]
fn hungry_fish_reaches_falling_food() {
    for seed in 0..8 {
        let mut tank = standard_tank(seed);
        let fish = tank.add(fish_at(Species::fish(), 40, 25), false);
        tank.drop_food(Position::new(40, 12)).unwrap();

        for _ in 0..40 {
            tank.update();
        }

        assert!(tank.get(fish).is_some());
        assert!(
            tank.food().all(|food| food.is_resting() && food.position().y == 39),
            "seed {seed}: food neither eaten nor settled"
        );
    }
}

#[test]
fn dropped_food_settles_on_the_floor() {
    let mut tank = standard_tank(3);
    tank.drop_food(Position::new(30, 11)).unwrap();
    for _ in 0..400 {
        tank.update();
    }
    let food = tank.food().next().unwrap();
    assert!(food.is_resting());
    assert_eq!(food.position().y, 39);
    assert!(food.lifetime() >= 400);
}

#[test]
fn food_piles_up_instead_of_overlapping() {
    for seed in 0..32 {
        let mut tank = standard_tank(seed);
        let bottom = tank.add(Food::new(Position::new(40, 39)), false);
        tank.update();
        assert!(tank.get(bottom).and_then(AquariumChild::as_food).unwrap().is_resting());

        tank.drop_food(Position::new(40, 35)).unwrap();
        for _ in 0..200 {
            tank.update();
            let cells: Vec<Position> = tank.food().map(Food::position).collect();
            assert_eq!(cells.len(), 2);
            assert_ne!(cells[0], cells[1], "seed {seed}: second food entered the pile");
        }
        assert!(tank.food().all(Food::is_resting));
    }
}

#[test]
fn second_food_stacks_once_the_first_settles() {
    let mut tank = standard_tank(11);
    tank.drop_food(Position::new(20, 37)).unwrap();
    for _ in 0..200 {
        if tank.food().all(Food::is_resting) {
            break;
        }
        tank.update();
    }
    let first = tank.food().next().unwrap().position();
    tank.update();
    tank.drop_food(first - Position::new(0, 2)).unwrap();
    for _ in 0..300 {
        tank.update();
    }
    let cells: Vec<Position> = tank.food().map(Food::position).collect();
    assert_eq!(cells.len(), 2);
    assert_ne!(cells[0], cells[1]);
    assert!(tank.food().all(Food::is_resting));
    assert!(cells.iter().all(|p| p.y <= 39));
}

#[test]
fn translation_carries_a_fish_mid_path() {
    let mut tank = standard_tank(5);
    let id = tank.add(fish_at(Species::fish(), 20, 20), false);
    tank.fish_mut(id).unwrap().plan_to(Position::new(60, 30));
    tank.update();

    let fish = tank.get(id).and_then(AquariumChild::as_fish).unwrap();
    let before = fish.position();
    let path_before: Vec<Position> = fish.path().map(|(p, _)| *p).collect();
    assert!(!path_before.is_empty());

    tank.translate(tank.origin() + Position::new(5, 5));
    let fish = tank.get(id).and_then(AquariumChild::as_fish).unwrap();
    assert_eq!(fish.position(), before + Position::new(5, 5));
    let path_after: Vec<Position> = fish.path().map(|(p, _)| *p).collect();
    assert_eq!(
        path_after,
        path_before
            .iter()
            .map(|p| *p + Position::new(5, 5))
            .collect::<Vec<_>>()
    );

    tank.update();
    let fish = tank.get(id).and_then(AquariumChild::as_fish).unwrap();
    assert_eq!(fish.position(), before + Position::new(5, 5));
    assert_eq!(fish.path_len(), path_before.len());
}

#[test]
fn no_food_is_chased_by_more_than_two_fish() {
    for seed in 0..8 {
        let mut tank = standard_tank(seed);
        for i in 0..12 {
            tank.add(fish_at(Species::fish(), 30 + i % 6, 14 + i / 6), false);
        }
        for x in [31, 34] {
            tank.drop_food(Position::new(x, 12)).unwrap();
        }
        for _ in 0..60 {
            tank.update();
            assert!(tank.food().all(|food| food.targeters() <= 2));
        }
    }
}

#[test]
fn second_diner_lets_go_of_food_eaten_earlier_in_the_tick() {
    let mut tank = standard_tank(4);
    let meal = tank.add(Food::new(Position::new(40, 39)), false);
    let other = tank.add(Food::new(Position::new(15, 39)), false);
    let first = tank.add(fish_at(Species::fish(), 38, 39), false);
    let second = tank.add(fish_at(Species::fish(), 42, 39), false);

    tank.update();
    let food = |tank: &Aquarium, id| tank.get(id).and_then(AquariumChild::as_food).cloned();
    let fish = |tank: &Aquarium, id| tank.get(id).and_then(AquariumChild::as_fish).cloned();
    assert_eq!(food(&tank, meal).unwrap().targeters(), 2);
    assert_eq!(food(&tank, other).unwrap().targeters(), 0);
    assert_eq!(fish(&tank, first).unwrap().position(), Position::new(39, 39));
    assert_eq!(fish(&tank, second).unwrap().position(), Position::new(41, 39));

    tank.update();
    assert!(tank.get(meal).is_none());
    assert_eq!(tank.food().count(), 1);
    assert_eq!(food(&tank, other).unwrap().targeters(), 0);

    let (a, b) = (fish(&tank, first).unwrap(), fish(&tank, second).unwrap());
    assert_eq!(a.target(), None);
    assert_eq!(b.target(), None);
    assert!(a.path_len() > 0, "the diner should head off somewhere new");
    assert_eq!(b.position(), Position::new(40, 39));
    for fish in [&a, &b] {
        let mut last = fish.position();
        for (p, _) in fish.path() {
            assert!((p.x - last.x).abs() <= 1 && (p.y - last.y).abs() <= 1);
            last = *p;
        }
    }
    assert_in_bounds(&tank);

    tank.update();
    assert_eq!(tank.food().count(), 1);
    assert_eq!(fish(&tank, second).unwrap().target(), None);
    assert_in_bounds(&tank);
}

#[test]
fn entities_at_the_edge_of_the_grid_are_pulled_back_in() {
    for seed in 0..4 {
        let mut tank = standard_tank(seed);
        tank.add(fish_at(Species::fish(), i32::MIN, i32::MAX), false);
        tank.add(Food::new(Position::new(i32::MAX, 20)), false);
        tank.add(fish_at(Species::bottom_dweller(), i32::MAX, i32::MIN), false);
        tank.add(Food::new(Position::new(i32::MIN, i32::MIN)), false);

        for _ in 0..5 {
            tank.update();
            assert_in_bounds(&tank);
        }
        assert_eq!(tank.fish().count(), 2);
    }
}

#[test]
fn content_is_stable_between_updates() {
    let mut tank = standard_tank(9);
    for species in [
        Species::top_dweller(),
        Species::mid_dweller(),
        Species::bottom_dweller(),
    ] {
        tank.spawn_fish(&species);
    }
    tank.drop_food(Position::new(50, 11));
    for _ in 0..10 {
        tank.update();
    }
    let first = tank.get_content();
    assert_eq!(first, tank.get_content());
    assert_eq!(first.len(), tank.len());
}

#[test]
fn content_follows_insertion_order() {
    let mut tank = standard_tank(1);
    tank.add(fish_at(Species::top_dweller(), 20, 12), false);
    tank.drop_food(Position::new(30, 12));
    tank.add(fish_at(Species::bottom_dweller(), 40, 36), false);

    let texts: Vec<String> = tank.get_content().iter().map(|(_, g)| g.text()).collect();
    assert_eq!(texts, vec![">-", "#", r"\='\\"]);
    assert!(tank.get_entity_at(Kind::Food, Position::new(30, 12)).is_some());
}

#[test]
fn bottom_dwellers_hop_in_short_legs() {
    let mut tank = standard_tank(21);
    let id = tank.spawn_fish(&Species::bottom_dweller());
    let mut last = tank.get(id).unwrap().position();
    for _ in 0..300 {
        tank.update();
        let now = tank.get(id).unwrap().position();
        assert!((now.x - last.x).abs() <= 1 && (now.y - last.y).abs() <= 1);
        let fish = tank.get(id).and_then(AquariumChild::as_fish).unwrap();
        if let Some((end, _)) = fish.path().last() {
            assert!((end.x - now.x).abs() <= 10);
            assert!((end.y - now.y).abs() <= 1);
        }
        last = now;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn everything_stays_inside_the_tank(
        seed in any::<u64>(),
        spots in prop::collection::vec((-200i32..300, -200i32..300), 1..8),
        food in prop::collection::vec((0i32..65, 0i32..30), 0..5),
        ticks in 1usize..60,
    ) {
        let mut tank = standard_tank(seed);
        for (i, (x, y)) in spots.iter().enumerate() {
            let species = match i % 3 {
                0 => Species::top_dweller(),
                1 => Species::mid_dweller(),
                _ => Species::bottom_dweller(),
            };
            tank.add(fish_at(species, *x, *y), false);
        }
        for (x, y) in food {
            tank.drop_food(tank.origin() + Position::new(x, y));
        }
        tank.add(Food::new(Position::new(-500, 900)), false);

        for _ in 0..ticks {
            tank.update();
            assert_in_bounds(&tank);
        }
    }
}
