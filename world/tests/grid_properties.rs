use panel_battle_core::{
    CellCoord, Command, Definitions, Direction, EntityKind, Event, Health, Side, BROKEN_PANEL,
    NORMAL_PANEL,
};
use panel_battle_world::{self as world, query, GridLayout, World};
use proptest::prelude::*;

const COLUMNS: u32 = 6;
const ROWS: u32 = 3;

fn standard_world() -> World {
    let definitions = Definitions::prototype().expect("prototype catalog");
    let normal = definitions.panel_id(NORMAL_PANEL).expect("normal panel");
    let broken = definitions.panel_id(BROKEN_PANEL).expect("broken panel");
    let layout = GridLayout::new(COLUMNS, ROWS, 3, normal).with_panel(CellCoord::new(3, 0), broken);
    World::new(&layout, definitions).expect("valid layout")
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn assert_occupancy_consistent(world: &World) {
    let entities = query::entities(world);
    for entity in &entities {
        let cell = query::cell_at(world, entity.cell).expect("entity cell lies inside the grid");
        assert_eq!(cell.occupant, Some(entity.id), "occupancy disagrees with entity");
    }
    for (index, first) in entities.iter().enumerate() {
        for second in entities.iter().skip(index + 1) {
            assert_ne!(first.cell, second.cell, "two entities share a cell");
        }
    }
    let (columns, rows) = query::grid(world).dimensions();
    let occupied = (0..rows)
        .flat_map(|row| (0..columns).map(move |column| CellCoord::new(column, row)))
        .filter(|cell| query::grid(world).occupant(*cell).is_some())
        .count();
    assert_eq!(occupied, entities.len(), "dangling occupancy left behind");
}

proptest! {
    #[test]
    fn lookups_outside_the_grid_are_empty(column in COLUMNS..u32::MAX, row in any::<u32>(), direction in direction_strategy()) {
        let world = standard_world();
        let grid = query::grid(&world);
        let outside = CellCoord::new(column, row);
        prop_assert!(grid.cell_at(outside).is_none());
        prop_assert!(grid.relative(outside, direction).is_none());
        prop_assert!(!grid.is_traversable(outside));
        prop_assert!(grid.occupant(outside).is_none());
    }

    #[test]
    fn relative_from_edge_cells_never_panics(column in 0..COLUMNS, row in 0..ROWS, direction in direction_strategy()) {
        let world = standard_world();
        let grid = query::grid(&world);
        let origin = CellCoord::new(column, row);
        if let Some(neighbour) = grid.relative(origin, direction) {
            prop_assert_eq!(origin.step(direction), Some(neighbour.coord));
        }
    }

    #[test]
    fn random_moves_keep_occupancy_bidirectional(
        moves in proptest::collection::vec((0usize..3, 0..COLUMNS + 1, 0..ROWS + 1), 1..40),
    ) {
        let mut world = standard_world();
        let mut events = Vec::new();
        let spawns = [
            (EntityKind::Navi, Side::Player, CellCoord::new(1, 1)),
            (EntityKind::Enemy, Side::Enemy, CellCoord::new(4, 1)),
            (EntityKind::Enemy, Side::Enemy, CellCoord::new(5, 2)),
        ];
        for (kind, side, cell) in spawns {
            world::apply(&mut world, Command::SpawnEntity { kind, side, cell, health: Health::new(50) }, &mut events);
        }
        let ids: Vec<_> = query::entities(&world).into_iter().map(|entity| entity.id).collect();

        for (index, column, row) in moves {
            let entity = ids[index];
            world::apply(&mut world, Command::MoveEntity { entity, to: CellCoord::new(column, row) }, &mut events);
            assert_occupancy_consistent(&world);
        }
        prop_assert!(events.iter().all(|event| !matches!(event, Event::EntityDestroyed { .. })), "no entity may be destroyed by moves");
    }
}
