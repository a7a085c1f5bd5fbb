use std::time::Duration;

use panel_battle_core::{
    ActionKind, Archetype, CellCoord, Command, ConfigError, Definitions, EnemyDefinition,
    EntityId, EntityKind, Event, Health, Side, CRACKED_PANEL, NORMAL_PANEL,
};
use panel_battle_system_enemy_ai::{AiController, FLASH_DURATION, FLASH_INTERVAL};
use panel_battle_system_movement::MovementState;
use panel_battle_world::{self as world, query, GridLayout, World};

const TICK: Duration = Duration::from_millis(100);

struct Battle {
    world: World,
    navi: EntityId,
    enemy: EntityId,
    controller: AiController,
}

impl Battle {
    fn new(definition: &EnemyDefinition, navi_cell: CellCoord, enemy_cell: CellCoord) -> Self {
        let definitions = Definitions::prototype().expect("prototype catalog");
        let normal = definitions.panel_id(NORMAL_PANEL).expect("normal panel");
        let mut world =
            World::new(&GridLayout::new(6, 3, 3, normal), definitions).expect("valid layout");
        let navi = spawn(&mut world, EntityKind::Navi, navi_cell);
        let enemy = spawn(&mut world, EntityKind::Enemy, enemy_cell);
        let controller =
            AiController::init(&world, enemy, navi, definition, 5).expect("controller");
        Self {
            world,
            navi,
            enemy,
            controller,
        }
    }

    fn hammer() -> Self {
        Self::new(
            &EnemyDefinition::patrol_strike("hammer"),
            CellCoord::new(1, 1),
            CellCoord::new(4, 1),
        )
    }

    fn step(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt: TICK }, &mut events);
        self.controller.tick(&mut self.world, TICK, &mut events);
        events
    }

    fn move_navi(&mut self, to: CellCoord) {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::MoveEntity {
                entity: self.navi,
                to,
            },
            &mut events,
        );
        assert!(
            matches!(events.as_slice(), [Event::EntityMoved { .. }]),
            "navi move failed: {events:?}"
        );
    }

    fn navi_health(&self) -> Option<u32> {
        query::entity(&self.world, self.navi).map(|navi| navi.health.get())
    }

    fn cell(&self, entity: EntityId) -> CellCoord {
        query::entity(&self.world, entity).expect("entity alive").cell
    }

    fn is_cracked(&self, cell: CellCoord) -> bool {
        let cracked = query::definitions(&self.world).panel_id(CRACKED_PANEL);
        query::cell_at(&self.world, cell).map(|cell| cell.panel) == cracked
    }
}

fn spawn(world: &mut World, kind: EntityKind, cell: CellCoord) -> EntityId {
    let side = match kind {
        EntityKind::Navi => Side::Player,
        EntityKind::Enemy => Side::Enemy,
    };
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEntity {
            kind,
            side,
            cell,
            health: Health::new(100),
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::EntitySpawned { entity, .. }] => *entity,
        other => panic!("unexpected spawn events: {other:?}"),
    }
}

#[test]
fn telegraph_flashes_the_opponent_cell_two_ticks_after_the_lunge() {
    let mut battle = Battle::hammer();

    let _ = battle.step();
    assert_eq!(battle.cell(battle.enemy), CellCoord::new(2, 1));
    assert_eq!(battle.controller.pending().len(), 2);

    let second = battle.step();
    assert!(!second
        .iter()
        .any(|event| matches!(event, Event::CellFlashRequested { .. })));

    let third = battle.step();
    let flashes: Vec<_> = third
        .iter()
        .filter_map(|event| match event {
            Event::CellFlashRequested {
                cell,
                material,
                duration,
                interval,
            } => Some((*cell, material.as_str().to_owned(), *duration, *interval)),
            _ => None,
        })
        .collect();
    assert_eq!(
        flashes,
        vec![(
            CellCoord::new(1, 1),
            "yellow".to_owned(),
            FLASH_DURATION,
            FLASH_INTERVAL
        )]
    );
}

#[test]
fn missed_strike_cracks_the_panel_left_of_the_attacker() {
    let mut battle = Battle::hammer();

    for _ in 0..6 {
        let _ = battle.step();
    }

    assert_eq!(battle.cell(battle.enemy), CellCoord::new(4, 1));
    assert!(battle.is_cracked(CellCoord::new(3, 1)));
    assert_eq!(battle.navi_health(), Some(100));
    assert!(battle.controller.pending().is_empty());
    assert_eq!(
        battle.controller.attack().remaining(),
        battle.controller.attack().base()
    );
}

#[test]
fn strike_connects_when_the_opponent_is_adjacent_at_resolution() {
    let mut battle = Battle::hammer();

    for _ in 0..3 {
        let _ = battle.step();
    }
    battle.move_navi(CellCoord::new(3, 1));

    let mut resolved = Vec::new();
    for _ in 0..3 {
        resolved.extend(battle.step());
    }

    assert_eq!(battle.navi_health(), Some(70));
    assert!(!battle.is_cracked(CellCoord::new(3, 1)));
    assert!(resolved.iter().any(|event| matches!(
        event,
        Event::AnimationRequested {
            action: ActionKind::Strike,
            ..
        }
    )));
}

#[test]
fn opponent_dodges_between_telegraph_and_resolution() {
    let mut battle = Battle::hammer();

    for _ in 0..3 {
        let _ = battle.step();
    }
    battle.move_navi(CellCoord::new(3, 1));
    let _ = battle.step();
    battle.move_navi(CellCoord::new(3, 0));
    let _ = battle.step();
    let _ = battle.step();

    assert_eq!(battle.navi_health(), Some(100));
    assert!(battle.is_cracked(CellCoord::new(3, 1)));
}

#[test]
fn destroying_the_attacker_cancels_its_telegraph() {
    let mut battle = Battle::hammer();
    let _ = battle.step();

    let mut events = Vec::new();
    world::apply(
        &mut battle.world,
        Command::DestroyEntity {
            entity: battle.enemy,
        },
        &mut events,
    );

    let mut later = Vec::new();
    for _ in 0..8 {
        later.extend(battle.step());
    }
    assert!(battle.controller.pending().is_empty());
    assert!(later.iter().all(|event| matches!(event, Event::TimeAdvanced { .. })));
    assert_eq!(battle.navi_health(), Some(100));
}

#[test]
fn paused_battle_holds_delayed_actions() {
    let mut battle = Battle::hammer();
    let _ = battle.step();
    let before = battle.controller.clone();

    let mut events = Vec::new();
    world::apply(&mut battle.world, Command::SetPaused { paused: true }, &mut events);
    for _ in 0..10 {
        assert!(battle.step().is_empty());
    }
    assert_eq!(battle.controller, before);
    assert_eq!(battle.cell(battle.enemy), CellCoord::new(2, 1));
}

#[test]
fn flank_attacker_polls_its_range_before_slashing() {
    let definition = EnemyDefinition {
        move_delay_ms: 10_000,
        attack_delay_ms: 500,
        ..EnemyDefinition::teleport_flank("swordsman")
    };
    let mut battle = Battle::new(&definition, CellCoord::new(1, 0), CellCoord::new(2, 1));

    for _ in 0..4 {
        let _ = battle.step();
    }
    assert_eq!(battle.navi_health(), Some(100));
    assert_eq!(
        battle.controller.attack().remaining(),
        Duration::from_millis(100)
    );

    let events = battle.step();
    assert_eq!(battle.navi_health(), Some(20));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::AnimationRequested {
            action: ActionKind::WideSlash,
            ..
        }
    )));
    assert!(!battle.controller.attack().can_attack());
    assert_eq!(
        battle.controller.attack().remaining(),
        Duration::from_millis(500)
    );
}

#[test]
fn flank_attack_timer_idles_out_of_range() {
    let definition = EnemyDefinition {
        move_delay_ms: 10_000,
        attack_delay_ms: 500,
        ..EnemyDefinition::teleport_flank("swordsman")
    };
    let mut battle = Battle::new(&definition, CellCoord::new(0, 0), CellCoord::new(2, 2));

    for _ in 0..10 {
        let _ = battle.step();
    }
    assert_eq!(
        battle.controller.attack().remaining(),
        Duration::from_millis(500)
    );
    assert_eq!(battle.navi_health(), Some(100));
}

#[test]
fn mismatched_movement_is_rejected() {
    let battle = Battle::hammer();
    let flank = MovementState::init(
        &battle.world,
        battle.enemy,
        &EnemyDefinition::teleport_flank("swordsman"),
        1,
    )
    .expect("movement");

    let result = battle.controller.clone().with_movement(flank);
    assert_eq!(
        result.err(),
        Some(ConfigError::ArchetypeMismatch {
            expected: Archetype::PatrolStrike,
            found: Archetype::TeleportFlank,
        })
    );
}

#[test]
fn missing_archetype_fails_initialisation() {
    let battle = Battle::hammer();
    let definition = EnemyDefinition {
        archetype: None,
        ..EnemyDefinition::patrol_strike("mystery")
    };
    let result = AiController::init(&battle.world, battle.enemy, battle.navi, &definition, 1);
    assert_eq!(
        result.err(),
        Some(ConfigError::MissingArchetype("mystery".to_owned()))
    );
}

#[test]
fn unknown_opponent_fails_initialisation() {
    let battle = Battle::hammer();
    let result = AiController::init(
        &battle.world,
        battle.enemy,
        EntityId::new(42),
        &EnemyDefinition::patrol_strike("hammer"),
        1,
    );
    assert_eq!(result.err(), Some(ConfigError::UnknownEntity(EntityId::new(42))));
}
