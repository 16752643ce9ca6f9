//! End-to-end level scenarios driven only through the public player hooks.

use trial_world::prelude::*;

fn build(desc: &LevelDescription) -> Level {
    Level::build(desc, Layout::default(), LevelOptions::default()).unwrap()
}

// -- Button -> Door -----------------------------------------------------------

#[test]
fn button_wired_door_opens_after_interact() {
    let desc = LevelDescription::new("corridor", &[" BD"], Coord::new(0, 0))
        .with_wire(Coord::new(0, 1), &[Coord::new(0, 2)]);
    let mut level = build(&desc);
    let button = level.grid().position(0, 1).unwrap();
    let door = level.grid().position(0, 2).unwrap();

    assert!(!level.grid()[door].walkable());
    assert_eq!(level.grid()[door].visual(), Visual::DoorClosed);

    level.move_player_to(button).unwrap();
    assert_eq!(level.interact().unwrap(), Interaction::Activated);

    // Walkability and the visual identifier flip together.
    assert!(level.grid()[door].walkable());
    assert_eq!(level.grid()[door].visual(), Visual::DoorOpen);
    assert_eq!(level.grid()[button].visual(), Visual::ButtonOn);

    level.move_player_to(door).unwrap();
    assert_eq!(level.player().position(), door);
}

// -- Dispenser ----------------------------------------------------------------

#[test]
fn auto_respawn_dispenser_replaces_destroyed_item_exactly_once() {
    let desc = LevelDescription::new("dispense", &["BC"], Coord::new(0, 0))
        .with_wire(Coord::new(0, 0), &[Coord::new(0, 1)])
        .with_dispenser(Coord::new(0, 1), true, false);
    let mut level = build(&desc);
    let dispenser = level.grid().position(0, 1).unwrap();
    assert!(level.items().is_empty());

    level.interact().unwrap();
    assert_eq!(level.items().len(), 1);
    let first = level.grid()[dispenser].occupants()[0];
    level.drain_events();

    level.destroy_item(first).unwrap();
    assert_eq!(level.items().len(), 1);
    let events = level.drain_events();
    let spawned = events
        .iter()
        .filter(|e| matches!(e, LevelEvent::ItemSpawned { .. }))
        .count();
    assert_eq!(spawned, 1);
    assert_eq!(level.grid()[dispenser].occupants().len(), 1);
    assert_ne!(level.grid()[dispenser].occupants()[0], first);
    assert!(level.audit().is_empty());
}

#[test]
fn destroying_a_stale_item_is_an_error() {
    let desc = LevelDescription::new("stale", &["C"], Coord::new(0, 0)).with_dispenser(
        Coord::new(0, 0),
        false,
        true,
    );
    let mut level = build(&desc);
    let (item, _) = level.items().iter().next().unwrap();
    level.destroy_item(item).unwrap();
    assert!(level.items().is_empty());
    assert_eq!(level.destroy_item(item), Err(WorldError::StaleItem(item)));
}

// -- Pressure switch + AND gate -------------------------------------------------

#[test]
fn two_switch_and_gate_needs_cube_and_player() {
    //   C _ _ D
    // Cube on one switch, player on the other, door opens.
    let desc = LevelDescription::new("and", &["C__D"], Coord::new(0, 0))
        .with_wire(Coord::new(0, 1), &[Coord::new(0, 3)])
        .with_wire(Coord::new(0, 2), &[Coord::new(0, 3)])
        .with_dispenser(Coord::new(0, 0), true, true);
    let mut level = build(&desc);
    let p = |c| level.grid().position(0, c).unwrap();
    let (first, second, door) = (p(1), p(2), p(3));

    level.interact().unwrap();
    level.move_player_to(first).unwrap();
    assert!(!level.grid()[door].walkable(), "one switch is not enough");

    level.interact().unwrap();
    level.move_player_to(second).unwrap();
    assert!(level.grid()[door].walkable());

    level.move_player_to(first).unwrap();
    assert!(!level.grid()[door].walkable());
    assert!(level.audit().is_empty());
}

// -- Loading ------------------------------------------------------------------

#[test]
fn levels_load_from_json() {
    let json = r#"[
        {
            "name": "first",
            "rows": ["I B", "*D!"],
            "player_start": { "row": 0, "col": 1 },
            "wiring": [{ "source": { "row": 0, "col": 2 }, "targets": [{ "row": 1, "col": 1 }] }],
            "texts": [{ "at": { "row": 0, "col": 0 }, "text": "Doors open from buttons." }]
        }
    ]"#;
    let levels = StaticLevels::from_json(json).unwrap();
    assert_eq!(levels.level_count(), 1);
    let desc = levels.load(0).unwrap();
    let level = build(&desc);
    assert_eq!(level.name(), "first");
    let info = level.grid().position(0, 0).unwrap();
    assert_eq!(level.grid()[info].text(), Some("Doors open from buttons."));

    assert!(matches!(
        levels.load(1),
        Err(LoadError::MissingLevel { index: 1, count: 1 })
    ));
}
