//! Integration tests for guarded movement.
//!
//! A walk holds the `PLAYER_WALK` socket from the key press until the player
//! lands on the target cell. Any move requested in between is dropped.

use trial_engine::prelude::*;

fn corridor(rows: &[&str], start: Coord) -> LevelSession {
    let desc = LevelDescription::new("corridor", rows, start);
    LevelSession::new(&desc, &EngineConfig::default()).unwrap()
}

fn coord(session: &LevelSession) -> Coord {
    session.level().player().position().coord()
}

#[test]
fn second_move_is_dropped_while_walking() {
    let mut s = corridor(&["    "], Coord::new(0, 0));
    let tile = s.level().grid().layout().tile_size;
    let start = s.level().player().render();

    assert!(s.request_move(Direction::Right));
    assert!(s.is_walking());

    // Midway through the walk the logical cell has not changed yet and a
    // further press is ignored.
    s.advance().unwrap();
    s.advance().unwrap();
    assert!(!s.request_move(Direction::Right));
    assert_eq!(coord(&s), Coord::new(0, 0));
    let midway = s.level().player().render();
    assert!((midway.x - (start.x + tile * 2.0 / 5.0)).abs() < 1e-9);

    for _ in 0..3 {
        s.advance().unwrap();
    }
    assert!(!s.is_walking());
    assert_eq!(coord(&s), Coord::new(0, 1));
    assert_eq!(s.level().player().render(), s.level().grid().pixel_origin(s.level().player().position()));

    // Once the walk has landed the next one starts normally.
    assert!(s.request_move(Direction::Right));
    for _ in 0..5 {
        s.advance().unwrap();
    }
    assert_eq!(coord(&s), Coord::new(0, 2));
}

#[test]
fn blocked_targets_do_not_take_the_socket() {
    let mut s = corridor(&[" *", " D"], Coord::new(0, 0));
    assert!(!s.request_move(Direction::Right)); // wall
    assert!(!s.request_move(Direction::Up)); // off the grid
    assert!(!s.is_walking());
    assert_eq!(s.pending_tasks(), 0);

    assert!(s.request_move(Direction::Down));
    for _ in 0..5 {
        s.advance().unwrap();
    }
    assert_eq!(coord(&s), Coord::new(1, 0));
    assert!(!s.request_move(Direction::Right)); // closed door
}

#[test]
fn opened_door_becomes_a_walk_target() {
    let desc = LevelDescription::new("gate", &["B D"], Coord::new(0, 1))
        .with_wire(Coord::new(0, 0), &[Coord::new(0, 2)]);
    let mut s = LevelSession::new(&desc, &EngineConfig::default()).unwrap();
    assert!(!s.request_move(Direction::Right));

    assert!(s.request_move(Direction::Left));
    for _ in 0..5 {
        s.advance().unwrap();
    }
    assert_eq!(s.interact().unwrap(), Interaction::Activated);

    for _ in 0..2 {
        assert!(s.request_move(Direction::Right));
        for _ in 0..5 {
            s.advance().unwrap();
        }
    }
    assert_eq!(coord(&s), Coord::new(0, 2));
}

#[test]
fn reaching_the_exit_leaves_the_walk_socket_free() {
    let desc = LevelDescription::new("exit", &[" !"], Coord::new(0, 0));
    let config = EngineConfig::default();
    let mut input = ScriptedInput::builder()
        .walk(Direction::Right, config.move_ticks)
        .build();
    let mut renderer = RecordingRenderer::new();
    let mut io = Frontend::new(&mut input, &mut renderer);

    let mut runner = LevelRunner::new(&desc, &config).unwrap();
    assert_eq!(run(&mut runner, &mut io), ExitCode::LevelComplete);
    assert!(!runner.session().is_walking());
    assert_eq!(runner.session().pending_tasks(), 0);
}

#[test]
fn interact_is_allowed_while_walking() {
    let mut s = corridor(&["B  "], Coord::new(0, 0));
    assert!(s.request_move(Direction::Right));
    s.advance().unwrap();
    // Still logically on the button.
    assert_eq!(s.interact().unwrap(), Interaction::Activated);
    let button = s.level().grid().position(0, 0).unwrap();
    assert!(s.level().grid()[button].state());
}
