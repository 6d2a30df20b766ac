//! Session tests - gravity, spawning, gate transitions and long runs

use quadmerge::core::gravity;
use quadmerge::core::{
    Board, BoardConfig, GroupCell, Motion, PresenterEvent, QuadState, RecordingPresenter,
    Session,
};
use quadmerge::engine::{Command, Driver};
use quadmerge::types::{Color, Coord, GroupId, TICK_MS};
use Color::*;

fn quad_cells(x: i16, y: i16, colors: [Color; 4]) -> Vec<GroupCell> {
    Coord::new(x, y)
        .ring()
        .iter()
        .zip(colors)
        .map(|(&p, c)| GroupCell::new(p, c))
        .collect()
}

#[test]
fn test_gravity_terminates() {
    let mut board = Board::new(4, 10);
    board
        .place_group(quad_cells(0, 8, [Red, Red, Blue, Blue]))
        .unwrap();
    board
        .place_group(quad_cells(0, 4, [Green, Green, Yellow, Yellow]))
        .unwrap();
    board
        .place_group(quad_cells(2, 6, [Purple, Orange, Orange, Purple]))
        .unwrap();

    let mut rounds = 0;
    loop {
        let plan = gravity::plan(&board, |_| false);
        if plan.is_empty() {
            break;
        }
        gravity::apply(&mut board, &plan);
        assert!(board.verify().is_ok());
        rounds += 1;
        assert!(rounds <= 20, "gravity did not settle");
    }

    // Everything ends up packed into the bottom two quad rows, left first.
    let anchors: Vec<_> = board.groups().filter_map(|g| g.anchor()).collect();
    assert!(anchors.iter().all(|a| a.y <= 2));
    assert_eq!(
        gravity::classify(board.cache(), Coord::new(0, 0)),
        QuadState::Full
    );
}

#[test]
fn test_shift_moves_board_before_animation() {
    let mut s = Session::new(BoardConfig::with_size(2, 4)).unwrap();
    let mut p = RecordingPresenter::new();
    let g = s
        .insert_group(quad_cells(0, 2, [Red, Red, Blue, Blue]))
        .unwrap();

    s.tick(TICK_MS, &mut p);
    assert_eq!(s.board().group(g).unwrap().anchor(), Some(Coord::new(0, 0)));
    let ticket = s.shift_in_flight().expect("shift in flight");
    assert!(s.is_busy(g));

    // No spawn while the shift is animating.
    s.tick(TICK_MS, &mut p);
    assert!(s.gate().is_idle());
    assert_eq!(s.board().group_count(), 1);

    let shift = p.moves().next().copied().unwrap();
    assert_eq!(shift.ticket, ticket);
    assert_eq!(shift.motion, Motion::Shift { delta: Coord::new(0, -2) });
    assert_eq!(shift.target, Coord::new(0, 0));

    assert!(s.complete(ticket, &mut p));
    assert!(s.shift_in_flight().is_none());
    s.tick(TICK_MS, &mut p);
    assert!(s.gate().is_spawning());
    assert_eq!(s.board().group_count(), 2);
}

#[test]
fn test_spawned_groups_hold_two_colors() {
    let session = Session::new(BoardConfig::default()).unwrap();
    let mut driver = Driver::new(session, RecordingPresenter::new());
    let mut spawned = 0;

    for _ in 0..2_000 {
        driver.step();
        let events = driver.presenter_mut().take_events();
        for event in events {
            let PresenterEvent::Move(req) = event else {
                continue;
            };
            if req.motion != Motion::FallIn {
                continue;
            }
            let group = driver.session().board().group(req.group).unwrap();
            assert_eq!(group.len(), 4);
            let first = group.cells()[0].color;
            let same = group.cells().iter().filter(|c| c.color == first).count();
            assert_eq!(same, 2);
            spawned += 1;
        }
    }
    assert!(spawned >= 9);
}

#[test]
fn test_long_runs_keep_board_consistent() {
    for seed in 1..=4 {
        let config = BoardConfig {
            seed,
            ..BoardConfig::with_size(6, 8)
        };
        let session = Session::new(config).unwrap();
        let mut driver = Driver::new(session, RecordingPresenter::with_staging(2));
        driver.apply(Command::Populate).unwrap();

        let mut reported = 0u32;
        for tick in 0..3_000u32 {
            driver.step();
            reported += driver
                .presenter_mut()
                .take_events()
                .iter()
                .filter(|e| matches!(e, PresenterEvent::Collected(_)))
                .count() as u32;

            if tick % 7 == 0 {
                let idle: Vec<GroupId> = driver
                    .session()
                    .board()
                    .groups()
                    .map(|g| g.id())
                    .filter(|&id| !driver.session().is_busy(id))
                    .collect();
                if let Some(&id) = idle.get(tick as usize % idle.len().max(1)) {
                    let _ = driver.apply(Command::Rotate(id));
                }
            }

            let board = driver.session().board();
            assert_eq!(board.rebuilt_cache(), *board.cache(), "seed {} tick {}", seed, tick);
            if driver.session().gate().is_idle() {
                assert!(board.verify().is_ok(), "seed {} tick {}", seed, tick);
            }
        }

        let tally: u32 = driver.session().collected_counts().iter().sum();
        assert_eq!(tally, reported);
    }
}

#[test]
fn test_settled_board_is_fully_packed() {
    for seed in 1..=3 {
        let config = BoardConfig {
            seed,
            ..BoardConfig::default()
        };
        let session = Session::new(config).unwrap();
        let mut driver = Driver::new(session, RecordingPresenter::new());
        driver.apply(Command::Populate).unwrap();
        driver.run_until_settled(20_000).unwrap();

        let board = driver.session().board();
        assert_eq!(board.cache().len(), 36, "seed {}", seed);
        assert!(board.verify().is_ok());
        for quad in gravity::gravity_quads(board.cache()) {
            assert_eq!(gravity::classify(board.cache(), quad), QuadState::Full);
        }
    }
}

#[test]
fn test_exhausted_staging_does_not_stall_matching() {
    let mut s = Session::new(BoardConfig::with_size(4, 4)).unwrap();
    let mut p = RecordingPresenter::with_staging(1);
    s.insert_group(quad_cells(0, 0, [Red, Red, Red, Red])).unwrap();
    s.insert_group(quad_cells(2, 0, [Blue, Blue, Blue, Blue])).unwrap();

    let pass = s.resolve_matches(&mut p);
    assert_eq!(pass.cleared_groups, 2);
    let slots: Vec<_> = p.collected().map(|c| c.slot).collect();
    assert_eq!(slots.len(), 8);
    assert!(slots[0].is_some());
    assert!(slots[1..].iter().all(|slot| slot.is_none()));
    assert_eq!(p.staging().unwrap().free_count(), 0);
    assert!(s.board().cache().is_empty());
}

#[test]
fn test_same_seed_same_board() {
    let run = |seed| {
        let config = BoardConfig {
            seed,
            ..BoardConfig::default()
        };
        let session = Session::new(config).unwrap();
        let mut driver = Driver::new(session, RecordingPresenter::new());
        driver.apply(Command::Populate).unwrap();
        for _ in 0..500 {
            driver.step();
        }
        driver.session().snapshot()
    };
    assert_eq!(run(7), run(7));
}

#[test]
fn test_snapshot_json_shape() {
    let mut s = Session::new(BoardConfig::with_size(4, 2)).unwrap();
    s.insert_group(quad_cells(0, 0, [Red, Green, Green, Red])).unwrap();
    let json = serde_json::to_value(s.snapshot()).unwrap();
    assert_eq!(json["width"], 4);
    assert_eq!(json["height"], 2);
    assert_eq!(json["gate"], "idle");
    assert_eq!(json["groups"].as_array().unwrap().len(), 1);
    assert_eq!(json["grid"][0], serde_json::json!([1, 2, 0, 0]));
}
