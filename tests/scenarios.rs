//! Worked scenarios through the public API: engine, session and config
//! together.
use console_2048::config::{Config, Rules};
use console_2048::engine::{AdjacencyScan, Board, Direction, MergeScan, SpawnRegion};
use console_2048::input::Released;
use console_2048::session::{Game, Phase, Step};
use console_2048::sink::{CellUpdate, NullSink, Recorder};
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn pair_merges_into_the_left_edge() {
    let mut board = Board::new(4, 4, Recorder::default()).unwrap();
    board.set(0, 0, 2).unwrap();
    board.set(1, 0, 2).unwrap();
    board.sink_mut().clear();

    assert!(board.shift(Direction::Left, MergeScan::Reference).unwrap());
    assert_eq!(board.get(0, 0).unwrap(), 4);
    assert_eq!(board.get(1, 0).unwrap(), 0);
    assert_eq!(
        board.sink().updates(),
        &[
            CellUpdate { x: 0, y: 0, value: 4 },
            CellUpdate { x: 1, y: 0, value: 0 },
        ]
    );
}

#[test]
fn four_equal_tiles_make_two_merges() {
    for scan in [MergeScan::Reference, MergeScan::Fixpoint] {
        let mut board = Board::from_rows(&[[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]], NullSink).unwrap();
        assert!(board.shift(Direction::Left, scan).unwrap());
        assert_eq!(board.rows()[0], vec![4, 4, 0, 0], "{scan:?}");
    }
}

#[test]
fn locked_board_is_over_under_both_scans() {
    let rows = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
    let board = Board::from_rows(&rows, NullSink).unwrap();
    assert!(board.is_game_over(AdjacencyScan::Reference));
    assert!(board.is_game_over(AdjacencyScan::Full));
}

#[test]
fn reference_check_misses_a_pair_in_the_last_row() {
    let rows = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [8, 16, 64, 64]];
    let board = Board::from_rows(&rows, NullSink).unwrap();
    assert!(board.is_game_over(AdjacencyScan::Reference));
    assert!(!board.is_game_over(AdjacencyScan::Full));
}

#[test]
fn seeded_games_replay_identically() {
    let moves = [Direction::Left, Direction::Up, Direction::Right, Direction::Down];
    let play = |seed| {
        let mut game = Game::seeded(NullSink, seed, Rules::corrected()).unwrap();
        for i in 0..50 {
            game.step(Some(moves[i % 4])).unwrap();
        }
        game.into_board().rows()
    };
    assert_eq!(play(11), play(11));
}

#[test]
fn released_keys_drive_a_game_one_direction_per_tick() {
    let mut game = Game::seeded(NullSink, 3, Rules::default()).unwrap();
    let released: Released = [Direction::Right, Direction::Left].into_iter().collect();
    let Step::Turn(turn) = game.step(released.direction()).unwrap() else {
        panic!("expected a turn");
    };
    assert_eq!(turn.direction, Direction::Left);
    assert_eq!(game.turns(), 1);
    assert_eq!(game.step(Released::default().direction()).unwrap(), Step::Idle);
    assert_eq!(game.turns(), 1);
}

#[test]
fn custom_board_game_latches_after_the_final_move() {
    let board = Board::from_rows(
        &[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 8], [8, 8, 32, 64]],
        NullSink,
    )
    .unwrap();
    let rules = Rules {
        adjacency_scan: AdjacencyScan::Full,
        ..Rules::default()
    };
    let mut game = Game::with_board(board, StdRng::seed_from_u64(0), rules);
    assert_eq!(game.phase(), Phase::Playing);

    let Step::Turn(turn) = game.step(Some(Direction::Left)).unwrap() else {
        panic!("expected a turn");
    };
    assert!(turn.changed);
    assert_eq!(turn.phase, Phase::GameOver);
    let frozen = game.board().rows();
    assert_eq!(game.step(Some(Direction::Up)).unwrap(), Step::Frozen);
    assert_eq!(game.board().rows(), frozen);
}

#[test]
fn config_file_selects_rules() {
    let config = Config::from_toml_str(
        r#"
seed = 9

[rules]
merge_scan = "fixpoint"
spawn_region = "full_board"
adjacency_scan = "full"
"#,
    )
    .unwrap();
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.rules.merge_scan, MergeScan::Fixpoint);
    assert_eq!(config.rules.spawn_region, SpawnRegion::FullBoard);
    assert_eq!(config.rules.adjacency_scan, AdjacencyScan::Full);
    assert_eq!(config.rules, Rules::corrected());
}
