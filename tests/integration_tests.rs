//! Integration tests for dotsboxes-rust
//!
//! Game scenarios on hand-built positions, invariants checked over seeded
//! random and self-play games, and board descriptions loaded from
//! `tests/data`.

use std::path::PathBuf;
use std::sync::Arc;

use dotsboxes_rust::analysis::{safe_edges, simulate_chain};
use dotsboxes_rust::board::{Board, Player};
use dotsboxes_rust::error::{GeometryError, MoveError};
use dotsboxes_rust::game::{Match, MoveMessage};
use dotsboxes_rust::geometry::{DotMap, EdgeId, Grid, Vertex};
use dotsboxes_rust::strategy::{Bot, Tier, TurnOutcome};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

type Dots = ((usize, usize), (usize, usize));

fn new_match(rows: usize, cols: usize) -> Match {
    Match::new(Arc::new(Grid::rectangular(rows, cols).unwrap()))
}

fn mv(((r1, c1), (r2, c2)): Dots) -> MoveMessage {
    MoveMessage::new(Vertex::new(r1, c1), Vertex::new(r2, c2))
}

fn edge_id(game: &Match, ((r1, c1), (r2, c2)): Dots) -> EdgeId {
    game.board()
        .edge_between(Vertex::new(r1, c1), Vertex::new(r2, c2))
        .unwrap()
}

/// Draw edges for whichever player holds the turn. None may capture.
fn setup(game: &mut Match, edges: &[Dots]) {
    for &e in edges {
        let player = game.turn();
        let event = game.play(&mv(e), player).unwrap();
        assert_eq!(event.boxes_captured, 0, "setup edge {e:?} captured");
    }
}

/// Everything observable about a board, for before/after comparisons.
fn snapshot(board: &Board) -> (Vec<bool>, Vec<u8>, Vec<Option<Player>>, [u32; 2]) {
    let grid = board.grid();
    (
        (0..grid.num_edges()).map(|e| board.is_edge_drawn(e)).collect(),
        (0..grid.num_boxes()).map(|b| board.drawn_count(b)).collect(),
        (0..grid.num_boxes()).map(|b| board.box_owner(b)).collect(),
        [board.score(Player::First), board.score(Player::Second)],
    )
}

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn load_grid(name: &str) -> Arc<Grid> {
    let text = std::fs::read_to_string(data_file(name)).unwrap();
    Arc::new(Grid::new(&DotMap::from_json(&text).unwrap()).unwrap())
}

/// Play uniformly random legal edges to the end, checking after each move
/// that the capture counts, owners, and turn all agree.
fn random_game(grid: Arc<Grid>, seed: u64) -> Match {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut game = Match::new(grid);
    let mut captured = 0usize;

    while !game.is_over() {
        let undrawn: Vec<EdgeId> = game.board().undrawn_edges().collect();
        let edge = undrawn[rng.usize(..undrawn.len())];
        let player = game.turn();

        let event = game.play_edge(edge, player).unwrap();
        captured += event.boxes_captured as usize;

        assert_eq!(captured, game.board().num_owned());
        assert_eq!(event.turn_retained, event.boxes_captured > 0);
        let expected = if event.turn_retained { player } else { player.other() };
        assert_eq!(game.turn(), expected);
    }
    game
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_single_box_captured_by_fourth_edge() {
    let mut game = new_match(2, 2);
    setup(
        &mut game,
        &[((0, 0), (0, 1)), ((0, 1), (1, 1)), ((1, 1), (1, 0))],
    );
    assert_eq!(game.board().drawn_count(0), 3);

    let player = game.turn();
    let event = game.play(&mv(((1, 0), (0, 0))), player).unwrap();
    assert_eq!(event.boxes_captured, 1);
    assert!(event.turn_retained);
    assert_eq!(game.board().box_owner(0), Some(player));
    assert_eq!(game.score(player), 1);
    assert!(game.is_over());
}

#[test]
fn test_shared_edge_captures_both_boxes() {
    let mut game = new_match(2, 3);
    setup(
        &mut game,
        &[
            ((0, 0), (0, 1)),
            ((1, 0), (1, 1)),
            ((0, 0), (1, 0)),
            ((0, 1), (0, 2)),
            ((1, 1), (1, 2)),
            ((0, 2), (1, 2)),
        ],
    );
    assert_eq!(game.board().drawn_count(0), 3);
    assert_eq!(game.board().drawn_count(1), 3);

    let player = game.turn();
    let event = game.play(&mv(((0, 1), (1, 1))), player).unwrap();
    assert_eq!(event.boxes_captured, 2);
    assert_eq!(game.board().box_owner(0), Some(player));
    assert_eq!(game.board().box_owner(1), Some(player));
    assert_eq!(game.result().unwrap().winner, Some(player));
}

/// Three boxes in a row; the first has top, bottom, and left drawn and the
/// others top and bottom.
fn three_box_chain() -> Match {
    let mut game = new_match(2, 4);
    setup(
        &mut game,
        &[
            ((0, 0), (0, 1)),
            ((0, 1), (0, 2)),
            ((0, 2), (0, 3)),
            ((1, 0), (1, 1)),
            ((1, 1), (1, 2)),
            ((1, 2), (1, 3)),
            ((0, 0), (1, 0)),
        ],
    );
    game
}

#[test]
fn test_harvest_takes_whole_chain() {
    for tier in [Tier::Medium, Tier::Hard, Tier::Expert] {
        let mut game = three_box_chain();
        let player = game.turn();
        let mut bot = Bot::with_seed(tier, 3);

        let harvest = bot.harvest(&mut game).unwrap();
        assert_eq!(harvest.events.len(), 3, "{tier}");
        assert_eq!(harvest.captured, 3, "{tier}");
        assert_eq!(harvest.sacrifice, None, "{tier}");
        assert!(harvest.events.iter().all(|e| e.capturing_player == player));
        assert_eq!(game.score(player), 3);
        assert!(game.is_over());
    }
}

#[test]
fn test_take_turn_harvests_then_reports_no_moves() {
    let mut game = three_box_chain();
    let mut bot = Bot::with_seed(Tier::Hard, 3);
    let report = bot.take_turn(&mut game).unwrap();
    assert_eq!(report.captured(), 3);
    assert_eq!(report.outcome, TurnOutcome::NoMovesAvailable);
}

/// 3x5 dots. The top row of four boxes is a chain opened at its left end
/// (box 0 has three sides). The bottom row is a closed chain of four boxes
/// with two sides each, so no edge on the board is safe.
fn double_cross_position() -> Match {
    let mut game = new_match(3, 5);
    let mut edges = Vec::new();
    for row in 0..3 {
        for col in 0..4 {
            edges.push(((row, col), (row, col + 1)));
        }
    }
    edges.push(((0, 0), (1, 0)));
    setup(&mut game, &edges);
    game
}

#[test]
fn test_expert_double_cross() {
    let mut game = double_cross_position();
    assert!(safe_edges(game.board(), 0, 1).is_empty());
    let player = game.turn();
    let mut bot = Bot::with_seed(Tier::Expert, 5);

    let report = bot.take_turn(&mut game).unwrap();
    assert_eq!(report.outcome, TurnOutcome::Moved);
    assert_eq!(report.events.len(), 3);
    assert_eq!(report.captured(), 2);

    // Two captures keep the turn, the sacrifice gives it away.
    assert!(report.events[0].turn_retained);
    assert!(report.events[1].turn_retained);
    let sacrifice = report.events[2];
    assert_eq!(sacrifice.boxes_captured, 0);
    assert!(!sacrifice.turn_retained);
    assert_eq!(game.turn(), player.other());

    let board = game.board();
    assert_eq!(board.box_owner(0), Some(player));
    assert_eq!(board.box_owner(1), Some(player));
    assert_eq!(board.drawn_count(2), 3);
    assert_eq!(board.drawn_count(3), 3);
    assert_eq!(board.box_owner(2), None);
    assert_eq!(board.box_owner(3), None);
    // Bottom row untouched.
    assert!((4..8).all(|b| board.drawn_count(b) == 2));

    // The opponent takes both handed-over boxes with the one shared edge.
    let opponent = player.other();
    let event = game.play(&mv(((0, 3), (1, 3))), opponent).unwrap();
    assert_eq!(event.boxes_captured, 2);
}

/// Rows of dots, left-aligned, with the given lengths.
fn ragged_match(lengths: &[usize]) -> Match {
    let rows = lengths.iter().map(|&n| vec![true; n]).collect();
    Match::new(Arc::new(Grid::new(&DotMap::from_rows(rows)).unwrap()))
}

/// Dot rows of 6, 6, 4 and 4. Every horizontal edge is drawn, so the board
/// is three corridors: five boxes on top (0-4), three in the middle (5-7)
/// and three at the bottom (8-10). The top and middle corridors are opened
/// at their left ends.
fn two_open_chains() -> Match {
    let lengths = [6, 6, 4, 4];
    let mut game = ragged_match(&lengths);
    let mut edges = Vec::new();
    for (row, &len) in lengths.iter().enumerate() {
        for col in 0..len - 1 {
            edges.push(((row, col), (row, col + 1)));
        }
    }
    edges.push(((0, 0), (1, 0)));
    edges.push(((1, 0), (2, 0)));
    setup(&mut game, &edges);
    game
}

#[test]
fn test_expert_double_crosses_shortest_chain() {
    let mut game = two_open_chains();
    assert_eq!(game.board().grid().num_boxes(), 11);
    assert!(safe_edges(game.board(), 0, 1).is_empty());
    let player = game.turn();
    let mut bot = Bot::with_seed(Tier::Expert, 13);

    let report = bot.take_turn(&mut game).unwrap();
    assert_eq!(report.events.len(), 7);
    assert_eq!(report.captured(), 6);
    assert_eq!(game.turn(), player.other());

    let board = game.board();
    // The long chain is taken whole.
    assert!((0..5).all(|b| board.box_owner(b) == Some(player)));
    // The short chain loses one box and hands over the other two.
    assert_eq!(board.box_owner(5), Some(player));
    assert_eq!(board.drawn_count(6), 3);
    assert_eq!(board.drawn_count(7), 3);
    assert_eq!(board.box_owner(6), None);
    assert_eq!(board.box_owner(7), None);
    // The unopened corridor is left alone.
    assert!((8..11).all(|b| board.drawn_count(b) == 2));
}

/// 3x5 dots: two 2x2 blocks of boxes with every outer side drawn. The left
/// block (boxes 0, 1, 4, 5) is opened by the spoke above its centre dot.
fn open_loop() -> Match {
    let mut game = new_match(3, 5);
    setup(
        &mut game,
        &[
            ((0, 0), (0, 1)),
            ((0, 1), (0, 2)),
            ((2, 0), (2, 1)),
            ((2, 1), (2, 2)),
            ((0, 0), (1, 0)),
            ((1, 0), (2, 0)),
            ((0, 2), (1, 2)),
            ((1, 2), (2, 2)),
            ((0, 2), (0, 3)),
            ((0, 3), (0, 4)),
            ((2, 2), (2, 3)),
            ((2, 3), (2, 4)),
            ((0, 4), (1, 4)),
            ((1, 4), (2, 4)),
            ((0, 1), (1, 1)),
        ],
    );
    game
}

#[test]
fn test_expert_harvests_open_loop_whole() {
    let mut game = open_loop();
    assert!(safe_edges(game.board(), 0, 1).is_empty());
    assert_eq!(game.board().drawn_count(0), 3);
    assert_eq!(game.board().drawn_count(1), 3);
    let player = game.turn();
    let mut bot = Bot::with_seed(Tier::Expert, 17);

    let harvest = bot.harvest(&mut game).unwrap();
    assert_eq!(harvest.captured, 4);
    assert_eq!(harvest.sacrifice, None);

    let board = game.board();
    for b in [0, 1, 4, 5] {
        assert_eq!(board.box_owner(b), Some(player));
    }
    for b in [2, 3, 6, 7] {
        assert_eq!(board.drawn_count(b), 2);
    }
}

#[test]
fn test_expert_keeps_harvesting_while_safe_edges_remain() {
    // Top row of four boxes opened at the left; the bottom row only has
    // its tops, so plenty of edges are still safe.
    let mut game = new_match(3, 5);
    let mut edges = Vec::new();
    for row in 0..2 {
        for col in 0..4 {
            edges.push(((row, col), (row, col + 1)));
        }
    }
    edges.push(((0, 0), (1, 0)));
    setup(&mut game, &edges);
    assert!(!safe_edges(game.board(), 0, 1).is_empty());
    let player = game.turn();
    let mut bot = Bot::with_seed(Tier::Expert, 19);

    let harvest = bot.harvest(&mut game).unwrap();
    assert_eq!(harvest.captured, 4);
    assert_eq!(harvest.sacrifice, None);
    assert!((0..4).all(|b| game.board().box_owner(b) == Some(player)));
    assert!((4..8).all(|b| game.board().drawn_count(b) == 1));
}

#[test]
fn test_hard_harvests_whole_chain_without_double_cross() {
    let mut game = double_cross_position();
    let player = game.turn();
    let mut bot = Bot::with_seed(Tier::Hard, 5);

    let report = bot.take_turn(&mut game).unwrap();
    assert_eq!(report.captured(), 4);
    assert_eq!(game.score(player), 4);
    assert_eq!(game.turn(), player.other());
}

#[test]
fn test_non_adjacent_move_rejected() {
    let mut game = new_match(3, 3);
    setup(&mut game, &[((0, 0), (0, 1))]);
    let before = snapshot(game.board());
    let turn = game.turn();

    for bad in [((0, 0), (1, 1)), ((0, 0), (0, 2)), ((1, 1), (1, 1))] {
        let err = game.play(&mv(bad), turn).unwrap_err();
        assert!(err.is_invalid_move(), "{bad:?}: {err}");
    }
    // Adjacent, but off the board.
    let err = game.play(&mv(((2, 2), (2, 3))), turn).unwrap_err();
    assert!(err.is_invalid_move());

    assert_eq!(snapshot(game.board()), before);
    assert_eq!(game.turn(), turn);
    assert_eq!(game.history().len(), 1);
}

// =============================================================================
// Invariants
// =============================================================================

#[test]
fn test_edge_claimed_at_most_once() {
    let mut board = Board::new(Arc::new(Grid::rectangular(3, 3).unwrap()));
    for e in 0..board.grid().num_edges() {
        let edge = board.grid().edge(e).unwrap();
        board.claim_edge(edge, Player::First).unwrap();
        let before = snapshot(&board);
        for player in [Player::First, Player::Second] {
            assert_eq!(
                board.claim_edge(edge, player).unwrap_err(),
                MoveError::EdgeAlreadyDrawn(edge)
            );
            assert_eq!(board.claim(e, player).unwrap_err(), MoveError::EdgeAlreadyDrawn(edge));
        }
        assert_eq!(snapshot(&board), before);
    }
    assert!(board.all_edges_drawn());
}

#[test]
fn test_random_games_conserve_captures() {
    let grid = Arc::new(Grid::rectangular(4, 5).unwrap());
    for seed in 0..20 {
        let game = random_game(Arc::clone(&grid), seed);
        let end = game.result().unwrap();
        assert_eq!((end.first + end.second) as usize, grid.num_boxes());
        let from_events: usize = game.history().iter().map(|e| e.boxes_captured as usize).sum();
        assert_eq!(from_events, grid.num_boxes());
        assert_eq!(game.history().len(), grid.num_edges());
    }
}

#[test]
fn test_safe_edges_never_reach_three_sides() {
    let grid = Arc::new(Grid::rectangular(5, 5).unwrap());
    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..10 {
        let mut board = Board::new(Arc::clone(&grid));
        loop {
            let safe = safe_edges(&board, 0, 1);
            if safe.is_empty() {
                break;
            }
            for &e in &safe {
                let mut probe = board.clone();
                probe.claim(e, Player::First).unwrap();
                assert!(grid.boxes_of(e).all(|b| probe.drawn_count(b) <= 2));
            }
            let e = safe[rng.usize(..safe.len())];
            board.claim(e, Player::First).unwrap();
        }
    }
}

#[test]
fn test_simulation_leaves_board_unchanged() {
    let grid = Arc::new(Grid::rectangular(4, 4).unwrap());
    let mut rng = fastrand::Rng::with_seed(23);
    let mut board = Board::new(Arc::clone(&grid));
    while !board.all_edges_drawn() {
        let before = snapshot(&board);
        for e in 0..grid.num_edges() {
            let first = simulate_chain(&board, e);
            assert_eq!(simulate_chain(&board, e), first);
        }
        assert_eq!(snapshot(&board), before);

        let undrawn: Vec<EdgeId> = board.undrawn_edges().collect();
        board.claim(undrawn[rng.usize(..undrawn.len())], Player::Second).unwrap();
    }
}

#[test]
fn test_self_play_every_tier() {
    let grid = Arc::new(Grid::rectangular(5, 5).unwrap());
    for tier in [Tier::Medium, Tier::Hard, Tier::Expert] {
        let mut game = Match::new(Arc::clone(&grid));
        let mut bots = [Bot::with_seed(tier, 1), Bot::with_seed(tier, 2)];
        loop {
            let player = game.turn();
            let report = bots[player.index()].take_turn(&mut game).unwrap();
            assert!(report.events.iter().all(|e| e.capturing_player == player));
            if report.outcome == TurnOutcome::NoMovesAvailable {
                break;
            }
        }
        let end = game.result().unwrap();
        assert_eq!(end.first + end.second, 16, "{tier}");
    }
}

#[test]
fn test_seeded_bots_are_reproducible() {
    let grid = Arc::new(Grid::rectangular(4, 4).unwrap());
    let play = |seed: u64| {
        let mut game = Match::new(Arc::clone(&grid));
        let mut bot = Bot::with_seed(Tier::Medium, seed);
        while bot.take_turn(&mut game).unwrap().outcome == TurnOutcome::Moved {}
        game.history().to_vec()
    };
    assert_eq!(play(9), play(9));
}

#[test]
fn test_parallel_matches_share_grid() {
    let grid = Arc::new(Grid::rectangular(5, 6).unwrap());
    let totals: Vec<u32> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4u64)
            .map(|seed| {
                let grid = Arc::clone(&grid);
                s.spawn(move || {
                    let mut game = Match::new(grid);
                    let mut bot = Bot::with_seed(Tier::Expert, seed);
                    while bot.take_turn(&mut game).unwrap().outcome == TurnOutcome::Moved {}
                    let end = game.result().unwrap();
                    end.first + end.second
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(totals, vec![20; 4]);
}

// =============================================================================
// Board descriptions
// =============================================================================

#[test]
fn test_cross_board_from_file() {
    let grid = load_grid("cross.json");
    assert_eq!(grid.num_boxes(), 5);
    assert_eq!(grid.num_edges(), 16);
    assert!(!grid.dot_map().is_present(0, 0));

    // The centre box borders all four arms.
    let centre = grid
        .boxes()
        .iter()
        .position(|b| (b.row, b.col) == (1, 1))
        .unwrap();
    let cell = grid.box_cell(centre).unwrap();
    for e in cell.edges() {
        assert_eq!(grid.boxes_of(e).count(), 2);
    }

    let game = random_game(grid, 4);
    assert_eq!(game.board().num_owned(), 5);
}

#[test]
fn test_ragged_board_from_file() {
    let grid = load_grid("ragged.json");
    assert_eq!(grid.num_boxes(), 4);
    assert_eq!(grid.num_edges(), 13);

    let mut game = Match::new(grid);
    let mut bot = Bot::with_seed(Tier::Expert, 8);
    while bot.take_turn(&mut game).unwrap().outcome == TurnOutcome::Moved {}
    assert!(game.is_over());
}

#[test]
fn test_invalid_cell_in_file() {
    let text = std::fs::read_to_string(data_file("bad_cell.json")).unwrap();
    assert_eq!(
        DotMap::from_json(&text).unwrap_err(),
        GeometryError::InvalidCell {
            row: 1,
            col: 1,
            value: "2".to_string()
        }
    );
}
