//! Chain and safety analysis.
//!
//! Read-only queries over a [`Board`]:
//! - which sides of a box are still open
//! - which boxes an edge borders
//! - which edges are safe to draw for a given window of drawn-side counts
//! - what a capture cascade started by one edge would yield
//!
//! Nothing here mutates the board. The chain simulation keeps its own shadow
//! set of hypothetically drawn edges on top of the real ones.

use crate::board::Board;
use crate::constants::HARVEST_DRAWN;
use crate::geometry::{BoxId, EdgeId};

/// The sides of a box that are not drawn yet, in top, bottom, left, right order.
pub fn undrawn_edges_of(board: &Board, b: BoxId) -> Vec<EdgeId> {
    board
        .grid()
        .box_cell(b)
        .map(|cell| {
            cell.edges()
                .into_iter()
                .filter(|&e| !board.is_edge_drawn(e))
                .collect()
        })
        .unwrap_or_default()
}

/// The boxes bordering an edge, minus `exclude`, optionally only uncaptured ones.
pub fn boxes_sharing(
    board: &Board,
    edge: EdgeId,
    exclude: Option<BoxId>,
    uncaptured_only: bool,
) -> Vec<BoxId> {
    board
        .grid()
        .boxes_of(edge)
        .filter(|&b| Some(b) != exclude)
        .filter(|&b| !uncaptured_only || board.box_owner(b).is_none())
        .collect()
}

/// All boxes with exactly `n` drawn sides, in row-major order.
pub fn boxes_with_drawn(board: &Board, n: u8) -> Vec<BoxId> {
    (0..board.grid().num_boxes())
        .filter(|&b| board.drawn_count(b) == n)
        .collect()
}

/// Undrawn edges all of whose boxes have between `min` and `max` sides drawn.
///
/// With `(0, 1)` these are the edges that cannot bring any box to three sides.
/// With `(2, 2)` they are the edges that open a chain.
pub fn safe_edges(board: &Board, min: u8, max: u8) -> Vec<EdgeId> {
    let in_window = |b: BoxId| (min..=max).contains(&board.drawn_count(b));
    let mut seen = vec![false; board.grid().num_edges()];
    let mut edges = Vec::new();

    for b in 0..board.grid().num_boxes() {
        if !in_window(b) {
            continue;
        }
        for e in undrawn_edges_of(board, b) {
            if seen[e] {
                continue;
            }
            if board.grid().boxes_of(e).all(in_window) {
                seen[e] = true;
                edges.push(e);
            }
        }
    }
    edges
}

/// Predicted result of drawing an edge and following the capture cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainSimulation {
    /// Boxes the side that continues the cascade would take.
    pub captures: usize,
    /// Boxes reaching three or four sides, in cascade order.
    pub boxes: Vec<BoxId>,
    /// Hypothetically drawn edges, starting with the opening edge.
    pub edges: Vec<EdgeId>,
}

/// Simulate drawing `edge` and every forced follow-up capture.
///
/// A box that would have three or more sides counts as captured; if it still
/// has an open side, that side is drawn next and the box beyond it examined.
pub fn simulate_chain(board: &Board, edge: EdgeId) -> ChainSimulation {
    let grid = board.grid();
    let mut sim = ChainSimulation::default();
    if edge >= grid.num_edges() || board.is_edge_drawn(edge) {
        return sim;
    }

    let mut shadow = vec![false; grid.num_edges()];
    let mut counted = vec![false; grid.num_boxes()];
    shadow[edge] = true;
    sim.edges.push(edge);

    // Fullest box first, so a cascade started next to a three-sided box
    // lists that box before the rest of its chain.
    let mut work = boxes_sharing(board, edge, None, true);
    work.sort_by_key(|&b| board.drawn_count(b));
    while let Some(b) = work.pop() {
        if counted[b] {
            continue;
        }
        let undrawn = undrawn_edges_of(board, b);
        let open: Vec<EdgeId> = undrawn.iter().copied().filter(|&e| !shadow[e]).collect();
        let sides = board.drawn_count(b) as usize + (undrawn.len() - open.len());
        if sides < HARVEST_DRAWN as usize {
            continue;
        }

        counted[b] = true;
        sim.captures += 1;
        sim.boxes.push(b);

        if let Some(&next) = open.first() {
            shadow[next] = true;
            sim.edges.push(next);
            for nb in boxes_sharing(board, next, Some(b), true) {
                if !counted[nb] && !work.contains(&nb) {
                    work.push(nb);
                }
            }
        }
    }
    sim
}
