//! Board state: which edges are drawn and which boxes are owned.
//!
//! [`Board::claim`] is the only mutation. It validates first and then applies,
//! so a rejected claim never leaves a partial update behind.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::BOX_SIDES;
use crate::error::MoveError;
use crate::geometry::{BoxId, Edge, EdgeId, Grid, Vertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    #[display("first")]
    First,
    #[display("second")]
    Second,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }
}

/// Mutable state of a single box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoxState {
    /// Number of sides drawn (0-4).
    pub drawn: u8,
    /// Set once, when the fourth side is drawn.
    pub owner: Option<Player>,
}

/// Outcome of a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub edge: EdgeId,
    pub player: Player,
    /// Boxes completed by this claim.
    pub captured: [Option<BoxId>; 2],
}

impl Claim {
    pub fn count(&self) -> usize {
        self.captured.iter().flatten().count()
    }

    pub fn captured(&self) -> impl Iterator<Item = BoxId> + '_ {
        self.captured.iter().flatten().copied()
    }
}

/// Drawn edges, box counts, and scores for one match.
///
/// The geometry is shared, so cloning a board copies only the mutable state.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Arc<Grid>,
    edges: Vec<Option<Player>>,
    cells: Vec<BoxState>,
    scores: [u32; 2],
    n_drawn: usize,
}

impl Board {
    pub fn new(grid: Arc<Grid>) -> Self {
        Self {
            edges: vec![None; grid.num_edges()],
            cells: vec![BoxState::default(); grid.num_boxes()],
            grid,
            scores: [0; 2],
            n_drawn: 0,
        }
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    /// Resolve the edge between two dots.
    pub fn edge_between(&self, a: Vertex, b: Vertex) -> Result<EdgeId, MoveError> {
        let edge = Edge::new(a, b)?;
        self.grid
            .edge_id(&edge)
            .ok_or(MoveError::UnknownEdge(edge))
    }

    /// Draw an edge for `player`.
    ///
    /// Each bordering box is incremented and checked for completion before
    /// the claim returns, so an edge shared by two three-sided boxes
    /// captures both.
    pub fn claim(&mut self, id: EdgeId, player: Player) -> Result<Claim, MoveError> {
        let edge = self.grid.edge(id).ok_or(MoveError::UnknownEdgeId(id))?;
        if self.edges[id].is_some() {
            return Err(MoveError::EdgeAlreadyDrawn(edge));
        }

        self.edges[id] = Some(player);
        self.n_drawn += 1;

        let mut captured = [None; 2];
        for (slot, b) in self.grid.boxes_of(id).enumerate() {
            let cell = &mut self.cells[b];
            cell.drawn += 1;
            if cell.drawn == BOX_SIDES {
                cell.owner = Some(player);
                self.scores[player.index()] += 1;
                captured[slot] = Some(b);
            }
        }

        Ok(Claim {
            edge: id,
            player,
            captured,
        })
    }

    /// Draw the edge between two dots for `player`.
    pub fn claim_edge(&mut self, edge: Edge, player: Player) -> Result<Claim, MoveError> {
        let id = self
            .grid
            .edge_id(&edge)
            .ok_or(MoveError::UnknownEdge(edge))?;
        self.claim(id, player)
    }

    pub fn is_edge_drawn(&self, id: EdgeId) -> bool {
        matches!(self.edges.get(id), Some(Some(_)))
    }

    pub fn edge_owner(&self, id: EdgeId) -> Option<Player> {
        self.edges.get(id).copied().flatten()
    }

    /// State of a box. An id outside the grid reads as an empty, unowned box.
    pub fn box_state(&self, id: BoxId) -> BoxState {
        self.cells.get(id).copied().unwrap_or_default()
    }

    pub fn box_owner(&self, id: BoxId) -> Option<Player> {
        self.box_state(id).owner
    }

    /// Number of drawn sides of a box.
    pub fn drawn_count(&self, id: BoxId) -> u8 {
        self.box_state(id).drawn
    }

    pub fn all_edges_drawn(&self) -> bool {
        self.n_drawn == self.edges.len()
    }

    pub fn num_drawn(&self) -> usize {
        self.n_drawn
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }

    /// Number of boxes with an owner.
    pub fn num_owned(&self) -> usize {
        self.cells.iter().filter(|c| c.owner.is_some()).count()
    }

    pub fn undrawn_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_none())
            .map(|(i, _)| i)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.grid.dot_map();
        let drawn = |a: (usize, usize), b: (usize, usize)| {
            self.edge_between(Vertex::new(a.0, a.1), Vertex::new(b.0, b.1))
                .ok()
                .map(|id| self.is_edge_drawn(id))
        };
        let mut owners = vec![vec![None; map.width()]; map.height()];
        for (id, cell) in self.grid.boxes().iter().enumerate() {
            owners[cell.row][cell.col] = self.box_owner(id);
        }

        for row in 0..map.height() {
            for col in 0..map.width() {
                write!(f, "{}", if map.is_present(row, col) { '+' } else { ' ' })?;
                let across = match drawn((row, col), (row, col + 1)) {
                    Some(true) => "---",
                    _ => "   ",
                };
                if col + 1 < map.width() {
                    write!(f, "{across}")?;
                }
            }
            writeln!(f)?;
            if row + 1 == map.height() {
                break;
            }
            for col in 0..map.width() {
                let down = match drawn((row, col), (row + 1, col)) {
                    Some(true) => '|',
                    _ => ' ',
                };
                write!(f, "{down}")?;
                if col + 1 < map.width() {
                    let owner = match owners[row][col] {
                        Some(Player::First) => " 1 ",
                        Some(Player::Second) => " 2 ",
                        None => "   ",
                    };
                    write!(f, "{owner}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: usize, cols: usize) -> Board {
        Board::new(Arc::new(Grid::rectangular(rows, cols).unwrap()))
    }

    fn v(row: usize, col: usize) -> Vertex {
        Vertex::new(row, col)
    }

    #[test]
    fn test_new_board_is_empty() {
        let b = board(3, 3);
        assert_eq!(b.num_drawn(), 0);
        assert!(!b.all_edges_drawn());
        assert_eq!(b.score(Player::First), 0);
        assert!((0..4).all(|id| b.drawn_count(id) == 0 && b.box_owner(id).is_none()));
    }

    #[test]
    fn test_claim_increments_both_boxes() {
        let mut b = board(2, 3);
        let shared = b.edge_between(v(0, 1), v(1, 1)).unwrap();
        let claim = b.claim(shared, Player::First).unwrap();
        assert_eq!(claim.count(), 0);
        assert_eq!(b.drawn_count(0), 1);
        assert_eq!(b.drawn_count(1), 1);
        assert_eq!(b.edge_owner(shared), Some(Player::First));
    }

    #[test]
    fn test_duplicate_claim_rejected() {
        let mut b = board(2, 2);
        let top = b.edge_between(v(0, 0), v(0, 1)).unwrap();
        b.claim(top, Player::First).unwrap();
        let err = b.claim(top, Player::Second).unwrap_err();
        assert!(matches!(err, MoveError::EdgeAlreadyDrawn(_)));
        assert_eq!(b.drawn_count(0), 1);
        assert_eq!(b.edge_owner(top), Some(Player::First));
    }

    #[test]
    fn test_unknown_edge_rejected() {
        let mut b = board(2, 2);
        assert_eq!(
            b.claim(99, Player::First).unwrap_err(),
            MoveError::UnknownEdgeId(99)
        );
        let outside = Edge::new(v(5, 5), v(5, 6)).unwrap();
        assert!(b.claim_edge(outside, Player::First).unwrap_err().is_invalid_move());
        assert_eq!(b.num_drawn(), 0);
    }

    #[test]
    fn test_player_display() {
        assert_eq!(Player::First.to_string(), "first");
        assert_eq!(Player::Second.to_string(), "second");
        assert_eq!(format!("{}", Player::First.other()), "second");
    }

    #[test]
    fn test_box_outside_grid_reads_empty() {
        let b = board(2, 2);
        assert_eq!(b.box_state(999), BoxState::default());
        assert_eq!(b.box_owner(999), None);
        assert_eq!(b.drawn_count(999), 0);
    }

    #[test]
    fn test_display() {
        let mut b = board(2, 2);
        for (a, c) in [(v(0, 0), v(0, 1)), (v(1, 0), v(1, 1)), (v(0, 0), v(1, 0))] {
            b.claim_edge(Edge::new(a, c).unwrap(), Player::First).unwrap();
        }
        b.claim_edge(Edge::new(v(0, 1), v(1, 1)).unwrap(), Player::Second)
            .unwrap();
        assert_eq!(b.to_string(), "+---+\n| 2 |\n+---+\n");
    }
}
