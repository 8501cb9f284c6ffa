//! Match context: board state, turn owner, scores, and the events a match
//! produces for whoever relays or renders it.
//!
//! A [`Match`] is created at the start of a game and dropped when it ends.
//! It is driven through `&mut self`, so one match is only ever touched by one
//! caller at a time; separate matches share nothing but the immutable grid.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::board::{Board, Player};
use crate::error::MoveError;
use crate::geometry::{Edge, EdgeId, Grid, Vertex};

/// A move as delivered by a local UI or a remote relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveMessage {
    pub source_vertex: Vertex,
    pub dest_vertex: Vertex,
}

impl MoveMessage {
    pub fn new(source_vertex: Vertex, dest_vertex: Vertex) -> Self {
        Self {
            source_vertex,
            dest_vertex,
        }
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureEvent {
    pub edge: Edge,
    pub capturing_player: Player,
    pub boxes_captured: u8,
    /// True when the mover keeps the turn.
    pub turn_retained: bool,
}

/// Final scores, produced once every edge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEnd {
    pub first: u32,
    pub second: u32,
    /// `None` on a tie.
    pub winner: Option<Player>,
}

#[derive(Debug, Clone)]
pub struct Match {
    board: Board,
    turn: Player,
    history: Vec<CaptureEvent>,
}

impl Match {
    /// New match on `grid`, with [`Player::First`] to move.
    pub fn new(grid: Arc<Grid>) -> Self {
        Self::with_first(grid, Player::First)
    }

    pub fn with_first(grid: Arc<Grid>, first: Player) -> Self {
        Self {
            board: Board::new(grid),
            turn: first,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The player entitled to claim the next edge.
    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn score(&self, player: Player) -> u32 {
        self.board.score(player)
    }

    pub fn history(&self) -> &[CaptureEvent] {
        &self.history
    }

    pub fn is_over(&self) -> bool {
        self.board.all_edges_drawn()
    }

    /// Final scores, or `None` while edges remain.
    pub fn result(&self) -> Option<MatchEnd> {
        if !self.is_over() {
            return None;
        }
        Some(self.standings())
    }

    /// Current scores and leader.
    pub fn standings(&self) -> MatchEnd {
        let first = self.score(Player::First);
        let second = self.score(Player::Second);
        let winner = match first.cmp(&second) {
            std::cmp::Ordering::Greater => Some(Player::First),
            std::cmp::Ordering::Less => Some(Player::Second),
            std::cmp::Ordering::Equal => None,
        };
        MatchEnd {
            first,
            second,
            winner,
        }
    }

    /// Apply a move message for `player`.
    pub fn play(&mut self, mv: &MoveMessage, player: Player) -> Result<CaptureEvent, MoveError> {
        self.check_turn(player)?;
        let id = self.board.edge_between(mv.source_vertex, mv.dest_vertex)?;
        self.play_edge(id, player)
    }

    /// Claim an edge by index for `player`.
    ///
    /// The turn passes to the other player only when nothing was captured.
    #[instrument(level = "debug", skip(self), fields(turn = %self.turn))]
    pub fn play_edge(&mut self, id: EdgeId, player: Player) -> Result<CaptureEvent, MoveError> {
        self.check_turn(player)?;
        let claim = self.board.claim(id, player)?;
        let edge = self.board.grid().edges()[claim.edge];

        let boxes_captured = claim.count() as u8;
        let turn_retained = boxes_captured > 0;
        if !turn_retained {
            self.turn = player.other();
        }

        let event = CaptureEvent {
            edge,
            capturing_player: player,
            boxes_captured,
            turn_retained,
        };
        debug!(%edge, %player, boxes_captured, "edge claimed");
        self.history.push(event);

        if let Some(end) = self.result() {
            info!(first = end.first, second = end.second, "match over");
        }
        Ok(event)
    }

    fn check_turn(&self, player: Player) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::MatchOver);
        }
        if player != self.turn {
            return Err(MoveError::OutOfTurn(player));
        }
        Ok(())
    }
}
