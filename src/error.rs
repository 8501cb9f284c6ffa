//! Error types for board construction and move validation.
//!
//! Every check happens before any mutation, so a returned error always means
//! the board is exactly as it was before the call.

use crate::board::Player;
use crate::geometry::{Edge, EdgeId, Vertex};

/// Failure to build a grid from a board description.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GeometryError {
    /// The description has no rows at all.
    #[display("board description is empty")]
    Empty,

    /// A cell holds something other than a presence flag.
    #[display("cell ({row}, {col}) must be 0 or 1, got {value}")]
    InvalidCell { row: usize, col: usize, value: String },

    /// The description is not a JSON array of rows.
    #[display("malformed board description: {_0}")]
    Malformed(String),

    /// No four present dots enclose a box.
    #[display("board description encloses no boxes")]
    NoBoxes,
}

impl std::error::Error for GeometryError {}

/// Rejection of a claimed edge.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The two dots are not one unit apart along a single axis.
    #[display("invalid move: {from} and {to} are not adjacent")]
    NotAdjacent { from: Vertex, to: Vertex },

    /// The dots are adjacent but the board has no edge between them.
    #[display("invalid move: no edge {_0} on this board")]
    UnknownEdge(Edge),

    /// Edge index out of range.
    #[display("invalid move: no edge with index {_0}")]
    UnknownEdgeId(EdgeId),

    /// The edge has already been claimed.
    #[display("edge {_0} is already drawn")]
    EdgeAlreadyDrawn(Edge),

    /// The player does not own the turn.
    #[display("it is not {_0}'s turn")]
    OutOfTurn(Player),

    /// Every edge is drawn.
    #[display("the match is over")]
    MatchOver,
}

impl MoveError {
    /// True for the errors meaning "this edge does not exist".
    pub fn is_invalid_move(&self) -> bool {
        matches!(
            self,
            MoveError::NotAdjacent { .. } | MoveError::UnknownEdge(_) | MoveError::UnknownEdgeId(_)
        )
    }
}

impl std::error::Error for MoveError {}
