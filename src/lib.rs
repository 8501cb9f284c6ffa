//! Dots-and-Boxes: board engine and computer opponent.
//!
//! Players take turns drawing edges between neighbouring dots. Drawing the
//! fourth side of a box captures it and earns another move; the player with
//! more boxes when every edge is drawn wins.
//!
//! ## Modules
//!
//! - [`constants`] - Default board size, analysis windows, strategy tuning
//! - [`geometry`] - Dots, edges, boxes, and their adjacency
//! - [`board`] - Drawn edges, box counts, owners, and scores
//! - [`analysis`] - Safe edges and capture-cascade simulation
//! - [`strategy`] - Computer opponent (harvest, safe move, double-cross)
//! - [`game`] - Match context, move messages, and capture events
//! - [`protocol`] - Line-oriented text protocol
//! - [`error`] - Geometry and move errors
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use dotsboxes_rust::board::Player;
//! use dotsboxes_rust::game::{Match, MoveMessage};
//! use dotsboxes_rust::geometry::{Grid, Vertex};
//! use dotsboxes_rust::strategy::{Bot, Tier};
//!
//! let grid = Arc::new(Grid::rectangular(4, 4).unwrap());
//! let mut game = Match::new(grid);
//!
//! // Human draws the top-left edge
//! let mv = MoveMessage::new(Vertex::new(0, 0), Vertex::new(0, 1));
//! game.play(&mv, Player::First).unwrap();
//!
//! // Computer answers
//! let mut bot = Bot::with_seed(Tier::Expert, 1);
//! let report = bot.take_turn(&mut game).unwrap();
//! println!("{} edges drawn", report.events.len());
//! ```

pub mod analysis;
pub mod board;
pub mod constants;
pub mod error;
pub mod game;
pub mod geometry;
pub mod protocol;
pub mod strategy;
