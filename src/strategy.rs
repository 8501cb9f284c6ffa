//! Computer opponent.
//!
//! Each turn runs the same steps:
//! 1. Harvest: take every box that already has three sides drawn. At the
//!    expert tier, once no safe edge is left, the last chain is harvested
//!    only up to its final two boxes, which are handed over with the
//!    double-cross sacrifice so the opponent must open the next chain.
//! 2. Safety check: draw an edge that cannot give away a box, if one exists.
//! 3. Chain analysis: otherwise open the chain that gives away the fewest
//!    boxes, as predicted by [`simulate_chain`].
//!
//! If the chosen edge captures, the bot keeps the turn and starts over.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::analysis::{
    ChainSimulation, boxes_with_drawn, safe_edges, simulate_chain, undrawn_edges_of,
};
use crate::board::{Board, Player};
use crate::constants::{
    DOUBLE_CROSS_SACRIFICE, DOUBLE_CROSS_THRESHOLD, HARVEST_DRAWN, OPENING_DRAWN, SAFE_MAX_DRAWN,
};
use crate::error::MoveError;
use crate::game::{CaptureEvent, Match};
use crate::geometry::{BoxId, EdgeId};

/// Strength of the computer opponent.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Harvests, otherwise plays any safe edge or any chain-opening edge.
    #[display("medium")]
    Medium,
    /// Opens the chain that gives away the fewest boxes.
    #[default]
    #[display("hard")]
    Hard,
    /// Hard, plus the double-cross.
    #[display("expert")]
    Expert,
}

/// Edges claimed while harvesting.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub events: Vec<CaptureEvent>,
    /// Boxes taken.
    pub captured: usize,
    /// Edge that hands over the last two boxes of a chain, when the
    /// double-cross was chosen.
    pub sacrifice: Option<EdgeId>,
}

impl Harvest {
    fn record(&mut self, event: CaptureEvent) {
        self.captured += event.boxes_captured as usize;
        self.events.push(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The bot drew an edge and passed the turn.
    Moved,
    /// No edge is left to draw: the match is over.
    NoMovesAvailable,
}

#[derive(Debug, Clone)]
pub struct TurnReport {
    pub events: Vec<CaptureEvent>,
    pub outcome: TurnOutcome,
}

impl TurnReport {
    pub fn captured(&self) -> usize {
        self.events.iter().map(|e| e.boxes_captured as usize).sum()
    }
}

/// The computer player. It plays whichever side owns the turn.
pub struct Bot {
    tier: Tier,
    rng: fastrand::Rng,
}

impl Bot {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            rng: fastrand::Rng::new(),
        }
    }

    /// Bot with a fixed seed, for reproducible games.
    pub fn with_seed(tier: Tier, seed: u64) -> Self {
        Self {
            tier,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
    }

    /// Play a full turn for the player to move.
    #[instrument(skip_all, fields(tier = %self.tier, player = %game.turn()))]
    pub fn take_turn(&mut self, game: &mut Match) -> Result<TurnReport, MoveError> {
        let player = game.turn();
        let mut report = TurnReport {
            events: Vec::new(),
            outcome: TurnOutcome::Moved,
        };

        loop {
            let harvest = self.harvest(game)?;
            report.events.extend(harvest.events);

            let choice = harvest.sacrifice.or_else(|| self.choose_edge(game.board()));
            let Some(edge) = choice else {
                debug!("no moves available");
                report.outcome = TurnOutcome::NoMovesAvailable;
                break;
            };

            let event = game.play_edge(edge, player)?;
            report.events.push(event);
            if !event.turn_retained {
                break;
            }
        }
        Ok(report)
    }

    /// Take every box with three sides drawn, repeating until none is left.
    ///
    /// At the expert tier with no safe edge left, one chain longer than two
    /// boxes is harvested only up to its last two boxes and the sacrifice
    /// edge is returned instead of being drawn.
    pub fn harvest(&mut self, game: &mut Match) -> Result<Harvest, MoveError> {
        let mut harvest = Harvest::default();
        let n_boxes = game.board().grid().num_boxes();

        let plan = if self.tier == Tier::Expert
            && safe_edges(game.board(), 0, SAFE_MAX_DRAWN).is_empty()
        {
            select_double_cross(game.board())
        } else {
            None
        };

        let mut reserved = vec![false; n_boxes];
        if let Some(chain) = &plan {
            for &b in &chain.boxes {
                reserved[b] = true;
            }
        }
        sweep(game, &reserved, &mut harvest)?;

        if let Some(chain) = plan {
            let player = game.turn();
            match double_cross(game.board(), chain.start) {
                Some((take, sacrifice)) => {
                    debug!(taken = take.len(), sacrifice, "double-cross");
                    for e in take {
                        harvest.record(game.play_edge(e, player)?);
                    }
                    harvest.sacrifice = Some(sacrifice);
                }
                None => sweep(game, &vec![false; n_boxes], &mut harvest)?,
            }
        }
        Ok(harvest)
    }

    /// Pick the next edge once nothing is left to harvest.
    pub fn choose_edge(&mut self, board: &Board) -> Option<EdgeId> {
        let safe = safe_edges(board, 0, SAFE_MAX_DRAWN);
        if !safe.is_empty() {
            let edge = match self.tier {
                Tier::Medium | Tier::Hard => self.pick(&safe),
                Tier::Expert => {
                    let fewest = fewest_captures(board, &safe);
                    self.pick(&fewest)
                }
            };
            trace!(edge, candidates = safe.len(), "safe move");
            return Some(edge);
        }

        let mut candidates = safe_edges(board, OPENING_DRAWN, OPENING_DRAWN);
        if candidates.is_empty() {
            // Edges between boxes at different counts; only empty when the
            // board is full.
            candidates = board.undrawn_edges().collect();
        }
        if candidates.is_empty() {
            return None;
        }

        let edge = match self.tier {
            Tier::Medium => self.pick(&candidates),
            Tier::Hard | Tier::Expert => least_cascade(board, &candidates)?,
        };
        debug!(edge, candidates = candidates.len(), "opening a chain");
        Some(edge)
    }

    fn pick(&mut self, edges: &[EdgeId]) -> EdgeId {
        edges[self.rng.usize(..edges.len())]
    }
}

/// Chain chosen for the double-cross.
struct DoubleCrossPlan {
    /// The three-sided box the chain is harvested from.
    start: BoxId,
    boxes: Vec<BoxId>,
}

/// Claim the open side of every unreserved three-sided box until none is left.
fn sweep(game: &mut Match, reserved: &[bool], harvest: &mut Harvest) -> Result<(), MoveError> {
    let player = game.turn();
    loop {
        let next = boxes_with_drawn(game.board(), HARVEST_DRAWN)
            .into_iter()
            .find(|&b| !reserved[b]);
        let Some(b) = next else {
            return Ok(());
        };
        let Some(&edge) = undrawn_edges_of(game.board(), b).first() else {
            return Ok(());
        };
        harvest.record(game.play_edge(edge, player)?);
    }
}

/// The cascade that starts by completing a three-sided box.
fn chain_from(board: &Board, start: BoxId) -> Option<ChainSimulation> {
    let open = *undrawn_edges_of(board, start).first()?;
    Some(simulate_chain(board, open))
}

/// Shortest open chain long enough to be worth a double-cross.
fn select_double_cross(board: &Board) -> Option<DoubleCrossPlan> {
    let mut best: Option<(BoxId, ChainSimulation)> = None;
    for start in boxes_with_drawn(board, HARVEST_DRAWN) {
        let Some(sim) = chain_from(board, start) else {
            continue;
        };
        if sim.captures <= DOUBLE_CROSS_THRESHOLD || !is_simple_chain(board, &sim) {
            continue;
        }
        if best.as_ref().is_none_or(|(_, b)| sim.captures < b.captures) {
            best = Some((start, sim));
        }
    }
    best.map(|(start, sim)| DoubleCrossPlan {
        start,
        boxes: sim.boxes,
    })
}

/// Edges to claim and the sacrifice edge for a double-cross of the chain
/// harvested from `start`, or `None` when it is not worth it.
fn double_cross(board: &Board, start: BoxId) -> Option<(Vec<EdgeId>, EdgeId)> {
    let sim = chain_from(board, start)?;
    let k = sim.boxes.len();
    if k <= DOUBLE_CROSS_THRESHOLD || !is_simple_chain(board, &sim) {
        return None;
    }
    // Control only pays off if more than the sacrifice is left elsewhere.
    let outside = board.grid().num_boxes() - board.num_owned() - k;
    if outside <= DOUBLE_CROSS_SACRIFICE {
        debug!(outside, "last chain, taking everything");
        return None;
    }
    let take = sim.edges[..k - DOUBLE_CROSS_SACRIFICE].to_vec();
    Some((take, sim.edges[k - 1]))
}

/// True when the cascade walks a simple path: the first box has three
/// sides, every other box two, each edge joins consecutive boxes, and the
/// last edge leads out of the chain.
fn is_simple_chain(board: &Board, sim: &ChainSimulation) -> bool {
    let grid = board.grid();
    let k = sim.boxes.len();
    if k == 0 || sim.edges.len() != k {
        return false;
    }
    if board.drawn_count(sim.boxes[0]) != HARVEST_DRAWN
        || sim.boxes[1..]
            .iter()
            .any(|&b| board.drawn_count(b) != OPENING_DRAWN)
    {
        return false;
    }
    let joins = |e: EdgeId, a: BoxId, b: BoxId| {
        let sides: Vec<BoxId> = grid.boxes_of(e).collect();
        sides.contains(&a) && sides.contains(&b)
    };
    if !(0..k - 1).all(|i| joins(sim.edges[i], sim.boxes[i], sim.boxes[i + 1])) {
        return false;
    }
    grid.boxes_of(sim.edges[k - 1])
        .all(|b| b == sim.boxes[k - 1] || !sim.boxes.contains(&b))
}

/// Safe candidates that leave the opponent the shortest chains.
///
/// Each candidate is drawn on a copy of the board; the score is the longest
/// cascade that opening one of its boxes would then give away.
fn fewest_captures(board: &Board, candidates: &[EdgeId]) -> Vec<EdgeId> {
    let counts: Vec<usize> = candidates
        .iter()
        .map(|&e| future_cascade(board, e))
        .collect();
    let Some(&min) = counts.iter().min() else {
        return Vec::new();
    };
    candidates
        .iter()
        .zip(&counts)
        .filter(|&(_, &n)| n == min)
        .map(|(&e, _)| e)
        .collect()
}

fn future_cascade(board: &Board, edge: EdgeId) -> usize {
    let mut probe = board.clone();
    // The claimant does not affect drawn counts.
    if probe.claim(edge, Player::First).is_err() {
        return usize::MAX;
    }
    board
        .grid()
        .boxes_of(edge)
        .flat_map(|b| undrawn_edges_of(&probe, b))
        .map(|e| simulate_chain(&probe, e).captures)
        .max()
        .unwrap_or(0)
}

/// First candidate with the smallest predicted cascade. Candidates already
/// drawn by an earlier simulation belong to the same chain and are skipped.
fn least_cascade(board: &Board, candidates: &[EdgeId]) -> Option<EdgeId> {
    let mut covered = vec![false; board.grid().num_edges()];
    let mut best: Option<(usize, EdgeId)> = None;
    for &e in candidates {
        if covered[e] {
            continue;
        }
        let sim = simulate_chain(board, e);
        trace!(edge = e, captures = sim.captures, "simulated");
        for &x in &sim.edges {
            covered[x] = true;
        }
        if best.is_none_or(|(n, _)| sim.captures < n) {
            best = Some((sim.captures, e));
        }
    }
    best.map(|(_, e)| e)
}
