//! Line-oriented text protocol for driving a match.
//!
//! Modelled on the Go Text Protocol: one command per line, an optional
//! numeric id in front, and responses of the form `=id message` on success
//! or `?id message` on failure, each followed by a blank line. A local UI or
//! a session relay feeds move messages through `play` and asks the computer
//! to move with `genmove`.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <rows> <cols>` - New rectangular board of dots
//! - `clear_board` - Restart the match on the current board
//! - `level <medium|hard|expert>` - Set the computer's tier
//! - `play <r1> <c1> <r2> <c2>` - Draw the edge between two dots
//! - `genmove` - Let the computer play the whole turn
//! - `score`, `final_score`
//! - `showboard`
//! - `history` - Capture events so far, as JSON

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::ValueEnum;
use tracing::{debug, warn};

use crate::constants::MAX_DOTS;
use crate::game::{CaptureEvent, Match, MoveMessage};
use crate::geometry::{Grid, Vertex};
use crate::strategy::{Bot, Tier, TurnOutcome};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "genmove",
    "history",
    "known_command",
    "level",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "score",
    "showboard",
    "version",
];

/// Protocol engine state.
pub struct Engine {
    grid: Arc<Grid>,
    game: Match,
    bot: Bot,
}

impl Engine {
    pub fn new(grid: Arc<Grid>, bot: Bot) -> Self {
        Self {
            game: Match::new(Arc::clone(&grid)),
            grid,
            bot,
        }
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        debug!(command, ?args, "command");
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "1".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    (true, known.to_string())
                }
                None => (false, "missing argument".to_string()),
            },

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some((rows, cols)) = parse_pair(args) else {
                    return (false, "expected <rows> <cols>".to_string());
                };
                if rows > MAX_DOTS || cols > MAX_DOTS {
                    return (false, format!("unacceptable size, at most {MAX_DOTS} dots per side"));
                }
                match Grid::rectangular(rows, cols) {
                    Ok(grid) => {
                        self.grid = Arc::new(grid);
                        self.game = Match::new(Arc::clone(&self.grid));
                        (true, String::new())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "clear_board" => {
                self.game = Match::new(Arc::clone(&self.grid));
                (true, String::new())
            }

            "level" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match Tier::from_str(name, true) {
                    Ok(tier) => {
                        self.bot.set_tier(tier);
                        (true, String::new())
                    }
                    Err(_) => (false, format!("unknown level: {name}")),
                }
            }

            "play" => {
                let (Some((r1, c1)), Some((r2, c2))) = (
                    parse_pair(args),
                    args.get(2..).and_then(parse_pair),
                ) else {
                    return (false, "expected <r1> <c1> <r2> <c2>".to_string());
                };
                let mv = MoveMessage::new(Vertex::new(r1, c1), Vertex::new(r2, c2));
                let player = self.game.turn();
                match self.game.play(&mv, player) {
                    Ok(event) => (true, describe(&event)),
                    Err(e) => {
                        warn!(%e, "move rejected");
                        (false, e.to_string())
                    }
                }
            }

            "genmove" => match self.bot.take_turn(&mut self.game) {
                Ok(report) if report.outcome == TurnOutcome::NoMovesAvailable
                    && report.events.is_empty() =>
                {
                    (true, "none".to_string())
                }
                Ok(report) => {
                    let lines: Vec<String> = report.events.iter().map(describe).collect();
                    (true, lines.join("\n"))
                }
                Err(e) => (false, e.to_string()),
            },

            "score" => {
                let s = self.game.standings();
                (true, format!("first {} second {}", s.first, s.second))
            }

            "final_score" => match self.game.result() {
                Some(end) => {
                    let verdict = match end.winner {
                        Some(p) => format!("{p} wins"),
                        None => "tie".to_string(),
                    };
                    (true, format!("{verdict} {}-{}", end.first, end.second))
                }
                None => (false, "match in progress".to_string()),
            },

            "showboard" => (true, format!("\n{}", self.game.board())),

            "history" => match serde_json::to_string(self.game.history()) {
                Ok(json) => (true, json),
                Err(e) => (false, e.to_string()),
            },

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

fn parse_pair(args: &[&str]) -> Option<(usize, usize)> {
    match args {
        [a, b, ..] => Some((a.parse().ok()?, b.parse().ok()?)),
        _ => None,
    }
}

/// One line per accepted edge: the edge, boxes taken, and who moves next.
fn describe(event: &CaptureEvent) -> String {
    let next = if event.turn_retained {
        event.capturing_player
    } else {
        event.capturing_player.other()
    };
    let (a, b) = (event.edge.source(), event.edge.dest());
    format!(
        "{} {} {} {} captured {} next {next}",
        a.row, a.col, b.row, b.col, event.boxes_captured
    )
}
