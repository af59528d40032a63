use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::error::TallyError;
use crate::tally::{PlayerCount, Tally};

// Table display constants
const COLUMN_WIDTH_PLAYER: usize = 32;
const COLUMN_WIDTH_GAMES: usize = 5;
const COLUMN_WIDTH_SHARE: usize = 6;
const TABLE_WIDTH: usize = 52;
const PERCENTAGE_MULTIPLIER: f64 = 100.0;

/// Destination for the outcome of a count run
pub trait ResultSink {
    /// Show sorted player counts and the number of games they came from
    fn show_results(&mut self, players: &[PlayerCount], total_games: usize) -> Result<()>;

    /// Show a failure report (already formatted, possibly multi-line)
    fn show_error(&mut self, report: &str) -> Result<()>;

    fn show_tally(&mut self, tally: &Tally) -> Result<()> {
        self.show_results(&tally.players, tally.total_games)
    }
}

/// Send a count outcome to the matching sink.
///
/// # Returns
/// * `Ok(true)` if results went to `results`
/// * `Ok(false)` if an error report went to `errors`
pub fn deliver(
    outcome: Result<Tally, TallyError>,
    results: &mut dyn ResultSink,
    errors: &mut dyn ResultSink,
) -> Result<bool> {
    match outcome {
        Ok(tally) => {
            results.show_tally(&tally)?;
            Ok(true)
        }
        Err(e) => {
            errors.show_error(&e.to_string())?;
            Ok(false)
        }
    }
}

/// Plain-text table writer
pub struct TableSink<W: Write> {
    out: W,
}

impl<W: Write> TableSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

/// Render the results table as lines of text.
///
/// Each row shows the player, their game count and their share of all
/// player slots.
pub fn render_table(players: &[PlayerCount], total_games: usize) -> Vec<String> {
    let mut lines = Vec::new();

    if players.is_empty() {
        lines.push("No games recorded.".to_string());
        return lines;
    }

    let slots: usize = players.iter().map(|p| p.games).sum();

    lines.push(format!(
        "{:<wp$} | {:>wg$} | {:>ws$}",
        "Player",
        "Games",
        "Share",
        wp = COLUMN_WIDTH_PLAYER,
        wg = COLUMN_WIDTH_GAMES,
        ws = COLUMN_WIDTH_SHARE
    ));
    lines.push("-".repeat(TABLE_WIDTH));

    for player in players {
        let percentage = (player.games as f64 / slots as f64) * PERCENTAGE_MULTIPLIER;
        lines.push(format!(
            "{:<wp$} | {:>wg$} | {:>ws$.1}%",
            player.name,
            player.games,
            percentage,
            wp = COLUMN_WIDTH_PLAYER,
            wg = COLUMN_WIDTH_GAMES,
            ws = COLUMN_WIDTH_SHARE - 1
        ));
    }

    lines.push("-".repeat(TABLE_WIDTH));
    lines.push(format!(
        "{:<wp$} | {:>wg$}",
        "TOTAL GAMES",
        total_games,
        wp = COLUMN_WIDTH_PLAYER,
        wg = COLUMN_WIDTH_GAMES
    ));
    lines
}

impl<W: Write> ResultSink for TableSink<W> {
    fn show_results(&mut self, players: &[PlayerCount], total_games: usize) -> Result<()> {
        writeln!(self.out, "╔══════════════════════════════════════════════════╗")?;
        writeln!(self.out, "║                   GAME COUNTS                    ║")?;
        writeln!(self.out, "╚══════════════════════════════════════════════════╝")?;
        for line in render_table(players, total_games) {
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush().context("Failed to flush results")
    }

    fn show_error(&mut self, report: &str) -> Result<()> {
        writeln!(self.out, "✗ {}", report)?;
        self.out.flush().context("Failed to flush error report")
    }
}

#[derive(Serialize)]
struct JsonResults<'a> {
    total_games: usize,
    players: &'a [PlayerCount],
}

#[derive(Serialize)]
struct JsonError<'a> {
    error: &'a str,
}

/// Machine-readable writer, one JSON document per call
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, value).context("Failed to write JSON")?;
        writeln!(self.out)?;
        self.out.flush().context("Failed to flush JSON output")
    }
}

impl<W: Write> ResultSink for JsonSink<W> {
    fn show_results(&mut self, players: &[PlayerCount], total_games: usize) -> Result<()> {
        self.write_json(&JsonResults {
            total_games,
            players,
        })
    }

    fn show_error(&mut self, report: &str) -> Result<()> {
        self.write_json(&JsonError { error: report })
    }
}
