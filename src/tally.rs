use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::{LineError, TallyError};
use crate::normalize::{clean_input, normalize};
use crate::parser::{GameRecord, ParseOptions, parse_line};

/// Default cap on pasted input (1 MiB)
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Number of games one player appeared in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerCount {
    pub name: String,
    pub games: usize,
}

/// Sorted player counts plus the number of games they came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub total_games: usize,
    pub players: Vec<PlayerCount>,
}

/// Result of a lenient count: whatever parsed, plus what didn't
#[derive(Debug, Clone, Default)]
pub struct PartialTally {
    pub tally: Tally,
    pub errors: Vec<LineError>,
}

/// Fold the rosters of all games into sorted per-player game counts.
///
/// Every listed occurrence counts, so a name written twice in one game is
/// counted twice.
pub fn aggregate(games: &[GameRecord]) -> Vec<PlayerCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for game in games {
        for player in game.players() {
            let key = normalize(player);
            if key.is_empty() {
                continue;
            }
            counts.entry(key).and_modify(|c| *c += 1).or_insert(1);
        }
    }

    let mut players: Vec<PlayerCount> = counts
        .into_iter()
        .map(|(name, games)| PlayerCount { name, games })
        .collect();
    players.sort_by(compare_players);
    players
}

/// Display order: most games first, then by name.
///
/// Names compare on a collation key (accents dropped, lowercased) before
/// falling back to the exact string, which keeps the order total.
pub fn compare_players(a: &PlayerCount, b: &PlayerCount) -> Ordering {
    b.games
        .cmp(&a.games)
        .then_with(|| collation_key(&a.name).cmp(&collation_key(&b.name)))
        .then_with(|| a.name.cmp(&b.name))
}

fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|&ch| !is_combining_mark(ch))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split a cleaned buffer into non-blank lines with their 1-based positions
pub fn split_lines(cleaned: &str) -> impl Iterator<Item = (usize, &str)> {
    cleaned
        .split('\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

fn check_size(input: &str, max_input_bytes: usize) -> Result<(), TallyError> {
    if input.len() > max_input_bytes {
        return Err(TallyError::InputTooLarge {
            size: input.len(),
            max: max_input_bytes,
        });
    }
    Ok(())
}

fn parse_all(cleaned: &str, options: &ParseOptions) -> (Vec<GameRecord>, Vec<LineError>) {
    let mut games = Vec::new();
    let mut errors = Vec::new();

    for (line_number, line) in split_lines(cleaned) {
        match parse_line(line, line_number, options) {
            Ok(Some(game)) => games.push(game),
            Ok(None) => {}
            Err(e) => {
                debug!(line = line_number, error = %e, "rejected line");
                errors.push(e);
            }
        }
    }

    (games, errors)
}

/// Count games per player, failing if any line is malformed.
///
/// Every line is parsed before deciding, so the error report lists all
/// problems at once. No partial result is returned on failure.
///
/// # Arguments
/// * `input` - The full multi-line text as typed or pasted
/// * `options` - Parser strictness settings
/// * `max_input_bytes` - Reject inputs larger than this
///
/// # Returns
/// * `Ok(Tally)` with sorted counts and the number of games
/// * `Err(TallyError)` for empty input, oversized input, line errors or no games
pub fn count_games(
    input: &str,
    options: &ParseOptions,
    max_input_bytes: usize,
) -> Result<Tally, TallyError> {
    check_size(input, max_input_bytes)?;

    let cleaned = clean_input(input);
    if cleaned.trim().is_empty() {
        return Err(TallyError::EmptyInput);
    }

    let (games, errors) = parse_all(&cleaned, options);

    if !errors.is_empty() {
        return Err(TallyError::LineErrors(errors));
    }
    if games.is_empty() {
        return Err(TallyError::NoGamesParsed);
    }

    let players = aggregate(&games);
    info!(games = games.len(), players = players.len(), "counted games");

    Ok(Tally {
        total_games: games.len(),
        players,
    })
}

/// Count whatever parses and report the rest alongside.
///
/// Used for live recounting while the user is still typing, where a half
/// written line should not hide the counts of the finished ones.
pub fn count_games_partial(
    input: &str,
    options: &ParseOptions,
    max_input_bytes: usize,
) -> Result<PartialTally, TallyError> {
    check_size(input, max_input_bytes)?;

    let cleaned = clean_input(input);
    let (games, errors) = parse_all(&cleaned, options);

    Ok(PartialTally {
        tally: Tally {
            total_games: games.len(),
            players: aggregate(&games),
        },
        errors,
    })
}
