use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LineError, LineErrorKind, Side};
use crate::normalize::normalize;

/// Names shorter than this many characters are reported as suspicious
pub const DEFAULT_SHORT_NAME_THRESHOLD: usize = 2;

// ASCII hyphen plus the Unicode hyphen/dash block and the minus sign
const DASHES: &str = r"\-\x{2010}-\x{2015}\x{2212}";

// Only ASCII letters and digits glue onto a score, so "Zoë21-12" still splits
const ASCII_BOUNDARY: &str = r"(?-u:\b)";

static NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s*").expect("static regex must compile"));

static SCORE_DASH_OR_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{ASCII_BOUNDARY}([0-9]{{1,2}})[\s{DASHES}]+([0-9]{{1,2}}){ASCII_BOUNDARY}"
    ))
    .expect("static regex must compile")
});

static SCORE_DASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{ASCII_BOUNDARY}([0-9]{{1,2}})\s*[{DASHES}]\s*([0-9]{{1,2}}){ASCII_BOUNDARY}"
    ))
    .expect("static regex must compile")
});

/// Which separators may sit between the two numbers of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreSeparator {
    /// Exactly one dash, optionally surrounded by spaces: `21-12`, `21 - 12`
    Dash,
    /// Any mix of dashes and spaces: `21-12`, `21 12`, `21 - - 12`
    #[default]
    DashOrSpace,
}

impl ScoreSeparator {
    fn pattern(self) -> &'static Regex {
        match self {
            ScoreSeparator::Dash => &*SCORE_DASH,
            ScoreSeparator::DashOrSpace => &*SCORE_DASH_OR_SPACE,
        }
    }
}

/// Knobs for how strictly a game line is interpreted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Require exactly this many players on each team
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_size: Option<usize>,
    pub score_separator: ScoreSeparator,
    /// Warn about names shorter than this (0 disables the check)
    pub short_name_threshold: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            team_size: None,
            score_separator: ScoreSeparator::default(),
            short_name_threshold: DEFAULT_SHORT_NAME_THRESHOLD,
        }
    }
}

/// Final score of a game, rendered canonically as `N-M`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub team1: u8,
    pub team2: u8,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.team1, self.team2)
    }
}

/// One successfully parsed game line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub team1: Vec<String>,
    pub team2: Vec<String>,
    pub score: Score,
    /// Normalized line text, kept for diagnostics
    pub source_line: String,
}

impl GameRecord {
    /// All players in listed order, team 1 first
    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.team1.iter().chain(self.team2.iter()).map(String::as_str)
    }
}

/// Parse one line of typed game results.
///
/// # Arguments
/// * `line` - Raw line text
/// * `line_number` - 1-based position in the input, used in error messages
/// * `options` - Strictness settings
///
/// # Returns
/// * `Ok(Some(GameRecord))` for a valid game
/// * `Ok(None)` if the line normalizes to nothing and should be skipped
/// * `Err(LineError)` describing why the line was rejected
pub fn parse_line(
    line: &str,
    line_number: usize,
    options: &ParseOptions,
) -> Result<Option<GameRecord>, LineError> {
    let clean = normalize(line);
    if clean.is_empty() {
        return Ok(None);
    }

    let fail = |kind: LineErrorKind| LineError::new(line_number, kind, clean.as_str());

    let body = NUMBERING.replace(&clean, "");
    if body.is_empty() {
        return Err(fail(LineErrorKind::EmptyAfterNumbering));
    }

    let caps = options
        .score_separator
        .pattern()
        .captures(&body)
        .ok_or_else(|| fail(LineErrorKind::NoScore))?;
    let (Some(whole), Some(left), Some(right)) = (caps.get(0), caps.get(1), caps.get(2)) else {
        return Err(fail(LineErrorKind::NoScore));
    };
    let (Ok(team1_points), Ok(team2_points)) =
        (left.as_str().parse::<u8>(), right.as_str().parse::<u8>())
    else {
        return Err(fail(LineErrorKind::NoScore));
    };

    let team1_text = body[..whole.start()].trim();
    let team2_text = body[whole.end()..].trim();

    if team1_text.is_empty() {
        return Err(fail(LineErrorKind::MissingTeam(Side::Team1)));
    }
    if team2_text.is_empty() {
        return Err(fail(LineErrorKind::MissingTeam(Side::Team2)));
    }

    let team1 = split_players(team1_text);
    let team2 = split_players(team2_text);

    for (side, team) in [(Side::Team1, &team1), (Side::Team2, &team2)] {
        if team.is_empty() {
            return Err(fail(LineErrorKind::NoValidPlayers(side)));
        }
        if let Some(expected) = options.team_size
            && team.len() != expected
        {
            return Err(fail(LineErrorKind::TeamSize {
                side,
                expected,
                found: team.len(),
            }));
        }
    }

    let record = GameRecord {
        team1,
        team2,
        score: Score {
            team1: team1_points,
            team2: team2_points,
        },
        source_line: clean.clone(),
    };

    warn_short_names(&record, line_number, options.short_name_threshold);
    debug!(line = line_number, score = %record.score, "parsed game");

    Ok(Some(record))
}

fn split_players(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(normalize)
        .filter(|name| !name.is_empty())
        .collect()
}

fn warn_short_names(record: &GameRecord, line_number: usize, threshold: usize) {
    let short: Vec<&str> = record
        .players()
        .filter(|name| name.chars().count() < threshold)
        .collect();

    if !short.is_empty() {
        warn!(
            line = line_number,
            "found potentially short player names: {}. Line: \"{}\"",
            short.join(", "),
            record.source_line
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Option<GameRecord>, LineError> {
        parse_line(line, 1, &ParseOptions::default())
    }

    fn kind_of(line: &str) -> LineErrorKind {
        parse(line).expect_err("line should be rejected").kind
    }

    #[test]
    fn test_parses_basic_line() {
        let game = parse("Alice Bob 21-12 Carol Dave").unwrap().unwrap();
        assert_eq!(game.team1, vec!["Alice", "Bob"]);
        assert_eq!(game.team2, vec!["Carol", "Dave"]);
        assert_eq!(game.score, Score { team1: 21, team2: 12 });
        assert_eq!(game.score.to_string(), "21-12");
        assert_eq!(game.source_line, "Alice Bob 21-12 Carol Dave");
    }

    #[test]
    fn test_strips_numbering() {
        let game = parse("12. Alice Bob 21-12 Carol Dave").unwrap().unwrap();
        assert_eq!(game.team1, vec!["Alice", "Bob"]);

        let game = parse("3.Alice Bob 21-12 Carol Dave").unwrap().unwrap();
        assert_eq!(game.team1, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_score_spacing_variants() {
        let variants = [
            "A1 B1 21-12 C1 D1",
            "A1 B1 21 - 12 C1 D1",
            "A1 B1 21- 12 C1 D1",
            "A1 B1 21 -12 C1 D1",
            "A1 B1 21 12 C1 D1",
            "A1 B1 21\u{2013}12 C1 D1",
            "A1 B1 21 \u{2014} 12 C1 D1",
        ];
        for line in variants {
            let game = parse(line).unwrap().unwrap();
            assert_eq!(game.score.to_string(), "21-12", "failed for {:?}", line);
            assert_eq!(game.team1, vec!["A1", "B1"]);
            assert_eq!(game.team2, vec!["C1", "D1"]);
        }
    }

    #[test]
    fn test_canonical_score_drops_leading_zero() {
        let game = parse("Alice 05 - 21 Bob").unwrap().unwrap();
        assert_eq!(game.score.to_string(), "5-21");
    }

    #[test]
    fn test_dash_only_rejects_space_separator() {
        let options = ParseOptions {
            score_separator: ScoreSeparator::Dash,
            ..ParseOptions::default()
        };
        let err = parse_line("Alice Bob 21 12 Carol Dave", 7, &options).unwrap_err();
        assert_eq!(err.kind, LineErrorKind::NoScore);
        assert_eq!(err.line, 7);

        let game = parse_line("Alice Bob 21 - 12 Carol Dave", 1, &options)
            .unwrap()
            .unwrap();
        assert_eq!(game.score.to_string(), "21-12");
    }

    #[test]
    fn test_first_score_wins() {
        let game = parse("Alice 21-12 Bob 15-21 Carol").unwrap().unwrap();
        assert_eq!(game.team1, vec!["Alice"]);
        assert_eq!(game.team2, vec!["Bob", "15-21", "Carol"]);
    }

    #[test]
    fn test_three_digit_numbers_are_not_scores() {
        assert_eq!(kind_of("Alice Bob 121-12 Carol Dave"), LineErrorKind::NoScore);
        assert_eq!(kind_of("Alice21-12Bob"), LineErrorKind::NoScore);
    }

    #[test]
    fn test_score_right_after_non_ascii_name() {
        let game = parse("Zo\u{00EB}21-12 Carol").unwrap().unwrap();
        assert_eq!(game.team1, vec!["Zoe\u{0308}"]);
        assert_eq!(game.team2, vec!["Carol"]);

        let game = parse("\u{0410}\u{043B}\u{044F}21-12 Bob").unwrap().unwrap();
        assert_eq!(game.team1, vec!["\u{0410}\u{043B}\u{044F}"]);
        assert_eq!(game.score.to_string(), "21-12");

        let options = ParseOptions {
            score_separator: ScoreSeparator::Dash,
            ..ParseOptions::default()
        };
        let game = parse_line("Zo\u{00EB} 21-12\u{0411}\u{043E}\u{0440}", 1, &options)
            .unwrap()
            .unwrap();
        assert_eq!(game.team2, vec!["\u{0411}\u{043E}\u{0440}"]);
    }

    #[test]
    fn test_blank_line_is_skipped() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   \t ").unwrap(), None);
        assert_eq!(parse("\u{200B}\u{FEFF}").unwrap(), None);
    }

    #[test]
    fn test_empty_after_numbering() {
        assert_eq!(kind_of("12."), LineErrorKind::EmptyAfterNumbering);
        assert_eq!(kind_of("4. "), LineErrorKind::EmptyAfterNumbering);
    }

    #[test]
    fn test_no_score() {
        let err = parse("Alice Bob Carol Dave").unwrap_err();
        assert_eq!(err.kind, LineErrorKind::NoScore);
        assert!(err.to_string().contains("Line content: \"Alice Bob Carol Dave\""));
    }

    #[test]
    fn test_missing_teams() {
        assert_eq!(kind_of("Alice 21-12"), LineErrorKind::MissingTeam(Side::Team2));
        assert_eq!(kind_of("21-12 Alice Bob"), LineErrorKind::MissingTeam(Side::Team1));
        assert_eq!(kind_of("1. 21-12 Alice Bob"), LineErrorKind::MissingTeam(Side::Team1));
    }

    #[test]
    fn test_team_size_enforced() {
        let options = ParseOptions {
            team_size: Some(2),
            ..ParseOptions::default()
        };
        assert!(parse_line("Alice Bob 21-12 Carol Dave", 1, &options).is_ok());

        let err = parse_line("Alice Bob 21-12 Carol", 2, &options).unwrap_err();
        assert_eq!(
            err.kind,
            LineErrorKind::TeamSize {
                side: Side::Team2,
                expected: 2,
                found: 1
            }
        );

        let err = parse_line("Alice Bob Eve 21-12 Carol Dave", 3, &options).unwrap_err();
        assert!(matches!(
            err.kind,
            LineErrorKind::TeamSize { side: Side::Team1, found: 3, .. }
        ));
    }

    #[test]
    fn test_unbounded_team_sizes() {
        let game = parse("Alice 21-12 Bob Carol Dave").unwrap().unwrap();
        assert_eq!(game.team1.len(), 1);
        assert_eq!(game.team2.len(), 3);
    }

    #[test]
    fn test_invisible_characters_inside_names() {
        let game = parse("Ali\u{200B}ce Bob 21-12 Carol Dave").unwrap().unwrap();
        assert_eq!(game.team1, vec!["Alice", "Bob"]);
        assert_eq!(game.source_line, "Alice Bob 21-12 Carol Dave");
    }

    #[test]
    fn test_short_names_do_not_fail() {
        let game = parse("A Bob 21-12 C D").unwrap().unwrap();
        assert_eq!(game.team1, vec!["A", "Bob"]);
        assert_eq!(game.team2, vec!["C", "D"]);
    }

    #[test]
    fn test_deterministic() {
        let line = "7. Jos\u{00E9}  Bob 21 -12 Carol\u{00A0}Dave";
        assert_eq!(parse(line).unwrap(), parse(line).unwrap());
    }

    #[test]
    fn test_players_in_listed_order() {
        let game = parse("Alice Bob 21-12 Carol Dave").unwrap().unwrap();
        let players: Vec<&str> = game.players().collect();
        assert_eq!(players, vec!["Alice", "Bob", "Carol", "Dave"]);
    }
}
