use std::fmt;

use thiserror::Error;

/// Which side of the score a team was written on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    fn position(self) -> &'static str {
        match self {
            Side::Team1 => "before",
            Side::Team2 => "after",
        }
    }

    fn number(self) -> u8 {
        match self {
            Side::Team1 => 1,
            Side::Team2 => 2,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team {}", self.number())
    }
}

/// Reason a single game line was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineErrorKind {
    EmptyAfterNumbering,
    NoScore,
    MissingTeam(Side),
    NoValidPlayers(Side),
    TeamSize {
        side: Side,
        expected: usize,
        found: usize,
    },
}

/// A parse failure scoped to one input line.
///
/// `content` holds the normalized line text so the message can quote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    pub line: usize,
    pub kind: LineErrorKind,
    pub content: String,
}

impl LineError {
    pub fn new(line: usize, kind: LineErrorKind, content: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            content: content.into(),
        }
    }
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.line;
        let content = &self.content;
        match &self.kind {
            LineErrorKind::EmptyAfterNumbering => {
                write!(f, "Line {line}: Empty line after removing numbering")
            }
            LineErrorKind::NoScore => write!(
                f,
                "Line {line}: No valid score found. Expected format like \"21-12\" or \"21 - 12\". Line content: \"{content}\""
            ),
            LineErrorKind::MissingTeam(side) => write!(
                f,
                "Line {line}: No players found {} the score. Line: \"{content}\"",
                side.position()
            ),
            LineErrorKind::NoValidPlayers(side) => write!(
                f,
                "Line {line}: No valid players found in {side}. Line: \"{content}\""
            ),
            LineErrorKind::TeamSize {
                side,
                expected,
                found,
            } => write!(
                f,
                "Line {line}: Expected {expected} player(s) in {side}, found {found}. Line: \"{content}\""
            ),
        }
    }
}

impl std::error::Error for LineError {}

/// Failure of a whole count run
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("Please enter some game results to count.")]
    EmptyInput,

    #[error("Input too large: {size} bytes (max: {max})")]
    InputTooLarge { size: usize, max: usize },

    #[error("{}", format_line_errors(.0))]
    LineErrors(Vec<LineError>),

    #[error(
        "No valid games found. Please check your input format.\n\nExpected format: \"Player1 Player2 21-12 Player3 Player4\""
    )]
    NoGamesParsed,
}

/// Render collected line errors as one report, prefixed with their count
pub fn format_line_errors(errors: &[LineError]) -> String {
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!("Found {} error(s):\n\n{}", errors.len(), messages.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_error_messages() {
        let err = LineError::new(2, LineErrorKind::MissingTeam(Side::Team2), "Alice 21-12");
        assert_eq!(
            err.to_string(),
            "Line 2: No players found after the score. Line: \"Alice 21-12\""
        );

        let err = LineError::new(1, LineErrorKind::MissingTeam(Side::Team1), "21-12 Alice");
        assert!(err.to_string().contains("before the score"));

        let err = LineError::new(4, LineErrorKind::NoValidPlayers(Side::Team1), "x");
        assert!(err.to_string().contains("in team 1"));

        let err = LineError::new(5, LineErrorKind::EmptyAfterNumbering, "5.");
        assert_eq!(err.to_string(), "Line 5: Empty line after removing numbering");
    }

    #[test]
    fn test_no_score_message_quotes_line() {
        let err = LineError::new(3, LineErrorKind::NoScore, "Alice Bob Carol");
        let msg = err.to_string();
        assert!(msg.starts_with("Line 3: No valid score found."));
        assert!(msg.ends_with("Line content: \"Alice Bob Carol\""));
    }

    #[test]
    fn test_line_errors_report() {
        let errors = vec![
            LineError::new(1, LineErrorKind::NoScore, "a"),
            LineError::new(3, LineErrorKind::MissingTeam(Side::Team2), "b 21-12"),
        ];
        let report = TallyError::LineErrors(errors).to_string();
        let mut lines = report.lines();
        assert_eq!(lines.next(), Some("Found 2 error(s):"));
        assert_eq!(lines.next(), Some(""));
        assert!(lines.next().is_some_and(|l| l.starts_with("Line 1:")));
        assert!(lines.next().is_some_and(|l| l.starts_with("Line 3:")));
        assert_eq!(lines.next(), None);
    }
}
