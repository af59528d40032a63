use crate::parser::ScoreSeparator;

/// Keyboard controls of the interactive editor, with the score formats the
/// current separator accepts
pub fn help_lines(separator: ScoreSeparator) -> Vec<String> {
    let scores = match separator {
        ScoreSeparator::DashOrSpace => "21-12, 21 - 12 or 21 12",
        ScoreSeparator::Dash => "21-12 or 21 - 12",
    };

    let mut lines: Vec<String> = [
        "╔════════════════════════════════════════════════════════╗",
        "║                   KEYBOARD CONTROLS                    ║",
        "╚════════════════════════════════════════════════════════╝",
        "  [Ctrl+S]   - Count games",
        "  [Ctrl+R]   - Reset (clear input and results)",
        "  [Enter]    - New line (one game per line)",
        "  [F1]       - Show/hide this help menu",
        "  [Esc]      - Quit and print the final count",
        "  [Ctrl+Q]   - Quit and print the final count",
        "",
        "  Format: Player1 Player2 21-12 Player3 Player4",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    lines.push(format!(
        "  Numbering like \"1.\" is ignored; scores may be {}",
        scores
    ));
    lines
}

/// One-line reminder shown above the editor
pub fn status_line(live: bool) -> String {
    let mode = if live { "LIVE" } else { "MANUAL" };
    format!("[{}] Ctrl+S count | Ctrl+R reset | F1 help | Esc quit", mode)
}
