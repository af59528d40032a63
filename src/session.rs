use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute, queue, style::Print};
use std::io::{self, Write};
use tracing::debug;

use crate::config::{Config, TriggerMode};
use crate::error::TallyError;
use crate::report::render_table;
use crate::tally::{PartialTally, Tally, count_games, count_games_partial};
use crate::ui::{help_lines, status_line};

/// Text being typed, edited at its end like a plain textarea
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when nothing but whitespace has been typed
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    pub fn newline(&mut self) {
        self.text.push('\n');
    }

    /// Delete the last character; at the start of a line this joins it to the previous one
    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Lines for display; a trailing line break yields an empty last line
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }
}

/// Latest thing to show under the editor
#[derive(Debug, Clone, Default)]
pub enum Outcome {
    #[default]
    Nothing,
    Results(Tally),
    Partial(PartialTally),
    Error(String),
}

/// What the event loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Continue,
    Quit,
}

/// State of one interactive editing session
pub struct Session<'a> {
    config: &'a Config,
    buffer: InputBuffer,
    outcome: Outcome,
    show_help: bool,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            buffer: InputBuffer::default(),
            outcome: Outcome::Nothing,
            show_help: false,
        }
    }

    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    fn is_live(&self) -> bool {
        self.config.trigger_mode == TriggerMode::Live
    }

    /// Strict count of the whole buffer, replacing the shown outcome
    pub fn count(&mut self) {
        self.outcome = match count_games(
            self.buffer.text(),
            &self.config.parse,
            self.config.max_input_bytes,
        ) {
            Ok(tally) => Outcome::Results(tally),
            Err(e) => Outcome::Error(e.to_string()),
        };
    }

    /// Strict count made when the session ends; `None` if nothing was typed
    pub fn final_count(&self) -> Option<Result<Tally, TallyError>> {
        if self.buffer.is_blank() {
            return None;
        }
        Some(count_games(
            self.buffer.text(),
            &self.config.parse,
            self.config.max_input_bytes,
        ))
    }

    fn recount_live(&mut self) {
        self.outcome = match count_games_partial(
            self.buffer.text(),
            &self.config.parse,
            self.config.max_input_bytes,
        ) {
            Ok(partial) => Outcome::Partial(partial),
            Err(e) => Outcome::Error(e.to_string()),
        };
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.outcome = Outcome::Nothing;
        debug!("session reset");
    }

    /// Paste arrives as one chunk when bracketed paste is on
    pub fn handle_paste(&mut self, text: &str) {
        self.buffer.insert_str(text);
        self.after_edit();
    }

    /// Apply one key press to the session
    pub fn handle_key(&mut self, key: KeyEvent) -> SessionAction {
        if key.kind != KeyEventKind::Press {
            return SessionAction::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return SessionAction::Quit,
            KeyCode::Char('q') | KeyCode::Char('Q') if ctrl => return SessionAction::Quit,
            KeyCode::Char('s') | KeyCode::Char('S') if ctrl => self.count(),
            KeyCode::Char('r') | KeyCode::Char('R') if ctrl => self.reset(),
            KeyCode::F(1) => self.show_help = !self.show_help,
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Char(ch) => {
                self.buffer.insert_char(ch);
                self.after_edit();
            }
            KeyCode::Tab => {
                self.buffer.insert_char(' ');
                self.after_edit();
            }
            KeyCode::Enter => {
                self.buffer.newline();
                self.after_edit();
            }
            KeyCode::Backspace => {
                self.buffer.backspace();
                self.after_edit();
            }
            _ => {}
        }
        SessionAction::Continue
    }

    fn after_edit(&mut self) {
        if self.is_live() {
            self.recount_live();
        }
    }

    /// Full screen contents, top to bottom
    pub fn render(&self) -> Vec<String> {
        let mut screen = vec![status_line(self.is_live()), String::new()];

        let lines = self.buffer.lines();
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            let cursor = if i == last { "_" } else { "" };
            screen.push(format!("{:>3} | {}{}", i + 1, line, cursor));
        }
        screen.push(String::new());

        if self.show_help {
            screen.extend(help_lines(self.config.parse.score_separator));
            screen.push(String::new());
        }

        match &self.outcome {
            Outcome::Nothing => {}
            Outcome::Results(tally) => {
                screen.extend(render_table(&tally.players, tally.total_games));
            }
            Outcome::Partial(partial) => {
                screen.extend(render_table(
                    &partial.tally.players,
                    partial.tally.total_games,
                ));
                if !partial.errors.is_empty() {
                    screen.push(String::new());
                    screen.extend(partial.errors.iter().map(|e| format!("✗ {}", e)));
                }
            }
            Outcome::Error(report) => {
                screen.extend(report.lines().map(|l| format!("✗ {}", l)));
            }
        }
        screen
    }
}

/// Keeps the terminal in raw mode for its lifetime
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)
            .context("Failed to prepare terminal")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn draw(out: &mut impl Write, screen: &[String]) -> Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    for line in screen {
        queue!(out, Print(line), Print("\r\n"))?;
    }
    out.flush().context("Failed to draw screen")
}

/// Run the terminal editor until the user quits.
///
/// Returns the final strict count of the buffer once the terminal is restored,
/// or `None` when the buffer was left blank.
pub fn run_session(config: &Config) -> Result<Option<Result<Tally, TallyError>>> {
    let mut session = Session::new(config);

    {
        let _guard = TerminalGuard::new()?;
        let mut stdout = io::stdout();

        loop {
            draw(&mut stdout, &session.render())?;

            match event::read().context("Failed to read terminal event")? {
                Event::Key(key) => {
                    if session.handle_key(key) == SessionAction::Quit {
                        break;
                    }
                }
                Event::Paste(text) => session.handle_paste(&text),
                _ => {}
            }
        }
    }

    Ok(session.final_count())
}
