//! Terminal front end: a label per cell kept in sync through [`CellSink`],
//! crossterm rendering, and per-tick key collection.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Stylize},
    terminal::{self, ClearType},
    ExecutableCommand, QueueableCommand,
};

use crate::engine::Direction;
use crate::input::Released;
use crate::sink::CellSink;

const CELL_WIDTH: usize = 7;

/// One text label per attached cell. Empty cells show an empty label.
#[derive(Debug, Default, Clone)]
pub struct LabelGrid {
    // keyed (y, x) so iteration is row-major
    labels: BTreeMap<(usize, usize), String>,
    dirty: bool,
}

impl LabelGrid {
    pub fn label(&self, x: usize, y: usize) -> Option<&str> {
        self.labels.get(&(y, x)).map(String::as_str)
    }

    /// Number of attached labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(width, height)` spanned by the attached labels.
    pub fn dimensions(&self) -> (usize, usize) {
        self.labels
            .keys()
            .fold((0, 0), |(w, h), &(y, x)| (w.max(x + 1), h.max(y + 1)))
    }

    /// Whether anything changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl CellSink for LabelGrid {
    fn attach(&mut self, x: usize, y: usize) {
        self.labels.insert((y, x), String::new());
        self.dirty = true;
    }

    fn cell_changed(&mut self, x: usize, y: usize, value: u32) {
        let text = if value == 0 { String::new() } else { value.to_string() };
        self.labels.insert((y, x), text);
        self.dirty = true;
    }
}

/// Keys collected during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub released: Released,
    pub quit: bool,
    pub restart: bool,
}

impl TickInput {
    /// Fold one key event in. Directions fire on `trigger` (key-up when the
    /// terminal reports releases, key-down otherwise); quit/restart on press.
    fn apply(&mut self, key: KeyEvent, trigger: KeyEventKind) {
        if key.kind == KeyEventKind::Press {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                self.quit = true;
                return;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.quit = true,
                KeyCode::Char('n') | KeyCode::Char('N') => self.restart = true,
                _ => {}
            }
        }
        if key.kind == trigger {
            if let Some(dir) = key_direction(key.code) {
                self.released.release(dir);
            }
        }
    }
}

fn key_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::Up),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::Down),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),
        _ => None,
    }
}

fn tile_color(value: u32) -> Color {
    match value {
        0 => Color::Reset,
        2 => Color::Grey,
        4 => Color::White,
        8 => Color::Yellow,
        16 => Color::DarkYellow,
        32 => Color::Red,
        64 => Color::DarkRed,
        128 | 256 => Color::Magenta,
        512 | 1024 => Color::Blue,
        _ => Color::Green,
    }
}

/// Raw-mode alternate screen. Restores the terminal on drop.
pub struct Terminal {
    out: io::Stdout,
    key_release: bool,
}

impl Terminal {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;
        let key_release = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if key_release {
            out.execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        }
        log::debug!("terminal entered, key release events: {key_release}");
        Ok(Self { out, key_release })
    }

    /// Collect every key event arriving within `tick`.
    pub fn poll_tick(&self, tick: Duration) -> io::Result<TickInput> {
        let trigger = if self.key_release {
            KeyEventKind::Release
        } else {
            KeyEventKind::Press
        };
        let deadline = Instant::now() + tick;
        let mut input = TickInput::default();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                break;
            }
            if let Event::Key(key) = event::read()? {
                input.apply(key, trigger);
            }
            if Instant::now() >= deadline {
                break;
            }
        }
        Ok(input)
    }

    pub fn render(&mut self, grid: &LabelGrid, status: &str) -> io::Result<()> {
        let (width, height) = grid.dimensions();
        let out = &mut self.out;
        out.queue(terminal::Clear(ClearType::All))?;
        out.queue(cursor::MoveTo(0, 0))?;
        out.queue(style::Print(format!("\r\n {}\r\n\r\n", "2048".bold())))?;

        let h_line = |out: &mut io::Stdout, left: char, cross: char, right: char| -> io::Result<()> {
            let segment = "─".repeat(CELL_WIDTH);
            let body = vec![segment; width].join(&cross.to_string());
            out.queue(style::Print(format!(" {left}{body}{right}\r\n")))?;
            Ok(())
        };

        h_line(out, '┌', '┬', '┐')?;
        for y in 0..height {
            for line in 0..3 {
                out.queue(style::Print(" │"))?;
                for x in 0..width {
                    let label = grid.label(x, y).unwrap_or("");
                    let value = label.parse::<u32>().unwrap_or(0);
                    let text = if line == 1 {
                        format!("{:^width$}", label, width = CELL_WIDTH)
                    } else {
                        " ".repeat(CELL_WIDTH)
                    };
                    let styled = if value == 0 {
                        text.reset()
                    } else {
                        text.with(Color::Black).on(tile_color(value))
                    };
                    out.queue(style::PrintStyledContent(styled))?;
                    out.queue(style::Print("│"))?;
                }
                out.queue(style::Print("\r\n"))?;
            }
            if y + 1 < height {
                h_line(out, '├', '┼', '┤')?;
            } else {
                h_line(out, '└', '┴', '┘')?;
            }
        }

        out.queue(style::Print(format!("\r\n {status}\r\n")))?;
        out.queue(style::Print(format!(
            " {}\r\n",
            "[Arrows/WASD] Move  [N] New game  [Q] Quit".grey()
        )))?;
        out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.key_release {
            let _ = self.out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = self.out.execute(cursor::Show);
        let _ = self.out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Board, Direction, MergeScan};
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn labels_mirror_the_board() {
        let mut board = Board::from_rows(&[[0, 0, 2, 2]], LabelGrid::default()).unwrap();
        assert_eq!(board.sink().len(), 4);
        assert_eq!(board.sink().dimensions(), (4, 1));
        board.shift(Direction::Left, MergeScan::Reference).unwrap();
        let grid = board.sink();
        assert_eq!(grid.label(0, 0), Some("4"));
        for x in 1..4 {
            assert_eq!(grid.label(x, 0), Some(""));
        }
    }

    #[test]
    fn dirty_flag_resets_after_take() {
        let mut grid = LabelGrid::default();
        grid.attach(0, 0);
        assert!(grid.take_dirty());
        assert!(!grid.take_dirty());
        grid.cell_changed(0, 0, 8);
        assert!(grid.take_dirty());
    }

    #[test]
    fn directions_fire_on_the_trigger_kind_only() {
        let mut input = TickInput::default();
        input.apply(key(KeyCode::Char('d'), KeyEventKind::Press), KeyEventKind::Release);
        assert!(input.released.is_empty());
        input.apply(key(KeyCode::Char('d'), KeyEventKind::Release), KeyEventKind::Release);
        input.apply(key(KeyCode::Up, KeyEventKind::Release), KeyEventKind::Release);
        assert_eq!(input.released.direction(), Some(Direction::Up));
    }

    #[test]
    fn quit_and_restart_fire_on_press() {
        let mut input = TickInput::default();
        input.apply(key(KeyCode::Char('n'), KeyEventKind::Press), KeyEventKind::Release);
        assert!(input.restart && !input.quit);
        input.apply(
            KeyEvent {
                modifiers: KeyModifiers::CONTROL,
                ..key(KeyCode::Char('c'), KeyEventKind::Press)
            },
            KeyEventKind::Release,
        );
        assert!(input.quit);
    }
}
