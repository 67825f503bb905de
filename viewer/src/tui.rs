use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use crate::keys::UiCommand;

const HELP: &str = "up/j next  down/k prev  r reset  s snapshot  q/esc quit";

/// Full-screen filter selector in the controlling terminal.
///
/// Raw mode and the alternate screen are restored on drop.
pub struct TerminalUi {
    out: Stdout,
    last: Option<(usize, String)>,
    last_frames: Option<u64>,
}

impl TerminalUi {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self {
            out,
            last: None,
            last_frames: None,
        })
    }

    /// Redraw the listing when the selection or status changed since the last
    /// call; otherwise only the status line is rewritten, and only when the
    /// frame count moved.
    pub fn render(
        &mut self,
        items: &[String],
        selected: usize,
        status: &str,
        frames: u64,
    ) -> io::Result<()> {
        let width = terminal::size().map(|(w, _)| w).unwrap_or(80);
        if matches!(&self.last, Some((idx, s)) if *idx == selected && s == status) {
            if self.last_frames != Some(frames) {
                draw_status(&mut self.out, items.len(), status, frames, width)?;
                self.out.flush()?;
                self.last_frames = Some(frames);
            }
            return Ok(());
        }
        draw(&mut self.out, items, selected, status, frames, width)?;
        self.last = Some((selected, status.to_string()));
        self.last_frames = Some(frames);
        Ok(())
    }

    /// Drain pending terminal events without blocking.
    pub fn poll_commands(&mut self) -> io::Result<Vec<UiCommand>> {
        let mut commands = Vec::new();
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => commands.extend(UiCommand::from_key_event(&key)),
                Event::Resize(..) => self.last = None,
                _ => {}
            }
        }
        Ok(commands)
    }
}

impl Drop for TerminalUi {
    fn drop(&mut self) {
        let _ = execute!(self.out, ResetColor, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Black on white for every entry, white on black for the selected one.
fn draw<W: Write>(
    out: &mut W,
    items: &[String],
    selected: usize,
    status: &str,
    frames: u64,
    width: u16,
) -> io::Result<()> {
    queue!(
        out,
        SetBackgroundColor(Color::White),
        SetForegroundColor(Color::Black),
        Clear(ClearType::All)
    )?;
    for (row, item) in items.iter().enumerate() {
        let (fg, bg) = if row == selected {
            (Color::White, Color::Black)
        } else {
            (Color::Black, Color::White)
        };
        queue!(
            out,
            MoveTo(0, row as u16),
            SetForegroundColor(fg),
            SetBackgroundColor(bg),
            Print(truncate(item, usize::from(width))),
        )?;
    }
    queue!(
        out,
        SetForegroundColor(Color::Black),
        SetBackgroundColor(Color::White),
        MoveTo(0, items.len() as u16 + 1),
        Print(truncate(HELP, usize::from(width))),
    )?;
    draw_status(out, items.len(), status, frames, width)?;
    out.flush()
}

/// The line under the key help: frame count, then the last snapshot result.
fn draw_status<W: Write>(
    out: &mut W,
    items: usize,
    status: &str,
    frames: u64,
    width: u16,
) -> io::Result<()> {
    let line = if status.is_empty() {
        format!("frame {frames}")
    } else {
        format!("frame {frames}  {status}")
    };
    queue!(
        out,
        SetForegroundColor(Color::Black),
        SetBackgroundColor(Color::White),
        MoveTo(0, items as u16 + 2),
        Clear(ClearType::CurrentLine),
        Print(truncate(&line, usize::from(width))),
    )
}

fn truncate(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(items: &[String], selected: usize, status: &str) -> String {
        let mut buf = Vec::new();
        draw(&mut buf, items, selected, status, 42, 80).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn draws_every_item_and_help() {
        let items = vec!["000 original".to_string(), "001 grayscale".to_string()];
        let out = rendered(&items, 1, "");
        assert!(out.contains("000 original"));
        assert!(out.contains("001 grayscale"));
        assert!(out.contains(HELP));
    }

    #[test]
    fn selected_item_drawn_inverted() {
        let items = vec!["000 original".to_string(), "001 grayscale".to_string()];
        let mut expected = Vec::new();
        queue!(
            expected,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Color::Black),
            Print("001 grayscale"),
        )
        .unwrap();
        let expected = String::from_utf8(expected).unwrap();
        assert!(rendered(&items, 1, "").contains(&expected));
        assert!(!rendered(&items, 0, "").contains(&expected));
    }

    #[test]
    fn status_line_shown() {
        let items = vec!["000 original".to_string()];
        let out = rendered(&items, 0, "saved snapshots/a.png");
        assert!(out.contains("frame 42  saved snapshots/a.png"));
        assert!(rendered(&items, 0, "").contains("frame 42"));
    }

    #[test]
    fn status_redraw_only_touches_its_line() {
        let mut buf = Vec::new();
        draw_status(&mut buf, 3, "", 7, 80).unwrap();
        let mut expected = Vec::new();
        queue!(expected, MoveTo(0, 5), Clear(ClearType::CurrentLine)).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains(&String::from_utf8(expected).unwrap()));
        assert!(out.ends_with("frame 7"));
        assert!(!out.contains(HELP));
    }

    #[test]
    fn truncate_limits_width() {
        assert_eq!(truncate("edge detection", 4), "edge");
        assert_eq!(truncate("edge", 10), "edge");
    }
}
