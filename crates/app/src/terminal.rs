use std::{
    io::{self, Stdout, Write},
    sync::mpsc::Sender,
    thread::{self, JoinHandle},
};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::Print,
    terminal::{self, ClearType},
    ExecutableCommand, QueueableCommand,
};
use metronome_core::{AppEvent, Key};

/// Raw-mode, alternate-screen terminal. Restored when dropped.
pub struct Tui {
    stdout: Stdout,
}

impl Tui {
    pub fn setup() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        stdout.execute(terminal::EnterAlternateScreen)?;
        stdout.execute(cursor::Hide)?;
        Ok(Self { stdout })
    }

    /// Paints a rendered screen from the top-left corner, clearing whatever
    /// the previous screen left behind.
    pub fn draw(&mut self, screen: &str) -> io::Result<()> {
        let mut rows = 0;
        for (row, line) in screen.lines().enumerate() {
            self.stdout
                .queue(cursor::MoveTo(0, row as u16))?
                .queue(Print(line))?
                .queue(terminal::Clear(ClearType::UntilNewLine))?;
            rows = row + 1;
        }
        self.stdout
            .queue(cursor::MoveTo(0, rows as u16))?
            .queue(terminal::Clear(ClearType::FromCursorDown))?;
        self.stdout.flush()
    }

    fn teardown(&mut self) {
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Forwards key presses and resizes into the event loop until the loop goes
/// away or the terminal stops producing input.
pub fn spawn_input_reader(events: Sender<AppEvent>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("metronome-input".to_string())
        .spawn(move || loop {
            let forwarded = match event::read() {
                Ok(Event::Key(key)) => match map_key(key) {
                    Some(key) => events.send(AppEvent::Key(key)).is_ok(),
                    None => true,
                },
                Ok(Event::Resize(..)) => events.send(AppEvent::Resize).is_ok(),
                Ok(_) => true,
                Err(err) => {
                    tracing::error!(%err, "reading terminal input failed");
                    false
                }
            };
            if !forwarded {
                break;
            }
        })
}

fn map_key(event: KeyEvent) -> Option<Key> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    let key = match event.code {
        KeyCode::Char(ch) if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Key::Ctrl(ch.to_ascii_lowercase())
        }
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => return None,
    };
    Some(key)
}
