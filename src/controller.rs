use std::time::{Duration, Instant};
use tracing::trace;

use crate::domain::{Message, TSConfig, TSError};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: Duration,
    last_tick: Instant,
}

impl Controller {
    pub fn new(cfg: &TSConfig) -> Self {
        Self {
            event_poll_time: Duration::from_millis(cfg.event_poll_time),
            last_tick: Instant::now(),
        }
    }

    /// Waits for the next terminal event. A tick is emitted whenever the poll time has passed
    /// since the last one, also while events keep arriving.
    pub fn handle_event(&mut self, model: &Model) -> Result<Option<Message>, TSError> {
        let now = Instant::now();
        if self.tick_due(now) {
            return Ok(Some(Message::Tick));
        }
        let timeout = self.event_poll_time.saturating_sub(now.duration_since(self.last_tick));
        if !event::poll(timeout)? {
            self.last_tick = Instant::now();
            return Ok(Some(Message::Tick));
        }
        let message = match event::read()? {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                self.handle_key(key, model.raw_keyevents())
            }
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            _ => None,
        };
        Ok(message)
    }

    fn tick_due(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_tick) < self.event_poll_time {
            return false;
        }
        self.last_tick = now;
        true
    }

    fn handle_key(&self, key: event::KeyEvent, raw: bool) -> Option<Message> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Message::Quit);
        }
        if raw {
            return Some(Message::RawKey(key));
        }

        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('u') => Some(Message::Upload),
            KeyCode::Char('d') => Some(Message::Delete),
            KeyCode::Char('/') | KeyCode::Char('s') => Some(Message::EditQuery),
            KeyCode::Enter => Some(Message::Search),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::PageUp => Some(Message::MovePageUp),
            KeyCode::PageDown => Some(Message::MovePageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::MoveBeginning),
            KeyCode::End | KeyCode::Char('G') => Some(Message::MoveEnd),
            KeyCode::Char('y') => Some(Message::CopyResult),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
