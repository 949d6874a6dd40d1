use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    /// No input within one tick. Drives the quiz clock and feedback timeout.
    Tick,
    Resize,
}

/// Reads terminal input on a background thread so the draw loop can block
/// on a channel.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            loop {
                let event = match event::poll(tick_rate) {
                    Ok(true) => match event::read() {
                        // Release and repeat events would double-submit answers.
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                        Ok(Event::Resize(_, _)) => AppEvent::Resize,
                        Ok(_) => continue,
                        Err(e) => {
                            tracing::error!("terminal read failed: {e}");
                            return;
                        }
                    },
                    Ok(false) => AppEvent::Tick,
                    Err(e) => {
                        tracing::error!("terminal poll failed: {e}");
                        return;
                    }
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
