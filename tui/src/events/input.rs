use std::{sync::mpsc, time::Duration};

use ratatui::crossterm::event::{self, Event};
use tokio_util::sync::CancellationToken;

use super::AppEvent;

/// How long a single poll blocks before the shutdown signal is checked again.
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

pub fn watch_input_events(
    tx: mpsc::Sender<AppEvent>,
    shutdown_signal: CancellationToken,
) -> crate::Result<()> {
    while !shutdown_signal.is_cancelled() {
        if !event::poll(POLL_TIMEOUT).map_err(crate::Error::Input)? {
            continue;
        }

        // If the main thread has already shut down the send fails. Input is
        // not critical so the error is dropped.
        match event::read().map_err(crate::Error::Input)? {
            Event::Key(key_event) => {
                let _ = tx.send(AppEvent::Input(key_event));
            }
            Event::Resize(width, height) => {
                let _ = tx.send(AppEvent::Resize(width, height));
            }
            _ => {}
        }
    }

    Ok(())
}
