//! Event types for the TUI
//!
//! Terminal input, timer ticks and snapshot fetch results all arrive on one
//! unbounded channel, so the app handles them strictly one at a time.

use crossterm::event::{Event as TerminalEvent, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use mnemograph::scheduler::TickKind;
use mnemograph::source::FetchOutcome;

/// Events that can occur in the TUI
#[derive(Debug)]
pub enum Event {
    /// Key, mouse or resize input from the terminal
    Terminal(TerminalEvent),
    /// A periodic timer fired
    Tick(TickKind),
    /// A snapshot fetch completed
    Snapshot(FetchOutcome),
}

impl From<TickKind> for Event {
    fn from(kind: TickKind) -> Self {
        Event::Tick(kind)
    }
}

impl From<FetchOutcome> for Event {
    fn from(outcome: FetchOutcome) -> Self {
        Event::Snapshot(outcome)
    }
}

/// Forward crossterm input into the event channel until either side closes
pub fn spawn_terminal_events(sender: mpsc::UnboundedSender<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = EventStream::new();
        while let Some(next) = stream.next().await {
            match next {
                Ok(event) => {
                    if sender.send(Event::Terminal(event)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Terminal event stream failed: {e}");
                    break;
                }
            }
        }
    })
}
