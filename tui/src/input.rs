//! Keyboard and resize events
//!
//! Escape and Enter dismiss the overlay. The terminal is in raw mode while
//! the overlay is up, so Ctrl+C arrives as a key rather than SIGINT and is
//! treated as a dismissal too.

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use reveal_core::{SurfaceEvent, SurfaceId};

/// Map a terminal event to what it means for surface `id`
#[must_use]
pub fn map_event(id: SurfaceId, event: &Event) -> Option<SurfaceEvent> {
    match event {
        // Only handle Press events (not Release or Repeat)
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(SurfaceEvent::Dismissed(id)),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(SurfaceEvent::Dismissed(id))
            }
            _ => None,
        },
        Event::Resize(..) => Some(SurfaceEvent::Resized(id)),
        _ => None,
    }
}

/// Read terminal events on a task until the receiver goes away
///
/// If the terminal input ends or fails, the surface is reported closed.
pub fn spawn_reader(id: SurfaceId, events: UnboundedSender<SurfaceEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = EventStream::new();
        loop {
            match stream.next().await {
                Some(Ok(event)) => {
                    let Some(mapped) = map_event(id, &event) else {
                        continue;
                    };
                    if events.send(mapped).is_err() {
                        break;
                    }
                }
                Some(Err(error)) => {
                    tracing::warn!(surface = %id, %error, "Terminal input failed");
                    let _ = events.send(SurfaceEvent::Closed(id));
                    break;
                }
                None => {
                    tracing::debug!(surface = %id, "Terminal input closed");
                    let _ = events.send(SurfaceEvent::Closed(id));
                    break;
                }
            }
        }
    })
}
