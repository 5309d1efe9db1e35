use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::app::App;
use crate::models::TemplateKind;
use crate::registry::TemplateRegistry;
use crate::ui::draw;

enum PickerEvent {
    Tick,
    Key(KeyEvent),
    Error(String),
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<io::Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Lets the user pick templates of `kind` from the registry.
///
/// The list is re-read from the registry whenever it changes, so names
/// merged by the background fetch appear while the picker is open.
/// Returns the chosen names in pick order; empty when the user skipped.
pub async fn pick(registry: Arc<TemplateRegistry>, kind: TemplateKind) -> Result<Vec<String>> {
    let mut session = TerminalSession::new()?;
    let mut app = App::new(kind);
    let (tx, mut rx) = mpsc::channel(100);
    let stop = Arc::new(AtomicBool::new(false));
    let reader = spawn_reader(tx, Arc::clone(&stop));

    let outcome = run(&mut session, &mut app, &registry, &mut rx).await;

    stop.store(true, Ordering::Relaxed);
    drop(rx);
    let _ = reader.await;
    drop(session);
    outcome
}

/// Polls the terminal on a blocking thread until `stop` is set.
fn spawn_reader(tx: mpsc::Sender<PickerEvent>, stop: Arc<AtomicBool>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !stop.load(Ordering::Relaxed) {
            let event = match event::poll(Duration::from_millis(100)) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Some(PickerEvent::Key(key)),
                    Ok(_) => None,
                    Err(err) => Some(PickerEvent::Error(err.to_string())),
                },
                Ok(false) => None,
                Err(err) => Some(PickerEvent::Error(err.to_string())),
            };
            if let Some(event) = event {
                if tx.blocking_send(event).is_err() {
                    break;
                }
            }
            if tx.blocking_send(PickerEvent::Tick).is_err() {
                break;
            }
        }
    })
}

async fn run(
    session: &mut TerminalSession,
    app: &mut App,
    registry: &TemplateRegistry,
    rx: &mut mpsc::Receiver<PickerEvent>,
) -> Result<Vec<String>> {
    loop {
        app.refresh(registry);
        session.terminal_mut().draw(|f| draw(f, app))?;

        let Some(ev) = rx.recv().await else {
            return Ok(Vec::new());
        };
        match ev {
            PickerEvent::Tick => {}
            PickerEvent::Error(e) => app.error = Some(e),
            PickerEvent::Key(key) => {
                if let Some(chosen) = app.handle_key(key) {
                    return Ok(chosen);
                }
            }
        }
    }
}
