//! Full-screen terminal front end.
//!
//! A single event loop drains one channel fed by three producers: the
//! crossterm event stream, an animation ticker, and the background tasks that
//! carry answer and verse results.

pub mod app;
pub mod render;

pub use app::{App, AppEvent, Services};

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Run an interactive session until the user quits.
pub async fn run(
    services: Services,
    return_url: String,
    initial_question: Option<String>,
) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());
    spawn_ticker(tx.clone());

    let app = App::new(services, tx, return_url, initial_question);

    install_panic_hook();
    let mut terminal = init()?;
    let result = event_loop(&mut terminal, app, rx).await;
    restore()?;

    result
}

async fn event_loop(
    terminal: &mut Tui,
    mut app: App,
    mut rx: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    info!("Session started");
    while !app.should_quit {
        terminal.draw(|frame| render::draw(frame, &app))?;

        match rx.recv().await {
            Some(event) => app.handle_event(event),
            None => break,
        }
    }
    info!("Session ended");
    Ok(())
}

fn spawn_input_reader(tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(event) = reader.next().await {
            let app_event = match event {
                // Only handle key press events (not release)
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Ok(Event::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    debug!(error = %e, "Terminal event stream failed");
                    break;
                }
            };
            if tx.send(app_event).is_err() {
                break;
            }
        }
    });
}

fn spawn_ticker(tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        loop {
            interval.tick().await;
            if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });
}

fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Restore the terminal before the default panic output is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}
