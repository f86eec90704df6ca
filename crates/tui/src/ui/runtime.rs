//! Runtime: terminal lifecycle and the unified event loop.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Multiplex terminal input, polling events, page fetch results, the
//!   startup health check and a render tick in one `tokio::select!` loop.
//! - Execute the `Effect`s components return.
//! - Draw a frame only when something visible changed.
//!
//! Input comes from a dedicated OS thread that blocks on
//! `crossterm::event::read()` and forwards events over a channel, so the
//! async loop never blocks on the terminal.

use std::io::Stdout;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use automator_api::WorkflowApi;
use automator_types::Effect;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, prelude::CrosstermBackend};
use tokio::{
    signal,
    sync::{mpsc, oneshot},
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::app::App;
use crate::ui::main_component::MainView;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Spinner cadence while a run is active.
const TICK_INTERVAL: Duration = Duration::from_millis(150);

/// Spawn the input thread. It exits once the receiver is dropped.
fn spawn_input_thread() -> Result<mpsc::Receiver<Event>> {
    let (sender, receiver) = mpsc::channel(256);
    thread::Builder::new()
        .name("tui-input".into())
        .spawn(move || {
            loop {
                match event::read() {
                    Ok(event) => {
                        if sender.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "failed to read terminal event");
                        break;
                    }
                }
            }
        })
        .context("spawn input thread")?;
    Ok(receiver)
}

/// Spawn the one-shot health check run at startup.
fn spawn_health_check(api: Arc<dyn WorkflowApi>) -> oneshot::Receiver<bool> {
    let (sender, receiver) = oneshot::channel();
    tokio::spawn(async move {
        let healthy = api.check_health().await;
        let _ = sender.send(healthy);
    });
    receiver
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")
}

fn cleanup_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Tui, app: &App, main_view: &mut MainView) -> Result<()> {
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

/// Apply effects and report whether the app should exit.
fn process_effects(app: &mut App, effects: Vec<Effect>) -> bool {
    for effect in effects {
        match effect {
            Effect::SubmitWorkflow { description, parameters } => {
                app.controller.submit(description, parameters);
            }
            Effect::Navigate(route) => app.navigate(route),
            Effect::Quit => return true,
        }
    }
    false
}

/// Entry point: set up the terminal, run the loop, and always restore the
/// terminal afterwards.
pub async fn run_app(api: Arc<dyn WorkflowApi>, poll_period: Duration, api_base: String) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let outcome = event_loop(&mut terminal, api, poll_period, api_base).await;
    let cleanup = cleanup_terminal(&mut terminal);
    outcome.and(cleanup)
}

async fn event_loop(terminal: &mut Tui, api: Arc<dyn WorkflowApi>, poll_period: Duration, api_base: String) -> Result<()> {
    let mut input_receiver = spawn_input_thread()?;
    let mut health = Some(spawn_health_check(Arc::clone(&api)));
    let (mut app, mut channels) = App::new(api, poll_period, api_base);
    let mut main_view = MainView::new();

    let mut ticker = time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(terminal, &app, &mut main_view)?;
    info!("dashboard started");

    loop {
        let mut needs_render = false;
        tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    debug!("input channel closed");
                    break;
                };
                match event {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        let effects = main_view.handle_key_events(&mut app, key);
                        if process_effects(&mut app, effects) {
                            break;
                        }
                        needs_render = true;
                    }
                    Event::Resize(_, _) => needs_render = true,
                    _ => {}
                }
            }

            Some(event) = channels.poll_events.recv() => {
                needs_render = app.apply_poll_event(event);
            }

            Some(event) = channels.list_events.recv() => {
                needs_render = app.apply_list_event(event);
            }

            result = async {
                match health.as_mut() {
                    Some(receiver) => receiver.await,
                    None => std::future::pending().await,
                }
            }, if health.is_some() => {
                health = None;
                match result {
                    Ok(healthy) => {
                        info!(healthy, "health check finished");
                        needs_render = app.set_health(healthy);
                    }
                    Err(_) => needs_render = app.set_health(false),
                }
            }

            _ = ticker.tick() => {
                if app.controller.is_running() {
                    app.spinner_frame = app.spinner_frame.wrapping_add(1);
                    needs_render = true;
                }
            }

            _ = signal::ctrl_c() => break,
        }

        if needs_render {
            render(terminal, &app, &mut main_view)?;
        }
    }

    // Dropping the app cancels any polling session and page fetch.
    drop(app);
    info!("dashboard stopped");
    Ok(())
}
