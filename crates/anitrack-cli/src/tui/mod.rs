//! AniTrack TUI
//!
//! Terminal view with the top anime list and the signed-in user's watchlist.
//!
//! ## Layout
//!
//! - Header: sign-in state
//! - Left: Top Anime (ranked catalog)
//! - Right: My Watchlist
//! - Bottom: status bar for notifications
//!
//! ## Keys
//!
//! - j/k or ↑/↓: Move selection up/down
//! - Tab: Switch pane
//! - a: Add selected anime to the watchlist
//! - d: Remove selected watchlist entry
//! - L / O: Log in / Log out
//! - r: Refresh the top anime list
//! - o: Open the selected anime page in a browser
//! - ?: Help
//! - q: Quit
//!
//! Watchlist changes run on background tasks; the view re-renders from the
//! snapshots and notifications the sync controller publishes.

mod app;
mod ui;

use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::debug;

use anitrack_core::{CatalogCache, CatalogError, CatalogItem, Config, IdentityProvider};

use app::{ActivePane, App};

use crate::logging::init_tui_logging;
use crate::session::Session;

type CatalogResult = Result<Arc<Vec<CatalogItem>>, CatalogError>;

/// Run the TUI application
pub async fn run(config: Config, ephemeral: bool) -> Result<()> {
    // File-based, only if ANITRACK_LOG is set
    init_tui_logging(&config);

    let session = Session::open(config, None, ephemeral)?;
    let controller = Arc::clone(&session.controller);

    let notifications = controller
        .take_events()
        .ok_or_else(|| anyhow!("Notification channel already taken"))?;
    let snapshots = controller.subscribe();

    // Applies the restored session right away, then follows sign-in changes
    let listener = controller.spawn_identity_listener(session.identity.subscribe());

    let (catalog_tx, catalog_rx) = mpsc::unbounded_channel();
    spawn_catalog_fetch(Arc::clone(&session.catalog), false, catalog_tx.clone());

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(controller.snapshot());
    let mut channels = Channels {
        notifications,
        snapshots,
        catalog_rx,
        catalog_tx,
    };

    let result = run_app(&mut terminal, &mut app, &session, &mut channels).await;

    listener.abort();

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

/// Receivers the event loop listens on
struct Channels {
    notifications: mpsc::UnboundedReceiver<anitrack_core::Notification>,
    snapshots: tokio::sync::watch::Receiver<anitrack_core::WatchlistSnapshot>,
    catalog_rx: mpsc::UnboundedReceiver<CatalogResult>,
    catalog_tx: mpsc::UnboundedSender<CatalogResult>,
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &Session,
    channels: &mut Channels,
) -> Result<()> {
    loop {
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            biased;

            Some(notification) = channels.notifications.recv() => {
                app.show_notification(notification);
            }

            Ok(()) = channels.snapshots.changed() => {
                let snapshot = channels.snapshots.borrow_and_update().clone();
                app.set_snapshot(snapshot);
            }

            Some(result) = channels.catalog_rx.recv() => {
                app.set_catalog(result);
            }

            // Poll for terminal events
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        // Any key dismisses the modal
                        if app.has_modal() {
                            app.clear_modal();
                            continue;
                        }

                        // If help is showing, any key dismisses it
                        if app.show_help {
                            app.show_help = false;
                            continue;
                        }

                        handle_key(app, session, &channels.catalog_tx, key.code, key.modifiers);
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle a key press in normal mode
fn handle_key(
    app: &mut App,
    session: &Session,
    catalog_tx: &mpsc::UnboundedSender<CatalogResult>,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j') | KeyCode::Char('k') | KeyCode::Up | KeyCode::Down | KeyCode::Tab
    ) {
        app.status_message = None;
    }

    match code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Tab | KeyCode::BackTab => app.next_pane(),

        KeyCode::Char('a') => {
            if app.active_pane != ActivePane::Catalog {
                app.set_status("Select an anime in Top Anime to add it");
                return;
            }
            let Some(item) = app.selected_item().cloned() else {
                return;
            };
            let controller = Arc::clone(&session.controller);
            // Outcome arrives as a snapshot and a notification
            tokio::spawn(async move {
                if let Err(e) = controller.add_to_watchlist(&item).await {
                    debug!("Add failed: {}", e);
                }
            });
        }

        KeyCode::Char('d') => {
            if app.active_pane != ActivePane::Watchlist {
                app.set_status("Select an entry in My Watchlist to remove it");
                return;
            }
            let Some(entry) = app.selected_entry().cloned() else {
                return;
            };
            let controller = Arc::clone(&session.controller);
            tokio::spawn(async move {
                if let Err(e) = controller.remove_from_watchlist(&entry.id).await {
                    debug!("Remove failed: {}", e);
                }
            });
        }

        KeyCode::Char('L') => {
            if app.is_signed_in() {
                app.set_status("Already signed in");
                return;
            }
            let controller = Arc::clone(&session.controller);
            let identity = Arc::clone(&session.identity);
            controller.begin_sign_in();
            // The identity listener loads the watchlist once sign-in lands
            tokio::spawn(async move {
                if let Err(e) = identity.sign_in().await {
                    controller.sign_in_failed(&e);
                }
            });
        }

        KeyCode::Char('O') => {
            if !app.is_signed_in() {
                app.set_status("Not signed in");
                return;
            }
            let controller = Arc::clone(&session.controller);
            let identity = Arc::clone(&session.identity);
            controller.begin_sign_out();
            tokio::spawn(async move {
                if let Err(e) = identity.sign_out().await {
                    controller.sign_out_failed(&e);
                }
            });
        }

        KeyCode::Char('r') => {
            if !app.refreshing {
                app.refreshing = true;
                app.set_status("Refreshing top anime...");
                spawn_catalog_fetch(Arc::clone(&session.catalog), true, catalog_tx.clone());
            }
        }

        KeyCode::Char('o') => {
            if let Some(url) = app.selected_page_url() {
                match open::that_detached(&url) {
                    Ok(()) => app.set_status(format!("Opened {}", url)),
                    Err(e) => app.set_status(format!("Failed to open browser: {}", e)),
                }
            }
        }

        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Fetch the catalog on a background task and report back on `tx`
fn spawn_catalog_fetch(
    catalog: Arc<CatalogCache>,
    force: bool,
    tx: mpsc::UnboundedSender<CatalogResult>,
) {
    tokio::spawn(async move {
        let result = if force {
            catalog.refresh().await
        } else {
            catalog.get().await
        };
        if let Err(ref e) = result {
            debug!("Catalog fetch failed: {}", e);
        }
        let _ = tx.send(result);
    });
}
