//! Application state and logic

use std::sync::Arc;
use std::time::{Duration, Instant};

use anitrack_core::{
    CatalogError, CatalogItem, Notification, NotificationLevel, SessionState, WatchlistEntry,
    WatchlistPhase, WatchlistSnapshot,
};

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Which pane has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Catalog,
    Watchlist,
}

impl ActivePane {
    /// Move to the other pane
    pub fn next(self) -> Self {
        match self {
            ActivePane::Catalog => ActivePane::Watchlist,
            ActivePane::Watchlist => ActivePane::Catalog,
        }
    }
}

/// State of the top anime pane
#[derive(Debug, Clone)]
pub enum CatalogView {
    Loading,
    Loaded(Arc<Vec<CatalogItem>>),
    Failed,
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Which pane has focus
    pub active_pane: ActivePane,
    pub catalog: CatalogView,
    pub catalog_index: usize,
    /// Last snapshot published by the sync controller
    pub watchlist: WatchlistSnapshot,
    pub watchlist_index: usize,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Blocking message shown until any key is pressed
    pub modal: Option<String>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// A catalog refresh is in flight
    pub refreshing: bool,
}

impl App {
    pub fn new(watchlist: WatchlistSnapshot) -> Self {
        Self {
            should_quit: false,
            active_pane: ActivePane::Catalog,
            catalog: CatalogView::Loading,
            catalog_index: 0,
            watchlist,
            watchlist_index: 0,
            status_message: None,
            status_message_time: None,
            modal: None,
            show_help: false,
            refreshing: false,
        }
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Route a controller notification to the status bar or the modal
    pub fn show_notification(&mut self, notification: Notification) {
        match notification.level {
            NotificationLevel::Blocking => self.modal = Some(notification.message),
            NotificationLevel::Info | NotificationLevel::Error => {
                self.set_status(notification.message)
            }
        }
    }

    pub fn has_modal(&self) -> bool {
        self.modal.is_some()
    }

    pub fn clear_modal(&mut self) {
        self.modal = None;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Replace the watchlist snapshot, keeping the selection in range
    pub fn set_snapshot(&mut self, snapshot: WatchlistSnapshot) {
        self.watchlist = snapshot;
        self.watchlist_index = clamp_index(self.watchlist_index, self.watchlist.entries.len());
    }

    /// Apply a finished catalog fetch
    ///
    /// A failed refresh keeps a list that was already showing.
    pub fn set_catalog(&mut self, result: Result<Arc<Vec<CatalogItem>>, CatalogError>) {
        self.refreshing = false;
        match result {
            Ok(items) => {
                self.catalog_index = clamp_index(self.catalog_index, items.len());
                self.catalog = CatalogView::Loaded(items);
            }
            Err(e) => {
                if matches!(self.catalog, CatalogView::Loaded(_)) {
                    self.set_status(format!("Failed to refresh anime list: {}", e));
                } else {
                    self.catalog = CatalogView::Failed;
                }
            }
        }
    }

    pub fn catalog_items(&self) -> &[CatalogItem] {
        match &self.catalog {
            CatalogView::Loaded(items) => items.as_slice(),
            CatalogView::Loading | CatalogView::Failed => &[],
        }
    }

    pub fn selected_item(&self) -> Option<&CatalogItem> {
        self.catalog_items().get(self.catalog_index)
    }

    pub fn selected_entry(&self) -> Option<&WatchlistEntry> {
        self.watchlist.entries.get(self.watchlist_index)
    }

    /// Page for whatever is selected in the focused pane
    pub fn selected_page_url(&self) -> Option<String> {
        match self.active_pane {
            ActivePane::Catalog => self.selected_item().map(CatalogItem::page_url),
            ActivePane::Watchlist => self.selected_entry().map(WatchlistEntry::page_url),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.watchlist.identity.is_some()
    }

    /// Short label for the header
    pub fn session_label(&self) -> String {
        match (self.watchlist.session, &self.watchlist.identity) {
            (SessionState::LoggingIn, _) => "Signing in...".to_string(),
            (SessionState::LoggingOut, _) => "Signing out...".to_string(),
            (_, Some(identity)) => format!("Signed in as {}", identity.display_name),
            (_, None) => "Not signed in".to_string(),
        }
    }

    pub fn watchlist_loading(&self) -> bool {
        self.watchlist.phase == WatchlistPhase::Loading
    }

    /// Move selection up in the current pane
    pub fn move_up(&mut self) {
        let index = self.index_mut();
        *index = index.saturating_sub(1);
    }

    /// Move selection down in the current pane
    pub fn move_down(&mut self) {
        let len = self.pane_len();
        let index = self.index_mut();
        if *index + 1 < len {
            *index += 1;
        }
    }

    /// Move focus to the other pane
    pub fn next_pane(&mut self) {
        self.active_pane = self.active_pane.next();
    }

    fn pane_len(&self) -> usize {
        match self.active_pane {
            ActivePane::Catalog => self.catalog_items().len(),
            ActivePane::Watchlist => self.watchlist.entries.len(),
        }
    }

    fn index_mut(&mut self) -> &mut usize {
        match self.active_pane {
            ActivePane::Catalog => &mut self.catalog_index,
            ActivePane::Watchlist => &mut self.watchlist_index,
        }
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anitrack_core::{Identity, WatchlistState};

    fn empty_snapshot() -> WatchlistSnapshot {
        WatchlistState::new().snapshot()
    }

    fn entry(id: &str, mal_id: i64) -> WatchlistEntry {
        WatchlistEntry {
            id: id.to_string(),
            mal_id,
            title: format!("Anime {}", mal_id),
            image_url: String::new(),
        }
    }

    fn catalog(n: i64) -> Arc<Vec<CatalogItem>> {
        Arc::new(
            (1..=n)
                .map(|i| CatalogItem::new(i, format!("Anime {}", i), ""))
                .collect(),
        )
    }

    #[test]
    fn test_active_pane_next() {
        assert_eq!(ActivePane::Catalog.next(), ActivePane::Watchlist);
        assert_eq!(ActivePane::Watchlist.next(), ActivePane::Catalog);
    }

    #[test]
    fn test_blocking_notification_opens_modal() {
        let mut app = App::new(empty_snapshot());

        app.show_notification(Notification::blocking("Please log in to track anime"));
        assert!(app.has_modal());
        assert!(app.status_message.is_none());

        app.clear_modal();
        assert!(!app.has_modal());
    }

    #[test]
    fn test_error_notification_goes_to_status() {
        let mut app = App::new(empty_snapshot());

        app.show_notification(Notification::error("Failed to load watchlist"));
        assert!(!app.has_modal());
        assert_eq!(app.status_message.as_deref(), Some("Failed to load watchlist"));
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let mut app = App::new(empty_snapshot());
        app.set_catalog(Ok(catalog(3)));

        app.move_up();
        assert_eq!(app.catalog_index, 0);

        for _ in 0..5 {
            app.move_down();
        }
        assert_eq!(app.catalog_index, 2);
        assert_eq!(app.selected_item().map(|i| i.mal_id), Some(3));
    }

    #[test]
    fn test_snapshot_clamps_selection() {
        let mut state = WatchlistState::new();
        state.set_identity(Some(Identity::new("U1", "U1")));
        state.replace_entries(vec![entry("a", 1), entry("b", 2), entry("c", 3)]);

        let mut app = App::new(state.snapshot());
        app.active_pane = ActivePane::Watchlist;
        app.move_down();
        app.move_down();
        assert_eq!(app.watchlist_index, 2);

        state.remove_entry("c");
        app.set_snapshot(state.snapshot());
        assert_eq!(app.watchlist_index, 1);
        assert_eq!(app.selected_entry().map(|e| e.id.as_str()), Some("b"));
    }

    #[test]
    fn test_catalog_failure_before_first_load() {
        let mut app = App::new(empty_snapshot());
        app.set_catalog(Err(CatalogError::Status(500)));
        assert!(matches!(app.catalog, CatalogView::Failed));
    }

    #[test]
    fn test_failed_refresh_keeps_list() {
        let mut app = App::new(empty_snapshot());
        app.set_catalog(Ok(catalog(2)));
        app.set_catalog(Err(CatalogError::Timeout(10)));

        assert_eq!(app.catalog_items().len(), 2);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_selected_page_url_follows_pane() {
        let mut state = WatchlistState::new();
        state.set_identity(Some(Identity::new("U1", "U1")));
        state.replace_entries(vec![entry("a", 99)]);

        let mut app = App::new(state.snapshot());
        app.set_catalog(Ok(catalog(1)));

        assert_eq!(
            app.selected_page_url().as_deref(),
            Some("https://myanimelist.net/anime/1")
        );
        app.next_pane();
        assert_eq!(
            app.selected_page_url().as_deref(),
            Some("https://myanimelist.net/anime/99")
        );
    }

    #[test]
    fn test_session_label() {
        let mut state = WatchlistState::new();
        let app = App::new(state.snapshot());
        assert_eq!(app.session_label(), "Not signed in");

        state.begin_sign_in();
        let app = App::new(state.snapshot());
        assert_eq!(app.session_label(), "Signing in...");

        state.set_identity(Some(Identity::new("U1", "Alice")));
        let app = App::new(state.snapshot());
        assert_eq!(app.session_label(), "Signed in as Alice");
    }
}
