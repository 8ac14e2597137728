//! Watchlist command handlers

use anyhow::{anyhow, bail, Context, Result};

use anitrack_core::catalog::find_item;
use anitrack_core::{SyncError, WatchlistEntry};

use crate::output::{short_id, Output};
use crate::prompt::confirm;
use crate::session::Session;

/// Print the signed-in user's watchlist
pub async fn list(session: &Session, output: &Output) -> Result<()> {
    session.restore().await?;

    if session.controller.identity().is_none() {
        bail!("Not signed in. Run `anitrack login` first.");
    }

    output.print_entries(&session.controller.entries());
    Ok(())
}

/// Add an anime from the top list by MyAnimeList id
pub async fn add(session: &Session, mal_id: i64, output: &Output) -> Result<()> {
    session.restore().await?;

    // Fail on sign-in before touching the network
    if session.controller.identity().is_none() {
        return Err(with_login_hint(SyncError::Unauthenticated));
    }

    let items = session
        .catalog
        .get()
        .await
        .context("Failed to load anime list")?;
    let item = find_item(&items, mal_id).ok_or_else(|| {
        anyhow!(
            "Anime {} is not in the top list. Run `anitrack top` to see available ids.",
            mal_id
        )
    })?;

    let entry = session
        .controller
        .add_to_watchlist(item)
        .await
        .map_err(with_login_hint)?;

    output.success(&format!("Added {} to watchlist", entry.title));
    output.print_entry(&entry);
    Ok(())
}

/// Remove an entry by document id or id prefix
pub async fn remove(session: &Session, id: String, output: &Output) -> Result<()> {
    session.restore().await?;

    if session.controller.identity().is_none() {
        output.message("Not signed in; nothing to remove.");
        return Ok(());
    }

    let entries = session.controller.entries();
    let entry = resolve_entry(&entries, &id)?;

    // Confirm removal
    if output.should_prompt() {
        println!("Remove: {} - {}", short_id(&entry.id), entry.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    session
        .controller
        .remove_from_watchlist(&entry.id)
        .await
        .context("Failed to remove entry")?;

    output.success(&format!("Removed {} from watchlist", entry.title));
    Ok(())
}

fn with_login_hint(err: SyncError) -> anyhow::Error {
    match err {
        SyncError::Unauthenticated => anyhow!("{}. Run `anitrack login` first.", err),
        other => other.into(),
    }
}

/// Find an entry by full id or unique prefix
fn resolve_entry<'a>(entries: &'a [WatchlistEntry], id: &str) -> Result<&'a WatchlistEntry> {
    if let Some(entry) = entries.iter().find(|e| e.id == id) {
        return Ok(entry);
    }

    let matches: Vec<_> = entries.iter().filter(|e| e.id.starts_with(id)).collect();

    match matches.as_slice() {
        [] => bail!("No watchlist entry found matching: {}", id),
        [entry] => Ok(*entry),
        _ => {
            eprintln!("Multiple entries match '{}':", id);
            for entry in &matches {
                eprintln!("  {} - {}", entry.id, entry.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
