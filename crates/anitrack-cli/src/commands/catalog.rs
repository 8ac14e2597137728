//! Catalog command handlers

use anyhow::{Context, Result};

use crate::output::Output;
use crate::session::Session;

/// Fetch and print the top anime list
pub async fn top(session: &Session, limit: Option<usize>, output: &Output) -> Result<()> {
    let items = session
        .catalog
        .get()
        .await
        .context("Failed to load anime list")?;

    output.print_catalog(limited(&items, limit));
    Ok(())
}

fn limited<T>(items: &[T], limit: Option<usize>) -> &[T] {
    match limit {
        Some(n) => &items[..n.min(items.len())],
        None => items,
    }
}
