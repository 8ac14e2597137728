//! Status command handler

use anyhow::Result;

use anitrack_core::{IdentityProvider, SyncError};

use crate::output::{Output, OutputFormat};
use crate::session::Session;

/// Show status information
pub async fn show(session: &Session, output: &Output) -> Result<()> {
    // A failed load is reported in the output rather than aborting
    let load_error = session.restore().await.err();
    let hint = load_error.as_ref().and_then(recovery_hint);
    let load_error = load_error.map(|e| format!("{:#}", e));

    let identity = session.identity.current();
    let entries = session.controller.entries();
    let config = &session.config;
    let store_location = session.store.location();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "identity": identity,
                    "store": store_location,
                    "watchlist": {
                        "count": entries.len(),
                        "error": load_error,
                        "hint": hint,
                    },
                    "catalog": {
                        "url": config.catalog_url,
                        "ttl_secs": config.catalog_ttl_secs,
                    },
                    "data_dir": config.data_dir,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", entries.len());
        }
        OutputFormat::Human => {
            println!("AniTrack Status");
            println!("===============");
            println!();
            println!("Identity:");
            match identity {
                Some(ref identity) => {
                    println!("  Signed in as: {}", identity.display_name);
                    println!(
                        "  Since:        {}",
                        identity.signed_in_at.format("%Y-%m-%d %H:%M")
                    );
                }
                None => {
                    println!("  Not signed in");
                    if let Some(profile) = session.identity.profile() {
                        println!("  Profile:      {} (anitrack login)", profile);
                    }
                }
            }
            println!();
            println!("Watchlist:");
            match load_error {
                Some(ref e) => {
                    println!("  Error:   {}", e);
                    if let Some(hint) = hint {
                        println!("  Hint:    {}", hint);
                    }
                }
                None => println!("  Entries: {}", entries.len()),
            }
            println!();
            println!("Storage:");
            println!("  Store:    {}", store_location);
            println!("  Data dir: {}", config.data_dir.display());
            println!();
            println!("Catalog:");
            println!("  URL: {}", config.catalog_url);
            println!("  TTL: {}s", config.catalog_ttl_secs);
        }
    }

    Ok(())
}

/// Suggestion for a failed watchlist load, if the store offers one
fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.downcast_ref::<SyncError>()
        .and_then(SyncError::recovery_suggestion)
}
