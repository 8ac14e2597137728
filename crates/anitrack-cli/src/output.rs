//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use anitrack_core::{CatalogItem, Identity, WatchlistEntry};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the ranked catalog
    pub fn print_catalog(&self, items: &[CatalogItem]) {
        match self.format {
            OutputFormat::Human => {
                if items.is_empty() {
                    println!("No anime found.");
                    return;
                }
                for (pos, item) in items.iter().enumerate() {
                    let rank = item.rank.unwrap_or(pos as u32 + 1);
                    let score = item
                        .score
                        .map(|s| format!("{:.2}", s))
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:>3}. {:<45} {:>5}  (mal {})",
                        rank,
                        truncate(&item.title, 45),
                        score,
                        item.mal_id
                    );
                }
                println!("\n{} anime", items.len());
            }
            OutputFormat::Json => print_json(&items),
            OutputFormat::Quiet => {
                for item in items {
                    println!("{}", item.mal_id);
                }
            }
        }
    }

    /// Print the watchlist
    pub fn print_entries(&self, entries: &[WatchlistEntry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("Your watchlist is empty.");
                    return;
                }
                for entry in entries {
                    println!(
                        "{} | {} | mal {}",
                        short_id(&entry.id),
                        truncate(&entry.title, 50),
                        entry.mal_id
                    );
                }
                println!("\n{} entr{}", entries.len(), plural_y(entries.len()));
            }
            OutputFormat::Json => print_json(&entries),
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.id);
                }
            }
        }
    }

    /// Print a single watchlist entry
    pub fn print_entry(&self, entry: &WatchlistEntry) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:     {}", entry.id);
                println!("Title:  {}", entry.title);
                println!("MAL ID: {}", entry.mal_id);
                if !entry.image_url.is_empty() {
                    println!("Image:  {}", entry.image_url);
                }
            }
            OutputFormat::Json => print_json(entry),
            OutputFormat::Quiet => println!("{}", entry.id),
        }
    }

    /// Print the signed-in identity, if any
    pub fn print_identity(&self, identity: Option<&Identity>) {
        match self.format {
            OutputFormat::Human => match identity {
                Some(identity) => {
                    println!("Signed in as {}", identity.display_name);
                    println!("User ID: {}", identity.user_id);
                    println!(
                        "Since:   {}",
                        identity.signed_in_at.format("%Y-%m-%d %H:%M")
                    );
                }
                None => println!("Not signed in."),
            },
            OutputFormat::Json => print_json(&serde_json::json!({ "identity": identity })),
            OutputFormat::Quiet => {
                if let Some(identity) = identity {
                    println!("{}", identity.user_id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON output: {}", e),
    }
}

/// First 8 characters of a document id
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

fn plural_y(n: usize) -> &'static str {
    if n == 1 {
        "y"
    } else {
        "ies"
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("進撃の巨人 The Final Season", 8), "進撃の巨人...");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("abcdefghijklmnop"), "abcdefgh");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural_y(1), "y");
        assert_eq!(plural_y(3), "ies");
    }
}
