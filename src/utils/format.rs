//! Formatting utilities for dates, prompts, and home-relative paths.

use std::borrow::Cow;

use chrono::{DateTime, TimeZone};

/// Format a timestamp the way `date` prints it
/// (e.g., "Mon Oct 19 2026 14:03:12 GMT+0000").
pub fn format_date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%a %b %d %Y %H:%M:%S GMT%z").to_string()
}

/// Expand a leading `~` to `home` (`~` and `~/x` only; `~user` is left alone).
pub fn expand_tilde<'a>(input: &'a str, home: &str) -> Cow<'a, str> {
    if input == "~" {
        Cow::Owned(home.to_string())
    } else if let Some(rest) = input.strip_prefix("~/") {
        Cow::Owned(format!("{}/{}", home.trim_end_matches('/'), rest))
    } else {
        Cow::Borrowed(input)
    }
}

/// Replace a leading `home` with `~` for display.
pub fn abbreviate_home(path: &str, home: &str) -> String {
    if home == "/" {
        return path.to_string();
    }
    if path == home {
        return "~".to_string();
    }
    match path.strip_prefix(home) {
        Some(rest) if rest.starts_with('/') => format!("~{}", rest),
        _ => path.to_string(),
    }
}

/// Shell prompt: `user@host:path$ `, `#` instead of `$` for root.
pub fn format_prompt(user: &str, host: &str, path: &str, home: &str) -> String {
    let sigil = if user == crate::config::SUPERUSER { '#' } else { '$' };
    format!("{}@{}:{}{}", user, host, abbreviate_home(path, home), sigil)
}
