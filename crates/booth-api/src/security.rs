//! Request classification helpers.
//!
//! This module provides:
//! - User-agent based bot filtering for the visit counter
//! - Visitor-id cookie validation

use std::sync::LazyLock;

use regex::Regex;

/// Name of the anonymous visitor cookie.
pub const VISITOR_COOKIE: &str = "v_id";

/// Maximum visitor id length accepted from a cookie.
const MAX_VISITOR_ID_LEN: usize = 64;

/// Common crawlers, link-preview fetchers, and scripted clients.
static BOT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)bot|crawl|spider|preview|scan|wget|curl|python-requests|facebookexternalhit|twitterbot|linkedinbot|slackbot|discordbot|whatsapp|telegram",
    )
    .expect("bot pattern is valid")
});

/// Whether a user agent looks automated. An empty agent is not a bot.
pub fn is_bot(user_agent: &str) -> bool {
    BOT_PATTERN.is_match(user_agent)
}

/// Whether a cookie value can be used as a visitor id.
pub fn is_valid_visitor_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_VISITOR_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
