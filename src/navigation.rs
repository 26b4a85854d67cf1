//! Leaving the app: the return action and outbound reference links.

use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use tracing::info;

/// Query parameter carrying the page to go back to.
pub const RETURN_URL_PARAM: &str = "returnUrl";

/// Pick the return destination from the launch query string.
///
/// `query` is the raw query string (a leading `?` is allowed). The value of
/// `returnUrl` is decoded as a query parameter and then percent-decoded once
/// more, so a doubly encoded URL comes out plain. When it is absent or empty
/// `default` is used.
pub fn resolve_return_url(query: Option<&str>, default: &str) -> String {
    query
        .map(|q| q.trim_start_matches('?'))
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == RETURN_URL_PARAM)
                .map(|(_, value)| decode_component(&value).trim().to_string())
        })
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Percent-decode `value`, keeping it as is when the result is not UTF-8.
fn decode_component(value: &str) -> String {
    percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Something that can take the user to a URL.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str) -> Result<()>;
}

/// Opens URLs in the system browser.
pub struct SystemBrowser;

impl Navigator for SystemBrowser {
    fn navigate(&self, url: &str) -> Result<()> {
        info!(url, "Opening in browser");
        open::that_detached(url).with_context(|| format!("Failed to open {}", url))
    }
}
