//! Base URL handling for the Portainer API root.

use url::Url;

use crate::error::{ConfigError, Result};

/// Derive the API root from a user-supplied Portainer URL.
///
/// Appends an `api` segment when the path has none and always leaves a
/// trailing slash, so relative paths such as `stacks/7` join beneath it.
/// Query string and fragment are dropped.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything but an `http(s)` URL.
pub fn api_base(url: &Url) -> Result<Url> {
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidValue {
            field: "url",
            reason: format!("expected an http(s) URL, got '{url}'"),
        }
        .into());
    }

    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);

    let has_api_segment = base
        .path_segments()
        .is_some_and(|mut segments| segments.any(|s| s == "api"));

    let mut path = base.path().trim_end_matches('/').to_string();
    if !has_api_segment {
        path.push_str("/api");
    }
    path.push('/');
    base.set_path(&path);

    Ok(base)
}
