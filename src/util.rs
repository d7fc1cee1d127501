use url::Url;

use crate::error::{Error, Result};

pub(crate) const API_PREFIX: &str = "api/v1/";

/// Parses a base URL and makes sure its path ends with `/`, so that
/// `api/v1/...` can be appended verbatim.
pub(crate) fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|source| Error::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// `<base>api/v1/<endpoint>[?<query>]`
pub(crate) fn endpoint_url(base: &Url, endpoint: &str, query: &[(&str, &str)]) -> Result<Url> {
    let base = base.as_str();
    let sep = if base.ends_with('/') { "" } else { "/" };
    let raw = format!("{base}{sep}{API_PREFIX}{}", endpoint.trim_start_matches('/'));
    let mut url = Url::parse(&raw).map_err(|source| Error::InvalidUrl { url: raw, source })?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.iter().copied());
    }
    Ok(url)
}

/// Reads an environment variable, treating blank values as unset.
pub(crate) fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
