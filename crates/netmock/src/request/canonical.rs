//! URL canonicalization for request equality.

use crate::error::MockError;
use url::Url;

pub(crate) fn parse_url(url: &str) -> Result<Url, MockError> {
    Url::parse(url).map_err(|source| MockError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Canonical form of `url` used when comparing request URLs.
///
/// Parsing already lowercases the scheme and host of special schemes, drops
/// default ports and turns an empty path into `/`. On top of that the fragment
/// is removed, since it never reaches the server.
pub fn canonical_url(url: &Url) -> Url {
    let mut canonical = url.clone();
    canonical.set_fragment(None);
    if canonical.path().is_empty() && !canonical.cannot_be_a_base() {
        canonical.set_path("/");
    }
    canonical
}
