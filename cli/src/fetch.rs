#![deny(missing_docs)]

//! # Upstream Fetch
//!
//! One blocking GET for the upstream OpenAPI document. A transport error or
//! a non-success status aborts generation; there is no retry.

use crate::error::{CliError, CliResult};
use url::Url;

/// Raw location of the upstream HSDS OpenAPI document.
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://raw.githubusercontent.com/HDFGroup/hdf-rest-api/master/openapi.yaml";

/// Downloads the upstream document as UTF-8 text.
pub fn fetch_document(url: &str) -> CliResult<String> {
    let parsed = Url::parse(url)
        .map_err(|e| CliError::Http(format!("Invalid upstream URL '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(CliError::Http(format!(
                "Unsupported URL scheme '{}' in '{}'",
                other, url
            )))
        }
    }

    log::info!("Fetching upstream document from {}", url);

    let mut response = ureq::get(url)
        .call()
        .map_err(|e| CliError::Http(format!("Failed to fetch '{}': {}", url, e)))?;

    response.body_mut().read_to_string().map_err(|e| {
        CliError::Http(format!("Failed to read response body from '{}': {}", url, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url_is_well_formed() {
        let url = Url::parse(DEFAULT_UPSTREAM_URL).unwrap();
        assert_eq!(url.scheme(), "https");
        assert!(url.path().ends_with("openapi.yaml"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = fetch_document("not a url").unwrap_err();
        assert!(matches!(err, CliError::Http(_)));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = fetch_document("ftp://example.com/openapi.yaml").unwrap_err();
        assert!(format!("{}", err).contains("Unsupported URL scheme"));
    }
}
