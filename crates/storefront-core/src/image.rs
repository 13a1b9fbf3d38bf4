//! Image references produced by the external upload collaborator.
//!
//! Only the URL is stored. A reference is accepted when it parses as an
//! absolute `http` or `https` URL with a host.

use url::Url;

/// Return the trimmed URL if it is a well-formed absolute web URL.
pub fn normalize_image_url(raw: &str) -> Option<String> {
  let raw = raw.trim();
  let url = Url::parse(raw).ok()?;
  let web = matches!(url.scheme(), "http" | "https");
  (web && url.has_host()).then(|| raw.to_owned())
}

/// Apply [`normalize_image_url`] to an optional input.
pub fn normalize_opt(raw: Option<&str>) -> Option<String> {
  raw.and_then(normalize_image_url)
}
