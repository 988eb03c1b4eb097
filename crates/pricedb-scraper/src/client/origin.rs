/// Scheme and host of `url`, used as the `Referer` for requests to it.
///
/// `"https://api.source.test/v1/prices?x=1"` becomes `"https://api.source.test/"`.
///
/// # Errors
///
/// Returns the parse failure message when `url` is not absolute.
pub fn referer_for(url: &str) -> Result<String, String> {
    let parsed = reqwest::Url::parse(url).map_err(|e| e.to_string())?;
    if !parsed.has_host() {
        return Err("URL has no host".to_owned());
    }
    Ok(format!("{}/", parsed.origin().ascii_serialization()))
}

/// Host name of `url` for error messages, or the raw input when unparseable.
pub(super) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
