//! Input source resolution: local paths vs http(s) URLs.

use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Local(PathBuf),
    Http(String),
}

/// Classify a source string by scheme. Anything without an http(s)
/// scheme is treated as a local path.
pub fn input_source(source: &str) -> InputSource {
    if let Some(idx) = source.find("://") {
        let scheme = source[..idx].to_ascii_lowercase();
        if scheme == "http" || scheme == "https" {
            return InputSource::Http(source.to_string());
        }
    }
    InputSource::Local(PathBuf::from(source))
}

/// Resolve a source to a readable local path, downloading when remote.
pub fn fetch(source: &str) -> Result<PathBuf> {
    match input_source(source) {
        InputSource::Local(path) => Ok(path),
        InputSource::Http(url) => download_http_to_temp(&url),
    }
}

/// Download a URL to a kept temp file and return its path.
#[cfg(feature = "http")]
pub fn download_http_to_temp(url: &str) -> Result<PathBuf> {
    use std::io;
    use std::time::Duration;

    let mut temp = tempfile::Builder::new()
        .prefix("soubitui-")
        .suffix(".csv")
        .tempfile()
        .map_err(|e| eyre!("Failed to create temp file: {e}"))?;

    let response = ureq::get(url)
        .timeout(Duration::from_secs(300))
        .call()
        .map_err(|e| eyre!("Failed to download file: {e}"))?;

    if response.status() >= 400 {
        return Err(eyre!(
            "Server returned {} {}",
            response.status(),
            response.status_text()
        ));
    }

    io::copy(&mut response.into_reader(), &mut temp)
        .map_err(|e| eyre!("Failed to write downloaded data: {e}"))?;

    let (_file, path) = temp
        .keep()
        .map_err(|e| eyre!("Failed to keep temp file: {e}"))?;
    Ok(path)
}

#[cfg(not(feature = "http"))]
pub fn download_http_to_temp(url: &str) -> Result<PathBuf> {
    Err(eyre!(
        "Cannot open {url}: this build has no http support (enable the `http` feature)"
    ))
}
