//! Snapshot fetcher: one HTTP GET via libcurl, saved under the download directory.
//!
//! The body is streamed into `<name>.part` and renamed onto `<name>` once the
//! transfer finished with status 200. Bodies of any other status are never
//! written, and no directory is created for them. No retries, no timeouts.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::str;

use crate::checksum;
use crate::storage::PartFile;
use crate::url_model;

/// Why a snapshot could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The URL has no last path segment to name the local file after.
    #[error("cannot derive a file name from url: {0}")]
    NoFileName(String),
    /// The server answered with something other than 200.
    #[error("HTTP {code} {reason} for url: {url}")]
    Status {
        url: String,
        code: u32,
        reason: String,
    },
    /// DNS, connect, TLS or transfer failure before a complete response.
    #[error("GET {url} failed")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },
    /// Writing the snapshot to disk failed.
    #[error("writing {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Status line of the final response (the last one seen when following redirects).
#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusLine {
    code: u32,
    reason: Option<String>,
}

/// Parses `HTTP/1.1 404 Not Found` or `HTTP/2 404`. Other header lines yield `None`.
fn parse_status_line(line: &str) -> Option<StatusLine> {
    let line = line.trim_end();
    if !line.starts_with("HTTP/") {
        return None;
    }
    let mut parts = line.splitn(3, ' ');
    let _version = parts.next()?;
    let code = parts.next()?.trim().parse::<u32>().ok()?;
    let reason = parts
        .next()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(|r| r.to_string());
    Some(StatusLine { code, reason })
}

/// Fallback description when the server sent no reason phrase (e.g. HTTP/2).
fn status_class(code: u32) -> &'static str {
    match code {
        100..=199 => "Informational",
        200..=299 => "Success",
        300..=399 => "Redirection",
        400..=499 => "Client Error",
        500..=599 => "Server Error",
        _ => "Unknown Status",
    }
}

/// Fetches `url` into `<download_dir>/<url basename>` and returns the path.
///
/// `download_dir` is created only once a 200 response starts arriving. An
/// existing file at the destination is replaced. When `verify_tls` is false
/// neither the certificate chain nor the host name is checked.
pub fn fetch_snapshot(url: &str, download_dir: &Path, verify_tls: bool) -> Result<PathBuf, FetchError> {
    let file_name =
        url_model::derive_filename(url).ok_or_else(|| FetchError::NoFileName(url.to_string()))?;
    let dest = download_dir.join(&file_name);
    let transport = |source: curl::Error| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    tracing::info!("making an HTTP request to {}", url);

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport)?;
    easy.get(true).map_err(transport)?;
    easy.follow_location(true).map_err(transport)?;
    if !verify_tls {
        tracing::warn!("TLS certificate verification disabled for {}", url);
        easy.ssl_verify_peer(false).map_err(transport)?;
        easy.ssl_verify_host(false).map_err(transport)?;
    }

    let status: RefCell<Option<StatusLine>> = RefCell::new(None);
    let mut part: Option<PartFile> = None;
    let mut write_error: Option<io::Error> = None;

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Some(line) = str::from_utf8(data).ok().and_then(parse_status_line) {
                    *status.borrow_mut() = Some(line);
                }
                true
            })
            .map_err(transport)?;
        transfer
            .write_function(|data| {
                let ok = status.borrow().as_ref().map(|s| s.code) == Some(200);
                if !ok {
                    // Error pages are drained, not saved.
                    return Ok(data.len());
                }
                if part.is_none() {
                    match PartFile::create(&dest) {
                        Ok(p) => part = Some(p),
                        Err(e) => {
                            write_error = Some(e);
                            return Ok(0); // abort transfer
                        }
                    }
                }
                if let Some(p) = part.as_mut() {
                    if let Err(e) = p.write_all(data) {
                        write_error = Some(e);
                        return Ok(0);
                    }
                }
                Ok(data.len())
            })
            .map_err(transport)?;
        transfer.perform()
    };

    if let Some(source) = write_error {
        if let Some(p) = part {
            p.discard();
        }
        return Err(FetchError::Io { path: dest, source });
    }
    if let Err(source) = performed {
        if let Some(p) = part {
            p.discard();
        }
        tracing::error!("request to {} failed: {}", url, source);
        return Err(transport(source));
    }

    let code = easy.response_code().map_err(transport)?;
    if code != 200 {
        if let Some(p) = part {
            p.discard();
        }
        let reason = status
            .into_inner()
            .and_then(|s| s.reason)
            .unwrap_or_else(|| status_class(code).to_string());
        tracing::error!("an error was encountered with status code {}", code);
        let err = FetchError::Status {
            url: url.to_string(),
            code,
            reason,
        };
        tracing::error!("HTTP error: {}", err);
        return Err(err);
    }

    // A 200 with an empty body never reached the write callback.
    let part = match part {
        Some(p) => p,
        None => PartFile::create(&dest).map_err(|source| FetchError::Io {
            path: dest.clone(),
            source,
        })?,
    };
    let bytes = part.written();
    let saved = part.finalize().map_err(|source| FetchError::Io {
        path: dest.clone(),
        source,
    })?;
    tracing::info!("saved {} bytes as {}", bytes, saved.display());

    match checksum::digest_path(&saved) {
        Ok(d) => tracing::info!(sha256 = %d.sha256, len = d.len, "snapshot fingerprint"),
        Err(e) => tracing::warn!("could not hash {}: {:#}", saved.display(), e),
    }

    Ok(saved)
}
