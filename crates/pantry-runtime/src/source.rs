//! Sources the raw procurement table as a byte stream.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pantry_core::error::{PantryError, Result};
use tracing::{debug, info};

/// Default timeout for HTTP table downloads.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can produce the raw table bytes.
///
/// Implementations surface failures as [`PantryError::Fetch`]; the core never
/// retries — retry policy lives in the manager wrapping the source.
pub trait RawTableSource {
    /// Fetch the raw table as one byte stream.
    fn fetch_raw_table(&self) -> Result<Vec<u8>>;

    /// Human-readable description of where the table comes from, for logs.
    fn describe(&self) -> String;
}

// ── FileSource ────────────────────────────────────────────────────────────────

/// Reads the table from a local file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RawTableSource for FileSource {
    fn fetch_raw_table(&self) -> Result<Vec<u8>> {
        debug!("reading table from {}", self.path.display());
        std::fs::read(&self.path)
            .map_err(|e| PantryError::Fetch(format!("{}: {}", self.path.display(), e)))
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

// ── HttpSource ────────────────────────────────────────────────────────────────

/// Downloads the table from an HTTP endpoint (e.g. a document-store export
/// URL), optionally with a bearer token.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    url: String,
    token: Option<String>,
}

impl HttpSource {
    /// Create a source with the default download timeout.
    pub fn new(url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(DEFAULT_FETCH_TIMEOUT)
            .build()
            .map_err(|e| PantryError::Fetch(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }
}

impl RawTableSource for HttpSource {
    fn fetch_raw_table(&self) -> Result<Vec<u8>> {
        info!("downloading table from {}", self.url);

        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| PantryError::Fetch(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PantryError::Fetch(format!(
                "{}: HTTP status {}",
                self.url, status
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| PantryError::Fetch(format!("{}: {}", self.url, e)))?;

        debug!("downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}

// ── Source selection ──────────────────────────────────────────────────────────

/// Build the source matching `location`: http(s) URLs download, everything
/// else is treated as a local file path.
pub fn source_for(location: &str, token: Option<String>) -> Result<Box<dyn RawTableSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location, token)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
