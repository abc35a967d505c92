//! WFS client for GetFeature downloads.
//!
//! Issues a GetFeature request for a configured feature type and streams
//! the SHAPE-ZIP response to disk chunk by chunk, so memory use stays
//! bounded regardless of archive size. Some WFS servers report failures as
//! HTTP 200 with an OWS ExceptionReport body; those are detected and
//! surfaced as typed errors instead of being written out as a corrupt
//! archive.

use std::path::PathBuf;
use std::time::Duration;

use basinlink_core::error::{BasinlinkError, Result};
use basinlink_core::sources::WfsSourceConfig;
use futures::StreamExt;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncWriteExt;

/// Output format requested from the server
const OUTPUT_FORMAT: &str = "SHAPE-ZIP";

/// Bound on connection establishment and on the whole request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Progress events emitted while a download streams to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadEvent {
    /// Response accepted; total size if the server reported one
    Started { total_bytes: Option<u64> },
    /// Another chunk hit the disk
    Chunk { bytes_so_far: u64 },
    /// The stream ended and the file is complete
    Finished { total_bytes: u64 },
}

/// Client for a single WFS endpoint
#[derive(Debug, Clone)]
pub struct WfsClient {
    client: reqwest::Client,
    base_url: String,
    version: String,
    timeout: Duration,
}

impl WfsClient {
    pub fn new(base_url: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, version, DEFAULT_TIMEOUT)
    }

    /// Build a client with an explicit timeout.
    ///
    /// The timeout bounds both connection establishment and the whole
    /// request, so a stalled server fails the download instead of hanging
    /// it indefinitely.
    pub fn with_timeout(
        base_url: impl Into<String>,
        version: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| BasinlinkError::Http {
                url: base_url.clone(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            version: version.into(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Download the shapefile archive for a WFS source.
    ///
    /// Streams the response into `<raw_dir>/<archive_name>`, creating the
    /// raw directory if needed, and returns the archive path. Progress is
    /// reported through `on_progress` as bytes reach the disk; pass a
    /// no-op closure when no display is attached.
    pub async fn download_shapefile(
        &self,
        source: &WfsSourceConfig,
        mut on_progress: impl FnMut(DownloadEvent),
    ) -> Result<PathBuf> {
        let output_path = source.source.raw_dir.join(&source.archive_name);
        tokio::fs::create_dir_all(&source.source.raw_dir).await?;

        let params = [
            ("service", "WFS"),
            ("version", self.version.as_str()),
            ("request", "GetFeature"),
            ("typeName", source.type_name.as_str()),
            ("outputFormat", OUTPUT_FORMAT),
        ];

        tracing::info!(
            url = %self.base_url,
            type_name = %source.type_name,
            "requesting WFS GetFeature"
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.http_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.http_error(format!("server returned status {}", status)));
        }

        // XML where an archive was expected means the server declined the
        // request; read the body and report the exception
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if content_type.contains("xml") {
            let body = response
                .text()
                .await
                .map_err(|e| self.http_error(e.to_string()))?;
            return Err(parse_ows_exception(&body).unwrap_or_else(|| {
                self.http_error(format!(
                    "expected {} but received '{}'",
                    OUTPUT_FORMAT, content_type
                ))
            }));
        }

        on_progress(DownloadEvent::Started {
            total_bytes: response.content_length(),
        });

        let mut file = tokio::fs::File::create(&output_path).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.http_error(e.to_string()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            on_progress(DownloadEvent::Chunk {
                bytes_so_far: written,
            });
        }
        file.flush().await?;

        on_progress(DownloadEvent::Finished {
            total_bytes: written,
        });

        tracing::info!(
            bytes = written,
            path = %output_path.display(),
            "downloaded WFS archive"
        );

        Ok(output_path)
    }

    fn http_error(&self, message: String) -> BasinlinkError {
        BasinlinkError::Http {
            url: self.base_url.clone(),
            message,
        }
    }
}

/// Parse an OWS ExceptionReport body into a WfsException error.
///
/// Returns None when the body is not an exception report at all.
pub fn parse_ows_exception(xml: &str) -> Option<BasinlinkError> {
    if !xml.contains("ExceptionReport") {
        return None;
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut code = "NoApplicableCode".to_string();
    let mut message = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"Exception" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"exceptionCode" {
                            if let Ok(value) = attr.unescape_value() {
                                code = value.into_owned();
                            }
                        }
                    }
                }
                b"ExceptionText" => in_text = true,
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"ExceptionText" => {
                in_text = false;
            }
            Ok(Event::Text(t)) if in_text => {
                if let Ok(text) = t.unescape() {
                    if !message.is_empty() {
                        message.push(' ');
                    }
                    message.push_str(text.trim());
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    Some(BasinlinkError::WfsException { code, message })
}
