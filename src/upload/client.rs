//! Block-blob uploader.

use std::collections::BTreeMap;
use std::path::Path;

use base64::prelude::*;
use chrono::{DateTime, Utc};
use log::{debug, info};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use url::Url;

use super::auth::{self, SignedRequest};
use super::destination::{Authorization, BlobDestination, ResolvedContainer};
use crate::config::{AZURE_API_VERSION, UPLOAD_BLOCK_SIZE};
use crate::error_handling::UploadError;
use crate::utils::sanitize::sanitize_and_truncate_error_message;

/// An uploaded archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobReference {
    /// Blob URL without any SAS token
    pub url: String,
    /// Blob name inside the container (`YYYY/MM/DD/<file>`)
    pub name: String,
    /// Uploaded size in bytes
    pub bytes: u64,
}

/// Uploads archives to one container as block blobs.
///
/// Files are streamed in fixed-size blocks (Put Block), then committed with a
/// single Put Block List, so memory use stays at one block per upload.
#[derive(Clone)]
pub struct BlobUploader {
    client: reqwest::Client,
    container: ResolvedContainer,
    block_size: usize,
}

impl std::fmt::Debug for BlobUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobUploader")
            .field("container", &self.container.url.as_str())
            .field("block_size", &self.block_size)
            .finish()
    }
}

impl BlobUploader {
    /// Creates an uploader for `destination` using `client`.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidDestination` if the destination cannot be
    /// resolved (unparseable URL, missing credentials, bad account key).
    pub fn new(destination: &BlobDestination, client: reqwest::Client) -> Result<Self, UploadError> {
        Ok(Self {
            client,
            container: destination.resolve()?,
            block_size: UPLOAD_BLOCK_SIZE,
        })
    }

    /// Overrides the staged block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Uploads `archive` as `YYYY/MM/DD/<file name>` (UTC date).
    ///
    /// The container is created first when the credentials allow it; an
    /// existing container is fine. The local file is left in place.
    ///
    /// # Errors
    ///
    /// - `UploadError::EmptyArchive` for a zero-byte file (nothing is sent)
    /// - `UploadError::Io` if the file cannot be read
    /// - `UploadError::Http` / `UploadError::Rejected` for transport or service errors
    pub async fn upload(&self, archive: &Path) -> Result<BlobReference, UploadError> {
        let size = tokio::fs::metadata(archive).await?.len();
        if size == 0 {
            return Err(UploadError::EmptyArchive(archive.to_path_buf()));
        }
        let file_name = archive
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                UploadError::InvalidDestination(format!(
                    "archive path {} has no UTF-8 file name",
                    archive.display()
                ))
            })?;

        if self.container.can_create() {
            self.create_container().await?;
        }

        let name = blob_name(file_name, Utc::now());
        let mut file = File::open(archive).await?;
        let mut block_ids = Vec::new();
        let mut sent: u64 = 0;
        loop {
            let block = read_block(&mut file, self.block_size).await?;
            if block.is_empty() {
                break;
            }
            let id = block_id(block_ids.len());
            let len = block.len();
            let url = self.request_url(Some(&name), &[("comp", "block"), ("blockid", id.as_str())]);
            self.send(Method::PUT, url, block, None, None).await?;
            sent += len as u64;
            debug!("Staged block {} ({} bytes) of {}", block_ids.len(), len, name);
            block_ids.push(id);
        }

        let url = self.request_url(Some(&name), &[("comp", "blocklist")]);
        self.send(
            Method::PUT,
            url,
            block_list_xml(&block_ids).into_bytes(),
            Some("application/xml"),
            None,
        )
        .await?;

        let blob_url = self.request_url(Some(&name), &[]);
        let mut plain = blob_url;
        plain.set_query(None);
        info!(
            "Uploaded {} ({} bytes, {} blocks)",
            plain,
            sent,
            block_ids.len()
        );
        Ok(BlobReference {
            url: plain.to_string(),
            name,
            bytes: sent,
        })
    }

    async fn create_container(&self) -> Result<(), UploadError> {
        let url = self.request_url(None, &[("restype", "container")]);
        self.send(Method::PUT, url, Vec::new(), None, Some(StatusCode::CONFLICT))
            .await?;
        Ok(())
    }

    /// Container (or blob) URL with the SAS token, if any, followed by `params`.
    fn request_url(&self, blob: Option<&str>, params: &[(&str, &str)]) -> Url {
        let mut url = self.container.url.clone();
        if let Some(blob) = blob {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().extend(blob.split('/'));
            }
        }
        if let Authorization::Sas(token) = &self.container.auth {
            url.set_query(Some(token));
        }
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Vec<u8>,
        content_type: Option<&str>,
        tolerated: Option<StatusCode>,
    ) -> Result<(), UploadError> {
        let mut ms_headers = BTreeMap::new();
        ms_headers.insert("x-ms-date".to_string(), auth::http_date(Utc::now()));
        ms_headers.insert("x-ms-version".to_string(), AZURE_API_VERSION.to_string());

        let mut request = self.client.request(method.clone(), url.clone());
        if let Authorization::SharedKey(credential) = &self.container.auth {
            let signed = SignedRequest {
                method: method.as_str(),
                url: &url,
                content_length: body.len(),
                content_type,
                ms_headers: &ms_headers,
            };
            request = request.header("authorization", auth::authorization(credential, &signed)?);
        }
        for (name, value) in &ms_headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }

        let response = request.body(body).send().await?;
        let status = response.status();
        if status.is_success() || Some(status) == tolerated {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(UploadError::Rejected {
            status: status.as_u16(),
            body: sanitize_and_truncate_error_message(body.trim()),
        })
    }
}

/// `YYYY/MM/DD/<file>` for `now`.
pub(crate) fn blob_name(file_name: &str, now: DateTime<Utc>) -> String {
    format!("{}/{}", now.format("%Y/%m/%d"), file_name)
}

/// Fixed-width ids: every id in a blob must have the same length.
fn block_id(index: usize) -> String {
    BASE64_STANDARD.encode(format!("{:08}", index))
}

fn block_list_xml(ids: &[String]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?><BlockList>");
    for id in ids {
        xml.push_str("<Latest>");
        xml.push_str(id);
        xml.push_str("</Latest>");
    }
    xml.push_str("</BlockList>");
    xml
}

/// Reads up to `size` bytes; an empty vector means EOF.
async fn read_block(file: &mut File, size: usize) -> std::io::Result<Vec<u8>> {
    let mut block = vec![0u8; size];
    let mut filled = 0;
    while filled < size {
        let n = file.read(&mut block[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    block.truncate(filled);
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_blob_name_is_date_prefixed() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 23, 59, 0).unwrap();
        assert_eq!(blob_name("pgdump-ab.sql.gz", at), "2025/03/07/pgdump-ab.sql.gz");
    }

    #[test]
    fn test_block_ids_have_equal_length() {
        assert_eq!(block_id(0), "MDAwMDAwMDA=");
        assert_eq!(block_id(0).len(), block_id(99_999).len());
    }

    #[test]
    fn test_block_list_xml() {
        let xml = block_list_xml(&["YQ==".to_string(), "Yg==".to_string()]);
        assert!(xml.ends_with("<BlockList><Latest>YQ==</Latest><Latest>Yg==</Latest></BlockList>"));
    }

    #[test]
    fn test_request_url_keeps_sas_first() {
        let destination = BlobDestination::ContainerSas {
            url: "https://acct.blob.core.windows.net/backups?sv=2021&sig=abc".into(),
        };
        let uploader = BlobUploader::new(&destination, reqwest::Client::new()).unwrap();
        let url = uploader.request_url(Some("2025/01/06/a.sql.gz"), &[("comp", "blocklist")]);
        assert_eq!(
            url.as_str(),
            "https://acct.blob.core.windows.net/backups/2025/01/06/a.sql.gz?sv=2021&sig=abc&comp=blocklist"
        );
    }

    #[tokio::test]
    async fn test_read_block_splits_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"0123456789").unwrap();
        let mut file = File::open(&path).await.unwrap();
        assert_eq!(read_block(&mut file, 4).await.unwrap(), b"0123");
        assert_eq!(read_block(&mut file, 4).await.unwrap(), b"4567");
        assert_eq!(read_block(&mut file, 4).await.unwrap(), b"89");
        assert!(read_block(&mut file, 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_archive_is_refused() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("empty.sql.gz");
        std::fs::write(&path, b"").unwrap();
        let destination = BlobDestination::ContainerSas {
            url: "http://127.0.0.1:9/backups?sig=abc".into(),
        };
        let uploader = BlobUploader::new(&destination, reqwest::Client::new()).unwrap();
        assert!(matches!(
            uploader.upload(&path).await,
            Err(UploadError::EmptyArchive(_))
        ));
    }
}
