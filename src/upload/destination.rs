//! Blob destinations and connection-string parsing.

use std::collections::HashMap;

use base64::prelude::*;
use url::Url;

use crate::config::AZURE_DEFAULT_ENDPOINT_SUFFIX;
use crate::error_handling::UploadError;

/// Where archives are uploaded.
#[derive(Clone, PartialEq, Eq)]
pub enum BlobDestination {
    /// A storage connection string plus the container to write to.
    ConnectionString {
        /// `Key=Value;...` connection string
        connection_string: String,
        /// Container name
        container: String,
    },
    /// Account name and key.
    SharedKey {
        /// Storage account name
        account_name: String,
        /// Base64 account key
        account_key: String,
        /// Container name
        container: String,
    },
    /// Container URL carrying a SAS token in its query string.
    ContainerSas {
        /// `https://<account>.blob.core.windows.net/<container>?sv=...`
        url: String,
    },
}

impl std::fmt::Debug for BlobDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobDestination::ConnectionString { container, .. } => f
                .debug_struct("ConnectionString")
                .field("container", container)
                .finish_non_exhaustive(),
            BlobDestination::SharedKey {
                account_name,
                container,
                ..
            } => f
                .debug_struct("SharedKey")
                .field("account_name", account_name)
                .field("container", container)
                .finish_non_exhaustive(),
            BlobDestination::ContainerSas { url } => f
                .debug_struct("ContainerSas")
                .field("url", &strip_query(url))
                .finish_non_exhaustive(),
        }
    }
}

/// Decoded account key used to sign requests.
#[derive(Clone)]
pub(crate) struct SharedKeyCredential {
    pub(crate) account_name: String,
    pub(crate) key: Vec<u8>,
}

impl SharedKeyCredential {
    fn new(account_name: &str, account_key: &str) -> Result<Self, UploadError> {
        if account_name.is_empty() {
            return Err(invalid("account name is empty"));
        }
        let key = BASE64_STANDARD
            .decode(account_key.trim())
            .map_err(|_| invalid("account key is not valid base64"))?;
        if key.is_empty() {
            return Err(invalid("account key is empty"));
        }
        Ok(Self {
            account_name: account_name.to_string(),
            key,
        })
    }
}

/// How requests against a container are authorized.
#[derive(Clone)]
pub(crate) enum Authorization {
    SharedKey(SharedKeyCredential),
    /// SAS token (query string without the leading `?`)
    Sas(String),
}

/// A container URL (no query string) plus its authorization.
#[derive(Clone)]
pub(crate) struct ResolvedContainer {
    pub(crate) url: Url,
    pub(crate) auth: Authorization,
}

impl ResolvedContainer {
    /// A SAS cannot be assumed to grant container creation.
    pub(crate) fn can_create(&self) -> bool {
        matches!(self.auth, Authorization::SharedKey(_))
    }
}

impl BlobDestination {
    /// Resolves the container URL and credentials.
    pub(crate) fn resolve(&self) -> Result<ResolvedContainer, UploadError> {
        match self {
            BlobDestination::ConnectionString {
                connection_string,
                container,
            } => {
                let settings = parse_connection_string(connection_string)?;
                resolve_connection_string(&settings, container)
            }
            BlobDestination::SharedKey {
                account_name,
                account_key,
                container,
            } => {
                let credential = SharedKeyCredential::new(account_name, account_key)?;
                let base = format!(
                    "https://{}.blob.{}",
                    account_name, AZURE_DEFAULT_ENDPOINT_SUFFIX
                );
                Ok(ResolvedContainer {
                    url: container_url(&base, container)?,
                    auth: Authorization::SharedKey(credential),
                })
            }
            BlobDestination::ContainerSas { url } => {
                let mut parsed =
                    Url::parse(url).map_err(|e| invalid(&format!("bad SAS URL: {e}")))?;
                let token = parsed.query().unwrap_or_default().to_string();
                if token.is_empty() {
                    return Err(invalid("SAS URL has no token"));
                }
                parsed.set_query(None);
                Ok(ResolvedContainer {
                    url: parsed,
                    auth: Authorization::Sas(token),
                })
            }
        }
    }
}

/// Splits `Key=Value;Key=Value` into a map. Values may contain `=`.
pub(crate) fn parse_connection_string(
    connection_string: &str,
) -> Result<HashMap<String, String>, UploadError> {
    let mut settings = HashMap::new();
    for part in connection_string.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| invalid("connection string entry without '='"))?;
        settings.insert(key.trim().to_string(), value.trim().to_string());
    }
    if settings.is_empty() {
        return Err(invalid("connection string is empty"));
    }
    Ok(settings)
}

fn resolve_connection_string(
    settings: &HashMap<String, String>,
    container: &str,
) -> Result<ResolvedContainer, UploadError> {
    let account = settings.get("AccountName").map(String::as_str);
    let base = match (settings.get("BlobEndpoint"), account) {
        (Some(endpoint), _) => endpoint.trim_end_matches('/').to_string(),
        (None, Some(account)) => {
            let protocol = settings
                .get("DefaultEndpointsProtocol")
                .map(String::as_str)
                .unwrap_or("https");
            let suffix = settings
                .get("EndpointSuffix")
                .map(String::as_str)
                .unwrap_or(AZURE_DEFAULT_ENDPOINT_SUFFIX);
            format!("{}://{}.blob.{}", protocol, account, suffix)
        }
        (None, None) => {
            return Err(invalid(
                "connection string names neither AccountName nor BlobEndpoint",
            ))
        }
    };

    let auth = match (account, settings.get("AccountKey"), settings.get("SharedAccessSignature")) {
        (Some(account), Some(key), _) => {
            Authorization::SharedKey(SharedKeyCredential::new(account, key)?)
        }
        (_, _, Some(sas)) => Authorization::Sas(sas.trim_start_matches('?').to_string()),
        _ => {
            return Err(invalid(
                "connection string has neither AccountKey nor SharedAccessSignature",
            ))
        }
    };

    Ok(ResolvedContainer {
        url: container_url(&base, container)?,
        auth,
    })
}

fn container_url(base: &str, container: &str) -> Result<Url, UploadError> {
    if container.is_empty() || container.contains('/') {
        return Err(invalid("container name must be a single non-empty path segment"));
    }
    let mut url = Url::parse(base).map_err(|e| invalid(&format!("bad endpoint {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| invalid("endpoint cannot hold a path"))?
        .pop_if_empty()
        .push(container);
    Ok(url)
}

/// Drops everything from the first `?` on.
pub fn strip_query(url: &str) -> &str {
    match url.find('?') {
        Some(i) => &url[..i],
        None => url,
    }
}

fn invalid(message: &str) -> UploadError {
    UploadError::InvalidDestination(message.to_string())
}
