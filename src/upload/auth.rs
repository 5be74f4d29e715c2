//! Shared Key request signing.

use std::collections::BTreeMap;

use base64::prelude::*;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use super::destination::SharedKeyCredential;
use crate::error_handling::UploadError;

type HmacSha256 = Hmac<Sha256>;

/// Fields of a request that take part in the signature.
pub(crate) struct SignedRequest<'a> {
    pub(crate) method: &'a str,
    pub(crate) url: &'a Url,
    pub(crate) content_length: usize,
    pub(crate) content_type: Option<&'a str>,
    /// `x-ms-*` headers, names lowercase
    pub(crate) ms_headers: &'a BTreeMap<String, String>,
}

/// `Date` header format expected in `x-ms-date`.
pub(crate) fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Canonical string-to-sign for the Blob service.
pub(crate) fn string_to_sign(account: &str, request: &SignedRequest<'_>) -> String {
    // Zero is sent as an empty field since API version 2015-02-21
    let content_length = if request.content_length == 0 {
        String::new()
    } else {
        request.content_length.to_string()
    };

    let mut out = String::new();
    out.push_str(request.method);
    out.push('\n');
    out.push('\n'); // Content-Encoding
    out.push('\n'); // Content-Language
    out.push_str(&content_length);
    out.push('\n');
    out.push('\n'); // Content-MD5
    out.push_str(request.content_type.unwrap_or_default());
    out.push('\n');
    // Date, If-Modified-Since, If-Match, If-None-Match, If-Unmodified-Since, Range
    out.push_str("\n\n\n\n\n\n");

    for (name, value) in request.ms_headers {
        out.push_str(name);
        out.push(':');
        out.push_str(value.trim());
        out.push('\n');
    }

    out.push('/');
    out.push_str(account);
    out.push_str(request.url.path());

    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in request.url.query_pairs() {
        params
            .entry(name.to_lowercase())
            .or_default()
            .push(value.into_owned());
    }
    for (name, mut values) in params {
        values.sort();
        out.push('\n');
        out.push_str(&name);
        out.push(':');
        out.push_str(&values.join(","));
    }
    out
}

/// `Authorization` header value for `request`.
pub(crate) fn authorization(
    credential: &SharedKeyCredential,
    request: &SignedRequest<'_>,
) -> Result<String, UploadError> {
    let canonical = string_to_sign(&credential.account_name, request);
    let mut mac = HmacSha256::new_from_slice(&credential.key)
        .map_err(|_| UploadError::InvalidDestination("unusable account key".to_string()))?;
    mac.update(canonical.as_bytes());
    let signature = BASE64_STANDARD.encode(mac.finalize().into_bytes());
    Ok(format!("SharedKey {}:{}", credential.account_name, signature))
}
