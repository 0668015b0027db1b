//! AWS Signature Version 4 for the Product Advertising API.
//!
//! Pure functions only: the caller supplies the clock and the exact payload
//! bytes that will go on the wire.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::CheckError;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const CONTENT_ENCODING: &str = "amz-1.0";
const SIGNED_HEADERS: &str = "content-encoding;host;x-amz-date;x-amz-target";

#[derive(Debug, Clone)]
pub struct SigningCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub service: String,
}

/// What is being called: host (with port when non-default), path and the
/// `X-Amz-Target` operation.
#[derive(Debug, Clone, Copy)]
pub struct RequestTarget<'a> {
    pub host: &'a str,
    pub path: &'a str,
    pub amz_target: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub amz_date: String,
    pub amz_target: String,
    pub authorization: String,
}

impl SignedHeaders {
    /// Header set to attach to the request, `Host` excluded since the HTTP
    /// client derives it from the URL.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("content-encoding", CONTENT_ENCODING.to_string()),
            ("content-type", "application/json; charset=UTF-8".to_string()),
            ("x-amz-date", self.amz_date.clone()),
            ("x-amz-target", self.amz_target.clone()),
            ("authorization", self.authorization.clone()),
        ]
    }
}

pub fn sign_request(
    credentials: &SigningCredentials,
    target: &RequestTarget<'_>,
    timestamp: DateTime<Utc>,
    payload: &str,
) -> Result<SignedHeaders, CheckError> {
    let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = timestamp.format("%Y%m%d").to_string();

    let canonical_request = canonical_request(target, &amz_date, payload);
    let credential_scope = format!(
        "{}/{}/{}/aws4_request",
        date_stamp, credentials.region, credentials.service
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        credential_scope,
        sha256_hex(&canonical_request)
    );

    let signing_key = signing_key(credentials, &date_stamp)?;
    let signature = hex_encode(&hmac(&signing_key, &string_to_sign)?);

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key, credential_scope, SIGNED_HEADERS, signature
    );

    Ok(SignedHeaders {
        amz_date,
        amz_target: target.amz_target.to_string(),
        authorization,
    })
}

fn canonical_request(target: &RequestTarget<'_>, amz_date: &str, payload: &str) -> String {
    // Header names must stay lowercase and sorted to match SIGNED_HEADERS
    let canonical_headers = format!(
        "content-encoding:{}\nhost:{}\nx-amz-date:{}\nx-amz-target:{}\n",
        CONTENT_ENCODING, target.host, amz_date, target.amz_target
    );

    format!(
        "POST\n{}\n\n{}\n{}\n{}",
        target.path,
        canonical_headers,
        SIGNED_HEADERS,
        sha256_hex(payload)
    )
}

fn signing_key(credentials: &SigningCredentials, date_stamp: &str) -> Result<Vec<u8>, CheckError> {
    let k_date = hmac(format!("AWS4{}", credentials.secret_key).as_bytes(), date_stamp)?;
    let k_region = hmac(&k_date, &credentials.region)?;
    let k_service = hmac(&k_region, &credentials.service)?;
    hmac(&k_service, "aws4_request")
}

fn hmac(key: &[u8], message: &str) -> Result<Vec<u8>, CheckError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| CheckError::Signing(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

pub(crate) fn sha256_hex(data: &str) -> String {
    hex_encode(&Sha256::digest(data.as_bytes()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}
