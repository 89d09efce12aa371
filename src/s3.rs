use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::error::CrawlError;
use crate::storage::ObjectStore;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Everything but RFC 3986 unreserved characters and `/`.
const SIGV4_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Access keys for request signing.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// S3-compatible store using path-style `PUT /{bucket}/{key}` with Signature V4.
#[derive(Debug, Clone)]
pub struct S3Store {
    endpoint: String,
    host: String,
    region: String,
    credentials: Credentials,
    agent: ureq::Agent,
}

impl S3Store {
    /// `endpoint` is a full `http(s)://host[:port]` URL; pass `None` for AWS itself.
    pub fn new(
        endpoint: Option<&str>,
        region: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, CrawlError> {
        let region = region.into();
        let endpoint = match endpoint {
            Some(e) => e.trim_end_matches('/').to_string(),
            None => format!("https://s3.{}.amazonaws.com", region),
        };
        let host = host_of(&endpoint)?;
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Ok(Self {
            endpoint,
            host,
            region,
            credentials,
            agent,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Headers (lowercase names) for a signed `PUT` of `body` at `now`.
    fn signed_headers(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, String)>, CrawlError> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let payload_hash = hex(&Sha256::digest(body));

        // Must stay sorted by name.
        let mut headers = vec![
            ("host".to_string(), self.host.clone()),
            ("x-amz-content-sha256".to_string(), payload_hash.clone()),
            ("x-amz-date".to_string(), amz_date.clone()),
        ];
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }

        let signed_names = headers
            .iter()
            .map(|(n, _)| n.as_str())
            .collect::<Vec<_>>()
            .join(";");
        let canonical_headers: String = headers
            .iter()
            .map(|(n, v)| format!("{}:{}\n", n, v.trim()))
            .collect();
        let canonical_request = format!(
            "PUT\n{}\n\n{}\n{}\n{}",
            canonical_uri(bucket, key),
            canonical_headers,
            signed_names,
            payload_hash
        );

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, SERVICE);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex(&Sha256::digest(canonical_request.as_bytes()))
        );
        let signing_key = signing_key(
            &self.credentials.secret_access_key,
            &date,
            &self.region,
            SERVICE,
        )?;
        let signature = hex(&hmac(&signing_key, string_to_sign.as_bytes())?);

        headers.push((
            "authorization".to_string(),
            format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                ALGORITHM, self.credentials.access_key_id, scope, signed_names, signature
            ),
        ));
        headers.push(("content-type".to_string(), "text/csv".to_string()));
        Ok(headers)
    }
}

impl ObjectStore for S3Store {
    #[instrument(level = "debug", skip(self, body), fields(bytes = body.len()))]
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), CrawlError> {
        let url = format!("{}{}", self.endpoint, canonical_uri(bucket, key));
        let headers = self.signed_headers(bucket, key, body, Utc::now())?;

        let mut request = self.agent.put(&url);
        // ureq derives Host from the URL, which matches the signed value.
        for (name, value) in headers.iter().filter(|(n, _)| n != "host") {
            request = request.header(name.as_str(), value.as_str());
        }
        match request.send(body) {
            Ok(resp) => {
                debug!(status = resp.status().as_u16(), url = %url, "PUT object");
                Ok(())
            }
            Err(e) => Err(CrawlError::Storage {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

fn host_of(endpoint: &str) -> Result<String, CrawlError> {
    let rest = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .ok_or_else(|| {
            CrawlError::Config(format!("object store endpoint must be http(s): {}", endpoint))
        })?;
    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(CrawlError::Config(format!(
            "object store endpoint has no host: {}",
            endpoint
        )));
    }
    Ok(host.to_string())
}

fn canonical_uri(bucket: &str, key: &str) -> String {
    format!(
        "/{}/{}",
        utf8_percent_encode(bucket, SIGV4_SET),
        utf8_percent_encode(key, SIGV4_SET)
    )
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>, CrawlError> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CrawlError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|err| CrawlError::Config(format!("hmac init failed: {err}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
