//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).
//!
//! All request parameters the client sends live in the query string, so the
//! signature base string is built from the request URL alone.

use std::fmt::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Method;
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use url::Url;

use crate::app::{HatebError, Result};
use crate::auth::Signer;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_BYTES: usize = 16;

pub struct OAuth1Signer {
    consumer_key: String,
    consumer_secret: String,
    token: String,
    token_secret: String,
    rng: SystemRandom,
}

impl OAuth1Signer {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: token.into(),
            token_secret: token_secret.into(),
            rng: SystemRandom::new(),
        }
    }

    /// Build the `Authorization` header value for a request.
    pub fn authorization_header(
        &self,
        method: &Method,
        url: &Url,
        nonce: &str,
        timestamp: i64,
    ) -> Result<String> {
        let signature = self.signature(method, url, nonce, timestamp)?;
        let mut params = self.protocol_params(nonce, timestamp);
        params.push(("oauth_signature", signature));
        params.sort();

        let fields: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect();

        Ok(format!("OAuth {}", fields.join(", ")))
    }

    /// Base64 HMAC-SHA1 of the signature base string.
    pub fn signature(&self, method: &Method, url: &Url, nonce: &str, timestamp: i64) -> Result<String> {
        let base = self.base_string(method, url, nonce, timestamp)?;
        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.token_secret)
        );
        let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, signing_key.as_bytes());
        let tag = hmac::sign(&key, base.as_bytes());
        Ok(STANDARD.encode(tag.as_ref()))
    }

    pub fn base_string(&self, method: &Method, url: &Url, nonce: &str, timestamp: i64) -> Result<String> {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (percent_encode(&k), percent_encode(&v)))
            .collect();
        params.extend(
            self.protocol_params(nonce, timestamp)
                .into_iter()
                .map(|(k, v)| (percent_encode(k), percent_encode(&v))),
        );
        params.sort();

        let normalized = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!(
            "{}&{}&{}",
            method.as_str().to_ascii_uppercase(),
            percent_encode(&base_uri(url)?),
            percent_encode(&normalized)
        ))
    }

    fn protocol_params(&self, nonce: &str, timestamp: i64) -> Vec<(&'static str, String)> {
        vec![
            ("oauth_consumer_key", self.consumer_key.clone()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp", timestamp.to_string()),
            ("oauth_token", self.token.clone()),
            ("oauth_version", OAUTH_VERSION.to_string()),
        ]
    }

    fn nonce(&self) -> Result<String> {
        let mut bytes = [0u8; NONCE_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| HatebError::Signing("Failed to generate nonce".into()))?;
        Ok(hex::encode(bytes))
    }
}

impl Signer for OAuth1Signer {
    fn sign(&self, request: &mut reqwest::Request) -> Result<()> {
        let nonce = self.nonce()?;
        let timestamp = Utc::now().timestamp();
        let header = self.authorization_header(request.method(), request.url(), &nonce, timestamp)?;
        let value = HeaderValue::from_str(&header)
            .map_err(|e| HatebError::Signing(format!("Invalid Authorization header: {e}")))?;
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

impl fmt::Debug for OAuth1Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Signer")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token", &self.token)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

/// `scheme://host[:port]/path` with default ports dropped and no query.
fn base_uri(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| HatebError::Signing(format!("URL has no host: {url}")))?;
    let mut base = format!("{}://{}", url.scheme(), host.to_ascii_lowercase());
    if let Some(port) = url.port() {
        let _ = write!(base, ":{port}");
    }
    base.push_str(url.path());
    Ok(base)
}

/// RFC 3986 encoding: everything except unreserved characters is escaped.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: i64 = 1318622958;

    fn signer() -> OAuth1Signer {
        OAuth1Signer::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        )
    }

    fn status_update_url() -> Url {
        Url::parse(
            "https://api.twitter.com/1.1/statuses/update.json?include_entities=true\
             &status=Hello%20Ladies%20%2B%20Gentlemen%2C%20a%20signed%20OAuth%20request%21",
        )
        .unwrap()
    }

    #[test]
    fn test_percent_encode_reserved() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_base_uri_drops_default_port_and_query() {
        let url = Url::parse("HTTPS://Bookmark.HatenaAPIs.com:443/rest/1/my?x=1").unwrap();
        assert_eq!(base_uri(&url).unwrap(), "https://bookmark.hatenaapis.com/rest/1/my");

        let url = Url::parse("http://localhost:8080/rest/1/my").unwrap();
        assert_eq!(base_uri(&url).unwrap(), "http://localhost:8080/rest/1/my");
    }

    #[test]
    fn test_base_string_matches_reference() {
        let base = signer()
            .base_string(&Method::POST, &status_update_url(), NONCE, TIMESTAMP)
            .unwrap();
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
             include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26\
             oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26\
             oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26\
             oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26\
             oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen\
             %252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn test_signature_matches_reference() {
        let signature = signer()
            .signature(&Method::POST, &status_update_url(), NONCE, TIMESTAMP)
            .unwrap();
        assert_eq!(signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn test_authorization_header_shape() {
        let header = signer()
            .authorization_header(&Method::POST, &status_update_url(), NONCE, TIMESTAMP)
            .unwrap();
        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_version=\"1.0\""));
        assert!(!header.contains("status="));
    }

    #[test]
    fn test_sign_inserts_fresh_header() {
        let signer = signer();
        let url = Url::parse("https://bookmark.hatenaapis.com/rest/1/my").unwrap();

        let mut first = reqwest::Request::new(Method::GET, url.clone());
        let mut second = reqwest::Request::new(Method::GET, url);
        signer.sign(&mut first).unwrap();
        signer.sign(&mut second).unwrap();

        let a = first.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
        let b = second.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
        assert!(a.starts_with("OAuth "));
        assert_ne!(a, b, "each request gets its own nonce");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", signer());
        assert!(!debug.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
        assert!(!debug.contains("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"));
        assert!(debug.contains("<redacted>"));
    }
}
