// Roadmap service HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, cookie-jar access, and
// the service's `{error}` body convention. Endpoint methods live in
// `auth.rs` and `roadmap.rs` as inherent impls to keep this module
// focused on transport mechanics.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Raw HTTP client for the roadmap service.
///
/// Identity is carried by the session cookie the service sets on
/// `/verify-otp`; the client never handles tokens itself.
#[derive(Clone)]
pub struct RaastaClient {
    http: reqwest::Client,
    base_url: Url,
    /// Cookie jar reference for persisting and restoring the session cookie.
    cookie_jar: Option<Arc<Jar>>,
}

impl RaastaClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// A cookie jar is created when the config doesn't carry one, since
    /// every identity-bearing endpoint relies on the session cookie.
    pub fn new(base_url: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            cookie_jar,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// The caller owns cookie handling; [`cookie_header`](Self::cookie_header)
    /// always returns `None` for such clients.
    pub fn with_client(http: reqwest::Client, base_url: &Url) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            cookie_jar: None,
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The service base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session cookie ───────────────────────────────────────────────

    /// The `Cookie` header the client would send to the service, if any.
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let cookies = jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    /// Seed the jar from a previously captured `Cookie` header value.
    pub fn restore_cookie_header(&self, header: &str) {
        let Some(jar) = self.cookie_jar.as_ref() else {
            debug!("no cookie jar, session cookie not restored");
            return;
        };
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            jar.add_cookie_str(pair, &self.base_url);
        }
        trace!("session cookie restored");
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Join an endpoint name (e.g. `"load"`) onto the base URL.
    pub(crate) fn url(&self, endpoint: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(endpoint)?)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, Error> {
        let url = self.url(endpoint)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let body = check_status(resp).await?;
        parse_body(&body)
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(endpoint)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        let body = check_status(resp).await?;
        parse_body(&body)
    }

    /// POST where a 2xx response may legitimately carry an empty body.
    pub(crate) async fn post_lenient<T: DeserializeOwned + Default, B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(endpoint)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        let body = check_status(resp).await?;
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        parse_body(&body)
    }

    /// POST whose response body is ignored beyond the status code.
    pub(crate) async fn post_no_response(
        &self,
        endpoint: &str,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<(), Error> {
        let url = self.url(endpoint)?;
        debug!("POST {url}");

        let mut builder = self.http.post(url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        check_status(resp).await?;
        Ok(())
    }
}

/// Ensure the base path ends with `/` so endpoint names join beneath it.
fn normalize_base_url(raw: &Url) -> Url {
    let mut url = raw.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Read the body, translating non-success statuses into errors.
async fn check_status(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message);

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication { message });
    }

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview = body.chars().take(200).collect::<String>();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = Url::parse("https://example.dev/api").expect("url");
        let normalized = normalize_base_url(&url);
        assert_eq!(normalized.as_str(), "https://example.dev/api/");
        assert_eq!(
            normalized.join("load").expect("join").as_str(),
            "https://example.dev/api/load"
        );
    }

    #[test]
    fn root_base_url_is_unchanged() {
        let url = Url::parse("https://example.dev").expect("url");
        assert_eq!(normalize_base_url(&url).as_str(), "https://example.dev/");
    }
}
