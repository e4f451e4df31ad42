// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Auth-setter reverse proxy
//!
//! The provider sets its token cookie on the application's domain by sending
//! the browser to `/as` on that domain. These routes forward such requests to
//! the provider token endpoint and relay the answer, `Set-Cookie` headers
//! included. Redirects are relayed to the browser, never followed.
//!
//! Requests share nothing but the upstream URL and the HTTP client.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rocket::http::{ContentType, Header, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::response::{self, Responder, Response};
use rocket::{get, post, routes, Request, Route, State};
use std::io::Cursor;

/// Fixed path of the auth-setter on both ends
pub const AUTHSET_PATH: &str = "/as";

/// Request headers copied to the upstream request
const FORWARDED_REQUEST_HEADERS: [&str; 4] = ["Cookie", "Content-Type", "User-Agent", "Accept"];

/// HTTP client bound to the provider token endpoint
#[derive(Debug, Clone)]
pub struct AuthsetProxy {
    client: reqwest::Client,
    upstream: String,
}

impl AuthsetProxy {
    /// Create a proxy forwarding to `token_endpoint`
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a URL or the HTTP client cannot
    /// be built.
    pub fn new(token_endpoint: &str) -> Result<Self> {
        url::Url::parse(token_endpoint)
            .with_context(|| format!("Invalid token endpoint: {}", token_endpoint))?;
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to build auth-setter HTTP client")?;

        Ok(Self {
            client,
            upstream: format!("{}{}", token_endpoint.trim_end_matches('/'), AUTHSET_PATH),
        })
    }

    /// Upstream URL for a request with the given raw query string
    pub fn upstream_url(&self, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}?{}", self.upstream, q),
            _ => self.upstream.clone(),
        }
    }

    async fn forward(
        &self,
        method: reqwest::Method,
        request: &ForwardedRequest,
        body: Option<Vec<u8>>,
    ) -> ProxiedResponse {
        let url = self.upstream_url(request.query.as_deref());
        info!("Forwarding auth-setter {} request to {}", method, url);

        let mut upstream = self.client.request(method, &url);
        for (name, value) in &request.headers {
            upstream = upstream.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            upstream = upstream.body(body);
        }

        let response = match upstream.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Auth-setter upstream request failed: {}", e);
                return ProxiedResponse::bad_gateway();
            }
        };

        let status = response.status().as_u16();
        let mut headers = Vec::new();
        for name in [
            reqwest::header::SET_COOKIE,
            reqwest::header::LOCATION,
            reqwest::header::CONTENT_TYPE,
        ] {
            for value in response.headers().get_all(&name) {
                if let Ok(value) = value.to_str() {
                    headers.push((name.as_str().to_string(), value.to_string()));
                }
            }
        }

        match response.bytes().await {
            Ok(bytes) => {
                debug!("Auth-setter upstream answered {} ({} bytes)", status, bytes.len());
                ProxiedResponse {
                    status: Status::new(status),
                    headers,
                    body: bytes.to_vec(),
                }
            }
            Err(e) => {
                warn!("Failed to read auth-setter upstream response: {}", e);
                ProxiedResponse::bad_gateway()
            }
        }
    }
}

/// The parts of an incoming request relayed upstream
#[derive(Debug)]
pub struct ForwardedRequest {
    query: Option<String>,
    headers: Vec<(String, String)>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ForwardedRequest {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let query = request.uri().query().map(|q| q.as_str().to_string());
        let headers = FORWARDED_REQUEST_HEADERS
            .iter()
            .filter_map(|name| {
                let values: Vec<&str> = request.headers().get(name).collect();
                if values.is_empty() {
                    None
                } else {
                    let separator = if *name == "Cookie" { "; " } else { ", " };
                    Some((name.to_string(), values.join(separator)))
                }
            })
            .collect();
        Outcome::Success(ForwardedRequest { query, headers })
    }
}

/// Upstream answer relayed to the browser
#[derive(Debug)]
pub struct ProxiedResponse {
    pub status: Status,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ProxiedResponse {
    fn bad_gateway() -> Self {
        Self {
            status: Status::BadGateway,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ProxiedResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut builder = Response::build();
        builder.status(self.status);
        for (name, value) in self.headers {
            if name.eq_ignore_ascii_case("content-type") {
                if let Some(content_type) = ContentType::parse_flexible(&value) {
                    builder.header(content_type);
                }
            } else {
                builder.header_adjoin(Header::new(name, value));
            }
        }
        builder.sized_body(self.body.len(), Cursor::new(self.body)).ok()
    }
}

#[get("/as")]
pub async fn authset_get(request: ForwardedRequest, proxy: &State<AuthsetProxy>) -> ProxiedResponse {
    proxy.forward(reqwest::Method::GET, &request, None).await
}

#[post("/as", data = "<body>")]
pub async fn authset_post(
    request: ForwardedRequest,
    body: Vec<u8>,
    proxy: &State<AuthsetProxy>,
) -> ProxiedResponse {
    proxy.forward(reqwest::Method::POST, &request, Some(body)).await
}

/// Routes to mount at `/`
pub fn authset_routes() -> Vec<Route> {
    routes![authset_get, authset_post]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_url_keeps_query() {
        let proxy = AuthsetProxy::new("https://authsetter.fident.io/").unwrap();
        assert_eq!(proxy.upstream_url(None), "https://authsetter.fident.io/as");
        assert_eq!(proxy.upstream_url(Some("")), "https://authsetter.fident.io/as");
        assert_eq!(
            proxy.upstream_url(Some("t=abc&r=1")),
            "https://authsetter.fident.io/as?t=abc&r=1"
        );
    }

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(AuthsetProxy::new("not a url").is_err());
    }
}
