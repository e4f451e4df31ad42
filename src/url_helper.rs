// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Provider redirect URLs
//!
//! Every hosted page takes a `destination` query parameter: the application
//! URL the provider redirects to once the user is done.
//!
//! Verified registration URLs additionally carry the already verified
//! `email` and a `presig` parameter, the hex encoded HMAC-SHA-256 of the
//! email keyed with the registration secret shared with the provider.
//!
//! ```
//! use fident_web::UrlHelper;
//!
//! let urls = UrlHelper::new("https://app.example.com", "https://fident.io", None);
//! assert_eq!(
//!     urls.login_url(),
//!     "https://fident.io/login?destination=https://app.example.com"
//! );
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use crate::config::UrlsConfig;
use crate::error::UrlError;

const DESTINATION_PARAM: &str = "destination";
const EMAIL_PARAM: &str = "email";
const SIGNATURE_PARAM: &str = "presig";

const LOGIN_PATH: &str = "/login";
const LOGOUT_PATH: &str = "/logout";
const MANAGEMENT_PATH: &str = "/user-management";
const REGISTRATION_PATH: &str = "/register";
const POST_REGISTRATION_PATH: &str = "/post-register";

/// Builds URLs of the provider hosted pages
///
/// Immutable once built; share it freely.
#[derive(Clone)]
pub struct UrlHelper {
    product_url: String,
    provider_url: String,
    registration_secret: Option<String>,
}

impl std::fmt::Debug for UrlHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlHelper")
            .field("product_url", &self.product_url)
            .field("provider_url", &self.provider_url)
            .field(
                "registration_secret",
                &self.registration_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl UrlHelper {
    /// Create a URL helper
    ///
    /// # Arguments
    ///
    /// * `product_url` - Base URL of this application, used as `destination`
    /// * `provider_url` - Base URL of the provider; a trailing `/` is ignored
    /// * `registration_secret` - Secret for verified registration URLs, if used
    pub fn new(
        product_url: impl Into<String>,
        provider_url: impl Into<String>,
        registration_secret: Option<String>,
    ) -> Self {
        let provider_url: String = provider_url.into();
        Self {
            product_url: product_url.into(),
            provider_url: provider_url.trim_end_matches('/').to_string(),
            registration_secret: registration_secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn from_config(urls: &UrlsConfig) -> Self {
        Self::new(
            urls.product_url.clone(),
            urls.provider_url.clone(),
            urls.registration_secret.clone(),
        )
    }

    fn page_url(&self, path: &str) -> String {
        format!(
            "{}{}?{}={}",
            self.provider_url, path, DESTINATION_PARAM, self.product_url
        )
    }

    /// Login page, redirecting back to the application on login
    pub fn login_url(&self) -> String {
        self.page_url(LOGIN_PATH)
    }

    /// Logout page, redirecting back to the application on logout
    pub fn logout_url(&self) -> String {
        self.page_url(LOGOUT_PATH)
    }

    /// Account management page of the current user
    pub fn management_url(&self) -> String {
        self.page_url(MANAGEMENT_PATH)
    }

    /// Registration page, redirecting back to the application afterwards
    pub fn registration_url(&self) -> String {
        self.page_url(REGISTRATION_PATH)
    }

    /// Target of an application-hosted registration form
    ///
    /// The form must post the address under the `email` key.
    pub fn registration_post_url(&self) -> String {
        self.page_url(POST_REGISTRATION_PATH)
    }

    /// Registration page for an email address the application already verified
    ///
    /// # Errors
    ///
    /// [`UrlError::MissingRegistrationSecret`] if no registration secret is
    /// configured, [`UrlError::InvalidUrl`] if the provider URL does not parse.
    pub fn verified_registration_url(&self, email: &str) -> Result<String, UrlError> {
        let secret = self
            .registration_secret
            .as_deref()
            .ok_or(UrlError::MissingRegistrationSecret)?;

        let mut url = Url::parse(&self.provider_url)?;
        let path = format!("{}{}", url.path().trim_end_matches('/'), REGISTRATION_PATH);
        url.set_path(&path);
        let signature = presig(secret, email)?;

        // Our parameters replace any of the same name; the query is sorted by key
        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .into_owned()
            .filter(|(k, _)| ![DESTINATION_PARAM, EMAIL_PARAM, SIGNATURE_PARAM].contains(&k.as_str()))
            .collect();
        pairs.push((DESTINATION_PARAM.to_string(), self.product_url.clone()));
        pairs.push((EMAIL_PARAM.to_string(), email.to_string()));
        pairs.push((SIGNATURE_PARAM.to_string(), signature));
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        url.query_pairs_mut().clear().extend_pairs(pairs);

        Ok(url.to_string())
    }
}

/// Hex encoded HMAC-SHA-256 of `email`
fn presig(secret: &str, email: &str) -> Result<String, UrlError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| UrlError::InvalidRegistrationSecret)?;
    mac.update(email.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper(secret: Option<&str>) -> UrlHelper {
        UrlHelper::new(
            "http://my-great-app.net/",
            "http://localhost:8080/",
            secret.map(str::to_string),
        )
    }

    #[test]
    fn page_urls() {
        let urls = helper(None);
        assert_eq!(
            urls.login_url(),
            "http://localhost:8080/login?destination=http://my-great-app.net/"
        );
        assert_eq!(
            urls.logout_url(),
            "http://localhost:8080/logout?destination=http://my-great-app.net/"
        );
        assert_eq!(
            urls.management_url(),
            "http://localhost:8080/user-management?destination=http://my-great-app.net/"
        );
        assert_eq!(
            urls.registration_url(),
            "http://localhost:8080/register?destination=http://my-great-app.net/"
        );
        assert_eq!(
            urls.registration_post_url(),
            "http://localhost:8080/post-register?destination=http://my-great-app.net/"
        );
    }

    #[test]
    fn verified_registration_is_deterministic() {
        let urls = helper(Some("80211BZH0T2V1LBBZNXV"));
        let first = urls.verified_registration_url("user@x.com").unwrap();
        let second = urls.verified_registration_url("user@x.com").unwrap();
        assert_eq!(first, second);

        let parsed = Url::parse(&first).unwrap();
        assert_eq!(parsed.path(), "/register");
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("destination".into(), "http://my-great-app.net/".into()));
        assert_eq!(pairs[1], ("email".into(), "user@x.com".into()));
        assert_eq!(pairs[2].0, "presig");
        assert_eq!(pairs[2].1, presig("80211BZH0T2V1LBBZNXV", "user@x.com").unwrap());
        assert_eq!(pairs[2].1.len(), 64);
    }

    #[test]
    fn presig_matches_reference_vector() {
        // RFC 4231 test case 2
        assert_eq!(
            presig("Jefe", "what do ya want for nothing?").unwrap(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn presig_depends_on_email() {
        let urls = helper(Some("secret"));
        assert_ne!(
            urls.verified_registration_url("a@x.com").unwrap(),
            urls.verified_registration_url("b@x.com").unwrap()
        );
    }

    #[test]
    fn verified_registration_keeps_provider_query() {
        let urls = UrlHelper::new(
            "http://my-great-app.net/",
            "http://localhost:8080/fident/?tenant=acme&email=stale",
            Some("secret".to_string()),
        );
        let url = Url::parse(&urls.verified_registration_url("user@x.com").unwrap()).unwrap();
        assert_eq!(url.path(), "/fident/register");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["destination", "email", "presig", "tenant"]);
        assert_eq!(pairs[1].1, "user@x.com");
        assert_eq!(pairs[3].1, "acme");
    }

    #[test]
    fn missing_secret() {
        for urls in [helper(None), helper(Some(""))] {
            let err = urls.verified_registration_url("user@x.com").unwrap_err();
            assert!(matches!(err, UrlError::MissingRegistrationSecret));
            assert_eq!(err.to_string(), "HMAC secret has not been set");
        }
    }
}
