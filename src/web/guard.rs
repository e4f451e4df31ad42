// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket request guard for signed-in users

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use std::ops::Deref;

use crate::error::VerificationError;
use crate::token::{Identity, TokenVerifier};

/// Request guard verifying the provider token cookie
///
/// Requires a [`TokenVerifier`] in managed state. Fails with `401` when the
/// cookie is missing or does not verify, and with `500` when the verifier is
/// not managed or not fully configured.
///
/// ```rust,no_run
/// use rocket::get;
/// use fident_web::web::FidentUser;
///
/// #[get("/me")]
/// fn me(user: FidentUser) -> String {
///     format!("Hello {}", user.email_address())
/// }
/// ```
#[derive(Debug)]
pub struct FidentUser(pub Identity);

impl Deref for FidentUser {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for FidentUser {
    type Error = VerificationError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let verifier = match request.guard::<&State<TokenVerifier>>().await {
            Outcome::Success(verifier) => verifier,
            _ => {
                return Outcome::Error((
                    Status::InternalServerError,
                    VerificationError::Configuration("token verifier is not managed".to_string()),
                ))
            }
        };

        match verifier.verify_request(request.cookies()) {
            Ok(identity) => Outcome::Success(FidentUser(identity)),
            Err(e) => Outcome::Error((e.status(), e)),
        }
    }
}
