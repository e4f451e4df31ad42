// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Notification endpoint
//!
//! Mounted at the configured notification path. Only `POST` is routed, so
//! any other method gets Rocket's `404`. The response is always `200`: with
//! the `con` body when the handler acknowledged the notification, empty
//! otherwise.

use log::{debug, warn};
use rocket::data::{Data, ToByteUnit};
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder, Response};
use rocket::{post, routes, Request, Route, State};
use std::io::Cursor;

use crate::notification::{NotificationOutcome, NotificationVerifier};

/// Default cap on notification bodies, in bytes
pub const DEFAULT_MAX_BODY: u64 = 1024 * 1024;

/// Largest notification body read by the endpoint, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationBodyLimit(pub u64);

impl Default for NotificationBodyLimit {
    fn default() -> Self {
        Self(DEFAULT_MAX_BODY)
    }
}

/// Response of the notification endpoint
#[derive(Debug)]
pub struct NotificationResponse(pub NotificationOutcome);

impl<'r> Responder<'r, 'static> for NotificationResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut builder = Response::build();
        builder.status(Status::Ok);
        if let Some(body) = self.0.response_body() {
            builder
                .header(ContentType::Plain)
                .sized_body(body.len(), Cursor::new(body));
        }
        builder.ok()
    }
}

/// Receive a provider notification
///
/// The body is read up to the managed [`NotificationBodyLimit`]. A body over
/// the limit is dropped like any other malformed notification.
#[post("/", data = "<body>")]
pub async fn notification_endpoint(
    body: Data<'_>,
    verifier: &State<NotificationVerifier>,
    limit: &State<NotificationBodyLimit>,
) -> NotificationResponse {
    let body = match body.open(limit.0.bytes()).into_bytes().await {
        Ok(capped) if capped.is_complete() => capped.into_inner(),
        Ok(capped) => {
            warn!(
                "Dropping notification larger than {} bytes ({} bytes read)",
                limit.0,
                capped.len()
            );
            return NotificationResponse(NotificationOutcome::Malformed);
        }
        Err(e) => {
            warn!("Failed to read notification body: {}", e);
            return NotificationResponse(NotificationOutcome::Malformed);
        }
    };

    let outcome = verifier.process(&body);
    debug!("Notification processed: {:?}", outcome);
    NotificationResponse(outcome)
}

/// Routes to mount at the notification path
pub fn notification_routes() -> Vec<Route> {
    routes![notification_endpoint]
}
