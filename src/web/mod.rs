// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket integration
//!
//! - [`FidentUser`]: request guard verifying the token cookie
//! - [`notification`]: the notification endpoint
//! - [`authset`]: the `/as` auth-setter reverse proxy
//! - [`build_rocket`] / [`FidentState`]: managing and mounting all of the above

pub mod authset;
pub mod guard;
pub mod notification;
pub mod server;

pub use authset::{AuthsetProxy, AUTHSET_PATH};
pub use guard::FidentUser;
pub use notification::{NotificationBodyLimit, NotificationResponse, DEFAULT_MAX_BODY};
pub use server::{build_rocket, FidentState};
