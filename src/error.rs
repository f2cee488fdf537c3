// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::permissions::Capability;

/// Failures a caller may want to tell apart. Everything else travels as
/// `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum UdhError {
    #[error("Not signed in: pass --as <username> or set UDH_USER")]
    NotSignedIn,

    #[error("User '{0}' not found")]
    UnknownUser(String),

    #[error("Permission denied: '{user}' lacks the '{capability}' permission")]
    PermissionDenied { user: String, capability: Capability },

    #[error("Access restricted: '{user}' is not in the Technical Team")]
    Restricted { user: String },

    #[error("{what} #{id} not found")]
    NotFound { what: &'static str, id: i64 },

    #[error("{0}")]
    Validation(String),
}
