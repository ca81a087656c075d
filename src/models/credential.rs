// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! OAuth credential persisted in the token file.

use serde::{Deserialize, Serialize};

/// Access/refresh token pair with the access token's expiry.
///
/// This is both the on-disk format of the token file and the shape of
/// Strava's refresh response (extra response fields are ignored).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token for API calls
    pub access_token: String,
    /// Long-lived token used to obtain a new access token
    pub refresh_token: String,
    /// Access token expiry (Unix timestamp, seconds)
    pub expires_at: i64,
}
