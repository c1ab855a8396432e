// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use relay_core::scope::ScopeKeyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AvatarStoreError {
    #[error("malformed composite key: {0}")]
    MalformedKey(#[from] ScopeKeyError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
