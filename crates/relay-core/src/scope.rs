// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite `scope:subject` key helpers shared by the avatar store (C2)
//! and the automod idempotency-key template (C4).
//!
//! Unlike a loosely-delimited namespace path, this is a strict two-part
//! composite key: malformed input is rejected outright with a
//! well-typed error rather than silently truncated or re-joined.

use thiserror::Error;

/// Errors building or parsing a `scope:subject` composite key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeKeyError {
    #[error("scope must not be empty")]
    EmptyScope,
    #[error("subject must not be empty")]
    EmptySubject,
    #[error("malformed composite key: {0:?}")]
    Malformed(String),
}

/// Build the composite key `"<scope>:<subject>"`.
///
/// Neither `scope` nor `subject` may be empty or contain `:` themselves
/// (a `:` inside either half would make the key ambiguous to split back
/// apart), which is checked here rather than left to `split_scoped_key`.
pub fn scoped_key(scope: &str, subject: &str) -> Result<String, ScopeKeyError> {
    if scope.is_empty() {
        return Err(ScopeKeyError::EmptyScope);
    }
    if subject.is_empty() {
        return Err(ScopeKeyError::EmptySubject);
    }
    if scope.contains(':') || subject.contains(':') {
        return Err(ScopeKeyError::Malformed(format!("{scope}:{subject}")));
    }
    Ok(format!("{scope}:{subject}"))
}

/// Split a composite key back into `(scope, subject)`.
///
/// Rejects keys with zero or more than one `:` separator, and keys with
/// an empty half, since those could not have been produced by
/// [`scoped_key`].
pub fn split_scoped_key(key: &str) -> Result<(&str, &str), ScopeKeyError> {
    let mut parts = key.splitn(3, ':');
    let scope = parts.next().unwrap_or("");
    let subject = parts.next().unwrap_or("");
    if parts.next().is_some() {
        return Err(ScopeKeyError::Malformed(key.to_string()));
    }
    if scope.is_empty() {
        return Err(ScopeKeyError::EmptyScope);
    }
    if subject.is_empty() {
        return Err(ScopeKeyError::EmptySubject);
    }
    Ok((scope, subject))
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
