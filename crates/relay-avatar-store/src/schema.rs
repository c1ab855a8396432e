// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk JSON shapes and migration from the legacy single-scope file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const CURRENT_SCHEMA_VERSION: &str = "2.0";

/// One scope's worth of `subject -> avatar hash` entries.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScopeSchema {
    pub entries: HashMap<String, String>,
    pub last_updated: String,
    pub scope_id: String,
}

/// The canonical, scope-partitioned on-disk shape.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CanonicalSchema {
    pub scopes: HashMap<String, ScopeSchema>,
    pub last_updated: String,
    #[serde(default)]
    pub version: String,
}

/// The pre-migration shape: a single implicit scope with no `scopes`
/// wrapper and no `version` field at all.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacySchema {
    pub entries: HashMap<String, String>,
    pub last_updated: String,
    pub scope_id: String,
}

impl From<LegacySchema> for CanonicalSchema {
    fn from(legacy: LegacySchema) -> Self {
        let mut scopes = HashMap::new();
        let scope_key = legacy.scope_id.clone();
        scopes.insert(
            scope_key,
            ScopeSchema {
                entries: legacy.entries,
                last_updated: legacy.last_updated.clone(),
                scope_id: legacy.scope_id,
            },
        );
        Self {
            scopes,
            last_updated: legacy.last_updated,
            version: CURRENT_SCHEMA_VERSION.to_string(),
        }
    }
}

/// Parse raw file bytes into the canonical shape, migrating the legacy
/// shape transparently and coercing a missing/empty `version` to
/// [`CURRENT_SCHEMA_VERSION`], since some canonical files predate the
/// `version` field itself.
///
/// Any failure to recognize either shape is treated as an unreadable
/// file, not a hard error — callers fall back to an empty store.
pub fn parse(bytes: &[u8]) -> Option<CanonicalSchema> {
    if let Ok(mut canonical) = serde_json::from_slice::<CanonicalSchema>(bytes) {
        if canonical.version.is_empty() {
            canonical.version = CURRENT_SCHEMA_VERSION.to_string();
        }
        return Some(canonical);
    }
    if let Ok(legacy) = serde_json::from_slice::<LegacySchema>(bytes) {
        return Some(legacy.into());
    }
    None
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
