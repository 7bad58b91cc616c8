//! Error-type-to-`ErrorInfo` registry
//!
//! The registry is populated during application assembly and treated as an
//! immutable snapshot while requests are served, so lookups take `&self`
//! and need no synchronization.
//!
//! Rust has no type inheritance, so the "ancestor chain" of an error is
//! its [`std::error::Error::source`] chain: `lookup` matches the outermost
//! error first and then walks towards the root cause. Within one chain
//! link, entries are scanned most-recently-registered first, and
//! re-registering a type replaces its previous entry. The net rule is
//! deterministic: most-recently-registered wins.

use std::any::TypeId;
use std::error::Error as StdError;

use crate::info::ErrorInfo;

type Matcher = fn(&(dyn StdError + 'static)) -> bool;

fn matches_type<E: StdError + 'static>(err: &(dyn StdError + 'static)) -> bool {
    err.is::<E>()
}

struct Entry {
    type_id: TypeId,
    type_name: &'static str,
    matcher: Matcher,
    info: ErrorInfo,
}

/// Mapping from error-type identity to response metadata.
#[must_use]
pub struct ErrorRegistry {
    // Newest registrations first; lookup scans in order.
    entries: Vec<Entry>,
    fallback: ErrorInfo,
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorRegistry {
    /// An empty registry with the generic 500 fallback.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            fallback: ErrorInfo::internal(),
        }
    }

    /// Register `info` for the error type `E`, overwriting any previous
    /// registration for the same type.
    pub fn register<E: StdError + 'static>(&mut self, info: ErrorInfo) {
        let type_id = TypeId::of::<E>();
        self.entries.retain(|e| e.type_id != type_id);
        self.entries.insert(
            0,
            Entry {
                type_id,
                type_name: std::any::type_name::<E>(),
                matcher: matches_type::<E>,
                info,
            },
        );
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<E: StdError + 'static>(mut self, info: ErrorInfo) -> Self {
        self.register::<E>(info);
        self
    }

    /// Resolve the [`ErrorInfo`] for `err`.
    ///
    /// Walks the source chain outermost-first and returns the first
    /// registered match, or the generic fallback if nothing matches.
    pub fn lookup(&self, err: &(dyn StdError + 'static)) -> &ErrorInfo {
        let mut current: Option<&(dyn StdError + 'static)> = Some(err);
        while let Some(e) = current {
            for entry in &self.entries {
                if (entry.matcher)(e) {
                    return &entry.info;
                }
            }
            current = e.source();
        }
        &self.fallback
    }

    /// The fallback entry used when no registration matches.
    #[must_use]
    pub fn fallback(&self) -> &ErrorInfo {
        &self.fallback
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ErrorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for entry in &self.entries {
            map.entry(&entry.type_name, &entry.info);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::Severity;
    use http::StatusCode;

    #[derive(Debug, thiserror::Error)]
    #[error("token rejected: {0}")]
    struct TokenError(String);

    #[derive(Debug, thiserror::Error)]
    #[error("upstream call failed")]
    struct UpstreamError {
        #[source]
        source: TokenError,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("nobody registered me")]
    struct StrayError;

    fn registry() -> ErrorRegistry {
        ErrorRegistry::new().with::<TokenError>(ErrorInfo::new(
            StatusCode::UNAUTHORIZED,
            "invalid access token",
            Severity::Warning,
        ))
    }

    #[test]
    fn registered_type_resolves_exactly() {
        let reg = registry();
        let err = TokenError("expired".into());
        let info = reg.lookup(&err);
        assert_eq!(info.status, StatusCode::UNAUTHORIZED);
        assert_eq!(info.message, "invalid access token");
        assert_eq!(info.level, Severity::Warning);
    }

    #[test]
    fn unregistered_type_falls_back_to_internal() {
        let reg = registry();
        let info = reg.lookup(&StrayError);
        assert_eq!(info.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(info.level, Severity::Error);
    }

    #[test]
    fn lookup_walks_the_source_chain() {
        let reg = registry();
        let err = UpstreamError {
            source: TokenError("expired".into()),
        };
        // UpstreamError itself is unregistered; its source is.
        let info = reg.lookup(&err);
        assert_eq!(info.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn outermost_match_wins_over_source_match() {
        let reg = registry().with::<UpstreamError>(ErrorInfo::new(
            StatusCode::BAD_GATEWAY,
            "upstream unavailable",
            Severity::Error,
        ));
        let err = UpstreamError {
            source: TokenError("expired".into()),
        };
        assert_eq!(reg.lookup(&err).status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn reregistration_overwrites() {
        let mut reg = registry();
        assert_eq!(reg.len(), 1);
        reg.register::<TokenError>(ErrorInfo::new(
            StatusCode::FORBIDDEN,
            "token expired",
            Severity::Info,
        ));
        assert_eq!(reg.len(), 1);
        let info = reg.lookup(&TokenError("x".into()));
        assert_eq!(info.status, StatusCode::FORBIDDEN);
        assert_eq!(info.message, "token expired");
    }

    #[test]
    fn empty_registry_always_falls_back() {
        let reg = ErrorRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(
            reg.lookup(&StrayError).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn debug_lists_registered_type_names() {
        let reg = registry();
        let rendered = format!("{reg:?}");
        assert!(rendered.contains("TokenError"));
    }
}
