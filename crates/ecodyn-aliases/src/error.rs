//! Error types for the aliasing map.

use thiserror::Error;

/// Errors raised while building or querying an [`crate::AliasingMap`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AliasError {
    /// A reference was not registered against any standard key.
    #[error("unknown alias '{reference}'; known aliases: {known}")]
    UnknownAlias {
        /// The reference string the caller asked to standardize.
        reference: String,
        /// A readable, elided-if-large rendering of the known aliases.
        known: String,
    },

    /// The same alias string was attached to two different standard keys.
    #[error("alias '{alias}' is ambiguous between '{key_a}' and '{key_b}'")]
    AmbiguousAlias {
        /// The alias string shared by both keys.
        alias: String,
        /// The first standard key that claims this alias.
        key_a: String,
        /// The second standard key that claims this alias.
        key_b: String,
    },

    /// The same alias string was listed twice for the same standard key.
    #[error("alias '{alias}' is listed more than once for '{key}'")]
    DuplicateAlias {
        /// The repeated alias string.
        alias: String,
        /// The standard key it was repeated under.
        key: String,
    },
}

/// Result type alias for aliasing-map operations.
pub type Result<T> = std::result::Result<T, AliasError>;

impl AliasError {
    #[must_use]
    pub(crate) fn unknown<S: Into<String>>(reference: S, known: &[String]) -> Self {
        Self::UnknownAlias {
            reference: reference.into(),
            known: render_known(known),
        }
    }
}

/// Renders a set of known aliases, eliding the tail when it is large enough
/// that printing it in full would not help a reader.
fn render_known(known: &[String]) -> String {
    const MAX_SHOWN: usize = 12;
    if known.len() <= MAX_SHOWN {
        known.join(", ")
    } else {
        format!(
            "{}, … ({} more)",
            known[..MAX_SHOWN].join(", "),
            known.len() - MAX_SHOWN
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_alias_elides_large_sets() {
        let known: Vec<String> = (0..20).map(|i| format!("k{i}")).collect();
        let err = AliasError::unknown("bogus", &known);
        let msg = err.to_string();
        assert!(msg.contains("more)"));
    }

    #[test]
    fn ambiguous_alias_message_names_both_keys() {
        let err = AliasError::AmbiguousAlias {
            alias: "A".into(),
            key_a: "topology".into(),
            key_b: "adjacency".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("topology") && msg.contains("adjacency"));
    }
}
