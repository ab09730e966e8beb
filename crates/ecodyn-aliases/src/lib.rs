//! # ecodyn-aliases
//!
//! An ordered mapping from a standard key to a set of reference aliases,
//! with construction-time guards against duplicate and ambiguous aliases.
//!
//! This is the naming layer behind interaction kinds (`trophic`,
//! `competition`, …) and blueprint parameter names (`topology`/`A`,
//! `intensity`/`I`, …): callers may spell either the canonical name or any
//! registered alias, and [`AliasingMap::standardize`] resolves it to the
//! canonical key.

mod error;
mod builtins;

pub use builtins::{interaction_aliases, parameter_aliases, InteractionKind, ParameterKind};
pub use error::{AliasError, Result};

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// An ordered mapping from a standard key of type `K` to the set of strings
/// that may be used to refer to it.
///
/// Construction is fallible: [`AliasingMap::build`] rejects an alias shared
/// by two keys ([`AliasError::AmbiguousAlias`]) and an alias repeated twice
/// under the same key ([`AliasError::DuplicateAlias`]).
#[derive(Debug, Clone)]
pub struct AliasingMap<K> {
    /// Canonical keys in registration order.
    keys: Vec<K>,
    /// Every alias (including the key's own display form) sorted by length
    /// then lexicographically, per key index into `keys`.
    aliases_by_key: Vec<Vec<String>>,
    /// Reverse index: alias string -> index into `keys`.
    index: HashMap<String, usize>,
}

impl<K> AliasingMap<K>
where
    K: Clone + Eq + Hash + Debug,
{
    /// Builds an aliasing map from `(key, aliases)` pairs.
    ///
    /// The key's own [`Debug`] rendering is registered as an implicit alias
    /// in addition to the ones supplied, so a canonical name always
    /// standardizes to itself.
    pub fn build(entries: Vec<(K, Vec<&str>)>) -> Result<Self> {
        let mut keys = Vec::with_capacity(entries.len());
        let mut aliases_by_key: Vec<Vec<String>> = Vec::with_capacity(entries.len());
        let mut index: HashMap<String, usize> = HashMap::new();

        for (key, aliases) in entries {
            let key_idx = keys.len();
            let implicit = format!("{key:?}").to_lowercase();
            let mut owned: Vec<String> = aliases.iter().map(|a| a.to_string()).collect();
            if !owned.iter().any(|a| a == &implicit) {
                owned.push(implicit);
            }

            let mut seen_for_key: HashMap<String, ()> = HashMap::new();
            for alias in &owned {
                if seen_for_key.insert(alias.clone(), ()).is_some() {
                    return Err(AliasError::DuplicateAlias {
                        alias: alias.clone(),
                        key: format!("{key:?}"),
                    });
                }
                if let Some(&other_idx) = index.get(alias) {
                    if other_idx != key_idx {
                        return Err(AliasError::AmbiguousAlias {
                            alias: alias.clone(),
                            key_a: format!("{:?}", keys[other_idx]),
                            key_b: format!("{key:?}"),
                        });
                    }
                }
                index.insert(alias.clone(), key_idx);
            }

            owned.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
            keys.push(key);
            aliases_by_key.push(owned);
        }

        Ok(Self { keys, aliases_by_key, index })
    }

    /// Resolves any alias to its canonical key.
    pub fn standardize(&self, reference: &str) -> Result<K> {
        self.index
            .get(reference)
            .map(|&idx| self.keys[idx].clone())
            .ok_or_else(|| AliasError::unknown(reference, &self.all_aliases()))
    }

    /// All aliases registered for `key`, sorted by length then
    /// lexicographically. Empty if `key` is not present in this map.
    #[must_use]
    pub fn references(&self, key: &K) -> &[String] {
        match self.keys.iter().position(|k| k == key) {
            Some(idx) => &self.aliases_by_key[idx],
            None => &[],
        }
    }

    /// The canonical keys, in registration order.
    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    fn all_aliases(&self) -> Vec<String> {
        let mut all: Vec<String> = self.index.keys().cloned().collect();
        all.sort();
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Animal {
        Cat,
        Dog,
    }

    #[test]
    fn standardizes_known_alias() {
        let map = AliasingMap::build(vec![
            (Animal::Cat, vec!["kitty", "feline"]),
            (Animal::Dog, vec!["puppy", "canine"]),
        ])
        .unwrap();
        assert_eq!(map.standardize("kitty").unwrap(), Animal::Cat);
        assert_eq!(map.standardize("canine").unwrap(), Animal::Dog);
        // canonical Debug form resolves too
        assert_eq!(map.standardize("cat").unwrap(), Animal::Cat);
    }

    #[test]
    fn unknown_alias_errors() {
        let map = AliasingMap::build(vec![(Animal::Cat, vec!["kitty"])]).unwrap();
        assert!(matches!(
            map.standardize("wolf"),
            Err(AliasError::UnknownAlias { .. })
        ));
    }

    #[test]
    fn ambiguous_alias_rejected() {
        let err = AliasingMap::build(vec![
            (Animal::Cat, vec!["pet"]),
            (Animal::Dog, vec!["pet"]),
        ])
        .unwrap_err();
        assert!(matches!(err, AliasError::AmbiguousAlias { .. }));
    }

    #[test]
    fn duplicate_alias_within_key_rejected() {
        let err = AliasingMap::build(vec![(Animal::Cat, vec!["kitty", "kitty"])]).unwrap_err();
        assert!(matches!(err, AliasError::DuplicateAlias { .. }));
    }

    #[test]
    fn references_sorted_by_length_then_lex() {
        let map = AliasingMap::build(vec![(Animal::Cat, vec!["feline", "kitty", "cc"])]).unwrap();
        let refs = map.references(&Animal::Cat);
        // "cc" (2) < "cat" (3, implicit) < "kitty" (5) < "feline" (6)
        let lens: Vec<usize> = refs.iter().map(String::len).collect();
        assert!(lens.windows(2).all(|w| w[0] <= w[1]));
    }
}
