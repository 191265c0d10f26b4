/// Station name canonicalization
///
/// Raw station labels arrive with stray whitespace and a handful of alternate
/// spellings. Canonicalization trims, collapses internal whitespace runs to a
/// single space, then folds the result through the alias map. Labels with no
/// alias are returned as normalized (identity fallback).
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::CatalogError;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Trim and collapse internal whitespace runs to one space
///
/// # Examples
///
/// ```
/// use rain_bulletin_service::catalog::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  Pos   Hujan\tCiawi "), "Pos Hujan Ciawi");
/// assert_eq!(normalize_whitespace(""), "");
/// ```
pub fn normalize_whitespace(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value.trim(), " ").into_owned()
}

/// Mapping from alternate spellings to canonical labels, free of chains
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    entries: HashMap<String, String>,
}

impl AliasMap {
    /// Build an alias map, normalizing keys and targets
    ///
    /// Fails when a target is itself a key (chains break idempotence) or
    /// when two spellings normalize to the same key with different targets.
    pub fn new<I, K, V>(pairs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries: HashMap<String, String> = HashMap::new();

        for (alias, target) in pairs {
            let alias = normalize_whitespace(alias.as_ref());
            let target = normalize_whitespace(target.as_ref());

            if let Some(existing) = entries.get(&alias) {
                if *existing != target {
                    return Err(CatalogError::ConflictingAlias {
                        alias,
                        first: existing.clone(),
                        second: target,
                    });
                }
                continue;
            }
            entries.insert(alias, target);
        }

        // Sorted so the reported chain is deterministic
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort();
        for alias in keys {
            let target = &entries[alias];
            if entries.contains_key(target) {
                return Err(CatalogError::AliasChain {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }

        Ok(Self { entries })
    }

    /// Canonical label for a raw station name
    pub fn canonicalize(&self, raw_name: &str) -> String {
        let normalized = normalize_whitespace(raw_name);
        match self.entries.get(&normalized) {
            Some(target) => target.clone(),
            None => normalized,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Alias pairs sorted by alias
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(alias, target)| (alias.as_str(), target.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}
