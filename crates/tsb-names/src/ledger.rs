//! The name ledger: the single source of truth for final names.
//!
//! Every type, member and view accessor gets its final name by reserving it
//! here, keyed by its [`StableId`] and the [`NameScope`] it lives in. Within
//! one scope final names are pairwise distinct, except that the members of
//! one overload family share a name.
//!
//! Collision policy: the first identity to request a name keeps it; later
//! requests get `name2`, `name3`, ... . Reserved words are marked before
//! collision resolution. Reservation is idempotent per identity and scope,
//! and lookups take `&self`, so a finished ledger can be read from any
//! number of threads.

use crate::reserved::sanitize;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tsb_common::limits::MAX_SUFFIX_ATTEMPTS;
use tsb_common::{Diagnostic, diagnostic_codes};
use tsb_model::{NameScope, StableId};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("no final name reserved for '{id}' in {scope}")]
    NotReserved { id: StableId, scope: NameScope },

    #[error("no free name for '{requested}' in {scope} after {attempts} attempts")]
    SuffixExhausted {
        id: StableId,
        requested: String,
        scope: NameScope,
        attempts: u32,
    },
}

impl NameError {
    /// ERROR diagnostic for this failure.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            NameError::NotReserved { id, scope } => Diagnostic::from_code(
                diagnostic_codes::MISSING_FINAL_NAME,
                id,
                &[&id.to_string(), &scope.to_string()],
            ),
            NameError::SuffixExhausted {
                id,
                requested,
                scope,
                attempts,
            } => Diagnostic::from_code(
                diagnostic_codes::NAME_SUFFIX_EXHAUSTED,
                id,
                &[requested, &scope.to_string(), &attempts.to_string()],
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LedgerOptions {
    /// Appended to requested names that are reserved words.
    pub reserved_word_marker: String,
    /// Candidates tried per request, the unsuffixed name included.
    pub max_suffix_attempts: u32,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            reserved_word_marker: "_".to_string(),
            max_suffix_attempts: MAX_SUFFIX_ATTEMPTS,
        }
    }
}

/// One identity's entry in a scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub requested: String,
    pub final_name: String,
}

#[derive(Clone, Debug, Default)]
struct ScopeTable {
    taken: FxHashSet<String>,
    /// Reservation order is kept for reporting.
    entries: IndexMap<StableId, Reservation>,
    /// Overload family key → shared final name.
    families: FxHashMap<String, String>,
}

impl ScopeTable {
    fn claim(
        &mut self,
        id: &StableId,
        base: &str,
        scope: &NameScope,
        max_attempts: u32,
    ) -> Result<String, NameError> {
        for attempt in 0..max_attempts {
            let candidate = match attempt {
                0 => base.to_string(),
                n => format!("{base}{}", n + 1),
            };
            if self.taken.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
        Err(NameError::SuffixExhausted {
            id: id.clone(),
            requested: base.to_string(),
            scope: scope.clone(),
            attempts: max_attempts,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct NameLedger {
    options: LedgerOptions,
    scopes: IndexMap<NameScope, ScopeTable>,
}

impl NameLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LedgerOptions) -> Self {
        Self {
            options,
            scopes: IndexMap::new(),
        }
    }

    pub fn options(&self) -> &LedgerOptions {
        &self.options
    }

    /// Reserve a final name for `id` in `scope`.
    ///
    /// `is_static` selects the static twin of a type scope. Reserving the
    /// same identity again in the same scope returns the name it already
    /// holds, whatever is requested the second time.
    pub fn reserve(
        &mut self,
        id: impl Into<StableId>,
        requested: &str,
        scope: &NameScope,
        is_static: bool,
    ) -> Result<String, NameError> {
        self.reserve_in_family(id.into(), None, requested, scope, is_static)
    }

    /// Reserve a name shared by every member of the overload family `family`.
    ///
    /// The first member of a family resolves collisions like [`Self::reserve`];
    /// later members get the family's name without further checks.
    pub fn reserve_overload(
        &mut self,
        id: impl Into<StableId>,
        family: &str,
        requested: &str,
        scope: &NameScope,
        is_static: bool,
    ) -> Result<String, NameError> {
        self.reserve_in_family(id.into(), Some(family), requested, scope, is_static)
    }

    fn reserve_in_family(
        &mut self,
        id: StableId,
        family: Option<&str>,
        requested: &str,
        scope: &NameScope,
        is_static: bool,
    ) -> Result<String, NameError> {
        let scope = scope.effective(is_static);
        let marker = self.options.reserved_word_marker.as_str();
        let max_attempts = self.options.max_suffix_attempts;
        let table = self.scopes.entry(scope.clone()).or_default();

        if let Some(existing) = table.entries.get(&id) {
            return Ok(existing.final_name.clone());
        }

        let shared = family.and_then(|key| table.families.get(key).cloned());
        let final_name = match shared {
            Some(name) => name,
            None => {
                let base = sanitize(requested, &scope, marker);
                let name = table.claim(&id, &base, &scope, max_attempts)?;
                if let Some(key) = family {
                    table.families.insert(key.to_string(), name.clone());
                }
                name
            }
        };

        tracing::trace!(%id, %scope, %requested, %final_name, "name reserved");
        table.entries.insert(
            id,
            Reservation {
                requested: requested.to_string(),
                final_name: final_name.clone(),
            },
        );
        Ok(final_name)
    }

    /// The final name `id` holds in `scope`.
    pub fn final_name(
        &self,
        id: &StableId,
        scope: &NameScope,
        is_static: bool,
    ) -> Result<&str, NameError> {
        let scope = scope.effective(is_static);
        self.scopes
            .get(&scope)
            .and_then(|table| table.entries.get(id))
            .map(|entry| entry.final_name.as_str())
            .ok_or_else(|| NameError::NotReserved {
                id: id.clone(),
                scope,
            })
    }

    pub fn is_reserved(&self, id: &StableId, scope: &NameScope, is_static: bool) -> bool {
        self.final_name(id, scope, is_static).is_ok()
    }

    /// Scopes in the order they were first used.
    pub fn scopes(&self) -> impl Iterator<Item = &NameScope> {
        self.scopes.keys()
    }

    /// Reservations of one scope, in reservation order.
    pub fn entries(&self, scope: &NameScope) -> impl Iterator<Item = (&StableId, &Reservation)> {
        self.scopes
            .get(scope)
            .into_iter()
            .flat_map(|table| table.entries.iter())
    }

    /// Total number of reservations across all scopes.
    pub fn len(&self) -> usize {
        self.scopes.values().map(|table| table.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(|table| table.entries.is_empty())
    }
}

#[cfg(test)]
#[path = "tests/ledger_tests.rs"]
mod ledger_tests;
