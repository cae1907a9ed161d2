//! Centralized limits and thresholds for the structural passes and the
//! name ledger.
//!
//! Ancestor traversal is guarded by visited sets, so these limits are a
//! backstop against malformed input rather than the primary cycle defence.

/// Maximum number of numeric suffixes the name ledger tries for one request.
///
/// Suffix search is unbounded in principle (`name2`, `name3`, ...). Hitting
/// this cap means a scope holds an absurd number of identical requests,
/// which is reported as a fatal internal-invariant error.
pub const MAX_SUFFIX_ATTEMPTS: u32 = 10_000;

/// Maximum depth of an ancestor chain walked by the surface closure.
///
/// Real hierarchies are a handful of levels deep; anything past this is
/// treated like a cycle and cut.
pub const MAX_ANCESTOR_DEPTH: u32 = 64;

/// Maximum number of types whose surface is memoized by one closure index
/// before the cache stops growing.
pub const MAX_SURFACE_CACHE_ENTRIES: usize = 1 << 20;
