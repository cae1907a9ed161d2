//! Final-name resolution for tsb.
//!
//! - [`NameLedger`]: scoped, first-come collision resolution keyed by
//!   identity; the single source of truth for every final name
//! - [`policy`]: requested names (type identifiers, member naming transform,
//!   view accessors)
//! - [`reserved`]: TypeScript reserved-word marking
//! - [`reservation`]: the single-threaded pass that fills the ledger

pub mod ledger;
pub mod policy;
pub mod reservation;
pub mod reserved;

pub use ledger::{LedgerOptions, NameError, NameLedger, Reservation};
pub use policy::{MemberNaming, camel_case, type_name};
pub use reservation::{
    NamingOptions, member_scope, requested_member_name, reserve_graph, reserve_import_set,
};

#[cfg(test)]
#[path = "tests/fixtures.rs"]
pub(crate) mod test_fixtures;
