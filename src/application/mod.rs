//! Application services orchestrating the domain through its ports.
//!
//! `Portal::assemble` wires the course catalog, academic records and payment
//! ledger against whichever adapters the caller constructs.

pub mod access;
pub mod catalog;
pub mod ledger;
pub mod notify;
pub mod portal;
pub mod records;

#[cfg(test)]
pub(crate) mod test_support;
