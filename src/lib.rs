/// Single account ledger: balance, credentials and the transaction log.
/// State is modified using events, which are created by validating a request
pub mod account;

/// Rules for opening accounts and generating account numbers.
pub mod config;

/// Registry of accounts keyed by account number.
pub mod directory;

/// Scripted user actions that are later executed by [`processor`].
pub mod command;

/// Operation processor interface, plus the session that tracks which
/// account is logged in.
///
/// NOTE: the trait exists so a different front end can drive the same
/// session the way the CSV driver does.
pub mod processor;

/// Ideally, this module should exists on its own crate, as a way to
/// bootstrap core logic. However, I want to use it for integration test
/// so I put it here.
pub mod bin_utils;
