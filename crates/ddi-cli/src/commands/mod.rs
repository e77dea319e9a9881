//! Command implementations.
//!
//! Stores are not object safe, so each command matches on the backend once
//! and runs a generic body against the concrete store.

pub mod import;
pub mod ping;
pub mod status;

pub use self::import::execute_import;
pub use self::ping::execute_ping;
pub use self::status::execute_status;
