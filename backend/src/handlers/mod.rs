//! HTTP handlers
//!
//! Handlers construct the relevant service and translate its result into a
//! response; business logic stays in the services.

pub mod bulk;
pub mod inventory;
pub mod ledger;
pub mod manual;
pub mod masters;
pub mod reports;
pub mod summary;

pub use bulk::*;
pub use inventory::*;
pub use ledger::*;
pub use manual::*;
pub use masters::*;
pub use reports::*;
pub use summary::*;
