//! Record models mirroring the Postgres tables

pub mod bulk;
pub mod inventory;
pub mod manual;
pub mod master;
pub mod summary;

pub use bulk::*;
pub use inventory::*;
pub use manual::*;
pub use master::*;
pub use summary::*;
