//! Business logic services
//!
//! Each service owns one slice of the database and exposes the operations
//! the handlers call. Handlers stay thin; validation and SQL both live
//! here.

pub mod bulk;
pub mod inventory;
pub mod ledger;
pub mod manual;
pub mod masters;
pub mod reports;
pub mod summary;

pub use bulk::BulkService;
pub use inventory::InventoryService;
pub use ledger::LedgerService;
pub use manual::ManualSaleService;
pub use masters::MasterService;
pub use reports::ReportService;
pub use summary::SummaryService;
