// Catalog and attribution
pub mod item;
pub mod supplier;
pub mod user;

// Stock ledger
pub mod ledger_entry;

// Transaction records
pub mod purchase;
pub mod sale;
pub mod sale_line;
