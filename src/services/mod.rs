// Catalog and stock
pub mod catalog;
pub mod ledger;

// Transaction processors
pub mod purchases;
pub mod sales;

// Supporting registries
pub mod suppliers;
pub mod users;
