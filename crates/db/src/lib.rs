pub mod connection;
pub mod fixtures;
pub mod ledger;
pub mod migrations;
pub mod repositories;

pub use connection::{connect_with_settings, DbPool};
pub use fixtures::{CanteenSeedDataset, SeedResult, VerificationResult};
pub use ledger::{RepositoryCatalog, RepositoryLedger};
