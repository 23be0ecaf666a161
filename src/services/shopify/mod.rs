pub mod connection;
pub mod export;
pub mod sync;

pub use connection::{ConnectionStatus, ShopifyConnectionService};
pub use export::{CatalogExporter, BULK_IMPORT_COLUMNS};
pub use sync::{ShopifySyncService, SyncClient, SyncSummary};
