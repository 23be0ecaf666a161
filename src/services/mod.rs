pub mod csv;
pub mod products;
pub mod reports;
pub mod shopify;
pub mod users;

pub use products::ProductService;
pub use reports::ReportService;
pub use users::UserService;
