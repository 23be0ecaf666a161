pub mod product;
pub mod shopify_connection;
pub mod user;

pub use product::Entity as Product;
pub use shopify_connection::Entity as ShopifyConnection;
pub use user::Entity as User;
