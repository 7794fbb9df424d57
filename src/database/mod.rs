pub mod config_cache;
pub mod manager;
pub mod models;
pub mod schema;
pub mod token;

pub use config_cache::{keys, ConfigCache};
pub use manager::{Database, DatabaseError};
pub use token::Token;
