pub mod connection;
pub mod documents;
pub mod reports;
pub mod schema;

pub use connection::Database;
pub use reports::StoredReport;
