pub mod auth;
pub mod documents;
pub mod health;
pub mod reports;
pub mod scans;
