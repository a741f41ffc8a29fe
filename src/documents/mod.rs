pub mod store;
pub mod validation;

pub use store::DocumentStore;
pub use validation::validate_upload;
