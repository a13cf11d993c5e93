pub mod schema;
pub mod snapshot;
