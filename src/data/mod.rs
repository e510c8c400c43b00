pub mod clean;
pub mod ingest;
pub mod order;
pub mod profile;
pub mod record;
pub mod roles;
pub mod sample;
pub mod value;
