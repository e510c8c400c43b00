pub mod correlation;
pub mod pipeline;
pub mod summary;
