pub mod analysis;
pub mod args;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod util;
