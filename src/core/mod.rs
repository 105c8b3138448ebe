pub mod config;
pub mod logging;
pub mod template;
pub mod utils;
