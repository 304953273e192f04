pub mod app;
pub mod config;
pub mod extract;
pub mod logging;
pub mod output;
pub mod source;
pub mod version;
