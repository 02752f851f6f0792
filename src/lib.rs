pub mod config;
pub mod entry;
pub mod errors;
pub mod file_times;
pub mod filestat;
pub mod logger;
pub mod published;
pub mod reconciler;
pub mod traversal;
mod test_data;
