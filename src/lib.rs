pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod json_repair;
pub mod logging;
pub mod models;
pub mod prompts;
pub mod server;
pub mod service;
pub mod session;
pub mod text;

pub use cache::{CacheKey, CacheStats, LookupCache, LookupStatus, WordLookup};
pub use client::ReaderClient;
pub use config::Config;
pub use error::LookupError;
pub use models::*;
pub use service::TutorService;
pub use session::{Anchor, ReaderSession, WordClick, WordPopover};
