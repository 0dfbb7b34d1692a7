//! Finds background images that only show up on interaction (`:hover`,
//! `:active`, `:focus`, `:checked`, or user-picked selectors) and preloads them.

pub mod config;
pub mod error;
pub mod loader;
pub mod parser;
pub mod preloader;
pub mod sheet;
pub mod style;

pub use config::{Entries, PreloadConfig, PropertyLookup};
pub use error::{PreloadError, Result};
pub use loader::{FileFetcher, ImageFetcher, ImageHandle, LoadState};
pub use preloader::{Preloader, PreloaderState};
pub use sheet::sheet_tree::{RuleNode, StyleDocument};
