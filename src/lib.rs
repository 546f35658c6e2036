#![warn(missing_docs)]
//! Restyle - instruction-driven image editing.
//!
//! Sends a source image, an optional reference image and a natural-language
//! instruction to a Gemini image model, and returns the edited image as an
//! embeddable data URI.
//!
//! # Quick Start
//!
//! ```no_run
//! use restyle::{Config, EditAdapter, EditRequest, ImagePayload};
//!
//! #[tokio::main]
//! async fn main() -> restyle::Result<()> {
//!     let config = Config::from_env()?;
//!     let adapter = EditAdapter::new(&config)?;
//!
//!     let request = EditRequest::new(
//!         ImagePayload::from_path("player.jpg")?,
//!         "Dress the player in a neon pickleball outfit",
//!     )
//!     .with_reference(ImagePayload::from_path("outfit.png")?);
//!
//!     let result = adapter.edit(&request).await?;
//!     result.save("edited.png")?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli`: the `restyle` command-line interface

mod config;
mod error;
pub mod edit;

// Re-export error and configuration types at crate root
pub use config::{Config, ConfigBuilder, EditModel, DEFAULT_BASE_URL};
pub use error::{EditError, ErrorKind, Result};

// Re-export commonly used edit types
pub use edit::{
    ContentGenerator, EditAdapter, EditRequest, EditResult, HistoryItem, HttpGenerator,
    ImageFormat, ImagePayload,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::edit::{EditAdapter, EditRequest, EditResult, ImagePayload};
    pub use crate::error::{EditError, Result};
}
