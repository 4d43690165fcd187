//! # chatkeep-renderer
//!
//! Tera-based rendering of the documents chatkeep keeps next to archived
//! transcripts, and best-effort parsing of those documents.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chatkeep_core::types::ProjectRoot;
//! use chatkeep_renderer::{Renderer, SaveRecord};
//!
//! fn render(root: &ProjectRoot) {
//!     if let Ok(renderer) = Renderer::new() {
//!         let record = SaveRecord::new(root, chrono::Utc::now(), 3);
//!         if let Ok(text) = renderer.render_saved(&record) {
//!             println!("{text}");
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod fields;

pub use context::{LoadRecord, SaveRecord};
pub use engine::{RecordKind, Renderer};
pub use error::RenderError;
