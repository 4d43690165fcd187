//! chatkeep core library: domain types, layout, transcript store, registry.
//!
//! - [`types`]: newtypes and outcome enums
//! - [`error`]: [`CoreError`]
//! - [`config`]: [`Layout`] resolution from home + optional config file
//! - [`project`]: canonical project-root resolution
//! - [`vcs`]: the [`Vcs`] seam and its git implementation
//! - [`store`]: list / copy / clear tracked transcripts
//! - [`registry`]: init / add / remove / list of project paths

pub mod config;
pub mod error;
pub mod project;
pub mod registry;
pub mod store;
pub mod types;
pub mod vcs;

pub use config::Layout;
pub use error::CoreError;
pub use types::{
    AddOutcome, CommitOutcome, InitOutcome, ProjectName, ProjectRoot, RegistryEntry,
    RemoveOutcome, RootState, TranscriptFile,
};
pub use vcs::{GitCli, NoVcs, Vcs};
