//! Tera rendering engine: [`RecordKind`] enum and [`Renderer`].
//!
//! # Output mapping
//!
//! | Record   | Template           | Output (inside the archive) |
//! |----------|--------------------|-----------------------------|
//! | Saved    | `saved.md.tera`    | `SAVED.md`                  |
//! | Context  | `context.md.tera`  | `CONTEXT.md`                |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use chatkeep_core::config::{LOAD_RECORD_FILE, SAVE_RECORD_FILE};

use crate::context::{LoadRecord, SaveRecord};
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("saved.md.tera", include_str!("templates/saved.md.tera")),
    ("context.md.tera", include_str!("templates/context.md.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

/// Overrides are flat: `<dir>/saved.md.tera` replaces the embedded default.
fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    let mut templates = Vec::new();
    for kind in RecordKind::all() {
        let path = dir.join(kind.template_name());
        if !path.is_file() {
            continue;
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((kind.template_name().to_string(), contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = TPLS
        .iter()
        .map(|(name, content)| ((*name).to_string(), (*content).to_string()))
        .collect();
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// RecordKind
// ---------------------------------------------------------------------------

/// The generated documents kept next to archived transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Saved,
    Context,
}

impl RecordKind {
    pub fn all() -> &'static [RecordKind] {
        &[RecordKind::Saved, RecordKind::Context]
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            RecordKind::Saved => "saved.md.tera",
            RecordKind::Context => "context.md.tera",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            RecordKind::Saved => SAVE_RECORD_FILE,
            RecordKind::Context => LOAD_RECORD_FILE,
        }
    }

    pub fn output_path(&self, archive: &Path) -> PathBuf {
        archive.join(self.file_name())
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Tera-based renderer for both record kinds. Create once and reuse.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_overrides(None)
    }

    /// Embedded templates, replaced by same-named `.tera` files found in
    /// `user_template_dir` when it exists.
    pub fn with_overrides(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let dir = user_template_dir.filter(|d| d.is_dir());
        Ok(Renderer {
            tera: build_tera(dir)?,
        })
    }

    pub fn render_saved(&self, record: &SaveRecord) -> Result<String, RenderError> {
        let ctx = record.to_tera_context()?;
        self.render(RecordKind::Saved, &ctx)
    }

    pub fn render_context(&self, record: &LoadRecord) -> Result<String, RenderError> {
        let ctx = record.to_tera_context()?;
        self.render(RecordKind::Context, &ctx)
    }

    fn render(&self, kind: RecordKind, ctx: &tera::Context) -> Result<String, RenderError> {
        let rendered = self.tera.render(kind.template_name(), ctx)?;
        Ok(rendered.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
