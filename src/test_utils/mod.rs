//! Test utilities for AgentRx
//!
//! Helpers for setting up prompt and template directories on disk and for
//! turning on tracing output inside tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use agentrx::test_utils::PromptFixture;
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let fixture = PromptFixture::new(temp.path()).unwrap();
//! fixture.template("vibes", "# <ARX [[prompt]] :new />").unwrap();
//! let workspace = fixture.workspace();
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::ArxConfig;
use crate::prompts::PromptWorkspace;
use crate::templating::EnvSnapshot;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging
/// stays off. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=agentrx=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// A prompts/templates/work-docs layout under one root directory.
///
/// ```text
/// <root>/prompts/     prompts directory
/// <root>/templates/   single template search directory
/// <root>/work/        work-docs root for new prompts
/// ```
#[derive(Debug, Clone)]
pub struct PromptFixture {
    root: PathBuf,
    env: EnvSnapshot,
}

impl PromptFixture {
    /// Create the directory layout under `root`.
    pub fn new(root: &Path) -> io::Result<Self> {
        let fixture = Self {
            root: root.to_path_buf(),
            env: EnvSnapshot::empty(),
        };
        std::fs::create_dir_all(fixture.prompts_dir())?;
        std::fs::create_dir_all(fixture.templates_dir())?;
        Ok(fixture)
    }

    /// Add an environment variable visible to templates.
    #[must_use]
    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.env = self.env.with_var(name, value);
        self
    }

    /// Root directory of the fixture.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The prompts directory.
    pub fn prompts_dir(&self) -> PathBuf {
        self.root.join("prompts")
    }

    /// The template search directory.
    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    /// The work-docs root.
    pub fn work_docs(&self) -> PathBuf {
        self.root.join("work")
    }

    /// Configuration pointing at the fixture's directories.
    pub fn config(&self) -> ArxConfig {
        ArxConfig::from_env(&self.env)
            .with_prompts_dir(self.prompts_dir())
            .with_work_docs(self.work_docs())
            .with_template_dirs(vec![self.templates_dir()])
    }

    /// A workspace over the fixture.
    pub fn workspace(&self) -> PromptWorkspace {
        PromptWorkspace::new(self.config(), self.env.clone())
    }

    /// Write `<templates>/<name>.md`.
    pub fn template(&self, name: &str, content: &str) -> io::Result<PathBuf> {
        let path = self.templates_dir().join(format!("{name}.md"));
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Write `<prompts>/<name>`.
    pub fn prompt(&self, name: &str, content: &str) -> io::Result<PathBuf> {
        let path = self.prompts_dir().join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Write an arbitrary file relative to the root, creating parents.
    pub fn file(&self, relative: &str, content: &str) -> io::Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }
}
