//! Configuration for the AgentRx prompt workflows.
//!
//! All settings come from an [`EnvSnapshot`] rather than the live process
//! environment, so the same configuration can be reproduced in tests.
//!
//! | Variable | Setting | Default |
//! |----------|---------|---------|
//! | `ARX_PROMPTS` | prompts directory | `_project/docs/agentrx/vibes` |
//! | `ARX_WORK_DOCS` | root for new prompt files | the prompts directory |
//! | `ARX_AGENT_TOOLS` | adds `$ARX_AGENT_TOOLS/templates` to the template search | unset |
//! | `AGENTRX_SOURCE` | adds `$AGENTRX_SOURCE/templates` to the template search | unset |
//! | `ARX_SCRIPT_TIMEOUT` | context script timeout, in seconds | `30` |
//!
//! # Examples
//!
//! ```rust
//! use agentrx::config::ArxConfig;
//! use agentrx::templating::EnvSnapshot;
//! use std::path::PathBuf;
//!
//! let env = EnvSnapshot::empty()
//!     .with_var("ARX_PROMPTS", "/work/prompts")
//!     .with_var("ARX_AGENT_TOOLS", "/opt/tools");
//! let config = ArxConfig::from_env(&env);
//!
//! assert_eq!(config.prompts_dir, PathBuf::from("/work/prompts"));
//! assert_eq!(config.work_docs, PathBuf::from("/work/prompts"));
//! assert_eq!(config.template_dirs, vec![PathBuf::from("/opt/tools/templates")]);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::templating::EnvSnapshot;

/// Default prompts directory, relative to the working directory.
pub const DEFAULT_PROMPTS_DIR: &str = "_project/docs/agentrx/vibes";

/// Name of the templates directory under each template root.
pub const TEMPLATES_SUBDIR: &str = "templates";

/// Default wall-clock limit for a template's context script.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Directory and timeout settings used by the prompt workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArxConfig {
    /// Where existing prompts are listed and looked up.
    pub prompts_dir: PathBuf,
    /// Root under which `prompt new` writes `<subdir>/<name>_<stamp>.md`.
    pub work_docs: PathBuf,
    /// Directories searched, in order, for named templates.
    pub template_dirs: Vec<PathBuf>,
    /// Upper bound on a context script's run time.
    pub script_timeout: Duration,
}

impl Default for ArxConfig {
    fn default() -> Self {
        Self::from_env(&EnvSnapshot::empty())
    }
}

impl ArxConfig {
    /// Build the configuration from environment variables in `env`.
    ///
    /// Empty values are treated as unset. An `ARX_SCRIPT_TIMEOUT` that is not
    /// a positive whole number of seconds is ignored with a warning.
    pub fn from_env(env: &EnvSnapshot) -> Self {
        let var = |name: &str| env.get(name).filter(|value| !value.is_empty());

        let prompts_dir = PathBuf::from(var("ARX_PROMPTS").unwrap_or(DEFAULT_PROMPTS_DIR));
        let work_docs = var("ARX_WORK_DOCS").map_or_else(|| prompts_dir.clone(), PathBuf::from);

        let template_dirs = ["ARX_AGENT_TOOLS", "AGENTRX_SOURCE"]
            .into_iter()
            .filter_map(|name| var(name))
            .map(|root| PathBuf::from(root).join(TEMPLATES_SUBDIR))
            .collect();

        let script_timeout = match var("ARX_SCRIPT_TIMEOUT") {
            None => DEFAULT_SCRIPT_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "Ignoring invalid ARX_SCRIPT_TIMEOUT '{}', using {} s",
                        raw,
                        DEFAULT_SCRIPT_TIMEOUT.as_secs()
                    );
                    DEFAULT_SCRIPT_TIMEOUT
                }
            },
        };

        let config = Self {
            prompts_dir,
            work_docs,
            template_dirs,
            script_timeout,
        };
        tracing::debug!("Loaded AgentRx configuration: {:?}", config);
        config
    }

    /// Override the prompts directory.
    #[must_use]
    pub fn with_prompts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompts_dir = dir.into();
        self
    }

    /// Override the root directory for new prompt files.
    #[must_use]
    pub fn with_work_docs(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_docs = dir.into();
        self
    }

    /// Replace the template search directories.
    #[must_use]
    pub fn with_template_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.template_dirs = dirs;
        self
    }

    /// Override the context script timeout.
    #[must_use]
    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }
}
