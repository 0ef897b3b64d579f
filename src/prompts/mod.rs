//! Prompt-file workflows built on the ARX renderer.
//!
//! A prompt goes through two stages:
//!
//! - **new**: a template (or bare prompt text) is rendered with
//!   [`Phase::New`](crate::templating::Phase::New) and written under the
//!   work-docs directory. `:do` tags survive this stage untouched.
//! - **do**: an existing prompt file is rendered with
//!   [`Phase::Do`](crate::templating::Phase::Do) against run-time data and
//!   written to a file or handed back to the caller.
//!
//! [`PromptWorkspace`] ties the [`ArxConfig`] and a [`TemplateRenderer`]
//! together; the stage entry points live in [`new`] and [`execute`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use agentrx::prompts::{NewPromptRequest, PromptWorkspace};
//! use agentrx::templating::EnvSnapshot;
//!
//! # async fn example() -> agentrx::core::Result<()> {
//! let workspace = PromptWorkspace::from_env(EnvSnapshot::capture());
//! let outcome = workspace
//!     .new_prompt(NewPromptRequest {
//!         template: Some("vibes".to_string()),
//!         prompt_text: Some("Refactor the payment module".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{}", outcome.path.display());
//! # Ok(())
//! # }
//! ```

pub mod discovery;
pub mod execute;
pub mod new;
pub mod script;
pub mod template;

pub use discovery::{
    PromptEntry, PromptListing, find_most_recent_prompt, format_age, list_prompts,
    resolve_prompt_path,
};
pub use execute::{DoPromptOutcome, DoPromptPlan, DoPromptRequest, data_source_label};
pub use new::{
    NewPromptOutcome, NewPromptRequest, build_output_path, derive_short_name, unresolved_tags,
};
pub use script::run_context_script;
pub use template::{find_template, resolve_template_arg, template_suggestions};

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use crate::config::ArxConfig;
use crate::core::Result;
use crate::templating::{EnvSnapshot, TemplateRenderer};

/// Configuration plus renderer shared by the prompt stages.
#[derive(Debug, Clone)]
pub struct PromptWorkspace {
    config: ArxConfig,
    renderer: TemplateRenderer,
}

impl PromptWorkspace {
    /// Create a workspace with explicit configuration.
    ///
    /// `env` backs `$NAME` expansion and `env.` expressions in templates.
    #[must_use]
    pub fn new(config: ArxConfig, env: EnvSnapshot) -> Self {
        Self {
            config,
            renderer: TemplateRenderer::new(env),
        }
    }

    /// Create a workspace whose configuration is read from `env`.
    #[must_use]
    pub fn from_env(env: EnvSnapshot) -> Self {
        Self::new(ArxConfig::from_env(&env), env)
    }

    /// The active configuration.
    pub fn config(&self) -> &ArxConfig {
        &self.config
    }

    /// The renderer used by both stages.
    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// List prompts in the configured prompts directory.
    pub fn list_prompts(&self, limit: usize) -> Result<PromptListing> {
        list_prompts(&self.config.prompts_dir, limit)
    }

    /// Resolve a prompt argument, or pick the most recent prompt.
    pub fn resolve_prompt_path(&self, prompt: Option<&str>) -> Result<PathBuf> {
        resolve_prompt_path(prompt, &self.config)
    }

    /// Locate a template by path or by name in the template directories.
    pub fn find_template(&self, name_or_path: &str) -> Option<PathBuf> {
        find_template(name_or_path, &self.config)
    }

    /// Directory a `new` prompt with `subdir` is written into.
    pub fn output_dir(&self, subdir: &str) -> PathBuf {
        self.config.work_docs.join(subdir)
    }
}

/// Read stdin to the end when it is piped, `None` when it is a terminal.
///
/// This is the hook a front end uses to fill the `stdin` field of
/// [`NewPromptRequest`] and [`DoPromptRequest`]; the workspace itself never
/// touches process stdin. Read failures are logged and treated as "no stdin
/// data".
pub fn read_piped_stdin() -> Option<String> {
    read_piped(std::io::stdin())
}

fn read_piped<R: Read + IsTerminal>(mut input: R) -> Option<String> {
    if input.is_terminal() {
        return None;
    }

    let mut buffer = String::new();
    match input.read_to_string(&mut buffer) {
        Ok(_) => Some(buffer),
        Err(e) => {
            tracing::debug!("Ignoring unreadable stdin: {}", e);
            None
        }
    }
}
