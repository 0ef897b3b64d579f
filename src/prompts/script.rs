//! Context scripts declared in template front matter.
//!
//! A template may name a `script` in its front matter. During `prompt new` the
//! script receives the current context as JSON on stdin and must print a JSON
//! object on stdout, which is merged over the context.

use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::{ArxError, Result};
use crate::templating::Context;
use crate::templating::utils::value_kind;

/// Run `script` with `context` on stdin and return the object it prints.
///
/// The script is executed directly, without a shell and without arguments.
/// It is killed if it has not exited within `limit`.
///
/// # Errors
///
/// - [`ArxError::ContextScriptNotFound`] if the executable does not exist
/// - [`ArxError::ContextScriptTimeout`] if it runs longer than `limit`
/// - [`ArxError::ContextScriptFailed`] on a non-zero exit
/// - [`ArxError::ContextScriptInvalidOutput`] if stdout is not a JSON object
/// - [`ArxError::FileSystemError`] for any other spawn failure
pub async fn run_context_script(
    script: &str,
    context: &Context,
    limit: Duration,
) -> Result<Context> {
    let payload = serde_json::to_vec(context).map_err(|e| ArxError::ContextScriptInvalidOutput {
        script: script.to_string(),
        reason: format!("could not encode context: {e}"),
    })?;

    tracing::debug!("Running context script: {}", script);

    let mut child = Command::new(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ArxError::ContextScriptNotFound {
                    script: script.to_string(),
                }
            } else {
                ArxError::file_system("run context script", script, &e)
            }
        })?;

    // Feed stdin from a separate task so a script that writes before it
    // reads cannot deadlock against us.
    if let Some(mut stdin) = child.stdin.take() {
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&payload).await {
                tracing::trace!("Context script closed stdin early: {}", e);
            }
        });
    }

    // Dropping the child on timeout kills it.
    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(result) => {
            result.map_err(|e| ArxError::file_system("wait for context script", script, &e))?
        }
        Err(_) => {
            tracing::warn!("Context script timed out after {:?}: {}", limit, script);
            return Err(ArxError::ContextScriptTimeout {
                script: script.to_string(),
                seconds: limit.as_secs(),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!("Context script failed with exit code: {:?}", output.status.code());
        return Err(ArxError::ContextScriptFailed {
            script: script.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).map_err(|e| ArxError::ContextScriptInvalidOutput {
            script: script.to_string(),
            reason: e.to_string(),
        })?;

    match value {
        serde_json::Value::Object(map) => {
            tracing::debug!("Context script returned {} key(s)", map.len());
            Ok(map)
        }
        other => Err(ArxError::ContextScriptInvalidOutput {
            script: script.to_string(),
            reason: format!("expected a JSON object, found {}", value_kind(&other)),
        }),
    }
}
