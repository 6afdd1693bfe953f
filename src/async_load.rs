//! Async loading with a deadline.
//!
//! Loading is blocking I/O. These helpers move it onto tokio's blocking
//! pool and stop waiting once the deadline passes. An abandoned load keeps
//! running on the blocking thread until it finishes; its result is dropped.

use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::context::Context;
use crate::error::{HstsError, Result};
use crate::loader::LoadOptions;

/// Load a rule file in either format, giving up after `deadline`.
pub async fn load_file_with_timeout(
    path: impl Into<PathBuf>,
    options: LoadOptions,
    deadline: Duration,
) -> Result<Context> {
    let path = path.into();
    let handle = tokio::task::spawn_blocking(move || Context::load_file_with(&path, &options));
    join_with_deadline(handle, deadline).await
}

async fn join_with_deadline<T>(handle: JoinHandle<Result<T>>, deadline: Duration) -> Result<T> {
    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(HstsError::TaskFailed(e.to_string())),
        Err(_) => {
            tracing::warn!(?deadline, "rule load timed out");
            Err(HstsError::Timeout(deadline))
        }
    }
}
