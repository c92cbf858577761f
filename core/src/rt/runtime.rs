//! tokio runtime used to drive the channel backend.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which tokio scheduler the runtime is built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeFlavor {
    #[default]
    CurrentThread,
    MultiThread,
}

impl RuntimeFlavor {
    pub fn label(self) -> &'static str {
        match self {
            RuntimeFlavor::CurrentThread => "current_thread",
            RuntimeFlavor::MultiThread => "multi_thread",
        }
    }
}

impl fmt::Display for RuntimeFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RuntimeFlavor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "current_thread" | "current" => Ok(RuntimeFlavor::CurrentThread),
            "multi_thread" | "multi" => Ok(RuntimeFlavor::MultiThread),
            other => Err(anyhow!(
                "unknown runtime flavor '{}' (expected current_thread or multi_thread)",
                other
            )),
        }
    }
}

/// Thin owner of a tokio runtime
pub struct Runtime {
    tokio_runtime: tokio::runtime::Runtime,
    flavor: RuntimeFlavor,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").field("flavor", &self.flavor).finish()
    }
}

impl Runtime {
    /// Create a new multi-threaded runtime
    pub fn new_multi_thread() -> Result<Self> {
        let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| anyhow!("Failed to create tokio runtime: {}", e))?;

        Ok(Runtime {
            tokio_runtime,
            flavor: RuntimeFlavor::MultiThread,
        })
    }

    /// Create a new current-thread runtime
    pub fn new_current_thread() -> Result<Self> {
        let tokio_runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| anyhow!("Failed to create tokio runtime: {}", e))?;

        Ok(Runtime {
            tokio_runtime,
            flavor: RuntimeFlavor::CurrentThread,
        })
    }

    /// Build the requested flavor. A multi-thread runtime that cannot be
    /// created falls back to a current-thread one.
    pub fn with_flavor(flavor: RuntimeFlavor) -> Result<Self> {
        match flavor {
            RuntimeFlavor::CurrentThread => Runtime::new_current_thread(),
            RuntimeFlavor::MultiThread => match Runtime::new_multi_thread() {
                Ok(runtime) => Ok(runtime),
                Err(err) => {
                    let err_msg = err.to_string();
                    warn!(error = %err_msg, "multi-thread runtime unavailable, using current-thread");
                    Runtime::new_current_thread().map_err(|fallback_err| {
                        anyhow!(
                            "Failed to create multi-thread runtime ({}) and fallback to current-thread runtime failed ({})",
                            err_msg,
                            fallback_err
                        )
                    })
                }
            },
        }
    }

    pub fn flavor(&self) -> RuntimeFlavor {
        self.flavor
    }

    /// Block on a future using the tokio runtime
    pub fn block_on<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        self.tokio_runtime.block_on(future)
    }

    /// Block on a fallible future, giving up after `timeout` when one is set.
    pub fn block_on_timeout<F, T>(&self, future: F, timeout: Option<Duration>) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match timeout {
            None => self.block_on(future),
            Some(limit) => self.block_on(async move {
                match tokio::time::timeout(limit, future).await {
                    Ok(result) => result,
                    Err(_) => Err(anyhow!("timed out after {:?}", limit)),
                }
            }),
        }
    }
}
