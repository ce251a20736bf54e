//! Process-wide ONNX Runtime initialization.
//!
//! The native runtime may only be initialized once per process. A
//! [`std::sync::OnceLock`] makes the first caller pay the cost and commit
//! the outcome; every later caller, on any thread, gets the same result
//! without re-running `ort::init`.

use std::sync::OnceLock;

use tracing::{error, info};

use crate::error::{Result, TurnDetectorError};

static RUNTIME: OnceLock<std::result::Result<(), TurnDetectorError>> = OnceLock::new();

/// Ensures the ONNX Runtime native library is loaded and initialized.
///
/// Safe to call from any number of detectors, threads, or tasks; the
/// underlying `ort::init()` call runs at most once per process.
///
/// # Errors
///
/// Returns [`TurnDetectorError::RuntimeInit`] if initialization failed. The
/// same error is returned on every subsequent call — there is no retry
/// within a process.
pub fn ensure_initialized() -> Result<()> {
    RUNTIME
        .get_or_init(|| {
            if let Some(lib_path) = std::env::var("ONNXRUNTIME_LIB")
                .ok()
                .or_else(|| default_dylib_path().map(str::to_owned))
            {
                std::env::set_var("ORT_DYLIB_PATH", lib_path);
            }

            match ort::init().with_name("turn-detector").commit() {
                Ok(_env) => {
                    info!("onnx runtime initialized");
                    Ok(())
                }
                Err(err) => {
                    let message = err.to_string();
                    error!(error = %message, "onnx runtime initialization failed");
                    Err(TurnDetectorError::RuntimeInit(message))
                }
            }
        })
        .clone()
}

/// `ONNXRUNTIME_LIB` default when the environment doesn't already set one.
///
/// The onnxruntime Homebrew formula installs here; other platforms rely on
/// `ort`'s bundled/downloaded binary and need no override.
#[cfg(target_os = "macos")]
fn default_dylib_path() -> Option<&'static str> {
    Some("/usr/local/lib/libonnxruntime.dylib")
}

#[cfg(not(target_os = "macos"))]
fn default_dylib_path() -> Option<&'static str> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_calls_return_the_same_outcome() {
        let first = ensure_initialized();
        let second = ensure_initialized();
        assert_eq!(first.is_ok(), second.is_ok());
    }
}
