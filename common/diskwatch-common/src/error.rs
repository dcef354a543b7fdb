//! Error logging utilities
//!
//! Long-running cycles never let a component failure escape: the call
//! site logs it with context and moves on. [`LogResultExt`] captures that
//! pattern so every call site logs the same way.

use std::fmt::Display;

/// Extension trait for Result types that logs the error and discards it
///
/// # Example
///
/// ```rust,ignore
/// use diskwatch_common::LogResultExt;
///
/// // Logged at error level, cycle continues with `None`
/// let readings = source.fetch().await.log_error("fetch failed");
///
/// // Logged at warn level for conditions that are expected now and then
/// store.save(&snapshot).log_warn("could not persist snapshot");
/// ```
pub trait LogResultExt<T> {
    /// Log the error at `error` level and convert to `Option`
    fn log_error(self, context: &str) -> Option<T>;

    /// Log the error at `warn` level and convert to `Option`
    fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: Display> LogResultExt<T> for Result<T, E> {
    fn log_error(self, context: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(error = %e, "{}", context);
                None
            }
        }
    }

    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "{}", context);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_error_passes_ok_through() {
        let result: Result<u32, String> = Ok(7);
        assert_eq!(result.log_error("unused"), Some(7));
    }

    #[test]
    fn test_log_error_swallows_err() {
        let result: Result<u32, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not found",
        ));
        assert_eq!(result.log_error("reading snapshot"), None);
    }

    #[test]
    fn test_log_warn_swallows_err() {
        let result: Result<(), &str> = Err("channel gone");
        assert!(result.log_warn("delivery").is_none());
    }
}
