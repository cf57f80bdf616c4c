//! Tracing subscriber setup.
//!
//! The library itself only emits `tracing` events. Hosts that have no subscriber of their
//! own can call [`init_tracing`] once at startup, usually with
//! [`SessionConfig::log_filter`](crate::config::SessionConfig::log_filter).

use crate::error::LoggingError;
use tracing_subscriber::EnvFilter;

/// Builds the filter: `RUST_LOG` when set and valid, otherwise `fallback`.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidFilter`] if `fallback` is needed and cannot be parsed.
pub fn env_filter(fallback: &str) -> Result<EnvFilter, LoggingError> {
  EnvFilter::try_from_default_env().or_else(|_| {
    EnvFilter::try_new(fallback).map_err(|e| LoggingError::InvalidFilter {
      filter: fallback.to_string(),
      message: e.to_string(),
    })
  })
}

/// Installs a global fmt subscriber filtered by [`env_filter`].
///
/// Returns `Ok(())` without doing anything if a global subscriber is already installed.
///
/// # Errors
///
/// Fails if the filter is invalid or the subscriber cannot be installed.
pub fn init_tracing(filter: &str) -> Result<(), LoggingError> {
  if tracing::dispatcher::has_been_set() {
    return Ok(());
  }
  let filter = env_filter(filter)?;
  match tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .try_init()
  {
    Ok(()) => Ok(()),
    // Lost a race with another initializer.
    Err(_) if tracing::dispatcher::has_been_set() => Ok(()),
    Err(e) => Err(LoggingError::Init(e.to_string())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn init_is_idempotent() {
    assert!(init_tracing("debug").is_ok());
    assert!(init_tracing("info").is_ok());
  }

  #[test]
  fn invalid_fallback_filter_is_reported() {
    if std::env::var_os("RUST_LOG").is_some() {
      return;
    }
    assert!(matches!(
      env_filter("modelweave=notalevel"),
      Err(LoggingError::InvalidFilter { .. })
    ));
  }
}
