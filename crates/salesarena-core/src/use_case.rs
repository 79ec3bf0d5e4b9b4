//! The use-case execution contract.
//!
//! A use case is one application-level operation: validate the command,
//! load aggregates, apply transitions, save, dispatch events. Callers only
//! ever see the returned `DomainResult`; even a panic inside the operation
//! comes back as `DomainError::Unexpected`.

use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{Instrument, error, info, info_span, warn};

use crate::command::Command;
use crate::error::DomainError;
use crate::event_bus::panic_message;
use crate::result::DomainResult;

/// A single business operation with one entry point.
///
/// Implementors write [`UseCase::handle`]; callers invoke
/// [`UseCase::execute`], which wraps `handle` with command validation,
/// tracing and fault containment.
#[async_trait]
pub trait UseCase: Send + Sync {
    /// The command this use case accepts.
    type Input: Command + 'static;
    /// What a successful execution returns.
    type Output: Send + 'static;

    /// Performs the operation. Only called after `input.validate()` passed.
    ///
    /// # Errors
    ///
    /// Returns any `DomainError` raised by the aggregates or repositories.
    async fn handle(&self, input: Self::Input) -> DomainResult<Self::Output>;

    /// Validates `input`, runs [`UseCase::handle`], and converts a panic
    /// into `DomainError::Unexpected`.
    ///
    /// # Errors
    ///
    /// Returns the validation failure, the error from `handle`, or
    /// `DomainError::Unexpected` if `handle` panicked.
    async fn execute(&self, input: Self::Input) -> DomainResult<Self::Output> {
        let command_type = input.command_type();
        let span = info_span!(
            "use_case",
            command_type,
            correlation_id = %input.correlation_id()
        );

        async move {
            if let Err(err) = input.validate() {
                warn!(error = %err, "command rejected before execution");
                return Err(err);
            }

            let outcome = AssertUnwindSafe(self.handle(input)).catch_unwind().await;
            match outcome {
                Ok(Ok(output)) => {
                    info!("use case completed");
                    Ok(output)
                }
                Ok(Err(err)) => {
                    if err.is_business_failure() {
                        warn!(error = %err, "use case rejected");
                    } else {
                        error!(error = %err, "use case failed");
                    }
                    Err(err)
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(panic = %message, "use case panicked");
                    Err(DomainError::Unexpected(format!(
                        "{command_type} failed unexpectedly: {message}"
                    )))
                }
            }
        }
        .instrument(span)
        .await
    }
}
