//! Classification of failed `kairo` invocations.
//!
//! The binary logs one structured event per failure and exits with a status
//! that tells scripts whether the inputs, the engine or the report writer
//! gave up.

use std::process::ExitCode;

use super::CliError;

/// Stage of an invocation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Opening or decoding the graph or hazard documents.
    Input,
    /// Configuring or running the simulation engine.
    Engine,
    /// Writing the report to stdout.
    Output,
}

impl FailureStage {
    /// Process exit status for the stage.
    ///
    /// Status `2` stays reserved for clap's usage errors.
    #[must_use]
    pub const fn exit_status(self) -> u8 {
        match self {
            Self::Output => 1,
            Self::Input => 3,
            Self::Engine => 4,
        }
    }

    #[rustfmt::skip]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self { Self::Input => "input", Self::Engine => "engine", Self::Output => "output" }
    }
}

/// A failed invocation, flattened for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    stage: FailureStage,
    code: Option<&'static str>,
    message: String,
}

impl Failure {
    /// Classifies `err` by the first [`CliError`] in its cause chain.
    ///
    /// Errors carrying no [`CliError`] can only come from writing the report,
    /// so they are attributed to [`FailureStage::Output`].
    ///
    /// # Examples
    /// ```
    /// use anyhow::Context;
    /// use kairo_cli::cli::{Failure, FailureStage};
    ///
    /// let err = Err::<(), _>(std::io::Error::other("pipe closed"))
    ///     .context("failed to write report")
    ///     .unwrap_err();
    /// let failure = Failure::classify(&err);
    /// assert_eq!(failure.stage(), FailureStage::Output);
    /// assert_eq!(failure.message(), "failed to write report: pipe closed");
    /// ```
    #[must_use]
    pub fn classify(err: &anyhow::Error) -> Self {
        let cli_error = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<CliError>());
        let stage = match cli_error {
            Some(CliError::Io { .. } | CliError::Provider(_)) => FailureStage::Input,
            Some(CliError::Core(_)) => FailureStage::Engine,
            None => FailureStage::Output,
        };
        Self {
            stage,
            code: cli_error.and_then(CliError::code),
            message: format!("{err:#}"),
        }
    }

    #[rustfmt::skip]
    #[must_use]
    pub const fn stage(&self) -> FailureStage { self.stage }

    /// Stable library error code, when the failure has one.
    #[rustfmt::skip]
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> { self.code }

    /// The error and its causes on one line.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.stage.exit_status())
    }
}
