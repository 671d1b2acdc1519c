use core::fmt::Display;
use std::process::ExitCode;

use tracing::error;

/// Extension trait for results a binary cannot carry on without.
pub trait Failure<T> {
    /// Log the error after `message` and panic.
    ///
    /// Only for failures before logging is up, where the panic message is the
    /// only report that reaches the user.
    fn or_log_and_panic(self, message: &str) -> T;

    /// Log the error after `message` and hand back the code to exit with.
    fn or_log_exit(self, message: &str) -> Result<T, ExitCode>;
}

impl<T, E: Display> Failure<T> for Result<T, E> {
    fn or_log_and_panic(self, message: &str) -> T {
        self.unwrap_or_else(|error| panic!("{}", report(message, &error)))
    }

    fn or_log_exit(self, message: &str) -> Result<T, ExitCode> {
        self.map_err(|error| {
            report(message, &error);
            ExitCode::FAILURE
        })
    }
}

fn report(message: &str, error: &dyn Display) -> String {
    let report = format!("{message}: {error}");
    error!("{report}");
    report
}
