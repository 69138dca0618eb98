//! Calc - the calculator command's evaluation entry point.
//!
//! # Architecture
//!
//! ```text
//! source ──► calc_parse::parse ──► Module ──► Interpreter::run ──► Outcome
//! ```
//!
//! [`evaluate`] runs that pipeline in the current process. Production
//! callers go through [`run_isolated`], which runs the same pipeline in a
//! child worker under a wall-clock deadline and a memory ceiling and reports
//! the rendered outcome back over a JSON protocol.

mod config;
mod error;
pub mod isolate;

pub use calc_eval::{Outcome, Value};
pub use config::{parse_args, CalcConfig, ConfigError, Invocation, USAGE};
pub use error::CalcError;
pub use isolate::{run_isolated, IsolationError, IsolationLimits, RenderedOutcome, Request};

use std::sync::Once;

use calc_eval::Interpreter;

/// Parse and run one script in a fresh session.
///
/// No state is shared between calls.
#[tracing::instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn evaluate(source: &str, exact_mode: bool) -> Result<Outcome, CalcError> {
    let module = calc_parse::parse(source).map_err(|error| CalcError::parse(source, error))?;
    let outcome = Interpreter::new(exact_mode).run(&module)?;
    tracing::debug!(
        has_result = outcome.result.is_some(),
        bindings = outcome.bindings.len(),
        "evaluated"
    );
    Ok(outcome)
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=calc=debug` or `RUST_LOG=calc_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set; stdout carries results and the
        // worker protocol.
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
mod tests;
