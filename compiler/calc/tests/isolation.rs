// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Isolated evaluation through a real worker process.
//!
//! ```bash
//! cargo test -p calc --test isolation
//! ```

use std::time::{Duration, Instant};

use calc::{run_isolated, CalcConfig, IsolationError, IsolationLimits, Request};
use pretty_assertions::assert_eq;

fn limits(timeout: Duration) -> IsolationLimits {
    let config = CalcConfig {
        timeout,
        ..CalcConfig::default()
    };
    IsolationLimits::new(env!("CARGO_BIN_EXE_calc"), &config)
}

fn request(source: &str, exact_mode: bool) -> Request {
    Request {
        source: source.to_string(),
        exact_mode,
    }
}

#[test]
fn outcome_comes_back_rendered() {
    let outcome = run_isolated(&request("x = 1\nx + 1", false), &limits(Duration::from_secs(10)))
        .expect("worker should succeed");
    assert_eq!(outcome.result.as_deref(), Some("2"));
    assert_eq!(outcome.bindings.get("x").map(String::as_str), Some("1"));
}

#[test]
fn exact_mode_reaches_the_worker() {
    let long = limits(Duration::from_secs(10));
    let outcome = run_isolated(&request("1 + 2", true), &long).unwrap();
    assert_eq!(outcome.result.as_deref(), Some("Decimal('3')"));
}

#[test]
fn infinite_loop_times_out() {
    let started = Instant::now();
    let short = limits(Duration::from_millis(300));
    let err = run_isolated(&request("while True:\n    pass", false), &short).unwrap_err();
    assert_eq!(
        err,
        IsolationError::Timeout {
            limit: Duration::from_millis(300)
        }
    );
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn script_errors_keep_their_class() {
    let long = limits(Duration::from_secs(10));
    assert!(matches!(
        run_isolated(&request("1 // 0", false), &long),
        Err(IsolationError::DivisionByZero { .. })
    ));
    assert!(matches!(
        run_isolated(&request("def f(): pass", false), &long),
        Err(IsolationError::Syntax { message }) if message == "FunctionDef is not supported"
    ));
    assert!(matches!(
        run_isolated(&request("undefined_name", false), &long),
        Err(IsolationError::Eval { class, .. }) if class == "NameError"
    ));
}

#[cfg(unix)]
#[test]
fn memory_ceiling_stops_runaway_allocation() {
    let config = CalcConfig {
        timeout: Duration::from_secs(20),
        memory_limit: Some(128 * 1024 * 1024),
        ..CalcConfig::default()
    };
    let limits = IsolationLimits::new(env!("CARGO_BIN_EXE_calc"), &config);
    let err = run_isolated(&request("x = [0] * 100000000", false), &limits).unwrap_err();
    assert!(matches!(err, IsolationError::Unexpected { .. }), "{err:?}");
}
