//! Process isolation for one evaluation.
//!
//! The supervisor side ([`run_isolated`]) re-executes the `calc` binary with
//! [`WORKER_FLAG`], sends a [`Request`] on its stdin and waits for a single
//! [`Reply`] on its stdout. The worker side ([`run_worker`]) evaluates the
//! request and renders values to their reprs, since runtime values never
//! leave the process that produced them.
//!
//! Killing the worker at any point is always safe: the evaluator touches
//! nothing but its own scope.

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{evaluate, CalcConfig, Outcome};

/// Argument that switches the binary into worker mode.
pub const WORKER_FLAG: &str = "--worker";

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// One script to evaluate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub source: String,
    pub exact_mode: bool,
}

/// An outcome with every value rendered to its repr.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedOutcome {
    pub result: Option<String>,
    pub bindings: BTreeMap<String, String>,
}

impl From<&Outcome> for RenderedOutcome {
    fn from(outcome: &Outcome) -> Self {
        RenderedOutcome {
            result: outcome.result.as_ref().map(calc_eval::Value::repr),
            bindings: outcome
                .bindings
                .iter()
                .map(|(name, value)| (name.clone(), value.repr()))
                .collect(),
        }
    }
}

/// The worker's single line of output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reply {
    Ok(RenderedOutcome),
    Err(FailedReply),
}

/// A failure reported by the worker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedReply {
    pub class: String,
    pub message: String,
}

/// Class reported when the worker panics.
pub const PANIC_CLASS: &str = "panic";

/// Error classes the evaluator raises for a script's own mistakes.
const SCRIPT_ERROR_CLASSES: &[&str] = &[
    "NameError",
    "TypeError",
    "ValueError",
    "AttributeError",
    "OverflowError",
    "IndexError",
    "KeyError",
    "StopIteration",
];

/// Limits for one isolated evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IsolationLimits {
    /// Executable that understands [`WORKER_FLAG`].
    pub program: PathBuf,
    pub timeout: Duration,
    /// Address-space ceiling in bytes.
    pub memory_limit: Option<u64>,
}

impl IsolationLimits {
    pub fn new(program: impl Into<PathBuf>, config: &CalcConfig) -> Self {
        IsolationLimits {
            program: program.into(),
            timeout: config.timeout,
            memory_limit: config.memory_limit,
        }
    }
}

/// Why an isolated evaluation produced no outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IsolationError {
    #[error("SyntaxError: {message}")]
    Syntax { message: String },
    #[error("{class}: {message}")]
    Eval { class: String, message: String },
    #[error("ZeroDivisionError: {message}")]
    DivisionByZero { message: String },
    #[error("evaluation timed out after {:.1}s", .limit.as_secs_f64())]
    Timeout { limit: Duration },
    #[error("unexpected {class}: {message}")]
    Unexpected { class: String, message: String },
}

impl From<FailedReply> for IsolationError {
    fn from(reply: FailedReply) -> Self {
        let FailedReply { class, message } = reply;
        match class.as_str() {
            "SyntaxError" => IsolationError::Syntax { message },
            "ZeroDivisionError" => IsolationError::DivisionByZero { message },
            known if SCRIPT_ERROR_CLASSES.contains(&known) => {
                IsolationError::Eval { class, message }
            }
            _ => IsolationError::Unexpected { class, message },
        }
    }
}

fn unexpected(class: &str, message: impl ToString) -> IsolationError {
    IsolationError::Unexpected {
        class: class.to_string(),
        message: message.to_string(),
    }
}

/// Evaluate `request` in a child worker under `limits`.
///
/// The child is killed once the deadline passes. No retries.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(timeout_ms = limits.timeout.as_millis())
)]
pub fn run_isolated(
    request: &Request,
    limits: &IsolationLimits,
) -> Result<RenderedOutcome, IsolationError> {
    let payload = serde_json::to_vec(request).map_err(|e| unexpected("ProtocolError", e))?;
    let mut child = worker_command(limits)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| unexpected("OSError", format!("failed to start worker: {e}")))?;
    tracing::debug!(pid = child.id(), "worker started");

    if let Some(mut stdin) = child.stdin.take() {
        // A worker that dies before reading is reported through its status.
        if let Err(e) = stdin.write_all(&payload) {
            tracing::debug!(error = %e, "request not delivered");
        }
    }
    let stdout = child.stdout.take();
    let reader = thread::spawn(move || -> io::Result<String> {
        let mut text = String::new();
        if let Some(mut stdout) = stdout {
            stdout.read_to_string(&mut text)?;
        }
        Ok(text)
    });

    let status = wait_with_deadline(&mut child, limits.timeout)?;
    let output = reader
        .join()
        .map_err(|_| unexpected(PANIC_CLASS, "worker reader thread panicked"))?
        .map_err(|e| unexpected("OSError", e))?;
    tracing::debug!(%status, bytes = output.len(), "worker finished");

    match parse_reply(&output) {
        Some(Reply::Ok(outcome)) => Ok(outcome),
        Some(Reply::Err(failure)) => Err(failure.into()),
        None => Err(unexpected(
            "WorkerExit",
            format!("worker exited without a reply ({status})"),
        )),
    }
}

#[cfg(unix)]
fn worker_command(limits: &IsolationLimits) -> Command {
    let Some(bytes) = limits.memory_limit else {
        return direct_command(limits);
    };
    let kib = (bytes / 1024).max(1);
    let mut command = Command::new("/bin/sh");
    command
        .arg("-c")
        .arg(format!("ulimit -v \"$1\" || exit 125; exec \"$0\" {WORKER_FLAG}"))
        .arg(&limits.program)
        .arg(kib.to_string());
    command
}

#[cfg(not(unix))]
fn worker_command(limits: &IsolationLimits) -> Command {
    direct_command(limits)
}

fn direct_command(limits: &IsolationLimits) -> Command {
    let mut command = Command::new(&limits.program);
    command.arg(WORKER_FLAG);
    command
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> Result<ExitStatus, IsolationError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(|e| unexpected("OSError", e))? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            tracing::warn!(timeout_ms = timeout.as_millis(), "worker exceeded deadline; killing");
            // The worker may exit on its own between the check and the kill.
            if let Err(e) = child.kill() {
                tracing::debug!(error = %e, "kill failed");
            }
            if let Err(e) = child.wait() {
                tracing::debug!(error = %e, "reaping killed worker failed");
            }
            return Err(IsolationError::Timeout { limit: timeout });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn parse_reply(output: &str) -> Option<Reply> {
    let line = output.lines().rev().find(|line| !line.trim().is_empty())?;
    serde_json::from_str(line).ok()
}

/// Worker entry point: read one request, write one reply.
pub fn run_worker(mut input: impl Read, mut output: impl Write) -> io::Result<()> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    let reply = match serde_json::from_str::<Request>(&text) {
        Ok(request) => evaluate_reply(&request),
        Err(e) => Reply::Err(FailedReply {
            class: "ProtocolError".to_string(),
            message: e.to_string(),
        }),
    };
    let line = serde_json::to_string(&reply).map_err(io::Error::other)?;
    writeln!(output, "{line}")?;
    output.flush()
}

/// Evaluate a request, turning errors and panics into replies.
pub fn evaluate_reply(request: &Request) -> Reply {
    let run = panic::catch_unwind(AssertUnwindSafe(|| {
        evaluate(&request.source, request.exact_mode)
            .map(|outcome| RenderedOutcome::from(&outcome))
    }));
    match run {
        Ok(Ok(outcome)) => Reply::Ok(outcome),
        Ok(Err(error)) => Reply::Err(FailedReply {
            class: error.class_name().to_string(),
            message: error.message(),
        }),
        Err(payload) => Reply::Err(FailedReply {
            class: PANIC_CLASS.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
