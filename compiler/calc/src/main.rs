//! Calc CLI
//!
//! The chat command's front end: joins its arguments into one script and
//! evaluates it, isolated in a worker process by default.

use std::io::{self, IsTerminal, Read};
use std::process::ExitCode;

use calc::isolate::{run_worker, WORKER_FLAG};
use calc::{evaluate, parse_args, run_isolated, IsolationLimits, RenderedOutcome, Request, USAGE};

fn main() -> ExitCode {
    calc::init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().is_some_and(|arg| arg == WORKER_FLAG) {
        return match run_worker(io::stdin().lock(), io::stdout().lock()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: worker I/O failed: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let mut source = invocation.script();
    if invocation.words.is_empty() && !io::stdin().is_terminal() {
        if let Err(e) = io::stdin().read_to_string(&mut source) {
            eprintln!("error: failed to read stdin: {e}");
            return ExitCode::FAILURE;
        }
    }
    if source.trim().is_empty() {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let config = invocation.config;
    let rendered = if config.isolated {
        let program = match std::env::current_exe() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("error: cannot locate the calc executable: {e}");
                return ExitCode::FAILURE;
            }
        };
        let request = Request {
            source,
            exact_mode: config.exact_mode,
        };
        run_isolated(&request, &IsolationLimits::new(program, &config)).map_err(|e| e.to_string())
    } else {
        evaluate(&source, config.exact_mode)
            .map(|outcome| RenderedOutcome::from(&outcome))
            .map_err(|e| e.to_string())
    };

    match rendered {
        Ok(outcome) => {
            print_outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn print_outcome(outcome: &RenderedOutcome) {
    if let Some(result) = &outcome.result {
        println!("{result}");
    }
    for (name, repr) in &outcome.bindings {
        println!("{name} = {repr}");
    }
}
