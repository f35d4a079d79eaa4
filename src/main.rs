use std::env;
use std::ffi::OsString;
use std::process;
use std::time::Instant;

use microshell::config::Config;
use microshell::error::report_fatal;
use microshell::executor::Environment;
use microshell::meta::{self, ExecResult};
use microshell::shell::Shell;

fn main() {
    let config = Config::load();
    let tokens: Vec<OsString> = env::args_os().skip(1).collect();
    let start = Instant::now();

    let result = Shell::new(&tokens, Environment::from_process())
        .with_trace(config.trace)
        .run();

    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let exec_result = match result {
        Ok(outcome) => ExecResult::completed(outcome, elapsed_ms),
        Err(e) => {
            if config.trace {
                eprintln!("[microshell] {}", e);
            }
            report_fatal();
            ExecResult::fatal(elapsed_ms)
        }
    };

    if let Some(ref meta_path) = config.meta_path {
        if let Err(e) = meta::write_meta(meta_path, &exec_result) {
            eprintln!("microshell: failed to write meta: {}", e);
        }
    }

    process::exit(exec_result.exit_code);
}
