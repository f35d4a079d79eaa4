use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::shell::Outcome;
use crate::EXIT_FAILURE;

#[derive(Debug, Serialize)]
pub struct ExecResult {
    pub pipestatus: Vec<i32>,
    pub exit_code: i32,
    pub elapsed_ms: u64,
    pub stages: usize,
    pub fatal: bool,
}

impl ExecResult {
    pub fn completed(outcome: Outcome, elapsed_ms: u64) -> Self {
        Self {
            pipestatus: outcome.pipestatus,
            exit_code: outcome.exit_code,
            elapsed_ms,
            stages: outcome.stages,
            fatal: false,
        }
    }

    pub fn fatal(elapsed_ms: u64) -> Self {
        Self {
            pipestatus: vec![],
            exit_code: EXIT_FAILURE,
            elapsed_ms,
            stages: 0,
            fatal: true,
        }
    }
}

pub fn write_meta(path: &str, result: &ExecResult) -> Result<(), String> {
    let json = serde_json::to_string(result).map_err(|e| format!("json: {}", e))?;
    fs::write(Path::new(path), json).map_err(|e| format!("write: {}", e))
}
