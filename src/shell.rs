//! Driver loop: scan a segment, classify it, dispatch it, repeat.

use std::ffi::OsString;
use std::fmt;

use nix::unistd::Pid;

use crate::builtin;
use crate::error::FatalError;
use crate::executor::{self, Environment};
use crate::pipeline::{classify, link, CommandKind, Delimiter, Link, Segment, Segments};
use crate::EXIT_SUCCESS;

/// A dispatched stage of the pipeline currently being built.
#[derive(Debug)]
enum Stage {
    Running(Pid),
    Finished(i32),
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub exit_code: i32,
    /// Statuses of every stage of the last completed pipeline, in order.
    pub pipestatus: Vec<i32>,
    /// Non-empty segments dispatched.
    pub stages: usize,
}

/// Execution context for one token list.
///
/// Owns the cursor (inside `segments`), the environment mapping and the link
/// state; nothing here is global.
pub struct Shell<'a> {
    segments: Segments<'a>,
    env: Environment,
    link: Link,
    pipeline: Vec<Stage>,
    exit_code: i32,
    pipestatus: Vec<i32>,
    stages: usize,
    trace: bool,
}

impl<'a> Shell<'a> {
    pub fn new(tokens: &'a [OsString], env: Environment) -> Self {
        Self {
            segments: Segments::new(tokens),
            env,
            link: Link::none(),
            pipeline: Vec::new(),
            exit_code: EXIT_SUCCESS,
            pipestatus: Vec::new(),
            stages: 0,
            trace: false,
        }
    }

    /// Log every step to stderr as `[microshell] ...`.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    fn log(&self, args: fmt::Arguments<'_>) {
        if self.trace {
            eprintln!("[microshell] {}", args);
        }
    }

    /// Run every segment in order.
    ///
    /// A fatal error stops the loop at once; children already started are
    /// left to the OS.
    pub fn run(mut self) -> Result<Outcome, FatalError> {
        while let Some(segment) = self.segments.next() {
            self.dispatch(segment)?;
        }
        // A trailing `|` leaves a pipeline open with nobody to read it.
        self.finish_pipeline()?;

        self.log(format_args!("done: exit {}", self.exit_code));
        Ok(Outcome {
            exit_code: self.exit_code,
            pipestatus: self.pipestatus,
            stages: self.stages,
        })
    }

    fn dispatch(&mut self, segment: Segment) -> Result<(), FatalError> {
        let kind = classify(&segment.argv);
        self.log(format_args!(
            "segment {:?} -> {:?}, {:?}",
            segment.argv, kind, segment.delimiter
        ));

        match kind {
            CommandKind::Empty => {}
            CommandKind::Builtin(b) => {
                self.stages += 1;
                // Builtins never read stdin.
                self.link.reset()?;
                let status = builtin::execute(b, &segment.argv);
                self.log(format_args!("builtin {:?} -> {}", b, status));
                self.pipeline.push(Stage::Finished(status));
                if segment.is_piped() {
                    self.link.replace(Some(link::exhausted_input()?))?;
                }
            }
            CommandKind::External => {
                self.stages += 1;
                let fds = link::prepare(&mut self.link, segment.is_piped())?;
                let (pid, next_link) = executor::spawn(&segment.argv, fds, &self.env)?;
                self.log(format_args!(
                    "spawned pid {} (carrying read end: {})",
                    pid,
                    next_link.is_some()
                ));
                self.link.replace(next_link)?;
                self.pipeline.push(Stage::Running(pid));
            }
        }

        if segment.delimiter != Delimiter::Pipe {
            self.finish_pipeline()?;
        }
        Ok(())
    }

    /// Close any carried read end, then reap the pipeline's stages in launch
    /// order. The last stage's status becomes the exit status.
    fn finish_pipeline(&mut self) -> Result<(), FatalError> {
        if self.link.is_open() {
            self.log(format_args!("closing unconsumed read end"));
        }
        self.link.reset()?;

        if self.pipeline.is_empty() {
            return Ok(());
        }

        let mut statuses = Vec::with_capacity(self.pipeline.len());
        for stage in std::mem::take(&mut self.pipeline) {
            let status = match stage {
                Stage::Running(pid) => {
                    let status = executor::wait_for(pid)?;
                    self.log(format_args!("reaped pid {} -> {}", pid, status));
                    status
                }
                Stage::Finished(status) => status,
            };
            statuses.push(status);
        }

        if let Some(&last) = statuses.last() {
            self.exit_code = last;
        }
        self.pipestatus = statuses;
        Ok(())
    }
}
