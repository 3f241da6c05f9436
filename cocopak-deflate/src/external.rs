//! External gzip backend.
//!
//! Pipes the input through a gzip-compatible program and returns what it
//! writes to stdout. The caller strips the container afterwards.

use cocopak_core::error::{CocoPakError, Result};
use std::io::Write;
use std::process::{Command, Stdio};

/// Program and arguments used for the external gzip backend.
///
/// The program must read the input on stdin and write a single gzip member
/// to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipCommand {
    /// Program to run, looked up on `PATH` unless it is a path.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
}

impl Default for GzipCommand {
    fn default() -> Self {
        Self {
            program: "gzip".to_string(),
            args: vec!["-9".to_string(), "-c".to_string()],
        }
    }
}

impl GzipCommand {
    /// `gzip -9 -c` with a different program name or path.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Run the program over `data` and collect its stdout.
    ///
    /// Stdin is fed from a scoped helper thread while the main thread drains
    /// stdout, so large inputs cannot deadlock on full pipe buffers.
    pub fn run(&self, data: &[u8]) -> Result<Vec<u8>> {
        log::debug!(
            "running {} {} on {} bytes",
            self.program,
            self.args.join(" "),
            data.len()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failure(format!("could not start: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.failure("stdin was not captured"))?;

        let (written, output) = std::thread::scope(|scope| {
            let feeder = scope.spawn(move || stdin.write_all(data));
            let output = child.wait_with_output();
            (feeder.join(), output)
        });

        let output = output.map_err(|e| self.failure(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(format!("{} ({})", output.status, stderr.trim())));
        }
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(self.failure(format!("writing stdin: {}", e))),
            Err(_) => return Err(self.failure("stdin writer panicked")),
        }

        log::debug!("{} produced {} bytes", self.program, output.stdout.len());
        Ok(output.stdout)
    }

    fn failure(&self, message: impl Into<String>) -> CocoPakError {
        CocoPakError::external_tool(self.program.clone(), message)
    }
}
