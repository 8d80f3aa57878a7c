use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Result, ToolError};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Output of a command run to completion with its streams captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs external tools. The process-backed implementation is [`SystemRunner`].
pub trait ToolRunner {
    /// Runs `cmd`, echoing each output line as it arrives, and returns the
    /// exit code.
    fn stream(&mut self, cmd: &mut Command) -> Result<i32>;

    /// Runs `cmd` with stdout and stderr captured. When `timeout` elapses
    /// first the child is killed and [`ToolError::Timeout`] is returned.
    fn capture(&mut self, cmd: &mut Command, timeout: Option<Duration>) -> Result<Captured>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

pub fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().to_string()
}

pub fn format_command(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().to_string())
        .collect();
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

fn spawn_error(cmd: &Command, err: std::io::Error) -> ToolError {
    ToolError::Spawn {
        program: program_name(cmd),
        message: err.to_string(),
    }
}

fn echo_lines<R: Read>(reader: R) {
    for line in BufReader::new(reader).lines().map_while(|l| l.ok()) {
        let line = line.trim_end();
        println!("{}", line);
        debug!("{}", line);
    }
}

fn read_all<R: Read>(mut reader: R) -> String {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf);
    String::from_utf8_lossy(&buf).to_string()
}

impl ToolRunner for SystemRunner {
    fn stream(&mut self, cmd: &mut Command) -> Result<i32> {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| spawn_error(cmd, e))?;
        let stderr_pump = child
            .stderr
            .take()
            .map(|stderr| thread::spawn(move || echo_lines(stderr)));
        if let Some(stdout) = child.stdout.take() {
            echo_lines(stdout);
        }
        if let Some(pump) = stderr_pump {
            let _ = pump.join();
        }
        let status = child.wait()?;
        Ok(status.code().unwrap_or(1))
    }

    fn capture(&mut self, cmd: &mut Command, timeout: Option<Duration>) -> Result<Captured> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| spawn_error(cmd, e))?;
        let stdout_pump = child.stdout.take().map(|s| thread::spawn(move || read_all(s)));
        let stderr_pump = child.stderr.take().map(|s| thread::spawn(move || read_all(s)));

        let deadline = timeout.map(|t| Instant::now() + t);
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if let (Some(deadline), Some(timeout)) = (deadline, timeout) {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ToolError::Timeout {
                        program: program_name(cmd),
                        seconds: timeout.as_secs(),
                    }
                    .into());
                }
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = stdout_pump
            .and_then(|pump| pump.join().ok())
            .unwrap_or_default();
        let stderr = stderr_pump
            .and_then(|pump| pump.join().ok())
            .unwrap_or_default();
        Ok(Captured {
            code: status.code().unwrap_or(1),
            stdout,
            stderr,
        })
    }
}
