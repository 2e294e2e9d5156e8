//! Process runner for the system `git` command
//!
//! Every git invocation in the crate goes through a [`GitRunner`], which
//! takes the argument vector and the working directory explicitly. The
//! process working directory is never changed, so a failed command cannot
//! leave the process somewhere else.
//!
//! Using the system git picks up whatever authentication the user has
//! configured: SSH keys, credential helpers, tokens in `~/.gitconfig`.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::{Error, Result};

/// Outcome of one git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    /// Exit code, `None` when the process was killed
    pub code: Option<i32>,
    /// Stdout followed by stderr, lossily decoded
    pub output: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait for running git - allows mocking in tests
pub trait GitRunner: Send + Sync {
    /// Run git with `args` in `cwd` (the process working directory when
    /// `None`) and report how it ended. A non-zero exit is not an error here.
    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<GitOutput>;

    /// Run git and turn a non-zero exit into [`Error::Process`].
    fn run_checked(&self, args: &[&str], cwd: Option<&Path>) -> Result<String> {
        let result = self.run(args, cwd)?;
        if result.success() {
            Ok(result.output)
        } else {
            Err(Error::Process {
                command: command_line(args),
                code: result.code,
                output: result.output,
            })
        }
    }
}

/// Render an argument vector the way it would be typed.
pub fn command_line(args: &[&str]) -> String {
    let mut line = String::from("git");
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// The default runner, backed by the `git` executable on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: String,
    timeout: Option<Duration>,
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SystemGit {
    /// Create a runner. With a timeout, an invocation running longer is
    /// killed and reported with no exit code.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            program: "git".to_string(),
            timeout,
        }
    }

    /// Use a different executable. Only useful for tests.
    #[cfg(test)]
    fn with_program(program: &str, timeout: Option<Duration>) -> Self {
        Self {
            program: program.to_string(),
            timeout,
        }
    }

    fn wait(&self, child: &mut Child, command: &str) -> Result<Option<i32>> {
        let Some(limit) = self.timeout else {
            return Ok(child.wait()?.code());
        };

        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status.code());
            }
            if started.elapsed() >= limit {
                debug!("Killing `{}` after {:?}", command, limit);
                // The child may have exited between the poll and the kill.
                let _ = child.kill();
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(Duration::from_millis(20));
        }
    }
}

impl GitRunner for SystemGit {
    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<GitOutput> {
        let command = command_line(args);
        match cwd {
            Some(dir) => debug!("Running `{}` in {}", command, dir.display()),
            None => debug!("Running `{}`", command),
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| Error::Process {
            command: command.clone(),
            code: None,
            output: format!("failed to start {}: {}", self.program, e),
        })?;

        // Drain both pipes on their own threads so a chatty process cannot
        // block on a full pipe while we wait for it.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let code = self.wait(&mut child, &command)?;

        let mut output = String::new();
        for reader in [stdout, stderr].into_iter().flatten() {
            if let Ok(bytes) = reader.join() {
                output.push_str(&String::from_utf8_lossy(&bytes));
            }
        }

        debug!("`{}` exited with {:?}", command, code);
        Ok(GitOutput { code, output })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

/// Returns true if a `git` executable can be started.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
