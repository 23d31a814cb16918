//! Subprocess dispatch to the container runtime.
//!
//! The child shares this process's terminal: stdin and stderr are always
//! inherited, stdout is inherited unless the caller asks for it to be
//! discarded.

use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use ahab_common::error::{AhabError, Result};
use ahab_common::types::{ArgumentVector, ContainerIdentity};

use crate::args;

/// Where the child's standard output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stdout {
    /// Shared with the current process.
    Inherit,
    /// Sent to the null device.
    Discard,
}

/// Something that can execute runtime argument vectors.
pub trait Runtime {
    /// Name shown in logs and error messages.
    fn program(&self) -> &str;

    /// Runs the runtime with `args` and blocks until it exits.
    ///
    /// # Errors
    ///
    /// Returns [`AhabError::Spawn`] if the process cannot be started.
    fn run(&self, args: &ArgumentVector, stdout: Stdout) -> Result<i32>;
}

impl<R: Runtime + ?Sized> Runtime for &R {
    fn program(&self) -> &str {
        (**self).program()
    }

    fn run(&self, args: &ArgumentVector, stdout: Stdout) -> Result<i32> {
        (**self).run(args, stdout)
    }
}

/// A runtime executable found on `PATH`.
#[derive(Debug, Clone)]
pub struct DockerCli {
    name: String,
    path: PathBuf,
}

impl DockerCli {
    /// Resolves `binary` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`AhabError::Spawn`] if the binary cannot be found.
    pub fn locate(binary: &str) -> Result<Self> {
        let path = which::which(binary).map_err(|e| AhabError::Spawn {
            program: binary.to_owned(),
            reason: format!("{e} (is it installed and on PATH?)"),
        })?;
        tracing::debug!(binary, path = %path.display(), "resolved container runtime");
        Ok(Self {
            name: binary.to_owned(),
            path,
        })
    }
}

impl Runtime for DockerCli {
    fn program(&self) -> &str {
        &self.name
    }

    fn run(&self, args: &ArgumentVector, stdout: Stdout) -> Result<i32> {
        let stdout = match stdout {
            Stdout::Inherit => Stdio::inherit(),
            Stdout::Discard => Stdio::null(),
        };
        let status = Command::new(&self.path)
            .args(args.as_slice())
            .stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| AhabError::Spawn {
                program: self.name.clone(),
                reason: e.to_string(),
            })?;
        Ok(exit_code(status))
    }
}

/// Maps an exit status to a shell-style code, `128 + signal` when killed.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Runs `args` with inherited stdio, failing on a non-zero exit.
///
/// # Errors
///
/// Returns [`AhabError::Spawn`] if the process cannot start, or
/// [`AhabError::RuntimeExit`] carrying its exit code.
pub fn dispatch(runtime: &dyn Runtime, args: &ArgumentVector) -> Result<()> {
    run_checked(runtime, args, Stdout::Inherit)
}

/// Starts the container if it is stopped. Succeeds quietly when it is
/// already running.
///
/// # Errors
///
/// Same as [`dispatch`].
pub fn ensure_running(runtime: &dyn Runtime, container: &ContainerIdentity) -> Result<()> {
    tracing::info!(container = %container, "ensuring container is running");
    run_checked(runtime, &args::ensure_running(container), Stdout::Discard)
}

fn run_checked(runtime: &dyn Runtime, args: &ArgumentVector, stdout: Stdout) -> Result<()> {
    let command = args.command_line(runtime.program());
    tracing::debug!(%command, ?stdout, "dispatching");
    let code = runtime.run(args, stdout)?;
    if code == 0 {
        Ok(())
    } else {
        tracing::warn!(%command, code, "container runtime failed");
        Err(AhabError::RuntimeExit { command, code })
    }
}

/// Keeps Ctrl-C from terminating this process while a child is attached.
///
/// The foreground child receives the interrupt through the terminal and
/// its exit status is what gets propagated.
pub fn shield_interrupts() {
    if let Err(e) = ctrlc::set_handler(|| tracing::debug!("interrupt left to child process")) {
        tracing::warn!(error = %e, "could not install interrupt handler");
    }
}
