//! The fixed table of logical commands.

use std::fmt::Write as _;

use ahab_common::constants::{BIN_NAME, DEFAULT_CONTAINER_USER};
use clap::{Arg, ArgAction};

/// Id of the positional argument holding pass-through tokens.
pub const TOKENS: &str = "tokens";

/// Id of the `--root` flag on shell commands.
pub const ROOT: &str = "root";

/// How a logical command's argument vector is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `[command, container]`.
    NoOption,
    /// `[command, ...tokens, container]`.
    OptionPassthrough,
    /// Ensure running, then `exec -it` a shell.
    ShellAttach {
        /// Shell binary inside the container.
        shell: &'static str,
        /// Human-readable shell name for help text.
        description: &'static str,
    },
    /// Ensure running, then `exec -it` the given tokens.
    Exec,
    /// A fixed invocation that does not target the container.
    Global {
        /// Runtime arguments.
        args: &'static [&'static str],
    },
    /// Only the ensure-running step.
    Up,
}

/// A user-facing subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalCommand {
    /// Subcommand name, unique across the table.
    pub name: &'static str,
    /// One-line summary.
    pub description: &'static str,
    /// Construction strategy.
    pub strategy: Strategy,
}

const fn no_option(name: &'static str, description: &'static str) -> LogicalCommand {
    LogicalCommand {
        name,
        description,
        strategy: Strategy::NoOption,
    }
}

const fn option(name: &'static str, description: &'static str) -> LogicalCommand {
    LogicalCommand {
        name,
        description,
        strategy: Strategy::OptionPassthrough,
    }
}

const fn shell(
    name: &'static str,
    description: &'static str,
    shell_description: &'static str,
) -> LogicalCommand {
    LogicalCommand {
        name,
        description,
        strategy: Strategy::ShellAttach {
            shell: name,
            description: shell_description,
        },
    }
}

/// Every logical command, in help order.
pub static COMMANDS: &[LogicalCommand] = &[
    LogicalCommand {
        name: "cmd",
        description: "Execute an attached command in the container",
        strategy: Strategy::Exec,
    },
    LogicalCommand {
        name: "lsv",
        description: "List volumes",
        strategy: Strategy::Global {
            args: &["volume", "ls"],
        },
    },
    LogicalCommand {
        name: "up",
        description: "Start the container if it is not already running",
        strategy: Strategy::Up,
    },
    // Commands that take no options
    no_option(
        "diff",
        "Inspect changes to files or directories on container filesystem",
    ),
    no_option("pause", "Pause all processes within container"),
    no_option("port", "List port mappings for the container"),
    no_option("top", "Display the running processes of the container"),
    no_option("unpause", "Unpause all processes within container"),
    no_option(
        "wait",
        "Block until the container stops, then print its exit code",
    ),
    // Commands that take options
    option(
        "attach",
        "Attach local standard input, output, and error streams to container",
    ),
    option("commit", "Create a new image from container's changes"),
    option("export", "Export container's filesystem as a tar archive"),
    option("kill", "Kill container"),
    option("logs", "Fetch the container logs"),
    option("restart", "Restart container"),
    option("rm", "Remove container"),
    option("start", "Start stopped container"),
    option(
        "stats",
        "Display a live stream of container resource usage statistics",
    ),
    option("stop", "Stop running container"),
    option("update", "Update configuration of the container"),
    // Shell attachment
    shell("bash", "Open a containerized bash shell", "bash"),
    shell("sh", "Open a containerized bourne shell", "bourne"),
    shell("zsh", "Open a containerized z shell", "z"),
];

/// Looks up a command by name.
pub fn find(name: &str) -> Option<&'static LogicalCommand> {
    COMMANDS.iter().find(|command| command.name == name)
}

impl LogicalCommand {
    /// Whether help flags arrive as raw tokens and must be intercepted.
    pub const fn intercepts_help(&self) -> bool {
        matches!(self.strategy, Strategy::OptionPassthrough | Strategy::Exec)
    }

    /// Long help: the summary, the `runtime` invocation it stands for, and
    /// for pass-through commands the usage line.
    pub fn long_help(&self, runtime: &str) -> String {
        let name = self.name;
        let mut help = String::new();
        let (runtime_line, usage) = match self.strategy {
            Strategy::NoOption => (format!("{name} CONTAINER"), None),
            Strategy::OptionPassthrough => (
                format!("{name} [OPTIONS] CONTAINER"),
                Some(format!("{name} [-h/--help] [OPTIONS]")),
            ),
            Strategy::Exec => (
                "exec -it [-u USER] CONTAINER COMMAND [OPTIONS]".to_owned(),
                Some(format!("{name} [-h/--help] COMMAND [OPTIONS]")),
            ),
            Strategy::ShellAttach { shell, description } => {
                let _ = write!(
                    help,
                    "Attach a containerized {description} shell to the active terminal.\n\n\
                     *Warning!* the {description} shell must be installed in your image \
                     for this command to function!\n\n"
                );
                (
                    format!("exec -it [-u {DEFAULT_CONTAINER_USER}] CONTAINER {shell}"),
                    None,
                )
            }
            Strategy::Global { args } => (args.join(" "), None),
            Strategy::Up => ("start CONTAINER".to_owned(), None),
        };

        if !matches!(self.strategy, Strategy::ShellAttach { .. }) {
            let _ = write!(help, "{}\n\n", self.description);
        }
        let _ = write!(help, "Docker Command:\n  {runtime} {runtime_line}\n");
        if let Some(usage) = usage {
            let _ = write!(help, "\nUsage:\n  {BIN_NAME} {usage}\n");
        }
        help
    }

    /// Builds the clap subcommand for this entry.
    pub fn to_clap(&self, runtime: &str) -> clap::Command {
        let command = clap::Command::new(self.name)
            .about(self.description)
            .long_about(self.long_help(runtime));
        match self.strategy {
            Strategy::OptionPassthrough | Strategy::Exec => command.disable_help_flag(true).arg(
                Arg::new(TOKENS)
                    .help("Arguments passed verbatim to the container runtime")
                    .value_name("ARGS")
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true),
            ),
            Strategy::ShellAttach { description, .. } => command.arg(
                Arg::new(ROOT)
                    .long("root")
                    .help(format!("Use {description} shell as root"))
                    .action(ArgAction::SetTrue),
            ),
            Strategy::NoOption | Strategy::Global { .. } | Strategy::Up => command,
        }
    }
}
