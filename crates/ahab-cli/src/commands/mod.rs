//! CLI command definitions and dispatch.
//!
//! Subcommands are generated from [`registry::COMMANDS`] and executed by
//! one handler per [`registry::Strategy`].

pub mod help;
pub mod registry;

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use ahab_common::constants::{CONFIG_ENV, DEFAULT_CONTAINER_USER, DEFAULT_RUNTIME, RUNTIME_ENV};
use ahab_runtime::args::{self, SessionContext};
use ahab_runtime::dispatch;
use anyhow::Context;
use clap::{ArgMatches, CommandFactory, Parser};

use crate::commands::registry::{LogicalCommand, ROOT, Strategy, TOKENS};
use crate::host::Host;

/// ahab: launch and work in a Dockerized environment.
#[derive(Parser, Debug)]
#[command(name = "ahab", version, about, long_about = None)]
pub struct GlobalArgs {
    /// Log every runtime invocation.
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file to use instead of searching for `ahab.json`.
    #[arg(long, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Container runtime executable.
    #[arg(long, env = RUNTIME_ENV, default_value = DEFAULT_RUNTIME)]
    pub runtime: String,
}

/// Global options that consume the following argument.
const VALUE_FLAGS: &[&str] = &["--config", "--runtime"];

/// Builds the full command tree, with help text naming `runtime`.
pub fn cli(runtime: &str) -> clap::Command {
    GlobalArgs::command()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommands(registry::COMMANDS.iter().map(|c| c.to_clap(runtime)))
}

/// Process arguments split at a raw-token subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    /// Arguments for clap: everything up to and including the subcommand.
    pub head: Vec<OsString>,
    /// Everything after a pass-through subcommand, byte for byte.
    pub raw: Option<Vec<OsString>>,
    /// `--runtime` value given before the subcommand.
    pub runtime: Option<String>,
}

/// Splits `argv` so that pass-through tokens never reach clap.
///
/// clap treats a leading `--` as its own separator. Tokens after
/// `cmd`, `stop` and the other pass-through commands are cut off here and
/// handed over unparsed.
pub fn split_command_line<I, T>(argv: I) -> CommandLine
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = argv.into_iter().map(Into::into);
    let mut line = CommandLine::default();
    line.head.extend(args.next());

    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy().into_owned();
        line.head.push(arg);
        if text == "--" {
            break;
        }
        if text.starts_with('-') {
            if VALUE_FLAGS.contains(&text.as_str()) {
                if let Some(value) = args.next() {
                    if text == "--runtime" {
                        line.runtime = Some(value.to_string_lossy().into_owned());
                    }
                    line.head.push(value);
                }
            } else if let Some(value) = text.strip_prefix("--runtime=") {
                line.runtime = Some(value.to_owned());
            }
            continue;
        }
        if registry::find(&text).is_some_and(LogicalCommand::intercepts_help) {
            line.raw = Some(args.collect());
            return line;
        }
        break;
    }
    line.head.extend(args);
    line
}

/// Per-invocation inputs taken from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Raw tokens for pass-through commands.
    pub tokens: Vec<String>,
    /// `--root` on shell commands.
    pub as_root: bool,
}

impl Invocation {
    fn from_matches(
        command: &LogicalCommand,
        matches: &ArgMatches,
        raw: Option<&[OsString]>,
    ) -> anyhow::Result<Self> {
        let tokens: Vec<String> = if !command.intercepts_help() {
            Vec::new()
        } else if let Some(raw) = raw {
            raw.iter()
                .map(|token| {
                    token.to_str().map(str::to_owned).with_context(|| {
                        format!("argument is not valid UTF-8: {}", token.to_string_lossy())
                    })
                })
                .collect::<anyhow::Result<_>>()?
        } else {
            matches
                .get_many::<String>(TOKENS)
                .map(|values| values.cloned().collect())
                .unwrap_or_default()
        };
        let as_root = matches!(command.strategy, Strategy::ShellAttach { .. })
            && matches.get_flag(ROOT);
        Ok(Self { tokens, as_root })
    }
}

/// Dispatches the parsed command line.
///
/// `raw` holds the untouched tokens from [`split_command_line`] and takes
/// precedence over anything clap collected.
///
/// # Errors
///
/// Returns an error if the subcommand is unknown, configuration cannot be
/// resolved, or the runtime fails.
pub fn execute(
    matches: &ArgMatches,
    raw: Option<&[OsString]>,
    host: &dyn Host,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let (name, sub_matches) = matches
        .subcommand()
        .context("no subcommand given")?;
    let command = registry::find(name).with_context(|| format!("unknown command: {name}"))?;
    let invocation = Invocation::from_matches(command, sub_matches, raw)?;
    run(command, invocation, host, out)
}

/// Runs one logical command.
///
/// # Errors
///
/// See [`execute`].
pub fn run(
    command: &LogicalCommand,
    mut invocation: Invocation,
    host: &dyn Host,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    if command.intercepts_help()
        && help::intercept(
            &mut invocation.tokens,
            &command.long_help(host.runtime_name()),
            out,
        )?
    {
        return Ok(());
    }
    if let Strategy::Global { args: global } = command.strategy {
        let runtime = host.runtime()?;
        dispatch::dispatch(&*runtime, &args::global(global))?;
        return Ok(());
    }

    let loaded = host
        .load_config()
        .context("cannot resolve the target container")?;
    let container = loaded.identity()?;
    let policy = loaded.policy();
    let runtime = host.runtime()?;
    tracing::debug!(command = command.name, container = %container, "running");

    let session = SessionContext {
        container: &container,
        policy: &policy,
        default_user: DEFAULT_CONTAINER_USER,
        as_root: invocation.as_root,
    };

    match command.strategy {
        Strategy::NoOption => {
            dispatch::dispatch(&*runtime, &args::no_option(command.name, &container))?;
        }
        Strategy::OptionPassthrough => {
            let argv = args::passthrough(command.name, &invocation.tokens, &container);
            dispatch::dispatch(&*runtime, &argv)?;
        }
        Strategy::ShellAttach { shell, .. } => {
            dispatch::ensure_running(&*runtime, &container)?;
            dispatch::dispatch(&*runtime, &args::shell_attach(shell, &session))?;
        }
        Strategy::Exec => {
            dispatch::ensure_running(&*runtime, &container)?;
            dispatch::dispatch(&*runtime, &args::exec(&invocation.tokens, &session))?;
        }
        Strategy::Up => dispatch::ensure_running(&*runtime, &container)?,
        Strategy::Global { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;

    use ahab_common::config::{ContainerConfig, LoadedConfig, Permissions};
    use ahab_common::error::{AhabError, Result};
    use ahab_common::types::ArgumentVector;
    use ahab_runtime::dispatch::{Runtime, Stdout};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(Vec<String>, Stdout)>>,
        fail_with: Option<i32>,
    }

    impl Runtime for Recorder {
        fn program(&self) -> &str {
            "docker"
        }

        fn run(&self, args: &ArgumentVector, stdout: Stdout) -> Result<i32> {
            self.calls
                .borrow_mut()
                .push((args.as_slice().to_vec(), stdout));
            Ok(self.fail_with.unwrap_or(0))
        }
    }

    struct FakeHost {
        config: Option<ContainerConfig>,
        recorder: Recorder,
        config_loads: Cell<usize>,
        runtime_name: &'static str,
    }

    impl FakeHost {
        fn with(config: ContainerConfig) -> Self {
            Self {
                config: Some(config),
                recorder: Recorder::default(),
                config_loads: Cell::new(0),
                runtime_name: "docker",
            }
        }

        fn unconfigured() -> Self {
            Self {
                config: None,
                recorder: Recorder::default(),
                config_loads: Cell::new(0),
                runtime_name: "docker",
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.recorder
                .calls
                .borrow()
                .iter()
                .map(|(args, _)| args.clone())
                .collect()
        }
    }

    impl Host for FakeHost {
        fn load_config(&self) -> Result<LoadedConfig> {
            self.config_loads.set(self.config_loads.get() + 1);
            self.config
                .clone()
                .map(|config| LoadedConfig {
                    path: PathBuf::from("/work/project/ahab.json"),
                    config,
                })
                .ok_or_else(|| AhabError::Config {
                    message: "no ahab.json found".into(),
                })
        }

        fn runtime(&self) -> Result<Box<dyn Runtime + '_>> {
            Ok(Box::new(&self.recorder))
        }

        fn runtime_name(&self) -> &str {
            self.runtime_name
        }
    }

    fn web1() -> ContainerConfig {
        ContainerConfig {
            name: Some("web1".into()),
            ..ContainerConfig::default()
        }
    }

    fn run_line(host: &FakeHost, line: &[&str]) -> (anyhow::Result<()>, String) {
        let split = split_command_line(std::iter::once("ahab").chain(line.iter().copied()));
        let matches = cli(host.runtime_name)
            .try_get_matches_from(split.head.iter().cloned())
            .expect("command line parses");
        let mut out = Vec::new();
        let result = execute(&matches, split.raw.as_deref(), host, &mut out);
        (result, String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn command_tree_is_consistent() {
        cli("docker").debug_assert();
    }

    #[test]
    fn value_flags_match_global_args() {
        let mut longs: Vec<String> = GlobalArgs::command()
            .get_arguments()
            .filter(|arg| arg.get_action().takes_values())
            .filter_map(clap::Arg::get_long)
            .map(|long| format!("--{long}"))
            .collect();
        longs.sort();
        assert_eq!(longs, VALUE_FLAGS);
    }

    #[test]
    fn split_stops_at_pass_through_subcommand() {
        let line = split_command_line([
            "ahab", "--runtime", "podman", "-v", "logs", "--runtime", "x", "--", "-f",
        ]);
        assert_eq!(line.head, ["ahab", "--runtime", "podman", "-v", "logs"]);
        assert_eq!(
            line.raw,
            Some(vec!["--runtime".into(), "x".into(), "--".into(), "-f".into()])
        );
        assert_eq!(line.runtime.as_deref(), Some("podman"));
    }

    #[test]
    fn split_skips_global_option_values() {
        let line = split_command_line(["ahab", "--config", "stop", "kill", "-s", "HUP"]);
        assert_eq!(line.head, ["ahab", "--config", "stop", "kill"]);
        assert_eq!(line.raw, Some(vec!["-s".into(), "HUP".into()]));
    }

    #[test]
    fn split_leaves_parsed_subcommands_to_clap() {
        let line = split_command_line(["ahab", "--runtime=podman", "bash", "--root"]);
        assert_eq!(line.head, ["ahab", "--runtime=podman", "bash", "--root"]);
        assert_eq!(line.raw, None);
        assert_eq!(line.runtime.as_deref(), Some("podman"));
    }

    #[test]
    fn leading_double_dash_is_passed_through() {
        let host = FakeHost::with(web1());
        run_line(&host, &["stop", "--", "-t", "5"]).0.expect("stop succeeds");
        assert_eq!(host.calls(), vec![vec!["stop", "--", "-t", "5", "web1"]]);
    }

    #[test]
    fn help_after_double_dash_is_dispatched() {
        let host = FakeHost::with(web1());
        let (result, out) = run_line(&host, &["stop", "--", "-h"]);
        result.expect("stop succeeds");
        assert!(out.is_empty());
        assert_eq!(host.calls(), vec![vec!["stop", "--", "-h", "web1"]]);
    }

    #[test]
    fn cmd_keeps_double_dash() {
        let host = FakeHost::with(web1());
        run_line(&host, &["cmd", "--", "ls"]).0.expect("cmd succeeds");
        assert_eq!(
            host.calls(),
            vec![
                vec!["start", "web1"],
                vec!["exec", "-it", "-u", "ahab", "web1", "--", "ls"]
            ]
        );
    }

    #[test]
    fn intercepted_help_names_configured_runtime() {
        let host = FakeHost {
            runtime_name: "podman",
            ..FakeHost::unconfigured()
        };
        let (result, out) = run_line(&host, &["stop", "--help"]);
        result.expect("help succeeds");
        assert!(out.contains("  podman stop [OPTIONS] CONTAINER\n"));
        assert!(host.calls().is_empty());
    }

    #[test]
    fn stop_passes_options_before_container() {
        let host = FakeHost::with(web1());
        let (result, _) = run_line(&host, &["stop", "-t", "5"]);
        result.expect("stop succeeds");
        assert_eq!(host.calls(), vec![vec!["stop", "-t", "5", "web1"]]);
    }

    #[test]
    fn no_option_command_targets_container() {
        let host = FakeHost::with(web1());
        run_line(&host, &["top"]).0.expect("top succeeds");
        assert_eq!(host.calls(), vec![vec!["top", "web1"]]);
    }

    #[test]
    fn bash_ensures_running_then_attaches_default_user() {
        let host = FakeHost::with(ContainerConfig {
            user: Some(String::new()),
            ..web1()
        });
        run_line(&host, &["bash"]).0.expect("bash succeeds");

        let calls = host.recorder.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], (vec!["start".to_owned(), "web1".to_owned()], Stdout::Discard));
        assert_eq!(calls[1].0, ["exec", "-it", "-u", "ahab", "web1", "bash"]);
        assert_eq!(calls[1].1, Stdout::Inherit);
    }

    #[test]
    fn root_flag_overrides_configured_user() {
        let host = FakeHost::with(ContainerConfig {
            user: Some("alice".into()),
            ..web1()
        });
        run_line(&host, &["zsh", "--root"]).0.expect("zsh succeeds");
        assert_eq!(host.calls()[1], ["exec", "-it", "-u", "root", "web1", "zsh"]);
    }

    #[test]
    fn cmd_respects_disabled_permissions() {
        let host = FakeHost::with(ContainerConfig {
            permissions: Permissions { disable: true },
            ..web1()
        });
        run_line(&host, &["cmd", "ls", "-la"]).0.expect("cmd succeeds");
        assert_eq!(
            host.calls(),
            vec![vec!["start", "web1"], vec!["exec", "-it", "web1", "ls", "-la"]]
        );
    }

    #[test]
    fn help_never_touches_config_or_runtime() {
        for line in [&["stop", "--help"][..], &["cmd", "-h"][..], &["logs", "-h", "-f"][..]] {
            let host = FakeHost::unconfigured();
            let (result, out) = run_line(&host, line);
            result.expect("help succeeds without configuration");
            assert!(out.contains("Docker Command:"), "help printed for {line:?}");
            assert!(host.calls().is_empty());
            assert_eq!(host.config_loads.get(), 0);
        }
    }

    #[test]
    fn lsv_needs_no_configuration() {
        let host = FakeHost::unconfigured();
        run_line(&host, &["lsv"]).0.expect("lsv succeeds");
        assert_eq!(host.calls(), vec![vec!["volume", "ls"]]);
        assert_eq!(host.config_loads.get(), 0);
    }

    #[test]
    fn missing_configuration_is_fatal_before_dispatch() {
        let host = FakeHost::unconfigured();
        let err = run_line(&host, &["kill"]).0.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AhabError>(),
            Some(AhabError::Config { .. })
        ));
        assert!(host.calls().is_empty());
    }

    #[test]
    fn failed_start_skips_attach() {
        let host = FakeHost {
            recorder: Recorder {
                fail_with: Some(1),
                ..Recorder::default()
            },
            ..FakeHost::with(web1())
        };
        let err = run_line(&host, &["sh"]).0.unwrap_err();
        assert_eq!(
            err.downcast_ref::<AhabError>().map(AhabError::exit_code),
            Some(1)
        );
        assert_eq!(host.calls(), vec![vec!["start", "web1"]]);
    }

    #[test]
    fn runtime_exit_code_is_preserved() {
        let host = FakeHost {
            recorder: Recorder {
                fail_with: Some(125),
                ..Recorder::default()
            },
            ..FakeHost::with(web1())
        };
        let err = run_line(&host, &["rm", "-f"]).0.unwrap_err();
        assert_eq!(
            err.downcast_ref::<AhabError>().map(AhabError::exit_code),
            Some(125)
        );
    }

    #[test]
    fn up_only_ensures_running() {
        let host = FakeHost::with(web1());
        run_line(&host, &["up"]).0.expect("up succeeds");
        assert_eq!(host.calls(), vec![vec!["start", "web1"]]);
    }
}
