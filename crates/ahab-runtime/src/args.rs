//! Argument vector construction.
//!
//! Every function here is pure: the same inputs always give the same
//! vector, and no placeholder survives into the result.

use ahab_common::constants::ROOT_USER;
use ahab_common::types::{ArgumentVector, ContainerIdentity, PermissionPolicy};

/// Everything an interactive session needs to choose its user.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    /// Target container.
    pub container: &'a ContainerIdentity,
    /// Permission settings from the configuration.
    pub policy: &'a PermissionPolicy,
    /// User injected when the policy allows it.
    pub default_user: &'a str,
    /// Forces the root user (shell commands only).
    pub as_root: bool,
}

impl SessionContext<'_> {
    /// Picks the user for `-u`, or `None` to omit the flag.
    ///
    /// Order: `--root`, then the configured override, then the default user
    /// unless disabled.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        if self.as_root {
            Some(ROOT_USER)
        } else if let Some(user) = self.policy.override_user() {
            Some(user)
        } else if self.policy.disable_default_user {
            None
        } else {
            Some(self.default_user)
        }
    }

    fn exec_prefix(&self) -> ArgumentVector {
        let mut args: ArgumentVector = ["exec", "-it"].into_iter().collect();
        if let Some(user) = self.user() {
            args.extend(["-u", user]);
        }
        args.push(self.container.as_str());
        args
    }
}

/// `[command, container]`
#[must_use]
pub fn no_option(command: &str, container: &ContainerIdentity) -> ArgumentVector {
    [command, container.as_str()].into_iter().collect()
}

/// `[command, ...tokens, container]`, tokens untouched.
#[must_use]
pub fn passthrough(
    command: &str,
    tokens: &[String],
    container: &ContainerIdentity,
) -> ArgumentVector {
    let mut args = ArgumentVector::new();
    args.push(command);
    args.extend(tokens.iter().cloned());
    args.push(container.as_str());
    args
}

/// `[exec, -it, (-u user), container, shell]`
#[must_use]
pub fn shell_attach(shell: &str, session: &SessionContext<'_>) -> ArgumentVector {
    let mut args = session.exec_prefix();
    args.push(shell);
    args
}

/// `[exec, -it, (-u user), container, ...tokens]`
///
/// `--root` has no meaning here and is ignored.
#[must_use]
pub fn exec(tokens: &[String], session: &SessionContext<'_>) -> ArgumentVector {
    let session = SessionContext {
        as_root: false,
        ..*session
    };
    let mut args = session.exec_prefix();
    args.extend(tokens.iter().cloned());
    args
}

/// Idempotent start of a possibly stopped container.
#[must_use]
pub fn ensure_running(container: &ContainerIdentity) -> ArgumentVector {
    no_option("start", container)
}

/// A fixed invocation that needs no container, such as `volume ls`.
#[must_use]
pub fn global(args: &[&str]) -> ArgumentVector {
    args.iter().copied().collect()
}
