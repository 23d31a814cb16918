//! Domain primitive types used across the ahab workspace.

use std::fmt;

use crate::error::{AhabError, Result};

/// Name of the container every command in a session targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerIdentity(String);

impl ContainerIdentity {
    /// Creates an identity from a container name.
    ///
    /// # Errors
    ///
    /// Returns [`AhabError::Config`] if the name is empty or only whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AhabError::Config {
                message: "container name is empty".into(),
            });
        }
        Ok(Self(name))
    }

    /// Returns the container name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which user, if any, is injected into interactive sessions.
///
/// A non-empty `override_user` wins. Otherwise the default user is injected
/// unless `disable_default_user` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionPolicy {
    /// Explicit user from the configuration.
    pub override_user: Option<String>,
    /// Suppresses the default user when no override is present.
    pub disable_default_user: bool,
}

impl PermissionPolicy {
    /// Returns the override user, treating an empty string as unset.
    #[must_use]
    pub fn override_user(&self) -> Option<&str> {
        self.override_user.as_deref().filter(|user| !user.is_empty())
    }
}

/// Fully resolved argument list handed to the container runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentVector(Vec<String>);

impl ArgumentVector {
    /// Creates an empty vector.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends one argument.
    pub fn push(&mut self, arg: impl Into<String>) {
        self.0.push(arg.into());
    }

    /// Appends every argument in order.
    pub fn extend<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(args.into_iter().map(Into::into));
    }

    /// Returns the arguments as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Renders the invocation as a shell-like command line for logs and errors.
    #[must_use]
    pub fn command_line(&self, program: &str) -> String {
        let mut line = String::from(program);
        for arg in &self.0 {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push('\'');
                line.push_str(arg);
                line.push('\'');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

impl<S: Into<String>> FromIterator<S> for ArgumentVector {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl PartialEq<[&str]> for ArgumentVector {
    fn eq(&self, other: &[&str]) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for ArgumentVector {
    fn eq(&self, other: &[&str; N]) -> bool {
        *self == other[..]
    }
}
