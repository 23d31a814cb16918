//! System-wide constants and defaults.

/// Binary name for the CLI.
pub const BIN_NAME: &str = "ahab";

/// File name searched for in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = "ahab.json";

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_ENV: &str = "AHAB_CONFIG";

/// Container runtime executable used when none is configured.
pub const DEFAULT_RUNTIME: &str = "docker";

/// Environment variable overriding the container runtime executable.
pub const RUNTIME_ENV: &str = "AHAB_RUNTIME";

/// User injected into interactive sessions unless the policy says otherwise.
pub const DEFAULT_CONTAINER_USER: &str = "ahab";

/// User forced by `--root` on shell commands.
pub const ROOT_USER: &str = "root";

/// Prefix for container names derived from the configuration directory.
pub const CONTAINER_NAME_PREFIX: &str = "ahab_";
