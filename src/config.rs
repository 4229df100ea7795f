//! Application configuration.
//!
//! Centralizes all configuration constants used throughout the shell.
//! Text assets are loaded at compile time using `include_str!`.

use crate::models::FsNode;

// =============================================================================
// Text Assets (loaded at compile time)
// =============================================================================

/// Help text for `help` command.
pub const HELP_TEXT: &str = include_str!("../assets/text/help.txt");

/// Seed content for `~/README.txt`.
pub const README_TEXT: &str = include_str!("../assets/text/readme.txt");

/// Seed content for `~/about.txt`.
pub const ABOUT_TEXT: &str = include_str!("../assets/text/about.txt");

/// Seed content for `/etc/motd`.
pub const MOTD_TEXT: &str = include_str!("../assets/text/motd.txt");

// =============================================================================
// Identity
// =============================================================================

/// Hostname shown in the prompt.
pub const HOSTNAME: &str = "ripline";

/// User the session starts as when nothing was persisted.
pub const DEFAULT_USER: &str = "user";

/// User `su` switches to without an argument.
pub const SUPERUSER: &str = "root";

/// `uname` output.
pub const UNAME_SHORT: &str = "RIPLINE";

/// `uname -a` output.
pub const UNAME_LONG: &str = "RIPLINE 1.0.0 ripline x86_64 GNU/Linux";

// =============================================================================
// Environment Variables
// =============================================================================

/// Initial `PATH`.
pub const DEFAULT_PATH_VAR: &str = "/usr/local/bin:/usr/bin:/bin";

/// Initial `SHELL`.
pub const DEFAULT_SHELL: &str = "/bin/bash";

// =============================================================================
// Persistence
// =============================================================================

/// Prefix for every persisted key (`ripline_filesystem`, ...).
pub const STORAGE_PREFIX: &str = "ripline";

/// Logical persistence keys.
pub mod storage_keys {
    pub const FILESYSTEM: &str = "filesystem";
    pub const CURRENT_PATH: &str = "current_path";
    pub const CURRENT_USER: &str = "current_user";
}

/// Environment variable holding the log filter for the native binary.
pub const LOG_ENV_VAR: &str = "RIPSH_LOG";

// =============================================================================
// Session Configuration
// =============================================================================

/// Options for constructing a [`Shell`](crate::Shell).
#[derive(Clone, Debug)]
pub struct ShellConfig {
    /// User the session starts as (overridden by a persisted user).
    pub username: String,
    /// Hostname shown in the prompt.
    pub hostname: String,
    /// Initial tree (overridden by a persisted tree).
    pub filesystem: FsNode,
    /// Prefix for persisted keys.
    pub storage_prefix: String,
    /// Start in `$HOME` even if a working directory was persisted.
    pub start_in_home: bool,
}

impl ShellConfig {
    /// Config for `username` with the default seed filesystem.
    pub fn for_user(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            filesystem: default_filesystem(&username),
            username,
            ..Self::default()
        }
    }

    pub fn with_filesystem(mut self, filesystem: FsNode) -> Self {
        self.filesystem = filesystem;
        self
    }

    pub fn with_storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_prefix = prefix.into();
        self
    }

    pub fn with_start_in_home(mut self, start_in_home: bool) -> Self {
        self.start_in_home = start_in_home;
        self
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USER.to_string(),
            hostname: HOSTNAME.to_string(),
            filesystem: default_filesystem(DEFAULT_USER),
            storage_prefix: STORAGE_PREFIX.to_string(),
            start_in_home: true,
        }
    }
}

/// Home directory for a user.
pub fn home_dir(user: &str) -> String {
    if user == SUPERUSER {
        "/root".to_string()
    } else {
        format!("/home/{}", user)
    }
}

/// Seed filesystem with a home directory for `user`.
pub fn default_filesystem(user: &str) -> FsNode {
    let home = FsNode::directory_with([
        ("README.txt", FsNode::file(README_TEXT)),
        ("about.txt", FsNode::file(ABOUT_TEXT)),
    ]);

    let mut homes = vec![];
    let mut root_home = FsNode::directory();
    if user == SUPERUSER {
        root_home = home;
    } else {
        homes.push((user.to_string(), home));
    }

    FsNode::directory_with([
        ("home", FsNode::directory_with(homes)),
        ("root", root_home),
        ("etc", FsNode::directory_with([("motd", FsNode::file(MOTD_TEXT))])),
        ("tmp", FsNode::directory()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_dir() {
        assert_eq!(home_dir("user"), "/home/user");
        assert_eq!(home_dir("root"), "/root");
    }

    #[test]
    fn test_default_filesystem_has_home() {
        let root = default_filesystem("kmitnick");
        let home = &root.entries().unwrap()["home"];
        let user = &home.entries().unwrap()["kmitnick"];
        assert!(user.entries().unwrap().contains_key("README.txt"));
    }

    #[test]
    fn test_default_filesystem_for_root() {
        let root = default_filesystem("root");
        let root_home = &root.entries().unwrap()["root"];
        assert!(root_home.entries().unwrap().contains_key("about.txt"));
        assert!(root.entries().unwrap()["home"].entries().unwrap().is_empty());
    }

    #[test]
    fn test_for_user_seeds_matching_home() {
        let config = ShellConfig::for_user("alice");
        assert_eq!(config.username, "alice");
        let home = &config.filesystem.entries().unwrap()["home"];
        assert!(home.entries().unwrap().contains_key("alice"));
    }
}
