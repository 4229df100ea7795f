//! Per-session shell state: working directory, environment, history, user.

use indexmap::IndexMap;

use crate::config::{DEFAULT_PATH_VAR, DEFAULT_SHELL};

/// Mutable record owned by one shell session.
///
/// `current_path` and `PWD` are always kept in sync, as are `current_user`
/// and `USER`.
#[derive(Clone, Debug)]
pub struct ShellState {
    current_path: String,
    environment: IndexMap<String, String>,
    history: Vec<String>,
    current_user: String,
}

impl ShellState {
    /// Create state for `user`, starting in `current_path`.
    pub fn new(user: &str, home: &str, current_path: &str) -> Self {
        let mut environment = IndexMap::new();
        environment.insert("USER".to_string(), user.to_string());
        environment.insert("HOME".to_string(), home.to_string());
        environment.insert("PWD".to_string(), current_path.to_string());
        environment.insert("PATH".to_string(), DEFAULT_PATH_VAR.to_string());
        environment.insert("SHELL".to_string(), DEFAULT_SHELL.to_string());

        Self {
            current_path: current_path.to_string(),
            environment,
            history: Vec::new(),
            current_user: user.to_string(),
        }
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Change directory. The caller has already verified `path` is a directory.
    pub fn set_current_path(&mut self, path: impl Into<String>) {
        self.current_path = path.into();
        self.environment
            .insert("PWD".to_string(), self.current_path.clone());
    }

    pub fn current_user(&self) -> &str {
        &self.current_user
    }

    pub fn set_current_user(&mut self, user: impl Into<String>) {
        self.current_user = user.into();
        self.environment
            .insert("USER".to_string(), self.current_user.clone());
    }

    /// Home directory from the environment (`/` if unset).
    pub fn home(&self) -> &str {
        self.environment
            .get("HOME")
            .map(String::as_str)
            .unwrap_or("/")
    }

    pub fn environment(&self) -> &IndexMap<String, String> {
        &self.environment
    }

    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str)
    }

    pub fn set_var(&mut self, key: &str, value: &str) {
        self.environment.insert(key.to_string(), value.to_string());
    }

    /// Remove a variable, returning whether it existed.
    pub fn unset_var(&mut self, key: &str) -> bool {
        self.environment.shift_remove(key).is_some()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn push_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }
}
