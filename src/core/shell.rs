//! The shell session facade.
//!
//! [`Shell`] owns the filesystem, the shell state and the persistence
//! backend, and is the single entry point a host talks to: it executes
//! lines, answers completion requests and exposes what the prompt needs.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{ShellConfig, home_dir};
use crate::core::autocomplete::{CompletionResult, get_completions};
use crate::core::commands::{Command, ExecContext, Outcome, execute_command};
use crate::core::error::{CommandError, FsError, StorageError};
use crate::core::filesystem::VirtualFs;
use crate::core::parser::parse_input;
use crate::core::state::ShellState;
use crate::core::storage::{MemoryStorage, Storage, StorageKeys};
use crate::models::{EditorRequest, FsNode, WriteMode};
use crate::utils::format::format_prompt;

/// One shell session.
pub struct Shell {
    fs: VirtualFs,
    state: ShellState,
    storage: Box<dyn Storage>,
    keys: StorageKeys,
    hostname: String,
    editor_request: Option<EditorRequest>,
}

impl Shell {
    /// Start a session, restoring persisted state from `storage`.
    ///
    /// Missing or corrupt values fall back to `config`; whatever was not
    /// restored is written back so the next session finds it.
    pub fn new(config: ShellConfig, storage: impl Storage + 'static) -> Self {
        let mut storage: Box<dyn Storage> = Box::new(storage);
        let keys = StorageKeys::with_prefix(&config.storage_prefix);

        let loaded_fs = load_filesystem(storage.as_ref(), &keys.filesystem);
        let loaded_path = load_string(storage.as_ref(), &keys.current_path);
        let loaded_user = load_string(storage.as_ref(), &keys.current_user)
            .filter(|user| !user.is_empty());
        let restored_fs = loaded_fs.is_some();

        let fs = match loaded_fs {
            Some(fs) => fs,
            None => VirtualFs::from_root(config.filesystem.clone()).unwrap_or_else(|err| {
                tracing::warn!(%err, "seed filesystem is not a directory, starting empty");
                VirtualFs::empty()
            }),
        };

        let home = home_dir(&config.username);
        let user = loaded_user.as_deref().unwrap_or(&config.username);
        let start = match &loaded_path {
            Some(path) if !config.start_in_home && fs.is_directory(path) => path.as_str(),
            _ if fs.is_directory(&home) => home.as_str(),
            _ => "/",
        };

        tracing::debug!(user, start, restored_fs, "session started");
        let state = ShellState::new(user, &home, start);

        if !restored_fs {
            save_value(storage.as_mut(), &keys.filesystem, fs.root());
        }
        if loaded_path.is_none() {
            save_value(storage.as_mut(), &keys.current_path, state.current_path());
        }
        if loaded_user.is_none() {
            save_value(storage.as_mut(), &keys.current_user, state.current_user());
        }

        Self {
            fs,
            state,
            storage,
            keys,
            hostname: config.hostname,
            editor_request: None,
        }
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Execute one input line.
    ///
    /// Blank lines do nothing and are not recorded. Everything else is
    /// appended to history verbatim, run, and any resulting change persisted.
    #[tracing::instrument(level = "debug", skip(self), fields(user = %self.state.current_user()))]
    pub fn execute(&mut self, line: &str) -> Outcome {
        if line.trim().is_empty() {
            return Outcome::empty();
        }
        self.state.push_history(line);

        let path_before = self.state.current_path().to_string();
        let user_before = self.state.current_user().to_string();
        let outcome = self.dispatch(line);
        self.persist(&path_before, &user_before);
        outcome
    }

    fn dispatch(&mut self, line: &str) -> Outcome {
        let parsed = match parse_input(line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return Outcome::empty(),
            Err(err) => return Outcome::text(err.to_string()),
        };

        let Some(cmd) = Command::parse(&parsed.name, &parsed.args) else {
            return Outcome::text(CommandError::NotFound(parsed.name).to_string());
        };
        tracing::debug!(command = %parsed.name, args = ?parsed.args, "dispatch");

        let mut ctx = ExecContext {
            fs: &mut self.fs,
            state: &mut self.state,
            storage: self.storage.as_mut(),
            storage_keys: &self.keys,
            editor_request: &mut self.editor_request,
        };

        let outcome = match execute_command(cmd, &mut ctx) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(command = %parsed.name, %err, "command failed");
                return Outcome::text(format!("Error executing {}: {}", parsed.name, err));
            }
        };

        let Some(redirect) = parsed.redirect else {
            return outcome;
        };

        // Control signals have no text; the target is still created
        let target = ctx.resolve(&redirect.target);
        let content = outcome.as_text().unwrap_or_default();
        match ctx.fs.write_file(&target, content, redirect.mode) {
            Ok(()) if outcome.is_signal() => outcome,
            Ok(()) => Outcome::empty(),
            Err(err) => Outcome::text(format!("bash: {}: {}", redirect.target, err)),
        }
    }

    /// Save whatever this command changed. Failures are logged and dropped.
    fn persist(&mut self, path_before: &str, user_before: &str) {
        if self.fs.take_changed() {
            save_value(self.storage.as_mut(), &self.keys.filesystem, self.fs.root());
        }
        if self.state.current_path() != path_before {
            save_value(
                self.storage.as_mut(),
                &self.keys.current_path,
                self.state.current_path(),
            );
        }
        if self.state.current_user() != user_before {
            save_value(
                self.storage.as_mut(),
                &self.keys.current_user,
                self.state.current_user(),
            );
        }
    }

    /// Write an editor buffer back to the filesystem (overwrite) and persist.
    pub fn save_file(&mut self, path: &str, content: &str) -> Result<(), FsError> {
        let path = VirtualFs::resolve_path(self.state.current_path(), path);
        self.fs.write_file(&path, content, WriteMode::Overwrite)?;
        if self.fs.take_changed() {
            save_value(self.storage.as_mut(), &self.keys.filesystem, self.fs.root());
        }
        Ok(())
    }

    /// The file the last `vi` asked to open, if not yet taken.
    pub fn take_editor_request(&mut self) -> Option<EditorRequest> {
        self.editor_request.take()
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Complete the last word of `partial`.
    pub fn get_completions(&self, partial: &str) -> CompletionResult {
        get_completions(
            partial,
            self.state.current_path(),
            self.state.home(),
            &self.fs,
        )
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn current_path(&self) -> &str {
        self.state.current_path()
    }

    pub fn current_user(&self) -> &str {
        self.state.current_user()
    }

    pub fn environment(&self) -> &IndexMap<String, String> {
        self.state.environment()
    }

    pub fn history(&self) -> &[String] {
        self.state.history()
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn filesystem(&self) -> &VirtualFs {
        &self.fs
    }

    /// Prompt text, e.g. `user@ripline:~/docs$` (`#` for root).
    pub fn prompt(&self) -> String {
        format_prompt(
            self.state.current_user(),
            &self.hostname,
            self.state.current_path(),
            self.state.home(),
        )
    }
}

impl Default for Shell {
    /// Default configuration, nothing persisted beyond the process.
    fn default() -> Self {
        Self::new(ShellConfig::default(), MemoryStorage::new())
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("state", &self.state)
            .field("keys", &self.keys)
            .field("hostname", &self.hostname)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Persistence Helpers
// =============================================================================

fn load_filesystem(storage: &dyn Storage, key: &str) -> Option<VirtualFs> {
    let raw = storage.load(key)?;
    let root: FsNode = match serde_json::from_str(&raw) {
        Ok(root) => root,
        Err(err) => {
            tracing::warn!(key, %err, "ignoring corrupt persisted filesystem");
            return None;
        }
    };
    match VirtualFs::from_root(root) {
        Ok(fs) => Some(fs),
        Err(err) => {
            tracing::warn!(key, %err, "ignoring persisted filesystem");
            None
        }
    }
}

fn load_string(storage: &dyn Storage, key: &str) -> Option<String> {
    let raw = storage.load(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, %err, "ignoring corrupt persisted value");
            None
        }
    }
}

fn save_value<T: Serialize + ?Sized>(storage: &mut dyn Storage, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })
        .and_then(|json| storage.save(key, &json));

    if let Err(err) = result {
        tracing::warn!(%err, "failed to persist shell state");
    }
}

// =============================================================================
// Tests
// =============================================================================
