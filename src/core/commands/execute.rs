//! Command execution logic.
//!
//! Contains the `execute_command` function that runs parsed commands
//! against the virtual filesystem and shell state.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{HELP_TEXT, SUPERUSER, UNAME_LONG, UNAME_SHORT};
use crate::core::env;
use crate::core::error::{CommandError, FsError};
use crate::core::filesystem::VirtualFs;
use crate::core::state::ShellState;
use crate::core::storage::{Storage, StorageKeys};
use crate::models::{EditorRequest, EntryKind, FsNode};
use crate::utils::format::{expand_tilde, format_date};

use super::{Command, Outcome, PathArg, ps};

/// One leading and one trailing quote character.
static SURROUNDING_QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^["']|["']$"#).expect("valid quote pattern"));

/// Usernames `su` accepts.
static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_-]*$").expect("valid username pattern"));

/// Everything a command may read or change.
pub struct ExecContext<'a> {
    pub fs: &'a mut VirtualFs,
    pub state: &'a mut ShellState,
    pub storage: &'a mut dyn Storage,
    pub storage_keys: &'a StorageKeys,
    /// Set by `vi`, taken by the host
    pub editor_request: &'a mut Option<EditorRequest>,
}

impl ExecContext<'_> {
    /// Resolve a user-typed path (with `~` expansion) against the current directory.
    pub fn resolve(&self, input: &str) -> String {
        let expanded = expand_tilde(input, self.state.home());
        VirtualFs::resolve_path(self.state.current_path(), &expanded)
    }
}

/// Execute a parsed command.
///
/// Expected failures (missing files, bad operands) are `Ok` text in the
/// usual `cmd: operand: reason` shape. `Err` means the command itself broke
/// and is reported as `Error executing <name>: <message>`.
pub fn execute_command(cmd: Command, ctx: &mut ExecContext<'_>) -> Result<Outcome, CommandError> {
    let outcome = match cmd {
        Command::Help => Outcome::text(HELP_TEXT.trim_end()),
        Command::Ls(path) => execute_ls(path, ctx),
        Command::Cd(path) => execute_cd(path, ctx),
        Command::Pwd => Outcome::text(ctx.state.current_path()),
        Command::Cat(file) => execute_cat(file, ctx),
        Command::Echo(args) => {
            Outcome::text(SURROUNDING_QUOTES.replace_all(&args.join(" "), ""))
        }
        Command::Clear => Outcome::ClearScreen,
        Command::Whoami => Outcome::text(ctx.state.current_user()),
        Command::Date => Outcome::text(format_date(&chrono::Local::now())),
        Command::Uname { all } => Outcome::text(if all { UNAME_LONG } else { UNAME_SHORT }),
        Command::Env => Outcome::text(env::format_env(ctx.state)),
        Command::Export(args) => execute_export(args, ctx),
        Command::Unset(args) => execute_unset(args, ctx),
        Command::History => Outcome::text(
            ctx.state
                .history()
                .iter()
                .enumerate()
                .map(|(i, line)| format!("{}  {}", i + 1, line))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Command::Mkdir(paths) => execute_create("mkdir", paths, EntryKind::Directory, ctx),
        Command::Touch(paths) => execute_create("touch", paths, EntryKind::File, ctx),
        Command::Rm(paths) => execute_rm(paths, ctx),
        Command::Tree => execute_tree(ctx),
        Command::Vi(file) => execute_vi(file, ctx),
        Command::Su(user) => execute_su(user, ctx),
        Command::Ps(args) => Outcome::text(ps::render(&args, ctx.state.current_user())),
        Command::Reset { filesystem } => return execute_reset(filesystem, ctx),
    };
    Ok(outcome)
}

/// Execute `ls` command.
fn execute_ls(path: Option<PathArg>, ctx: &ExecContext<'_>) -> Outcome {
    let target = path.as_ref().map_or(".", PathArg::as_str);
    let resolved = ctx.resolve(target);

    match ctx.fs.lookup(&resolved) {
        None => Outcome::text(format!(
            "ls: cannot access '{}': {}",
            target,
            FsError::NoSuchEntry
        )),
        Some(FsNode::File { .. }) => Outcome::text(target),
        Some(FsNode::Directory { entries }) => Outcome::text(
            entries
                .iter()
                .map(|(name, node)| {
                    if node.is_directory() {
                        format!("{}/", name)
                    } else {
                        name.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join("  "),
        ),
    }
}

/// Execute `cd` command.
fn execute_cd(path: Option<PathArg>, ctx: &mut ExecContext<'_>) -> Outcome {
    let (shown, resolved) = match &path {
        Some(arg) => (arg.as_str().to_string(), ctx.resolve(arg.as_str())),
        None => {
            let home = ctx.state.home().to_string();
            (home.clone(), VirtualFs::normalize_path(&home))
        }
    };

    match ctx.fs.lookup(&resolved) {
        Some(node) if node.is_directory() => {
            ctx.state.set_current_path(resolved);
            Outcome::empty()
        }
        Some(_) => Outcome::text(format!("cd: {}: {}", shown, FsError::NotADirectory)),
        None => Outcome::text(format!("cd: {}: {}", shown, FsError::NoSuchEntry)),
    }
}

/// Execute `cat` command.
fn execute_cat(file: Option<PathArg>, ctx: &ExecContext<'_>) -> Outcome {
    let Some(file) = file else {
        return Outcome::text("cat: missing file operand");
    };

    match ctx.fs.read_file(&ctx.resolve(file.as_str())) {
        Ok(content) => Outcome::text(content),
        Err(err) => Outcome::text(format!("cat: {}: {}", file, err)),
    }
}

/// Execute `export` command.
fn execute_export(args: Vec<String>, ctx: &mut ExecContext<'_>) -> Outcome {
    if args.is_empty() {
        return Outcome::text(env::format_export(ctx.state));
    }
    let messages: Vec<String> = args
        .iter()
        .filter_map(|arg| env::export(ctx.state, arg))
        .collect();
    Outcome::text(messages.join("\n"))
}

/// Execute `unset` command.
fn execute_unset(args: Vec<String>, ctx: &mut ExecContext<'_>) -> Outcome {
    let messages: Vec<String> = args
        .iter()
        .filter_map(|arg| env::unset(ctx.state, arg))
        .collect();
    Outcome::text(messages.join("\n"))
}

/// Execute `mkdir` / `touch`.
fn execute_create(
    name: &str,
    paths: Vec<PathArg>,
    kind: EntryKind,
    ctx: &mut ExecContext<'_>,
) -> Outcome {
    if paths.is_empty() {
        return Outcome::text(match kind {
            EntryKind::Directory => "mkdir: missing operand",
            EntryKind::File => "touch: missing file operand",
        });
    }

    let mut errors = Vec::new();
    for path in paths {
        let resolved = ctx.resolve(path.as_str());
        if let Err(err) = ctx.fs.create_entry(&resolved, kind) {
            errors.push(match kind {
                EntryKind::Directory => {
                    format!("{}: cannot create directory '{}': {}", name, path, err)
                }
                EntryKind::File => format!("{}: cannot touch '{}': {}", name, path, err),
            });
        }
    }
    Outcome::text(errors.join("\n"))
}

/// Execute `rm` command.
fn execute_rm(paths: Vec<PathArg>, ctx: &mut ExecContext<'_>) -> Outcome {
    if paths.is_empty() {
        return Outcome::text("rm: missing operand");
    }

    let mut errors = Vec::new();
    for path in paths {
        let resolved = ctx.resolve(path.as_str());
        if let Err(err) = ctx.fs.remove_entry(&resolved) {
            errors.push(format!("rm: cannot remove '{}': {}", path, err));
        }
    }
    Outcome::text(errors.join("\n"))
}

/// Execute `tree` command.
fn execute_tree(ctx: &ExecContext<'_>) -> Outcome {
    let current = ctx.state.current_path();
    let mut lines = vec![if current == "/" {
        "/".to_string()
    } else {
        format!("{}/", current)
    }];
    render_tree(ctx.fs, current, "", &mut lines);
    Outcome::text(lines.join("\n"))
}

/// Depth-first, pre-order listing with box-drawing connectors.
fn render_tree(fs: &VirtualFs, path: &str, prefix: &str, lines: &mut Vec<String>) {
    let Ok(entries) = fs.list_entries(path) else {
        return;
    };

    let count = entries.len();
    for (index, entry) in entries.iter().enumerate() {
        let is_last = index + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{}{}{}", prefix, connector, entry.display_name()));

        if entry.is_dir {
            let child = VirtualFs::resolve_path(path, &entry.name);
            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            render_tree(fs, &child, &child_prefix, lines);
        }
    }
}

/// Execute `vi` / `vim`: stash the file for the host to open.
fn execute_vi(file: Option<PathArg>, ctx: &mut ExecContext<'_>) -> Outcome {
    let Some(file) = file else {
        return Outcome::text("vi: missing file operand");
    };

    let resolved = ctx.resolve(file.as_str());
    let content = match ctx.fs.lookup(&resolved) {
        Some(FsNode::Directory { .. }) => {
            return Outcome::text(format!("vi: {}: {}", file, FsError::IsADirectory));
        }
        Some(FsNode::File { content }) => content.clone(),
        None => match ctx.fs.lookup(&VirtualFs::parent_path(&resolved)) {
            Some(parent) if parent.is_directory() => String::new(),
            Some(_) => {
                return Outcome::text(format!("vi: {}: {}", file, FsError::NotADirectory));
            }
            None => return Outcome::text(format!("vi: {}: {}", file, FsError::NoSuchParent)),
        },
    };

    tracing::debug!(path = %resolved, "opening editor");
    *ctx.editor_request = Some(EditorRequest {
        path: resolved,
        content,
    });
    Outcome::EditorOpened
}

/// Execute `su` command.
fn execute_su(user: Option<String>, ctx: &mut ExecContext<'_>) -> Outcome {
    let user = user.unwrap_or_else(|| SUPERUSER.to_string());
    if !USERNAME.is_match(&user) {
        return Outcome::text(format!("su: user {} does not exist", user));
    }

    tracing::info!(from = ctx.state.current_user(), to = %user, "switching user");
    ctx.state.set_current_user(user.clone());
    Outcome::UserSwitched(user)
}

/// Execute `reset` command.
fn execute_reset(filesystem: bool, ctx: &mut ExecContext<'_>) -> Result<Outcome, CommandError> {
    if !filesystem {
        return Ok(Outcome::text(
            "Usage: reset --filesystem (or -f) to reset the filesystem",
        ));
    }

    for key in ctx.storage_keys.all() {
        ctx.storage.remove(key)?;
    }
    tracing::info!("persisted state cleared");
    Ok(Outcome::text(
        "Filesystem reset. Start a new session to restore the defaults.",
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_filesystem;
    use crate::core::error::StorageError;
    use crate::core::storage::MemoryStorage;
    use crate::models::WriteMode;

    struct Fixture {
        fs: VirtualFs,
        state: ShellState,
        storage: MemoryStorage,
        keys: StorageKeys,
        editor_request: Option<EditorRequest>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                fs: VirtualFs::from_root(default_filesystem("user")).unwrap(),
                state: ShellState::new("user", "/home/user", "/home/user"),
                storage: MemoryStorage::new(),
                keys: StorageKeys::with_prefix("ripline"),
                editor_request: None,
            }
        }

        fn run(&mut self, name: &str, args: &[&str]) -> Outcome {
            let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
            let cmd = Command::parse(name, &args).unwrap();
            let mut ctx = ExecContext {
                fs: &mut self.fs,
                state: &mut self.state,
                storage: &mut self.storage,
                storage_keys: &self.keys,
                editor_request: &mut self.editor_request,
            };
            execute_command(cmd, &mut ctx).unwrap()
        }

        fn text(&mut self, name: &str, args: &[&str]) -> String {
            match self.run(name, args) {
                Outcome::Text(text) => text,
                other => panic!("expected text, got {:?}", other),
            }
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    #[test]
    fn test_ls_current_directory() {
        let mut fx = Fixture::new();
        fx.text("mkdir", &["docs"]);
        assert_eq!(fx.text("ls", &[]), "README.txt  about.txt  docs/");
    }

    #[test]
    fn test_ls_file_and_missing() {
        let mut fx = Fixture::new();
        assert_eq!(fx.text("ls", &["README.txt"]), "README.txt");
        assert_eq!(
            fx.text("ls", &["nope"]),
            "ls: cannot access 'nope': No such file or directory"
        );
        fx.text("mkdir", &["/tmp/empty"]);
        assert_eq!(fx.text("ls", &["/tmp/empty"]), "");
    }

    #[test]
    fn test_cd_and_pwd() {
        let mut fx = Fixture::new();
        assert_eq!(fx.text("cd", &["/etc"]), "");
        assert_eq!(fx.text("pwd", &[]), "/etc");
        assert_eq!(fx.state.get_var("PWD"), Some("/etc"));
        assert_eq!(fx.text("cd", &[]), "");
        assert_eq!(fx.text("pwd", &[]), "/home/user");
        fx.text("cd", &["~/../.."]);
        assert_eq!(fx.text("pwd", &[]), "/");
    }

    #[test]
    fn test_cd_errors_leave_path() {
        let mut fx = Fixture::new();
        assert_eq!(
            fx.text("cd", &["/nonexistent"]),
            "cd: /nonexistent: No such file or directory"
        );
        assert_eq!(fx.text("cd", &["README.txt"]), "cd: README.txt: Not a directory");
        assert_eq!(fx.state.current_path(), "/home/user");
    }

    #[test]
    fn test_cd_without_home_directory() {
        let mut fx = Fixture::new();
        fx.state.set_var("HOME", "/gone");
        assert_eq!(fx.text("cd", &[]), "cd: /gone: No such file or directory");
    }

    // =========================================================================
    // Files
    // =========================================================================

    #[test]
    fn test_cat() {
        let mut fx = Fixture::new();
        assert_eq!(fx.text("cat", &["/etc/motd"]), crate::config::MOTD_TEXT);
        assert_eq!(fx.text("cat", &[]), "cat: missing file operand");
        assert_eq!(fx.text("cat", &["/etc"]), "cat: /etc: Is a directory");
        assert_eq!(
            fx.text("cat", &["missing"]),
            "cat: missing: No such file or directory"
        );
    }

    #[test]
    fn test_mkdir_errors() {
        let mut fx = Fixture::new();
        assert_eq!(fx.text("mkdir", &[]), "mkdir: missing operand");
        assert_eq!(fx.text("mkdir", &["a"]), "");
        assert_eq!(
            fx.text("mkdir", &["a"]),
            "mkdir: cannot create directory 'a': File exists"
        );
        assert_eq!(
            fx.text("mkdir", &["x/y"]),
            "mkdir: cannot create directory 'x/y': No such file or directory"
        );
        assert_eq!(
            fx.text("mkdir", &["README.txt/y"]),
            "mkdir: cannot create directory 'README.txt/y': Not a directory"
        );
    }

    #[test]
    fn test_mkdir_reports_each_failure() {
        let mut fx = Fixture::new();
        fx.text("mkdir", &["a"]);
        assert_eq!(
            fx.text("mkdir", &["a", "b", "a"]),
            "mkdir: cannot create directory 'a': File exists\n\
             mkdir: cannot create directory 'a': File exists"
        );
        assert!(fx.fs.is_directory("/home/user/b"));
    }

    #[test]
    fn test_touch_keeps_content() {
        let mut fx = Fixture::new();
        assert_eq!(fx.text("touch", &[]), "touch: missing file operand");
        fx.fs
            .write_file("/home/user/notes", "keep", WriteMode::Overwrite)
            .unwrap();
        assert_eq!(fx.text("touch", &["notes"]), "");
        assert_eq!(fx.fs.read_file("/home/user/notes"), Ok("keep"));
        assert_eq!(
            fx.text("touch", &["/nope/file"]),
            "touch: cannot touch '/nope/file': No such file or directory"
        );
    }

    #[test]
    fn test_rm() {
        let mut fx = Fixture::new();
        assert_eq!(fx.text("rm", &[]), "rm: missing operand");
        assert_eq!(fx.text("rm", &["about.txt"]), "");
        assert!(fx.fs.lookup("/home/user/about.txt").is_none());
        assert_eq!(
            fx.text("rm", &["about.txt"]),
            "rm: cannot remove 'about.txt': No such file or directory"
        );
        assert_eq!(fx.text("rm", &["/tmp"]), "rm: cannot remove '/tmp': Is a directory");
    }

    #[test]
    fn test_tree() {
        let mut fx = Fixture::new();
        fx.text("mkdir", &["docs"]);
        fx.text("touch", &["docs/a.txt"]);
        assert_eq!(
            fx.text("tree", &[]),
            "/home/user/\n\
             ├── README.txt\n\
             ├── about.txt\n\
             └── docs/\n    \
                 └── a.txt"
        );
    }

    #[test]
    fn test_tree_continuation_bar() {
        let mut fx = Fixture::new();
        fx.text("cd", &["/"]);
        fx.text("rm", &["/etc/motd"]);
        fx.text("rm", &["/home/user/README.txt"]);
        fx.text("rm", &["/home/user/about.txt"]);
        assert_eq!(
            fx.text("tree", &[]),
            "/\n\
             ├── home/\n\
             │   └── user/\n\
             ├── root/\n\
             ├── etc/\n\
             └── tmp/"
        );
    }

    // =========================================================================
    // Text And Environment
    // =========================================================================

    #[test]
    fn test_echo_strips_quotes() {
        let mut fx = Fixture::new();
        assert_eq!(fx.text("echo", &["\"hello", "world\""]), "hello world");
        assert_eq!(fx.text("echo", &["'hi'"]), "hi");
        assert_eq!(fx.text("echo", &["it's"]), "it's");
        assert_eq!(fx.text("echo", &[]), "");
    }

    #[test]
    fn test_uname_whoami() {
        let mut fx = Fixture::new();
        assert_eq!(fx.text("uname", &[]), "RIPLINE");
        assert_eq!(fx.text("uname", &["-a"]), UNAME_LONG);
        assert_eq!(fx.text("whoami", &[]), "user");
    }

    #[test]
    fn test_export_env_unset() {
        let mut fx = Fixture::new();
        assert_eq!(fx.text("export", &["EDITOR=vi", "PAGER=less"]), "");
        let env = fx.text("env", &[]);
        assert!(env.ends_with("EDITOR=vi\nPAGER=less"));
        assert!(fx.text("export", &[]).contains("declare -x EDITOR=\"vi\""));
        assert_eq!(fx.text("unset", &["EDITOR"]), "");
        assert!(!fx.text("env", &[]).contains("EDITOR"));
        assert_eq!(
            fx.text("export", &["9LIVES=1"]),
            "export: `9LIVES=1': not a valid identifier"
        );
    }

    #[test]
    fn test_history_numbering() {
        let mut fx = Fixture::new();
        fx.state.push_history("ls");
        fx.state.push_history("cd  /tmp");
        assert_eq!(fx.text("history", &[]), "1  ls\n2  cd  /tmp");
    }

    #[test]
    fn test_date_is_not_empty() {
        let mut fx = Fixture::new();
        assert!(fx.text("date", &[]).contains("GMT"));
    }

    // =========================================================================
    // Signals
    // =========================================================================

    #[test]
    fn test_clear_signal() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run("clear", &[]), Outcome::ClearScreen);
    }

    #[test]
    fn test_vi_opens_existing_and_new_files() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run("vi", &["README.txt"]), Outcome::EditorOpened);
        let request = fx.editor_request.take().unwrap();
        assert_eq!(request.path, "/home/user/README.txt");
        assert_eq!(request.content, crate::config::README_TEXT);

        assert_eq!(fx.run("vim", &["new.txt"]), Outcome::EditorOpened);
        let request = fx.editor_request.take().unwrap();
        assert_eq!(request.path, "/home/user/new.txt");
        assert_eq!(request.content, "");
    }

    #[test]
    fn test_vi_errors() {
        let mut fx = Fixture::new();
        assert_eq!(fx.text("vi", &[]), "vi: missing file operand");
        assert_eq!(fx.text("vi", &["/etc"]), "vi: /etc: Is a directory");
        assert_eq!(
            fx.text("vi", &["/nope/file"]),
            "vi: /nope/file: No such file or directory"
        );
        assert_eq!(
            fx.text("vi", &["README.txt/x"]),
            "vi: README.txt/x: Not a directory"
        );
        assert!(fx.editor_request.is_none());
    }

    #[test]
    fn test_su() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run("su", &[]), Outcome::UserSwitched("root".to_string()));
        assert_eq!(fx.state.current_user(), "root");
        assert_eq!(fx.state.get_var("USER"), Some("root"));
        assert_eq!(fx.run("su", &["alice"]), Outcome::UserSwitched("alice".to_string()));
        assert_eq!(fx.text("su", &["Bad User!"]), "su: user Bad User! does not exist");
        assert_eq!(fx.state.current_user(), "alice");
    }

    // =========================================================================
    // Reset
    // =========================================================================

    #[test]
    fn test_reset_clears_storage() {
        let mut fx = Fixture::new();
        fx.storage.save("ripline_filesystem", "{}").unwrap();
        fx.storage.save("ripline_current_user", "\"root\"").unwrap();
        fx.storage.save("unrelated", "1").unwrap();

        assert!(fx.text("reset", &[]).starts_with("Usage: reset"));
        assert_eq!(fx.storage.len(), 3);

        assert!(fx.text("reset", &["-f"]).starts_with("Filesystem reset."));
        assert_eq!(fx.storage.load("ripline_filesystem"), None);
        assert_eq!(fx.storage.load("ripline_current_user"), None);
        assert_eq!(fx.storage.load("unrelated").as_deref(), Some("1"));
    }

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn load(&self, _key: &str) -> Option<String> {
            None
        }

        fn save(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_reset_storage_failure_is_an_error() {
        let mut fx = Fixture::new();
        let mut storage = BrokenStorage;
        let mut ctx = ExecContext {
            fs: &mut fx.fs,
            state: &mut fx.state,
            storage: &mut storage,
            storage_keys: &fx.keys,
            editor_request: &mut fx.editor_request,
        };
        let result = execute_command(Command::Reset { filesystem: true }, &mut ctx);
        assert_eq!(
            result,
            Err(CommandError::Failed("storage not available".to_string()))
        );
    }
}
