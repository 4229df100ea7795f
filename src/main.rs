//! ripsh command-line host.
//!
//! Usage:
//!   ripsh                              # Interactive session, nothing persisted
//!   ripsh --state-file state.json      # Keep filesystem, directory and user across runs
//!   ripsh --user alice                 # Start as another user
//!   ripsh -c 'ls /etc'                 # Run one line and exit
//!
//! A line ending in a tab (`cat RE\t`) asks for completions instead of
//! running. While `vi` is open, each input line is a key sequence in vim
//! notation, e.g. `iHello<Esc>:wq<CR>`; with `-c 'vi file'` the keys are
//! read from stdin.
//!
//! Logging goes to stderr, filtered by `RIPSH_LOG` (default `warn`).

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;
    use std::process::ExitCode;
    use std::rc::Rc;

    use clap::Parser;
    use tracing_subscriber::{EnvFilter, fmt};

    use ripsh::config::{LOG_ENV_VAR, MOTD_TEXT};
    use ripsh::core::storage::{JsonFileStorage, MemoryStorage, Storage, StorageKeys};
    use ripsh::{Key, LineEditor, Outcome, Shell, ShellConfig};

    /// Unix-like shell over an in-memory filesystem.
    #[derive(Parser, Debug)]
    #[command(name = "ripsh", version)]
    #[command(about = "Unix-like shell over an in-memory filesystem")]
    struct Args {
        /// User to start as (a persisted user takes precedence)
        #[arg(short, long)]
        user: Option<String>,

        /// JSON file to persist session state in (in-memory when omitted)
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// Discard persisted state before starting
        #[arg(long)]
        fresh: bool,

        /// Run a single command line and exit
        #[arg(short = 'c', value_name = "COMMAND")]
        command: Option<String>,
    }

    pub fn main() -> ExitCode {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(io::stderr)
            .init();

        let args = Args::parse();
        match run(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("ripsh: {err}");
                ExitCode::FAILURE
            }
        }
    }

    fn run(args: Args) -> io::Result<()> {
        let config = match &args.user {
            Some(user) => ShellConfig::for_user(user),
            None => ShellConfig::default(),
        };

        let shell = match &args.state_file {
            Some(path) => {
                let mut storage = JsonFileStorage::open(path);
                if args.fresh {
                    discard_state(&mut storage, &config.storage_prefix);
                }
                Shell::new(config, storage)
            }
            None => Shell::new(config, MemoryStorage::new()),
        };
        let shell = Rc::new(RefCell::new(shell));

        if let Some(line) = &args.command {
            let outcome = shell.borrow_mut().execute(line);
            let stdin = io::stdin();
            return respond(&shell, outcome, &mut stdin.lock().lines(), &mut io::stdout());
        }

        print!("{MOTD_TEXT}");
        repl(&shell)
    }

    fn discard_state(storage: &mut dyn Storage, prefix: &str) {
        for key in StorageKeys::with_prefix(prefix).all() {
            if let Err(err) = storage.remove(key) {
                tracing::warn!(%err, "could not discard persisted state");
            }
        }
    }

    fn repl(shell: &Rc<RefCell<Shell>>) -> io::Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("{} ", shell.borrow().prompt());
            io::stdout().flush()?;

            let Some(line) = lines.next().transpose()? else {
                println!();
                return Ok(());
            };

            if let Some(partial) = line.strip_suffix('\t') {
                show_completions(&shell.borrow(), partial);
                continue;
            }

            let outcome = shell.borrow_mut().execute(&line);
            respond(shell, outcome, &mut lines, &mut io::stdout())?;
        }
    }

    /// Show an outcome. `vi` takes over the remaining input lines until the
    /// editor closes, in one-shot mode too (`ripsh -c 'vi f' < keys`).
    fn respond(
        shell: &Rc<RefCell<Shell>>,
        outcome: Outcome,
        lines: &mut impl Iterator<Item = io::Result<String>>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        if outcome != Outcome::EditorOpened {
            return print_outcome(&outcome, out);
        }
        let request = shell.borrow_mut().take_editor_request();
        match request {
            Some(request) => {
                let editor = LineEditor::from_request(request, save_to(shell), || {});
                run_editor(editor, lines, out)
            }
            None => Ok(()),
        }
    }

    /// Save callback writing the buffer back through the shell.
    fn save_to(shell: &Rc<RefCell<Shell>>) -> impl FnMut(&str, &str) + 'static {
        let shell = Rc::clone(shell);
        move |path: &str, content: &str| {
            if let Err(err) = shell.borrow_mut().save_file(path, content) {
                eprintln!("vi: {path}: {err}");
            }
        }
    }

    fn run_editor(
        mut editor: LineEditor,
        lines: &mut impl Iterator<Item = io::Result<String>>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        writeln!(out, "(vi: enter keys in vim notation, e.g. iHello<Esc>:wq<CR>)")?;
        while !editor.is_closed() {
            for line in editor.render_lines() {
                writeln!(out, "{line}")?;
            }
            writeln!(out, "{}", editor.status_line())?;
            out.flush()?;

            let Some(input) = lines.next().transpose()? else {
                writeln!(out, "vi: input ended, unsaved changes discarded")?;
                return out.flush();
            };
            editor.handle_keys(Key::parse_sequence(&input));
        }
        Ok(())
    }

    fn show_completions(shell: &Shell, partial: &str) {
        let result = shell.get_completions(partial);
        match result.matches.len() {
            0 => {}
            1 => println!("{}", result.extend_input(partial)),
            _ => println!("{}", result.matches.join("  ")),
        }
    }

    fn print_outcome(outcome: &Outcome, out: &mut impl Write) -> io::Result<()> {
        match outcome {
            Outcome::Text(text) if text.is_empty() => {}
            Outcome::Text(text) => writeln!(out, "{text}")?,
            Outcome::ClearScreen => write!(out, "\x1b[2J\x1b[H")?,
            Outcome::EditorOpened | Outcome::UserSwitched(_) => {}
        }
        out.flush()
    }

}
