//! JavaScript bindings.
//!
//! [`WebShell`] wraps a [`Shell`] persisted to `localStorage` together with
//! the `vi` session it may open. The page owns rendering: it calls
//! [`WebShell::execute`] per line, forwards key names while an editor is
//! open, and redraws from [`WebShell::editor_lines`] and
//! [`WebShell::editor_status`].

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::config::ShellConfig;
use crate::core::storage::LocalStorage;
use crate::core::{Outcome, Shell};
use crate::editor::{Key, LineEditor};
use crate::utils::console;

#[wasm_bindgen]
pub struct WebShell {
    shell: Rc<RefCell<Shell>>,
    editor: Option<LineEditor>,
}

#[wasm_bindgen]
impl WebShell {
    /// Start or resume a session for `username` (default user when omitted).
    #[wasm_bindgen(constructor)]
    pub fn new(username: Option<String>) -> WebShell {
        console_error_panic_hook::set_once();
        console::init(tracing::Level::INFO);

        let config = match username {
            Some(user) => ShellConfig::for_user(user),
            None => ShellConfig::default(),
        };
        Self {
            shell: Rc::new(RefCell::new(Shell::new(config, LocalStorage))),
            editor: None,
        }
    }

    /// Run one line. Returns the serialized outcome
    /// (`{ kind: "text", value: "..." }`, `{ kind: "clear_screen" }`, ...).
    pub fn execute(&mut self, line: &str) -> Result<JsValue, JsError> {
        let outcome = self.shell.borrow_mut().execute(line);
        if outcome == Outcome::EditorOpened {
            self.open_editor();
        }
        Ok(serde_wasm_bindgen::to_value(&outcome)?)
    }

    /// Completion matches for `input` (`{ kind, matches, prefix }`).
    pub fn completions(&self, input: &str) -> Result<JsValue, JsError> {
        let result = self.shell.borrow().get_completions(input);
        Ok(serde_wasm_bindgen::to_value(&result)?)
    }

    /// `input` extended as far as the completions allow.
    pub fn complete(&self, input: &str) -> String {
        self.shell.borrow().get_completions(input).extend_input(input)
    }

    pub fn prompt(&self) -> String {
        self.shell.borrow().prompt()
    }

    #[wasm_bindgen(getter)]
    pub fn cwd(&self) -> String {
        self.shell.borrow().current_path().to_string()
    }

    // =========================================================================
    // Editor
    // =========================================================================

    #[wasm_bindgen(getter)]
    pub fn editor_open(&self) -> bool {
        self.editor.is_some()
    }

    /// Feed one DOM key name (`KeyboardEvent.key`) to the open editor.
    ///
    /// Returns false if no editor is open or the key is not one it handles.
    pub fn editor_key(&mut self, name: &str) -> bool {
        let (Some(editor), Some(key)) = (self.editor.as_mut(), Key::from_name(name)) else {
            return false;
        };
        editor.handle_key(key);
        if editor.is_closed() {
            self.editor = None;
        }
        true
    }

    /// Buffer lines with the cursor drawn in.
    pub fn editor_lines(&self) -> Result<JsValue, JsError> {
        let lines = self
            .editor
            .as_ref()
            .map(LineEditor::render_lines)
            .unwrap_or_default();
        Ok(serde_wasm_bindgen::to_value(&lines)?)
    }

    pub fn editor_status(&self) -> Option<String> {
        self.editor.as_ref().map(LineEditor::status_line)
    }

    fn open_editor(&mut self) {
        let Some(request) = self.shell.borrow_mut().take_editor_request() else {
            return;
        };

        let shell = Rc::clone(&self.shell);
        let on_save = move |path: &str, content: &str| {
            if let Err(err) = shell.borrow_mut().save_file(path, content) {
                tracing::warn!(path, %err, "vi: save failed");
            }
        };
        self.editor = Some(LineEditor::from_request(request, on_save, || {}));
    }
}

impl Default for WebShell {
    fn default() -> Self {
        Self::new(None)
    }
}
