/// A file handed to the line editor by `vi`.
///
/// Produced by the command interpreter and picked up once by the host via
/// `Shell::take_editor_request`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorRequest {
    /// Absolute path of the file being edited (also the editor's filename).
    pub path: String,
    /// Current content, empty for a file that does not exist yet.
    pub content: String,
}
