use crate::core::error::FsError;
use crate::models::{DirEntry, EntryKind, FsNode, WriteMode};

/// In-memory hierarchical filesystem.
///
/// # Path Convention
///
/// - Root: `"/"`
/// - Nested: `"/home/user/notes.txt"`
/// - Operations accept any absolute path and normalize `.`, `..` and
///   repeated slashes before walking the tree. Relative paths are resolved
///   by the caller with [`VirtualFs::resolve_path`].
///
/// Every mutation either fully applies or leaves the tree untouched, and sets
/// a dirty flag the shell drains with [`VirtualFs::take_changed`] to decide
/// when to persist.
#[derive(Clone, Debug)]
pub struct VirtualFs {
    /// Root directory entry containing all files
    root: FsNode,
    changed: bool,
}

impl VirtualFs {
    /// Create an empty filesystem (just `/`).
    pub fn empty() -> Self {
        Self {
            root: FsNode::directory(),
            changed: false,
        }
    }

    /// Create a filesystem from an existing tree.
    ///
    /// Fails with `NotADirectory` if `root` is a file.
    pub fn from_root(root: FsNode) -> Result<Self, FsError> {
        if !root.is_directory() {
            return Err(FsError::NotADirectory);
        }
        Ok(Self {
            root,
            changed: false,
        })
    }

    /// The root directory node.
    pub fn root(&self) -> &FsNode {
        &self.root
    }

    /// Returns whether the tree changed since the last call, and resets the flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    // =========================================================================
    // Path Handling
    // =========================================================================

    /// Resolve `input` against the absolute directory `base`.
    ///
    /// Absolute inputs are only normalized. Relative inputs are appended to
    /// `base`; `..` pops a component (never above `/`) and `.` is ignored.
    /// Pure string operation, the tree is not consulted.
    pub fn resolve_path(base: &str, input: &str) -> String {
        if input.starts_with('/') {
            return Self::normalize_path(input);
        }
        if input.is_empty() {
            return Self::normalize_path(base);
        }
        Self::normalize_path(&format!("{}/{}", base, input))
    }

    /// Normalize a path into absolute form by resolving `.` and `..`.
    pub fn normalize_path(path: &str) -> String {
        let parts = Self::components(path);
        format!("/{}", parts.join("/"))
    }

    /// Split a path into its normalized components.
    fn components(path: &str) -> Vec<&str> {
        let mut parts: Vec<&str> = Vec::new();
        for part in path.split('/').filter(|s| !s.is_empty()) {
            match part {
                ".." => {
                    parts.pop();
                }
                "." => {}
                _ => parts.push(part),
            }
        }
        parts
    }

    /// Split a path into its parent components and leaf name.
    ///
    /// Returns `None` for the root, which has no parent.
    fn split_leaf(path: &str) -> Option<(Vec<&str>, &str)> {
        let mut parts = Self::components(path);
        let leaf = parts.pop()?;
        Some((parts, leaf))
    }

    /// Get the parent directory of an absolute path (`/` for `/`).
    pub fn parent_path(path: &str) -> String {
        match Self::split_leaf(path) {
            Some((parent, _)) => format!("/{}", parent.join("/")),
            None => "/".to_string(),
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Get a node by absolute path.
    ///
    /// Returns `None` if any component is missing or if the walk would have to
    /// descend into a file.
    pub fn lookup(&self, path: &str) -> Option<&FsNode> {
        Self::walk(&self.root, &Self::components(path))
    }

    fn walk<'a>(root: &'a FsNode, parts: &[&str]) -> Option<&'a FsNode> {
        let mut current = root;
        for part in parts {
            current = current.entries()?.get(*part)?;
        }
        Some(current)
    }

    fn walk_mut<'a>(root: &'a mut FsNode, parts: &[&str]) -> Option<&'a mut FsNode> {
        let mut current = root;
        for part in parts {
            current = current.entries_mut()?.get_mut(*part)?;
        }
        Some(current)
    }

    /// Check if a path is an existing directory.
    pub fn is_directory(&self, path: &str) -> bool {
        self.lookup(path).is_some_and(FsNode::is_directory)
    }

    /// Read a file's content.
    pub fn read_file(&self, path: &str) -> Result<&str, FsError> {
        match self.lookup(path) {
            Some(FsNode::File { content }) => Ok(content),
            Some(FsNode::Directory { .. }) => Err(FsError::IsADirectory),
            None => Err(FsError::NoSuchEntry),
        }
    }

    /// List directory contents in creation order.
    pub fn list_entries(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        match self.lookup(path) {
            Some(FsNode::Directory { entries }) => Ok(entries
                .iter()
                .map(|(name, node)| DirEntry {
                    name: name.clone(),
                    is_dir: node.is_directory(),
                })
                .collect()),
            Some(FsNode::File { .. }) => Err(FsError::NotADirectory),
            None => Err(FsError::NoSuchEntry),
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Resolve the parent directory of `parts` for mutation.
    fn parent_dir_mut(&mut self, parent: &[&str]) -> Result<&mut FsNode, FsError> {
        match Self::walk_mut(&mut self.root, parent) {
            Some(node) if node.is_directory() => Ok(node),
            Some(_) => Err(FsError::NotADirectory),
            None => Err(FsError::NoSuchParent),
        }
    }

    /// Create a file or directory.
    ///
    /// Creating a directory over an existing name fails with `AlreadyExists`;
    /// creating a file over an existing name succeeds without touching it
    /// (`touch` semantics).
    pub fn create_entry(&mut self, path: &str, kind: EntryKind) -> Result<(), FsError> {
        let Some((parent, name)) = Self::split_leaf(path) else {
            // The root always exists
            return match kind {
                EntryKind::Directory => Err(FsError::AlreadyExists),
                EntryKind::File => Ok(()),
            };
        };

        let dir = self.parent_dir_mut(&parent)?;
        let Some(entries) = dir.entries_mut() else {
            return Err(FsError::NotADirectory);
        };

        if entries.contains_key(name) {
            return match kind {
                EntryKind::Directory => Err(FsError::AlreadyExists),
                EntryKind::File => Ok(()),
            };
        }

        let node = match kind {
            EntryKind::File => FsNode::file(""),
            EntryKind::Directory => FsNode::directory(),
        };
        entries.insert(name.to_string(), node);
        self.changed = true;
        Ok(())
    }

    /// Remove a file. Directories cannot be removed.
    pub fn remove_entry(&mut self, path: &str) -> Result<(), FsError> {
        let Some((parent, name)) = Self::split_leaf(path) else {
            return Err(FsError::IsADirectory);
        };

        let dir = self.parent_dir_mut(&parent).map_err(|err| match err {
            FsError::NoSuchParent => FsError::NoSuchEntry,
            other => other,
        })?;
        let Some(entries) = dir.entries_mut() else {
            return Err(FsError::NotADirectory);
        };

        match entries.get(name) {
            None => return Err(FsError::NoSuchEntry),
            Some(node) if node.is_directory() => return Err(FsError::IsADirectory),
            Some(_) => {}
        }

        entries.shift_remove(name);
        self.changed = true;
        Ok(())
    }

    /// Set or append file content, creating the file if needed.
    pub fn write_file(&mut self, path: &str, content: &str, mode: WriteMode) -> Result<(), FsError> {
        let Some((parent, name)) = Self::split_leaf(path) else {
            return Err(FsError::IsADirectory);
        };

        let dir = self.parent_dir_mut(&parent)?;
        let Some(entries) = dir.entries_mut() else {
            return Err(FsError::NotADirectory);
        };

        match (entries.get_mut(name), mode) {
            (Some(FsNode::Directory { .. }), _) => return Err(FsError::IsADirectory),
            (Some(FsNode::File { content: existing }), WriteMode::Append) => {
                existing.push_str(content);
            }
            (Some(FsNode::File { content: existing }), WriteMode::Overwrite) => {
                *existing = content.to_string();
            }
            (None, _) => {
                entries.insert(name.to_string(), FsNode::file(content));
            }
        }

        self.changed = true;
        Ok(())
    }
}

impl Default for VirtualFs {
    fn default() -> Self {
        Self::empty()
    }
}
