use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Children of a directory, kept in creation order.
pub type Entries = IndexMap<String, FsNode>;

// =============================================================================
// Filesystem Node
// =============================================================================

/// Represents an entry in the virtual filesystem.
///
/// Serialized compactly: a JSON string is a file, a JSON object is a
/// directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub enum FsNode {
    Directory { entries: Entries },
    File { content: String },
}

impl FsNode {
    /// Create an empty directory.
    pub fn directory() -> Self {
        FsNode::Directory {
            entries: Entries::new(),
        }
    }

    /// Create a directory from `(name, node)` pairs, preserving their order.
    pub fn directory_with<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = (S, FsNode)>,
        S: Into<String>,
    {
        FsNode::Directory {
            entries: children
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        }
    }

    /// Create a file with the given content.
    pub fn file(content: impl Into<String>) -> Self {
        FsNode::File {
            content: content.into(),
        }
    }

    /// Check if this entry is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self, FsNode::Directory { .. })
    }

    /// Directory children (directories only).
    pub fn entries(&self) -> Option<&Entries> {
        match self {
            FsNode::Directory { entries } => Some(entries),
            FsNode::File { .. } => None,
        }
    }

    pub(crate) fn entries_mut(&mut self) -> Option<&mut Entries> {
        match self {
            FsNode::Directory { entries } => Some(entries),
            FsNode::File { .. } => None,
        }
    }

    /// File content (files only).
    pub fn content(&self) -> Option<&str> {
        match self {
            FsNode::File { content } => Some(content),
            FsNode::Directory { .. } => None,
        }
    }
}

/// Wire shape of a node.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawNode {
    File(String),
    Directory(IndexMap<String, RawNode>),
}

impl From<RawNode> for FsNode {
    fn from(raw: RawNode) -> Self {
        match raw {
            RawNode::File(content) => FsNode::File { content },
            RawNode::Directory(children) => FsNode::Directory {
                entries: children
                    .into_iter()
                    .map(|(name, child)| (name, child.into()))
                    .collect(),
            },
        }
    }
}

impl From<FsNode> for RawNode {
    fn from(node: FsNode) -> Self {
        match node {
            FsNode::File { content } => RawNode::File(content),
            FsNode::Directory { entries } => RawNode::Directory(
                entries
                    .into_iter()
                    .map(|(name, child)| (name, child.into()))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// Listing Types
// =============================================================================

/// Directory entry returned by `list_entries`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

impl DirEntry {
    /// Name as shown by `ls` and completion (directories get a trailing `/`).
    pub fn display_name(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Kind of node to create with `create_entry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// How `write_file` treats existing content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Overwrite,
    Append,
}
