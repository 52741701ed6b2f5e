//! In-memory document backend.
//!
//! [`DocumentWriter`] records a [`Transfer`](crate::Transfer) walk into a
//! [`Node`] tree; [`DocumentReader`] replays a tree back into objects. The
//! tree is `serde`-serializable and encodes to `MessagePack` with
//! `rmp-serde`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use scenery_foundation::{Error, ErrorKind, Result};

use crate::serializer::{Direction, Scalar, Serializer};

/// A value in a document tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Node {
    /// No value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Ordered list of values.
    Array(Vec<Node>),
    /// Ordered map of named values.
    Object(Vec<(String, Node)>),
}

impl Node {
    /// Name of this node's type, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Looks up a named entry of an object node.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        match self {
            Self::Object(fields) => fields.iter().find(|(key, _)| key == name).map(|(_, node)| node),
            _ => None,
        }
    }

    /// Returns the elements of an array node.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Follows a `/`-separated path of object keys and array indices.
    #[must_use]
    pub fn pointer(&self, path: &str) -> Option<&Node> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| match node {
                Self::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => node.get(segment),
            })
    }
}

/// A complete document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Root object.
    pub root: Node,
}

impl Document {
    /// Creates a document around a root node.
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Returns a reader positioned at the root.
    #[must_use]
    pub fn reader(&self) -> DocumentReader<'_> {
        DocumentReader::new(self)
    }

    /// Encodes the document as `MessagePack`.
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(|e| Error::serialization(e.to_string()))
    }

    /// Decodes a document from `MessagePack`.
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::serialization(e.to_string()))
    }

    /// Writes the encoded document to a file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_msgpack()?;
        fs::write(path.as_ref(), bytes)
            .map_err(|e| Error::serialization(format!("failed to write {}: {e}", path.as_ref().display())))
    }

    /// Reads and decodes a document from a file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())
            .map_err(|e| Error::serialization(format!("failed to read {}: {e}", path.as_ref().display())))?;
        Self::from_msgpack(&bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Root,
    Object,
    Array,
    Element,
}

impl ScopeKind {
    const fn name(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Object => "object",
            Self::Array => "array",
            Self::Element => "element",
        }
    }
}

fn scope_mismatch(expected: ScopeKind, found: ScopeKind) -> Error {
    Error::new(ErrorKind::ScopeMismatch {
        expected: expected.name(),
        found: found.name(),
    })
}

// =============================================================================
// Writer
// =============================================================================

#[derive(Debug)]
struct WriteFrame {
    kind: ScopeKind,
    name: String,
    node: Node,
}

/// Saves objects into a [`Document`].
#[derive(Debug)]
pub struct DocumentWriter {
    stack: Vec<WriteFrame>,
}

impl Default for DocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentWriter {
    /// Creates a writer with an empty root object.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec![WriteFrame {
                kind: ScopeKind::Root,
                name: String::new(),
                node: Node::Object(Vec::new()),
            }],
        }
    }

    /// Finishes writing and returns the document.
    ///
    /// Fails if any scope is still open.
    pub fn finish(mut self) -> Result<Document> {
        match self.stack.pop() {
            Some(frame) if self.stack.is_empty() && frame.kind == ScopeKind::Root => {
                Ok(Document::new(frame.node))
            }
            Some(frame) => Err(scope_mismatch(ScopeKind::Root, frame.kind)),
            None => Err(Error::new(ErrorKind::Internal("writer stack is empty".into()))),
        }
    }

    fn top(&mut self) -> Result<&mut WriteFrame> {
        self.stack
            .last_mut()
            .ok_or_else(|| Error::new(ErrorKind::Internal("writer stack is empty".into())))
    }

    fn attach(&mut self, name: &str, node: Node) -> Result<()> {
        let parent = self.top()?;
        match parent.node {
            Node::Array(ref mut items) => items.push(node),
            Node::Null => {
                parent.node = if name.is_empty() {
                    node
                } else {
                    Node::Object(vec![(name.to_string(), node)])
                };
            }
            Node::Object(ref mut fields) if !name.is_empty() => fields.push((name.to_string(), node)),
            ref other => {
                return Err(Error::type_mismatch(name, "object", other.type_name()));
            }
        }
        Ok(())
    }

    fn open(&mut self, kind: ScopeKind, name: &str, node: Node) {
        self.stack.push(WriteFrame {
            kind,
            name: name.to_string(),
            node,
        });
    }

    fn close(&mut self, expected: ScopeKind) -> Result<()> {
        let found = self.top()?.kind;
        if found != expected {
            return Err(scope_mismatch(expected, found));
        }
        if let Some(frame) = self.stack.pop() {
            self.attach(&frame.name, frame.node)?;
        }
        Ok(())
    }
}

impl Serializer for DocumentWriter {
    fn direction(&self) -> Direction {
        Direction::Read
    }

    fn push_object(&mut self, name: &str) -> Result<bool> {
        self.open(ScopeKind::Object, name, Node::Object(Vec::new()));
        Ok(true)
    }

    fn pop_object(&mut self) -> Result<()> {
        self.close(ScopeKind::Object)
    }

    fn push_array(&mut self, name: &str) -> Result<bool> {
        self.open(ScopeKind::Array, name, Node::Array(Vec::new()));
        Ok(true)
    }

    fn pop_array(&mut self) -> Result<()> {
        self.close(ScopeKind::Array)
    }

    fn begin_element(&mut self) -> Result<bool> {
        let found = self.top()?.kind;
        if found != ScopeKind::Array {
            return Err(scope_mismatch(ScopeKind::Array, found));
        }
        self.open(ScopeKind::Element, "", Node::Null);
        Ok(true)
    }

    fn end_element(&mut self) -> Result<()> {
        self.close(ScopeKind::Element)
    }

    fn contains(&self, name: &str) -> bool {
        self.stack.last().is_some_and(|frame| frame.node.get(name).is_some())
    }

    fn scalar(&mut self, name: &str, value: Scalar<'_>) -> Result<()> {
        let node = match value {
            Scalar::Bool(v) => Node::Bool(*v),
            Scalar::Int(v) => Node::Int(*v),
            Scalar::UInt(v) => Node::UInt(*v),
            Scalar::Float(v) => Node::Float(*v),
            Scalar::Text(v) => Node::Text(v.clone()),
        };
        self.attach(name, node)
    }
}

// =============================================================================
// Reader
// =============================================================================

#[derive(Debug)]
struct ReadFrame<'a> {
    kind: ScopeKind,
    node: &'a Node,
    cursor: usize,
}

/// Loads objects from a [`Document`].
///
/// Missing fields leave the target untouched; present fields of the wrong
/// type are errors.
#[derive(Debug)]
pub struct DocumentReader<'a> {
    stack: Vec<ReadFrame<'a>>,
}

impl<'a> DocumentReader<'a> {
    /// Creates a reader positioned at the document root.
    #[must_use]
    pub fn new(document: &'a Document) -> Self {
        Self {
            stack: vec![ReadFrame {
                kind: ScopeKind::Root,
                node: &document.root,
                cursor: 0,
            }],
        }
    }

    fn top(&self) -> Result<&ReadFrame<'a>> {
        self.stack
            .last()
            .ok_or_else(|| Error::new(ErrorKind::Internal("reader stack is empty".into())))
    }

    fn lookup(&self, name: &str) -> Result<Option<&'a Node>> {
        let node = self.top()?.node;
        if name.is_empty() {
            return Ok(Some(node));
        }
        Ok(node.get(name))
    }

    fn enter(&mut self, kind: ScopeKind, name: &str) -> Result<bool> {
        let Some(node) = self.lookup(name)? else {
            return Ok(false);
        };
        let matches = match kind {
            ScopeKind::Array => matches!(node, Node::Array(_)),
            _ => matches!(node, Node::Object(_)),
        };
        if !matches {
            return Err(Error::type_mismatch(name, kind.name(), node.type_name()));
        }
        self.stack.push(ReadFrame {
            kind,
            node,
            cursor: 0,
        });
        Ok(true)
    }

    fn leave(&mut self, expected: ScopeKind) -> Result<()> {
        let found = self.top()?.kind;
        if found != expected {
            return Err(scope_mismatch(expected, found));
        }
        self.stack.pop();
        Ok(())
    }
}

impl Serializer for DocumentReader<'_> {
    fn direction(&self) -> Direction {
        Direction::Write
    }

    fn push_object(&mut self, name: &str) -> Result<bool> {
        self.enter(ScopeKind::Object, name)
    }

    fn pop_object(&mut self) -> Result<()> {
        self.leave(ScopeKind::Object)
    }

    fn push_array(&mut self, name: &str) -> Result<bool> {
        self.enter(ScopeKind::Array, name)
    }

    fn pop_array(&mut self) -> Result<()> {
        self.leave(ScopeKind::Array)
    }

    fn begin_element(&mut self) -> Result<bool> {
        let frame = self
            .stack
            .last_mut()
            .ok_or_else(|| Error::new(ErrorKind::Internal("reader stack is empty".into())))?;
        if frame.kind != ScopeKind::Array {
            return Err(scope_mismatch(ScopeKind::Array, frame.kind));
        }
        let Some(element) = frame.node.as_array().and_then(|items| items.get(frame.cursor)) else {
            return Ok(false);
        };
        frame.cursor += 1;
        self.stack.push(ReadFrame {
            kind: ScopeKind::Element,
            node: element,
            cursor: 0,
        });
        Ok(true)
    }

    fn end_element(&mut self) -> Result<()> {
        self.leave(ScopeKind::Element)
    }

    fn contains(&self, name: &str) -> bool {
        match self.stack.last() {
            Some(frame) if name.is_empty() => !matches!(frame.node, Node::Null),
            Some(frame) => frame.node.get(name).is_some(),
            None => false,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn scalar(&mut self, name: &str, value: Scalar<'_>) -> Result<()> {
        let Some(node) = self.lookup(name)? else {
            return Ok(());
        };
        let mismatch = |expected: &'static str| Error::type_mismatch(name, expected, node.type_name());
        match (value, node) {
            (Scalar::Bool(slot), Node::Bool(v)) => *slot = *v,
            (Scalar::Int(slot), Node::Int(v)) => *slot = *v,
            (Scalar::Int(slot), Node::UInt(v)) => {
                *slot = i64::try_from(*v).map_err(|_| Error::out_of_range(name, v))?;
            }
            (Scalar::UInt(slot), Node::UInt(v)) => *slot = *v,
            (Scalar::UInt(slot), Node::Int(v)) => {
                *slot = u64::try_from(*v).map_err(|_| Error::out_of_range(name, v))?;
            }
            (Scalar::Float(slot), Node::Float(v)) => *slot = *v,
            (Scalar::Float(slot), Node::Int(v)) => *slot = *v as f64,
            (Scalar::Float(slot), Node::UInt(v)) => *slot = *v as f64,
            (Scalar::Text(slot), Node::Text(v)) => slot.clone_from(v),
            (slot, _) => return Err(mismatch(slot.type_name())),
        }
        Ok(())
    }
}
