use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use meld_shared::{log::trace, Transform};

use crate::mesh::MeshData;

/// Name of the synthetic root node under which all content is organized.
pub const MASTER_ROOT_NAME: &str = "MASTER_ROOT";

/// Identifies a node in a [`SceneGraph`].
///
/// Nodes are never removed, so a handle stays valid for the lifetime of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(usize);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh(MeshData),
    Group,
    /// Cameras, skinned nodes and everything else that has no bakeable payload.
    Other,
}

impl NodeKind {
    /// Only meshes and groups take part in transform baking.
    pub fn is_bakeable(&self) -> bool {
        matches!(self, NodeKind::Mesh(_) | NodeKind::Group)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    /// Name the node was inserted with, before any suffix was appended.
    source_name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub metadata: BTreeMap<String, String>,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }
}

/// Description of a node that is about to be inserted into a [`SceneGraph`].
#[derive(Debug, Clone)]
pub struct NodeDescription {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub metadata: BTreeMap<String, String>,
}

impl NodeDescription {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform::identity(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// The set of nodes that existed at a point in time.
///
/// The graph only grows, so every node with an index at or above the recorded
/// count was created after the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    node_count: usize,
}

impl Snapshot {
    pub fn contains(&self, handle: NodeHandle) -> bool {
        handle.0 < self.node_count
    }
}

/// Arena of nodes forming one tree below [`MASTER_ROOT_NAME`].
///
/// Node names are unique. Inserting or renaming to a name that is already
/// taken appends `.001`, `.002` and so on.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    names: HashMap<String, NodeHandle>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a graph that contains only the root node.
    pub fn new() -> Self {
        let mut scene_graph = Self {
            nodes: Vec::new(),
            names: HashMap::new(),
        };
        scene_graph.insert(NodeDescription::new(MASTER_ROOT_NAME, NodeKind::Group));
        scene_graph
    }

    /// Drops all nodes except a fresh root node.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn root(&self) -> NodeHandle {
        NodeHandle(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            node_count: self.nodes.len(),
        }
    }

    /// Returns the handles of all nodes created after the `snapshot` was taken.
    pub fn created_since(&self, snapshot: &Snapshot) -> Vec<NodeHandle> {
        (snapshot.node_count..self.nodes.len()).map(NodeHandle).collect()
    }

    /// Inserts a node without parent and returns its handle.
    pub fn insert(&mut self, description: NodeDescription) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        let name = self.unique_name(&description.name);
        trace!("Inserting node '{name}' as {handle}");
        self.names.insert(name.clone(), handle);
        self.nodes.push(Node {
            name,
            source_name: description.name,
            kind: description.kind,
            transform: description.transform,
            metadata: description.metadata,
            parent: None,
            children: Vec::new(),
        });
        handle
    }

    /// Inserts a node as the last child of `parent`.
    pub fn insert_child(&mut self, parent: NodeHandle, description: NodeDescription) -> NodeHandle {
        let handle = self.insert(description);
        self.set_parent(handle, parent);
        handle
    }

    /// Renames the node and returns the name it actually received.
    pub fn rename(&mut self, handle: NodeHandle, name: &str) -> &str {
        let old_name = self.nodes[handle.0].name.clone();
        if old_name != name {
            self.names.remove(&old_name);
            let new_name = self.unique_name(name);
            self.names.insert(new_name.clone(), handle);
            self.nodes[handle.0].name = new_name;
        }
        &self.nodes[handle.0].name
    }

    /// Attaches `child` to `parent`, detaching it from its previous parent.
    ///
    /// # Panics
    ///
    /// If `child` is `parent` or an ancestor of it.
    pub fn set_parent(&mut self, child: NodeHandle, parent: NodeHandle) {
        assert!(
            !self.ancestors(parent).any(|ancestor| ancestor == child) && child != parent,
            "attaching {child} to {parent} would create a cycle"
        );
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|handle| *handle != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn node(&self, handle: NodeHandle) -> &Node {
        &self.nodes[handle.0]
    }

    pub fn node_mut(&mut self, handle: NodeHandle) -> &mut Node {
        &mut self.nodes[handle.0]
    }

    pub fn find(&self, name: &str) -> Option<NodeHandle> {
        self.names.get(name).copied()
    }

    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> {
        (0..self.nodes.len()).map(NodeHandle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter().enumerate().map(|(index, node)| (NodeHandle(index), node))
    }

    /// Nodes that have no parent. After normalization this is only the root.
    pub fn parentless(&self) -> Vec<NodeHandle> {
        self.iter().filter(|(_, node)| node.parent.is_none()).map(|(handle, _)| handle).collect()
    }

    /// Walks from the parent of `handle` up to the root.
    pub fn ancestors(&self, handle: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        std::iter::successors(self.nodes[handle.0].parent, move |current| self.nodes[current.0].parent)
    }

    /// Returns `handle` and all of its descendants in depth-first pre-order.
    pub fn depth_first(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut result = Vec::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev());
        }
        result
    }

    fn unique_name(&self, name: &str) -> String {
        if !self.names.contains_key(name) {
            return name.to_owned();
        }
        (1..)
            .map(|counter| format!("{name}.{counter:03}"))
            .find(|candidate| !self.names.contains_key(candidate))
            .expect("ran out of unique name suffixes")
    }
}
