//! Tree item trait and a ready-made node type.

/// Trait for items that can be displayed by the tree engine.
///
/// The engine never mutates items; it walks them on every flattening pass and
/// keys all of its own state (expansion, selection, drag, rename) by `id`.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone)]
/// struct FileNode {
///     path: String,
///     name: String,
///     is_dir: bool,
///     children: Vec<FileNode>,
/// }
///
/// impl TreeItem for FileNode {
///     fn id(&self) -> &str { &self.path }
///     fn children(&self) -> &[Self] { &self.children }
///     fn label(&self) -> &str { &self.name }
///     fn can_contain(&self) -> bool { self.is_dir }
/// }
/// ```
pub trait TreeItem: Sized {
    /// Unique, stable identifier for this node.
    ///
    /// This ID must be unique across the entire tree and stable across
    /// updates to maintain expand/collapse and selection state.
    fn id(&self) -> &str;

    /// Child items in display order. Empty for leaf nodes.
    fn children(&self) -> &[Self];

    /// Text used for full-path rename labels and find-in-tree.
    fn label(&self) -> &str {
        self.id()
    }

    /// Whether dragged nodes may be dropped inside this node.
    ///
    /// Default implementation returns true if the node has children.
    fn can_contain(&self) -> bool {
        !self.children().is_empty()
    }
}

/// A node with a label, an arbitrary payload, and children.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode<P = ()> {
    /// Unique node id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Host data, used only for rendering.
    pub payload: P,
    /// Child nodes.
    pub children: Vec<TreeNode<P>>,
    /// Explicit container flag. `None` means "has children".
    pub container: Option<bool>,
}

impl<P: Default> TreeNode<P> {
    /// Create a new leaf node (no children).
    pub fn leaf(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            payload: P::default(),
            children: Vec::new(),
            container: None,
        }
    }

    /// Create a new branch node with children.
    pub fn branch(id: impl Into<String>, children: Vec<TreeNode<P>>) -> Self {
        let mut node = Self::leaf(id);
        node.children = children;
        node
    }

    /// Create an empty container (a folder with no children yet).
    pub fn folder(id: impl Into<String>) -> Self {
        let mut node = Self::leaf(id);
        node.container = Some(true);
        node
    }
}

impl<P> TreeNode<P> {
    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: P) -> Self {
        self.payload = payload;
        self
    }
}

impl<P> TreeItem for TreeNode<P> {
    fn id(&self) -> &str {
        &self.id
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn can_contain(&self) -> bool {
        self.container.unwrap_or(!self.children.is_empty())
    }
}

/// Find an item by id anywhere in the tree, including collapsed subtrees.
pub fn find_item<'a, T: TreeItem>(roots: &'a [T], id: &str) -> Option<&'a T> {
    let mut stack: Vec<&T> = roots.iter().rev().collect();
    while let Some(item) = stack.pop() {
        if item.id() == id {
            return Some(item);
        }
        stack.extend(item.children().iter().rev());
    }
    None
}

/// Labels from the root down to and including `id`.
pub fn label_path<'a, T: TreeItem>(roots: &'a [T], id: &str) -> Option<Vec<&'a str>> {
    let mut path: Vec<&str> = Vec::new();
    let mut stack: Vec<(&T, usize)> = roots.iter().rev().map(|r| (r, 0)).collect();
    while let Some((item, depth)) = stack.pop() {
        path.truncate(depth);
        path.push(item.label());
        if item.id() == id {
            return Some(path);
        }
        stack.extend(item.children().iter().rev().map(|c| (c, depth + 1)));
    }
    None
}
