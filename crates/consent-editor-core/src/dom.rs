//! Owned, mutable document tree.
//!
//! The editing surface is an element inside a `Dom`. Nodes live in an arena
//! and are addressed by `NodeId`. Slots are never reused: a removed node keeps
//! its id and simply has no parent, so stale handles (saved selections, the
//! overlay's bound image) can always be told apart from live ones.
//!
//! The cost is that the arena only grows. Reloads, text splits and wrapper
//! juggling all leave dead slots behind for the lifetime of the `Dom`. A
//! session edits one consent document, so this stays small; a host that keeps
//! one session open across many imports should start a fresh session instead.

use smol_str::SmolStr;

use crate::style;

/// Handle to a node in a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index, useful for logging.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A single attribute. Names are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: SmolStr,
    pub value: String,
}

/// Element payload: tag name plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: SmolStr,
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name.to_ascii_lowercase()),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Slot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Arena-backed tree.
#[derive(Debug, Clone)]
pub struct Dom {
    slots: Vec<Slot>,
    document: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            document: NodeId(0),
        }
    }

    /// The document node every attached node descends from.
    pub fn document(&self) -> NodeId {
        self.document
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData::new(name)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Comment(text.to_string()))
    }

    // === Node inspection ===

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.slots[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.slots[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.slots[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.slots[id.0].kind, NodeKind::Text(_))
    }

    /// Text and comment nodes carry character data and are measured in chars.
    pub fn is_character_data(&self, id: NodeId) -> bool {
        matches!(
            self.slots[id.0].kind,
            NodeKind::Text(_) | NodeKind::Comment(_)
        )
    }

    /// Lower-cased tag name, for elements.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    pub fn is_element_named(&self, id: NodeId, names: &[&str]) -> bool {
        self.tag_name(id).is_some_and(|n| names.contains(&n))
    }

    /// Character data of a text or comment node.
    pub fn character_data(&self, id: NodeId) -> Option<&str> {
        match &self.slots[id.0].kind {
            NodeKind::Text(t) | NodeKind::Comment(t) => Some(t),
            _ => None,
        }
    }

    pub fn set_character_data(&mut self, id: NodeId, data: String) {
        match &mut self.slots[id.0].kind {
            NodeKind::Text(t) | NodeKind::Comment(t) => *t = data,
            _ => {}
        }
    }

    /// Length as used by boundary points: chars for character data, child
    /// count otherwise.
    pub fn node_length(&self, id: NodeId) -> usize {
        match self.character_data(id) {
            Some(data) => data.chars().count(),
            None => self.slots[id.0].children.len(),
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        match &self.slots[id.0].kind {
            NodeKind::Text(t) => t.clone(),
            NodeKind::Comment(_) => String::new(),
            _ => self
                .descendants(id)
                .filter_map(|n| match &self.slots[n.0].kind {
                    NodeKind::Text(t) => Some(t.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    // === Structure ===

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].children.last().copied()
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.slots[parent.0].children.iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index_of(id)?;
        self.slots[parent.0].children.get(idx + 1).copied()
    }

    /// Inclusive ancestor test: `ancestor == node` counts.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Attached to the document.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.document, id)
    }

    /// Ancestors from the parent upwards.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Nearest inclusive ancestor element with one of the given tag names.
    /// Character data starts the search at its parent.
    pub fn closest(&self, id: NodeId, names: &[&str]) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| self.is_element_named(n, names))
    }

    /// Pre-order descendants, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { dom: self, stack }
    }

    // === Mutation ===

    /// Remove a node from its parent. The node and its subtree stay intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slots[id.0].parent.take() {
            self.slots[parent.0].children.retain(|&c| c != id);
        }
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.slots[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.slots[child.0].parent = Some(parent);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.slots[parent.0].children.push(child);
        self.slots[child.0].parent = Some(parent);
    }

    /// Insert `child` before `reference`, or append when `reference` is `None`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        match reference.and_then(|r| {
            self.children(parent).iter().position(|&c| c == r)
        }) {
            Some(idx) => {
                // Detaching first can shift the reference when `child` is an
                // earlier sibling.
                let shift = self
                    .index_of(child)
                    .filter(|_| self.parent(child) == Some(parent))
                    .is_some_and(|i| i < idx);
                self.insert_child(parent, if shift { idx - 1 } else { idx }, child);
            }
            None => self.append_child(parent, child),
        }
    }

    pub fn remove_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.slots[id.0].children);
        for &c in &children {
            self.slots[c.0].parent = None;
        }
        children
    }

    /// Replace `el` by its children. Returns `(parent, index, count)` of the
    /// moved children, or `None` when `el` is detached.
    pub fn unwrap_element(&mut self, el: NodeId) -> Option<(NodeId, usize, usize)> {
        let parent = self.parent(el)?;
        let index = self.index_of(el)?;
        let children = self.remove_children(el);
        let count = children.len();
        self.detach(el);
        for (i, child) in children.into_iter().enumerate() {
            self.insert_child(parent, index + i, child);
        }
        Some((parent, index, count))
    }

    /// Copy of the node without children, detached.
    pub fn shallow_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.slots[id.0].kind.clone();
        self.alloc(kind)
    }

    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let copy = self.shallow_clone(id);
        for child in self.children(id).to_vec() {
            let child_copy = self.deep_clone(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    // === Attributes ===

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        match el.attrs.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            Some(attr) => attr.value = value.to_string(),
            None => el.attrs.push(Attribute {
                name: SmolStr::new(name.to_ascii_lowercase()),
                value: value.to_string(),
            }),
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        let before = el.attrs.len();
        el.attrs.retain(|a| !a.name.eq_ignore_ascii_case(name));
        el.attrs.len() != before
    }

    // === Class list ===

    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|c| c.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).contains(&class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let mut classes: Vec<String> = self.classes(id).into_iter().map(String::from).collect();
        classes.push(class.to_string());
        self.set_attr(id, "class", &classes.join(" "));
    }

    /// Remove a class; drops the attribute once the list is empty.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let classes: Vec<String> = self
            .classes(id)
            .into_iter()
            .filter(|c| *c != class)
            .map(String::from)
            .collect();
        if classes.is_empty() {
            self.remove_attr(id, "class");
        } else {
            self.set_attr(id, "class", &classes.join(" "));
        }
    }

    // === Inline style ===

    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let decls = style::parse_declarations(self.attr(id, "style")?);
        decls
            .into_iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(property))
            .map(|(_, v)| v)
    }

    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) {
        let current = self.attr(id, "style").unwrap_or_default();
        let updated = style::set_property(current, property, value);
        self.set_attr(id, "style", &updated);
    }

    // === Markup ===

    /// Replace the children of `id` with the parsed body content of `markup`.
    /// `id` itself is kept, so identity held by callers survives.
    pub fn set_inner_html(&mut self, id: NodeId, markup: &str) {
        self.remove_children(id);
        crate::parse::parse_into(self, id, markup);
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        crate::serialize::inner_html(self, id)
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        crate::serialize::outer_html(self, id)
    }
}

/// Pre-order iterator over a subtree, created by [`Dom::descendants`].
pub struct Descendants<'a> {
    dom: &'a Dom,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.stack.pop()?;
        self.stack
            .extend(self.dom.children(next).iter().rev().copied());
        Some(next)
    }
}
