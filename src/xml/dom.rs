use std::sync::atomic::{AtomicU32, Ordering};

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::error::{FxStudioError, FxStudioResult};

/// Handle to a node of one particular [`XmlDocument`]; ids from another document are not
/// [`contained`](XmlDocument::contains) in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    doc: u32,
    index: usize,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index
    }
}

static NEXT_DOCUMENT_ID: AtomicU32 = AtomicU32::new(1);

/// A selectable node: an element, or one attribute of an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum XmlNode {
    Element(NodeId),
    Attribute { owner: NodeId, index: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Document,
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed XML tree. Node zero is the document node; it has no parent.
///
/// Elements created with [`XmlDocument::create_element`] start detached and only get a
/// parent once appended, mirroring DOM `CreateElement`/`AppendChild`.
///
/// A clone keeps the identity of its source, so ids taken before cloning stay usable on
/// the copy.
#[derive(Clone, Debug)]
pub struct XmlDocument {
    id: u32,
    nodes: Vec<NodeData>,
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlDocument {
    pub fn new() -> Self {
        Self {
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn document_node(&self) -> NodeId {
        self.node_id(0)
    }

    fn node_id(&self, index: usize) -> NodeId {
        NodeId {
            doc: self.id,
            index,
        }
    }

    /// Whether `id` was handed out by this document.
    pub fn contains(&self, id: NodeId) -> bool {
        id.doc == self.id && id.index < self.nodes.len()
    }

    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Element {
            name: name.into(),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = self.node_id(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Appends `child` as the last child of `parent`, detaching it from any previous parent.
    ///
    /// `child` must not be `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            !self.ancestors_or_self(parent).any(|n| n == child),
            "append_child would create a cycle"
        );
        self.detach(child);
        self.nodes[child.index].parent = Some(parent);
        self.nodes[parent.index].children.push(child);
    }

    /// Installs `element` as the document element, replacing any previous one.
    pub fn set_root(&mut self, element: NodeId) {
        if let Some(old) = self.root_element() {
            self.detach(old);
        }
        let doc = self.document_node();
        self.append_child(doc, element);
    }

    pub fn root_element(&self) -> Option<NodeId> {
        self.child_elements(self.document_node()).next()
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.nodes[child.index].parent != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    /// Puts `new` in the position currently held by `old`. Returns false if `old` is not a
    /// child of `parent`.
    pub fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> bool {
        let Some(pos) = self.nodes[parent.index].children.iter().position(|&c| c == old) else {
            return false;
        };
        self.detach(new);
        // Detaching `new` may have shifted `old` if both shared `parent`.
        let pos = self.nodes[parent.index]
            .children
            .iter()
            .position(|&c| c == old)
            .unwrap_or(pos);
        self.nodes[parent.index].children[pos] = new;
        self.nodes[new.index].parent = Some(parent);
        self.nodes[old.index].parent = None;
        true
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index].parent.take() {
            self.nodes[parent.index].children.retain(|&c| c != id);
        }
    }

    fn ancestors_or_self(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |n| self.nodes[n.index].parent)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index].children
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.index].kind, NodeKind::Element { .. })
    }

    /// Element tag name; `None` for document and text nodes.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.index]
            .children
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
    }

    pub fn child_elements_named<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.child_elements(id)
            .filter(move |&c| self.name(c) == Some(name))
    }

    pub fn first_child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements_named(id, name).next()
    }

    /// Pre-order walk of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n.index].children.iter().rev().copied());
        }
        out
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.nodes[id.index].kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Adds the attribute at the end, or overwrites the value in place if the name exists.
    /// No-op on non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, attr: Attribute) {
        let NodeKind::Element { attributes, .. } = &mut self.nodes[id.index].kind else {
            return;
        };
        match attributes.iter_mut().find(|a| a.name == attr.name) {
            Some(existing) => existing.value = attr.value,
            None => attributes.push(attr),
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in self.descendants(id) {
            if let NodeKind::Text(t) = &self.nodes[n.index].kind {
                out.push_str(t);
            }
        }
        out
    }

    /// Replaces all children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        for child in std::mem::take(&mut self.nodes[id.index].children) {
            self.nodes[child.index].parent = None;
        }
        let t = self.create_text(text);
        self.append_child(id, t);
    }

    /// Deep-copies `node` (and its subtree) out of `src` into this document, detached.
    pub fn import_subtree(&mut self, src: &XmlDocument, node: NodeId) -> NodeId {
        let copy = self.push(src.nodes[node.index].kind.clone());
        for &child in &src.nodes[node.index].children {
            let c = self.import_subtree(src, child);
            self.append_child(copy, c);
        }
        copy
    }

    /// Compact outer XML of one node, the form handed to the renderer.
    pub fn to_xml_string(&self, id: NodeId) -> FxStudioResult<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_node(&mut writer, id)?;
        into_string(writer.into_inner())
    }

    /// Whole document with declaration and four-space indentation, the form saved to disk.
    pub fn to_pretty_string(&self) -> FxStudioResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| FxStudioError::xml(e.to_string()))?;
        self.write_node(&mut writer, self.document_node())?;
        let mut out = into_string(writer.into_inner())?;
        out.push('\n');
        Ok(out)
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> FxStudioResult<()> {
        let node = &self.nodes[id.index];
        match &node.kind {
            NodeKind::Document => {
                for &child in &node.children {
                    self.write_node(writer, child)?;
                }
            }
            NodeKind::Text(text) => {
                writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(|e| FxStudioError::xml(e.to_string()))?;
            }
            NodeKind::Element { name, attributes } => {
                let mut start = BytesStart::new(name.as_str());
                for a in attributes {
                    start.push_attribute((a.name.as_str(), a.value.as_str()));
                }
                if node.children.is_empty() {
                    writer
                        .write_event(Event::Empty(start))
                        .map_err(|e| FxStudioError::xml(e.to_string()))?;
                } else {
                    writer
                        .write_event(Event::Start(start))
                        .map_err(|e| FxStudioError::xml(e.to_string()))?;
                    for &child in &node.children {
                        self.write_node(writer, child)?;
                    }
                    writer
                        .write_event(Event::End(BytesEnd::new(name.as_str())))
                        .map_err(|e| FxStudioError::xml(e.to_string()))?;
                }
            }
        }
        Ok(())
    }

    /// Parses a complete document. Whitespace-only text, declarations, comments and
    /// processing instructions are dropped; other text is kept verbatim.
    pub fn parse(xml: &str) -> FxStudioResult<Self> {
        let mut reader = Reader::from_str(xml);

        let mut doc = Self::new();
        let mut stack = vec![doc.document_node()];

        loop {
            let event = match reader.read_event() {
                Ok(ev) => ev,
                Err(e) => {
                    return Err(FxStudioError::xml(format!(
                        "at byte {}: {e}",
                        reader.buffer_position()
                    )));
                }
            };
            let parent = stack.last().copied().unwrap_or(doc.document_node());
            match event {
                Event::Start(start) => {
                    let id = doc.element_from_start(&start, parent)?;
                    stack.push(id);
                }
                Event::Empty(start) => {
                    doc.element_from_start(&start, parent)?;
                }
                Event::End(_) => {
                    if stack.len() <= 1 {
                        return Err(FxStudioError::xml("unbalanced closing tag"));
                    }
                    stack.pop();
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| FxStudioError::xml(e.to_string()))?;
                    doc.push_text(parent, &text)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    doc.push_text(parent, &text)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if stack.len() != 1 {
            return Err(FxStudioError::xml("unexpected end of input (unclosed element)"));
        }
        if doc.root_element().is_none() {
            return Err(FxStudioError::xml("document has no root element"));
        }
        Ok(doc)
    }

    fn element_from_start(
        &mut self,
        start: &BytesStart<'_>,
        parent: NodeId,
    ) -> FxStudioResult<NodeId> {
        if parent == self.document_node() && self.root_element().is_some() {
            return Err(FxStudioError::xml("document has more than one root element"));
        }
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| FxStudioError::xml(e.to_string()))?
            .to_string();
        let id = self.create_element(name);
        for attr in start.attributes() {
            let attr = attr.map_err(|e| FxStudioError::xml(e.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| FxStudioError::xml(e.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| FxStudioError::xml(e.to_string()))?
                .into_owned();
            self.set_attribute(id, Attribute::new(key, value));
        }
        self.append_child(parent, id);
        Ok(id)
    }

    fn push_text(&mut self, parent: NodeId, text: &str) -> FxStudioResult<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        if parent == self.document_node() {
            return Err(FxStudioError::xml("text outside the root element"));
        }
        let t = self.create_text(text);
        self.append_child(parent, t);
        Ok(())
    }
}

/// XML 1.0 `Name` production: whether `name` can be used as an element or attribute name.
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | '_' | 'A'..='Z' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

fn into_string(bytes: Vec<u8>) -> FxStudioResult<String> {
    String::from_utf8(bytes).map_err(|e| FxStudioError::xml(e.to_string()))
}
