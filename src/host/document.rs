// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Arena-backed document model standing in for the live checkout page.
//!
//! Nodes are never freed: removing a node only detaches it, so a stale
//! [`NodeId`] stays valid to read but reports `is_attached() == false`.
//! Callers holding ids across a delay re-validate with [`Document::is_attached`].

use std::collections::HashSet;

use super::selector::Selector;
use crate::utils::{escape_html, escape_html_attr};

/// Handle to a node inside a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Element payload: tag, attributes, classes and form state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    checked: bool,
    selected: bool,
    hidden: bool,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            classes: Vec::new(),
            checked: false,
            selected: false,
            hidden: false,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// A child-list change under `target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
}

/// Stylesheet installed under `<head>` whose rules all mean `display:none`.
#[derive(Clone, Debug)]
struct HideSheet {
    node: NodeId,
    rules: Vec<Selector>,
}

/// Mutable document tree plus the page-global state scripts rely on.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    sheets: Vec<HideSheet>,
    mutations: Vec<MutationRecord>,
    /// Records dropped by [`Document::compact_mutations`]; cursors stay
    /// absolute.
    mutations_dropped: usize,
    flags: HashSet<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty `<html><head></head><body></body></html>` document.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            sheets: Vec::new(),
            mutations: Vec::new(),
            mutations_dropped: 0,
            flags: HashSet::new(),
        };
        doc.root = doc.create_element("html");
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        doc.link(doc.root, doc.head, None);
        doc.link(doc.root, doc.body, None);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    // ----- tree structure -------------------------------------------------

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
            .collect()
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.link(parent, child, None);
        self.record(parent);
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.link(parent, child, Some(0));
        self.record(parent);
    }

    /// Insert `node` as the next sibling of `reference`. No-op when the
    /// reference has no parent.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        self.detach(node);
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == reference)
            .map(|p| p + 1);
        self.link(parent, node, pos);
        self.record(parent);
    }

    /// Detach `node` from its parent.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.parent(node) {
            self.detach(node);
            self.record(parent);
        }
    }

    pub fn clear_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in &children {
            self.nodes[child.0].parent = None;
        }
        if !children.is_empty() {
            self.record(node);
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId, pos: Option<usize>) {
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        match pos {
            Some(p) if p <= children.len() => children.insert(p, child),
            _ => children.push(child),
        }
    }

    fn record(&mut self, target: NodeId) {
        self.mutations.push(MutationRecord { target });
    }

    /// Whether `node` is still reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.is_inclusive_descendant(node, self.root)
    }

    pub fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    // ----- text -----------------------------------------------------------

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element(_) => {
                for child in &self.nodes[node.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.clear_children(node);
        let t = self.create_text(text);
        self.append_child(node, t);
    }

    // ----- attributes and state -------------------------------------------

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attr(name)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.set_attr(name, value);
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.element_mut(node) {
            el.remove_attr(name);
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            el.add_class(class);
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            el.remove_class(class);
        }
    }

    pub fn is_checked(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(Element::is_checked)
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(el) = self.element_mut(node) {
            el.checked = checked;
        }
    }

    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        if let Some(el) = self.element_mut(node) {
            el.hidden = hidden;
        }
    }

    /// Whether the node renders: attached, and neither it nor an ancestor is
    /// hidden inline or by an installed stylesheet rule.
    pub fn is_displayed(&self, node: NodeId) -> bool {
        if !self.is_attached(node) {
            return false;
        }
        let mut cur = Some(node);
        while let Some(n) = cur {
            if let Some(el) = self.element(n)
                && (el.hidden || self.hidden_by_sheet(el))
            {
                return false;
            }
            cur = self.parent(n);
        }
        true
    }

    fn hidden_by_sheet(&self, el: &Element) -> bool {
        self.sheets
            .iter()
            .filter(|s| self.is_attached(s.node))
            .any(|s| s.rules.iter().any(|r| r.matches(el)))
    }

    // ----- select controls --------------------------------------------------

    /// `<option>` children of a `<select>`.
    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.find_all(select, &Selector::tag("option"))
    }

    /// Value of the selected option, if any option is selected.
    pub fn select_value(&self, select: NodeId) -> Option<String> {
        self.options(select)
            .into_iter()
            .find(|o| self.element(*o).is_some_and(|el| el.selected))
            .and_then(|o| self.attr(o, "value").map(str::to_string))
    }

    /// Select the option whose value matches; `None` (or an unknown value)
    /// leaves nothing selected.
    pub fn set_select_value(&mut self, select: NodeId, value: Option<&str>) {
        for option in self.options(select) {
            let is_match = value.is_some() && self.attr(option, "value") == value;
            if let Some(el) = self.element_mut(option) {
                el.selected = is_match;
            }
        }
    }

    // ----- queries -----------------------------------------------------------

    /// Every attached element matching `selector`, in document order.
    pub fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.find_all(self.root, selector)
    }

    pub fn query_first(&self, selector: &Selector) -> Option<NodeId> {
        self.find_first(self.root, selector)
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_first(&Selector::id(id))
    }

    /// Matching descendants of `scope` (excluding `scope`), in document order.
    pub fn find_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            if let Some(el) = self.element(n) {
                if selector.matches(el) {
                    out.push(n);
                }
                stack.extend(self.children(n).iter().rev().copied());
            }
        }
        out
    }

    pub fn find_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.find_all(scope, selector).into_iter().next()
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if self.element(n).is_some_and(|el| selector.matches(el)) {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }

    /// Element siblings of `node` matching `selector`, in document order.
    pub fn siblings(&self, node: NodeId, selector: &Selector) -> Vec<NodeId> {
        let Some(parent) = self.parent(node) else {
            return Vec::new();
        };
        self.children(parent)
            .iter()
            .copied()
            .filter(|c| *c != node)
            .filter(|c| self.element(*c).is_some_and(|el| selector.matches(el)))
            .collect()
    }

    /// First matching sibling after `node`.
    pub fn next_sibling_matching(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let parent = self.parent(node)?;
        self.children(parent)
            .iter()
            .copied()
            .skip_while(|c| *c != node)
            .skip(1)
            .find(|c| self.element(*c).is_some_and(|el| selector.matches(el)))
    }

    // ----- page globals -------------------------------------------------------

    /// Install a `<style id=..>` whose rules hide matching elements. Returns
    /// `false` when a style with that id already exists.
    pub fn install_hide_sheet(&mut self, style_id: &str, rules: Vec<Selector>) -> bool {
        if self.element_by_id(style_id).is_some() {
            return false;
        }
        let style = self.create_element("style");
        self.set_attr(style, "id", style_id);
        let css: String = rules
            .iter()
            .map(|r| format!("{r}{{display:none !important;}}"))
            .collect();
        self.set_text(style, &css);
        let head = self.head;
        self.append_child(head, style);
        self.sheets.push(HideSheet { node: style, rules });
        true
    }

    /// Set a window-level flag. Returns `true` if it was not already set.
    pub fn set_flag(&mut self, name: &str) -> bool {
        self.flags.insert(name.to_string())
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Child-list mutations recorded since `cursor` (a previous
    /// [`Document::mutation_count`]).
    pub fn mutations_since(&self, cursor: usize) -> &[MutationRecord] {
        let start = cursor.saturating_sub(self.mutations_dropped);
        self.mutations.get(start..).unwrap_or(&[])
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations_dropped + self.mutations.len()
    }

    /// Forget records older than cursor `before`. Returns how many were
    /// dropped.
    pub fn compact_mutations(&mut self, before: usize) -> usize {
        let count = before
            .saturating_sub(self.mutations_dropped)
            .min(self.mutations.len());
        self.mutations.drain(..count);
        self.mutations_dropped += count;
        count
    }

    // ----- serialization --------------------------------------------------------

    /// Serialize `node` and its subtree as HTML.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let el = match &self.nodes[node.0].kind {
            NodeKind::Text(t) => {
                out.push_str(&escape_html(t));
                return;
            }
            NodeKind::Element(el) => el,
        };
        out.push('<');
        out.push_str(&el.tag);
        for (name, value) in &el.attrs {
            out.push_str(&format!(" {name}=\"{}\"", escape_html_attr(value)));
        }
        if !el.classes.is_empty() {
            out.push_str(&format!(
                " class=\"{}\"",
                escape_html_attr(&el.classes.join(" "))
            ));
        }
        if el.hidden {
            out.push_str(" style=\"display: none;\"");
        }
        if el.checked {
            out.push_str(" checked");
        }
        if el.selected {
            out.push_str(" selected");
        }
        out.push('>');
        if el.tag == "input" {
            return;
        }
        for child in &self.nodes[node.0].children {
            self.write_html(*child, out);
        }
        out.push_str(&format!("</{}>", el.tag));
    }
}
