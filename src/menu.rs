//! Menu tree built from an item description.
//!
//! Every tree owns one click slot. The root slot holds the caller's
//! callback. A child tree's slot holds a forwarder with a non-owning handle
//! to its parent's slot, so a click at any depth surfaces at the root with
//! the id of the entry that was activated.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::description::{
    DecodeError, ItemDescription, ItemFields, ItemId, ItemKind, MenuDescription,
};
use crate::icon::{IconResolver, MenuIcon};
use crate::shortcut::{self, KeyEquivalent};

type ClickCallback = Box<dyn Fn(ItemId)>;

#[derive(Default)]
struct ClickSlot {
    callback: RefCell<Option<ClickCallback>>,
}

impl ClickSlot {
    fn emit(&self, id: ItemId) {
        if let Some(callback) = self.callback.borrow().as_ref() {
            callback(id);
        }
    }
}

/// Click action wired to an enabled entry.
#[derive(Clone)]
pub struct ClickAction {
    id: ItemId,
    slot: Weak<ClickSlot>,
}

impl ClickAction {
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Reports this entry's id through the tree it belongs to.
    pub fn fire(&self) {
        if let Some(slot) = self.slot.upgrade() {
            slot.emit(self.id);
        }
    }
}

impl PartialEq for ClickAction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::fmt::Debug for ClickAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ClickAction").field(&self.id).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CheckState {
    Checked,
    Unchecked,
    /// Indeterminate, shown when the caller sent no `checked` value.
    Mixed,
}

impl From<Option<bool>> for CheckState {
    fn from(checked: Option<bool>) -> Self {
        match checked {
            None => Self::Mixed,
            Some(true) => Self::Checked,
            Some(false) => Self::Unchecked,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum EntryKind {
    Normal,
    Checkbox(CheckState),
    Submenu(MenuTree),
}

/// A menu entry that is not a separator.
#[derive(Debug, PartialEq)]
pub struct MenuEntry {
    id: ItemId,
    label: String,
    tool_tip: String,
    icon: Option<MenuIcon>,
    key_equivalent: Option<KeyEquivalent>,
    enabled: bool,
    action: Option<ClickAction>,
    kind: EntryKind,
}

impl MenuEntry {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tool_tip(&self) -> &str {
        &self.tool_tip
    }

    pub fn icon(&self) -> Option<&MenuIcon> {
        self.icon.as_ref()
    }

    pub fn key_equivalent(&self) -> Option<&KeyEquivalent> {
        self.key_equivalent.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `None` for disabled entries.
    pub fn action(&self) -> Option<&ClickAction> {
        self.action.as_ref()
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn check_state(&self) -> Option<CheckState> {
        match self.kind {
            EntryKind::Checkbox(state) => Some(state),
            _ => None,
        }
    }

    pub fn submenu(&self) -> Option<&MenuTree> {
        match &self.kind {
            EntryKind::Submenu(tree) => Some(tree),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum MenuNode {
    Separator { id: Option<ItemId> },
    Entry(MenuEntry),
}

impl MenuNode {
    pub fn id(&self) -> Option<ItemId> {
        match self {
            Self::Separator { id } => *id,
            Self::Entry(entry) => Some(entry.id),
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator { .. })
    }

    pub fn entry(&self) -> Option<&MenuEntry> {
        match self {
            Self::Entry(entry) => Some(entry),
            Self::Separator { .. } => None,
        }
    }

    pub fn action(&self) -> Option<&ClickAction> {
        self.entry().and_then(MenuEntry::action)
    }

    pub fn submenu(&self) -> Option<&MenuTree> {
        self.entry().and_then(MenuEntry::submenu)
    }
}

/// An ordered list of menu nodes with a single outward click callback.
pub struct MenuTree {
    nodes: Vec<MenuNode>,
    slot: Rc<ClickSlot>,
}

impl MenuTree {
    /// Builds a tree, resolving icons at the default size.
    pub fn build(items: &[ItemDescription]) -> Self {
        Self::build_with(items, &IconResolver::default())
    }

    /// Builds a tree. Malformed fields degrade to defaults, this never fails.
    pub fn build_with(items: &[ItemDescription], icons: &IconResolver) -> Self {
        let slot = Rc::new(ClickSlot::default());
        let nodes = items
            .iter()
            .map(|item| build_node(item, &slot, icons))
            .collect();

        Self { nodes, slot }
    }

    pub fn from_description(description: &MenuDescription, icons: &IconResolver) -> Self {
        Self::build_with(&description.items, icons)
    }

    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let description = MenuDescription::from_json(json)?;
        Ok(Self::build(&description.items))
    }

    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let description = MenuDescription::from_value(value)?;
        Ok(Self::build(&description.items))
    }

    /// Sets the callback that receives the id of every activated entry,
    /// including entries nested in submenus. Replaces any previous callback.
    pub fn set_on_click(&mut self, callback: impl Fn(ItemId) + 'static) {
        *self.slot.callback.borrow_mut() = Some(Box::new(callback));
    }

    pub fn clear_on_click(&mut self) {
        self.slot.callback.borrow_mut().take();
    }

    /// Registers this tree to forward its clicks into `parent`.
    fn forward_to(&self, parent: &Rc<ClickSlot>) {
        let parent = Rc::downgrade(parent);
        *self.slot.callback.borrow_mut() = Some(Box::new(move |id| {
            if let Some(parent) = parent.upgrade() {
                parent.emit(id);
            }
        }));
    }

    pub fn nodes(&self) -> &[MenuNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MenuNode> {
        self.nodes.iter()
    }

    /// Called by the toolkit when the node at `index` of this tree is
    /// activated. Returns the reported id, or `None` when the node has no
    /// action.
    pub fn activate(&self, index: usize) -> Option<ItemId> {
        let action = self.nodes.get(index)?.action()?;
        tracing::trace!("Menu item {} activated", action.id());
        action.fire();
        Some(action.id())
    }

    /// Walks `path` through nested submenus and activates the last index.
    pub fn activate_path(&self, path: &[usize]) -> Option<ItemId> {
        let (last, parents) = path.split_last()?;
        let mut tree = self;
        for &index in parents {
            tree = tree.nodes.get(index)?.submenu()?;
        }
        tree.activate(*last)
    }

    /// Depth-first lookup of the first entry with `id`.
    pub fn find(&self, id: ItemId) -> Option<&MenuEntry> {
        let path = self.path_of(id)?;
        let (last, parents) = path.split_last()?;
        let mut tree = self;
        for &index in parents {
            tree = tree.nodes[index].submenu()?;
        }
        tree.nodes[*last].entry()
    }

    /// Index path of the first entry with `id`, suitable for
    /// [`MenuTree::activate_path`].
    pub fn path_of(&self, id: ItemId) -> Option<Vec<usize>> {
        for (index, node) in self.nodes.iter().enumerate() {
            let Some(entry) = node.entry() else {
                continue;
            };

            if entry.id == id {
                return Some(vec![index]);
            }

            if let Some(mut path) = entry.submenu().and_then(|tree| tree.path_of(id)) {
                path.insert(0, index);
                return Some(path);
            }
        }

        None
    }
}

impl<'a> IntoIterator for &'a MenuTree {
    type Item = &'a MenuNode;
    type IntoIter = std::slice::Iter<'a, MenuNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for MenuTree {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl std::fmt::Debug for MenuTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuTree")
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}

fn build_node(item: &ItemDescription, slot: &Rc<ClickSlot>, icons: &IconResolver) -> MenuNode {
    let fields = match item {
        ItemDescription::Separator { id } => return MenuNode::Separator { id: *id },
        ItemDescription::Item(fields) => fields,
    };

    let enabled = !fields.disabled;
    let action = enabled.then(|| ClickAction {
        id: fields.id,
        slot: Rc::downgrade(slot),
    });

    let kind = match &fields.kind {
        ItemKind::Normal => EntryKind::Normal,
        ItemKind::Checkbox { checked } => EntryKind::Checkbox(CheckState::from(*checked)),
        ItemKind::Submenu { items } => {
            let child = MenuTree::build_with(items.as_deref().unwrap_or_default(), icons);
            child.forward_to(slot);
            EntryKind::Submenu(child)
        }
    };

    MenuNode::Entry(MenuEntry {
        id: fields.id,
        label: fields.label.clone(),
        tool_tip: fields.tool_tip.clone(),
        icon: icons.resolve(&fields.icon),
        key_equivalent: key_equivalent(fields),
        enabled,
        action,
        kind,
    })
}

fn key_equivalent(fields: &ItemFields) -> Option<KeyEquivalent> {
    let hint = fields.shortcut.as_deref().filter(|hint| !hint.is_empty())?;
    let parsed = shortcut::parse(hint);
    if parsed.is_none() {
        tracing::debug!("Ignoring unsupported shortcut `{hint}` on menu item {}", fields.id);
    }
    parsed
}
