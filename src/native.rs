//! Renders a [`MenuTree`] with muda and routes muda's menu events back
//! into the tree.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use muda::accelerator::{Accelerator, Code, Modifiers as MudaModifiers};
use muda::{
    CheckMenuItem, Icon, IconMenuItem, IsMenuItem, Menu, MenuEvent, MenuId, MenuItem,
    PredefinedMenuItem, Submenu,
};

use crate::description::ItemId;
use crate::menu::{CheckState, EntryKind, MenuEntry, MenuNode, MenuTree};
use crate::shortcut::{KeyEquivalent, Modifiers};

static NEXT_MENU: AtomicU64 = AtomicU64::new(0);

/// A native menu mirroring a [`MenuTree`].
pub struct NativeMenu {
    menu: Menu,
    paths: HashMap<MenuId, Vec<usize>>,
}

impl NativeMenu {
    pub fn new(tree: &MenuTree) -> anyhow::Result<Self> {
        let mut builder = Builder {
            instance: NEXT_MENU.fetch_add(1, Ordering::Relaxed),
            paths: HashMap::new(),
        };

        let items = builder.items(tree, &mut Vec::new())?;
        let menu = Menu::new();
        menu.append_items(&borrowed(&items))
            .context("Failed to populate native menu")?;

        tracing::debug!(
            "Built native menu with {} reachable items",
            builder.paths.len()
        );

        Ok(Self {
            menu,
            paths: builder.paths,
        })
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Index path, in the source tree, of the native item with `id`.
    pub fn path(&self, id: &MenuId) -> Option<&[usize]> {
        self.paths.get(id).map(Vec::as_slice)
    }

    /// Activates the tree entry behind a muda event. Events for other menus
    /// are ignored.
    pub fn dispatch(&self, tree: &MenuTree, event: &MenuEvent) -> Option<ItemId> {
        let path = self.path(event.id())?;
        tree.activate_path(path)
    }
}

struct Builder {
    instance: u64,
    paths: HashMap<MenuId, Vec<usize>>,
}

impl Builder {
    fn items(
        &mut self,
        tree: &MenuTree,
        path: &mut Vec<usize>,
    ) -> anyhow::Result<Vec<Box<dyn IsMenuItem>>> {
        let mut items: Vec<Box<dyn IsMenuItem>> = Vec::with_capacity(tree.len());

        for (index, node) in tree.iter().enumerate() {
            path.push(index);
            let item: Box<dyn IsMenuItem> = match node {
                MenuNode::Separator { .. } => Box::new(PredefinedMenuItem::separator()),
                MenuNode::Entry(entry) => self.entry(entry, path)?,
            };
            path.pop();

            items.push(item);
        }

        Ok(items)
    }

    fn entry(
        &mut self,
        entry: &MenuEntry,
        path: &mut Vec<usize>,
    ) -> anyhow::Result<Box<dyn IsMenuItem>> {
        let id = self.menu_id(path);
        let label = entry.label();
        let enabled = entry.is_enabled();
        let accelerator = entry.key_equivalent().and_then(accelerator);

        if !entry.tool_tip().is_empty() {
            tracing::trace!("Tool tips are not rendered for menu item {}", entry.id());
        }

        let item: Box<dyn IsMenuItem> = match entry.kind() {
            EntryKind::Submenu(tree) => {
                let submenu = Submenu::with_id(id, label, enabled);
                let children = self.items(tree, path)?;
                submenu
                    .append_items(&borrowed(&children))
                    .with_context(|| format!("Failed to populate submenu {}", entry.id()))?;
                Box::new(submenu)
            }
            EntryKind::Checkbox(state) => {
                if *state == CheckState::Mixed {
                    tracing::trace!("Rendering {state} menu item {} as unchecked", entry.id());
                }
                let checked = *state == CheckState::Checked;
                Box::new(CheckMenuItem::with_id(id, label, enabled, checked, accelerator))
            }
            EntryKind::Normal => match entry.icon().and_then(native_icon) {
                Some(icon) => {
                    let item = IconMenuItem::with_id(id, label, enabled, Some(icon), accelerator);
                    Box::new(item)
                }
                None => {
                    let item = MenuItem::with_id(id, label, enabled, accelerator);
                    Box::new(item)
                }
            },
        };

        self.paths.insert(item.id().clone(), path.clone());
        Ok(item)
    }

    fn menu_id(&self, path: &[usize]) -> MenuId {
        MenuId::new(menu_id(self.instance, path))
    }
}

fn menu_id(instance: u64, path: &[usize]) -> String {
    let path = path
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(".");
    format!("tray-menu-{instance}:{path}")
}

fn borrowed(items: &[Box<dyn IsMenuItem>]) -> Vec<&dyn IsMenuItem> {
    items.iter().map(|item| item.as_ref()).collect()
}

fn native_icon(icon: &crate::icon::MenuIcon) -> Option<Icon> {
    Icon::from_rgba(icon.rgba().to_vec(), icon.width(), icon.height())
        .inspect_err(|e| tracing::debug!("Failed to convert menu icon: {e}"))
        .ok()
}

fn accelerator(shortcut: &KeyEquivalent) -> Option<Accelerator> {
    let Some(code) = key_code(&shortcut.key) else {
        tracing::debug!("No native key for shortcut {shortcut}");
        return None;
    };

    let modifiers = modifiers(shortcut.modifiers);
    Some(Accelerator::new(
        (!modifiers.is_empty()).then_some(modifiers),
        code,
    ))
}

fn modifiers(modifiers: Modifiers) -> MudaModifiers {
    const MAPPING: &[(Modifiers, MudaModifiers)] = &[
        (Modifiers::COMMAND, MudaModifiers::SUPER),
        (Modifiers::SHIFT, MudaModifiers::SHIFT),
        (Modifiers::OPTION, MudaModifiers::ALT),
        (Modifiers::CONTROL, MudaModifiers::CONTROL),
        (Modifiers::FUNCTION, MudaModifiers::FN),
        (Modifiers::CAPS_LOCK, MudaModifiers::CAPS_LOCK),
    ];

    MAPPING
        .iter()
        .filter(|(ours, _)| modifiers.contains(*ours))
        .fold(MudaModifiers::empty(), |acc, (_, theirs)| acc | *theirs)
}

fn key_code(key: &str) -> Option<Code> {
    let mut chars = key.chars();
    let (Some(key), None) = (chars.next(), chars.next()) else {
        return None;
    };

    let code = match key.to_ascii_lowercase() {
        'a' => Code::KeyA,
        'b' => Code::KeyB,
        'c' => Code::KeyC,
        'd' => Code::KeyD,
        'e' => Code::KeyE,
        'f' => Code::KeyF,
        'g' => Code::KeyG,
        'h' => Code::KeyH,
        'i' => Code::KeyI,
        'j' => Code::KeyJ,
        'k' => Code::KeyK,
        'l' => Code::KeyL,
        'm' => Code::KeyM,
        'n' => Code::KeyN,
        'o' => Code::KeyO,
        'p' => Code::KeyP,
        'q' => Code::KeyQ,
        'r' => Code::KeyR,
        's' => Code::KeyS,
        't' => Code::KeyT,
        'u' => Code::KeyU,
        'v' => Code::KeyV,
        'w' => Code::KeyW,
        'x' => Code::KeyX,
        'y' => Code::KeyY,
        'z' => Code::KeyZ,
        '0' => Code::Digit0,
        '1' => Code::Digit1,
        '2' => Code::Digit2,
        '3' => Code::Digit3,
        '4' => Code::Digit4,
        '5' => Code::Digit5,
        '6' => Code::Digit6,
        '7' => Code::Digit7,
        '8' => Code::Digit8,
        '9' => Code::Digit9,
        ' ' => Code::Space,
        ',' => Code::Comma,
        '.' => Code::Period,
        '/' => Code::Slash,
        ';' => Code::Semicolon,
        '\'' => Code::Quote,
        '[' => Code::BracketLeft,
        ']' => Code::BracketRight,
        '\\' => Code::Backslash,
        '-' => Code::Minus,
        '=' => Code::Equal,
        '`' => Code::Backquote,
        _ => return None,
    };

    Some(code)
}
