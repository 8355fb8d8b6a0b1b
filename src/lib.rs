//! Native tray context menus built from a declarative item description.
//!
//! A caller sends a loosely-typed `{ "items": [...] }` payload. It is decoded
//! once into [`ItemDescription`]s, then [`MenuTree::build`] turns it into a
//! tree of [`MenuNode`]s with resolved icons, parsed shortcut hints and a
//! single click callback that reports the id of whichever entry was
//! activated, at any nesting depth.

pub mod config;
pub mod description;
pub mod icon;
pub mod menu;
#[cfg(feature = "native")]
pub mod native;
pub mod shortcut;

pub use config::Config;
pub use description::{
    DecodeError, IconSource, ItemDescription, ItemFields, ItemId, ItemKind, ItemPath, ItemType,
    MenuDescription,
};
pub use icon::{IconResolver, MenuIcon, DEFAULT_ICON_SIZE};
pub use menu::{CheckState, ClickAction, EntryKind, MenuEntry, MenuNode, MenuTree};
#[cfg(feature = "native")]
pub use native::NativeMenu;
pub use shortcut::{KeyEquivalent, Modifiers};
