//! Typed form of the loosely-typed item description sent by the caller.
//!
//! The payload is decoded once, here, and every field default is applied
//! during decoding. Only structural problems (no `items` list, an item that
//! is not an object, an item without a usable `id`) are errors.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque identity of a menu item, reported back on click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Wire value of an item's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ItemType {
    #[default]
    Normal,
    Separator,
    Submenu,
    Checkbox,
}

impl ItemType {
    /// Parses a wire value, treating unknown values as [`ItemType::Normal`].
    pub fn from_wire(value: &str) -> Self {
        Self::from_str(value).unwrap_or_else(|_| {
            tracing::debug!("Unknown menu item type `{value}`, using `normal`");
            Self::Normal
        })
    }
}

/// Where an item's icon comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconSource {
    /// Base64 encoded image bytes, preferred over `path`.
    pub base64: Option<String>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Normal,
    /// `None` means indeterminate.
    Checkbox { checked: Option<bool> },
    /// `None` when the caller sent no submenu payload.
    Submenu { items: Option<Vec<ItemDescription>> },
}

/// Fields of every non-separator item, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFields {
    pub id: ItemId,
    pub kind: ItemKind,
    pub label: String,
    pub tool_tip: String,
    pub shortcut: Option<String>,
    pub disabled: bool,
    pub icon: IconSource,
}

impl ItemFields {
    /// A normal item with the documented defaults, disabled included.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::Normal,
            label: String::new(),
            tool_tip: String::new(),
            shortcut: None,
            disabled: true,
            icon: IconSource::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemDescription {
    Separator { id: Option<ItemId> },
    Item(ItemFields),
}

impl ItemDescription {
    pub fn separator() -> Self {
        Self::Separator { id: None }
    }

    pub fn normal(id: impl Into<ItemId>, label: impl Into<String>) -> Self {
        Self::Item(ItemFields {
            label: label.into(),
            ..ItemFields::new(id)
        })
    }

    pub fn checkbox(id: impl Into<ItemId>, label: impl Into<String>, checked: Option<bool>) -> Self {
        Self::Item(ItemFields {
            label: label.into(),
            kind: ItemKind::Checkbox { checked },
            ..ItemFields::new(id)
        })
    }

    pub fn submenu(
        id: impl Into<ItemId>,
        label: impl Into<String>,
        items: Vec<ItemDescription>,
    ) -> Self {
        Self::Item(ItemFields {
            label: label.into(),
            kind: ItemKind::Submenu { items: Some(items) },
            ..ItemFields::new(id)
        })
    }

    /// Marks the item enabled. No-op for separators.
    pub fn enabled(mut self) -> Self {
        if let Self::Item(fields) = &mut self {
            fields.disabled = false;
        }
        self
    }

    /// Sets the shortcut hint. No-op for separators.
    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        if let Self::Item(fields) = &mut self {
            fields.shortcut = Some(shortcut.into());
        }
        self
    }

    pub fn id(&self) -> Option<ItemId> {
        match self {
            Self::Separator { id } => *id,
            Self::Item(fields) => Some(fields.id),
        }
    }
}

/// Location of an item inside the payload, used in error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPath(Vec<usize>);

impl ItemPath {
    fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, index) in self.0.iter().enumerate() {
            if depth == 0 {
                write!(f, "items[{index}]")?;
            } else {
                write!(f, ".submenu[{index}]")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("menu description is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("menu description is not an object")]
    NotAnObject,
    #[error("menu description has no `items` list")]
    MissingItems,
    #[error("{path}.submenu has no `items` list")]
    SubmenuMissingItems { path: ItemPath },
    #[error("{path} is not an object")]
    ItemNotAnObject { path: ItemPath },
    #[error("{path} has no `id`")]
    MissingId { path: ItemPath },
    #[error("{path} has an `id` that is not an integer")]
    InvalidId { path: ItemPath },
}

/// A decoded top-level menu payload, `{ "items": [...] }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuDescription {
    pub items: Vec<ItemDescription>,
}

impl MenuDescription {
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let items = decode_items(value, &ItemPath::default())?;
        Ok(Self { items })
    }
}

impl FromStr for MenuDescription {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

fn decode_items(value: &Value, path: &ItemPath) -> Result<Vec<ItemDescription>, DecodeError> {
    let object = value.as_object().ok_or(if path.0.is_empty() {
        DecodeError::NotAnObject
    } else {
        DecodeError::ItemNotAnObject { path: path.clone() }
    })?;

    let items = object.get("items").and_then(Value::as_array).ok_or_else(|| {
        if path.0.is_empty() {
            DecodeError::MissingItems
        } else {
            DecodeError::SubmenuMissingItems { path: path.clone() }
        }
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| decode_item(item, &path.child(index)))
        .collect()
}

fn decode_item(value: &Value, path: &ItemPath) -> Result<ItemDescription, DecodeError> {
    let item = value
        .as_object()
        .ok_or_else(|| DecodeError::ItemNotAnObject { path: path.clone() })?;

    let kind = string(item, "type")
        .map(ItemType::from_wire)
        .unwrap_or_default();

    if kind == ItemType::Separator {
        let id = decode_id(item, path).ok();
        return Ok(ItemDescription::Separator { id });
    }

    let id = decode_id(item, path)?;

    let kind = match kind {
        ItemType::Checkbox => ItemKind::Checkbox {
            checked: item.get("checked").and_then(Value::as_bool),
        },
        ItemType::Submenu => {
            let items = match item.get("submenu") {
                Some(submenu) if submenu.is_object() => Some(decode_items(submenu, path)?),
                Some(Value::Null) | None => None,
                Some(_) => {
                    tracing::debug!("Ignoring malformed submenu payload at {path}");
                    None
                }
            };
            ItemKind::Submenu { items }
        }
        ItemType::Normal | ItemType::Separator => ItemKind::Normal,
    };

    Ok(ItemDescription::Item(ItemFields {
        id,
        kind,
        label: string(item, "label").unwrap_or_default().to_string(),
        tool_tip: string(item, "toolTip").unwrap_or_default().to_string(),
        shortcut: string(item, "shortcut").map(str::to_string),
        disabled: item.get("disabled").and_then(Value::as_bool).unwrap_or(true),
        icon: IconSource {
            base64: string(item, "base64Icon").map(str::to_string),
            path: string(item, "icon").map(PathBuf::from),
        },
    }))
}

fn decode_id(item: &Map<String, Value>, path: &ItemPath) -> Result<ItemId, DecodeError> {
    match item.get("id") {
        None | Some(Value::Null) => Err(DecodeError::MissingId { path: path.clone() }),
        Some(id) => id
            .as_i64()
            .map(ItemId)
            .ok_or_else(|| DecodeError::InvalidId { path: path.clone() }),
    }
}

fn string<'a>(item: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(item: &ItemDescription) -> &ItemFields {
        match item {
            ItemDescription::Item(fields) => fields,
            ItemDescription::Separator { .. } => panic!("expected an item, got a separator"),
        }
    }

    #[test]
    fn applies_defaults() {
        let description = MenuDescription::from_value(&json!({
            "items": [{ "id": 7 }]
        }))
        .unwrap();

        assert_eq!(
            description.items,
            vec![ItemDescription::Item(ItemFields::new(7))]
        );
        assert!(fields(&description.items[0]).disabled);
    }

    #[test]
    fn reads_every_field() {
        let description = MenuDescription::from_value(&json!({
            "items": [{
                "id": 1,
                "type": "checkbox",
                "label": "Show hidden",
                "toolTip": "Toggles hidden files",
                "shortcut": "⌘H",
                "checked": false,
                "disabled": false,
                "base64Icon": "AAAA",
                "icon": "/tmp/icon.png",
            }]
        }))
        .unwrap();

        let item = fields(&description.items[0]);
        assert_eq!(item.id, ItemId(1));
        assert_eq!(item.kind, ItemKind::Checkbox { checked: Some(false) });
        assert_eq!(item.label, "Show hidden");
        assert_eq!(item.tool_tip, "Toggles hidden files");
        assert_eq!(item.shortcut.as_deref(), Some("⌘H"));
        assert!(!item.disabled);
        assert_eq!(item.icon.base64.as_deref(), Some("AAAA"));
        assert_eq!(item.icon.path, Some(PathBuf::from("/tmp/icon.png")));
    }

    #[test]
    fn unknown_or_missing_type_is_normal() {
        let description = MenuDescription::from_value(&json!({
            "items": [
                { "id": 1, "type": "radio" },
                { "id": 2 },
                { "id": 3, "type": 42 },
                { "id": 4, "type": "Checkbox" },
            ]
        }))
        .unwrap();

        for item in &description.items {
            assert_eq!(fields(item).kind, ItemKind::Normal);
        }
    }

    #[test]
    fn wrongly_typed_fields_fall_back_to_defaults() {
        let description = MenuDescription::from_value(&json!({
            "items": [{
                "id": 1,
                "label": 5,
                "disabled": "no",
                "shortcut": ["⌘Q"],
                "type": "checkbox",
                "checked": "yes",
            }]
        }))
        .unwrap();

        let item = fields(&description.items[0]);
        assert_eq!(item.label, "");
        assert!(item.disabled);
        assert_eq!(item.shortcut, None);
        assert_eq!(item.kind, ItemKind::Checkbox { checked: None });
    }

    #[test]
    fn separator_ignores_other_fields_and_needs_no_id() {
        let description = MenuDescription::from_value(&json!({
            "items": [
                { "type": "separator", "label": "ignored", "disabled": false },
                { "type": "separator", "id": 9 },
            ]
        }))
        .unwrap();

        assert_eq!(
            description.items,
            vec![
                ItemDescription::Separator { id: None },
                ItemDescription::Separator { id: Some(ItemId(9)) },
            ]
        );
    }

    #[test]
    fn nested_submenus() {
        let description = MenuDescription::from_value(&json!({
            "items": [{
                "id": 1,
                "type": "submenu",
                "submenu": { "items": [
                    { "id": 2, "type": "submenu", "submenu": { "items": [{ "id": 3 }] } },
                ] },
            }, {
                "id": 4,
                "type": "submenu",
            }]
        }))
        .unwrap();

        let ItemKind::Submenu { items: Some(level1) } = &fields(&description.items[0]).kind else {
            panic!("expected a submenu");
        };
        let ItemKind::Submenu { items: Some(level2) } = &fields(&level1[0]).kind else {
            panic!("expected a nested submenu");
        };
        assert_eq!(level2[0].id(), Some(ItemId(3)));

        assert_eq!(
            fields(&description.items[1]).kind,
            ItemKind::Submenu { items: None }
        );
    }

    #[test]
    fn missing_id_is_an_error() {
        let err = MenuDescription::from_value(&json!({
            "items": [{ "id": 1 }, { "label": "no id" }]
        }))
        .unwrap_err();

        assert!(matches!(err, DecodeError::MissingId { .. }));
        assert_eq!(err.to_string(), "items[1] has no `id`");
    }

    #[test]
    fn nested_missing_id_reports_path() {
        let err = MenuDescription::from_value(&json!({
            "items": [{ "type": "separator" }, {
                "id": 1,
                "type": "submenu",
                "submenu": { "items": [{ "id": 2 }, { "type": "checkbox" }] },
            }]
        }))
        .unwrap_err();

        let DecodeError::MissingId { path } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(path.indices(), &[1, 1]);
        assert_eq!(err.to_string(), "items[1].submenu[1] has no `id`");
    }

    #[test]
    fn non_integer_id_is_an_error() {
        for id in [json!("1"), json!(1.5), json!(true)] {
            let err = MenuDescription::from_value(&json!({ "items": [{ "id": id }] })).unwrap_err();
            assert!(matches!(err, DecodeError::InvalidId { .. }), "{err}");
        }
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(
            MenuDescription::from_value(&json!([])),
            Err(DecodeError::NotAnObject)
        ));
        assert!(matches!(
            MenuDescription::from_value(&json!({})),
            Err(DecodeError::MissingItems)
        ));
        assert!(matches!(
            MenuDescription::from_value(&json!({ "items": [1] })),
            Err(DecodeError::ItemNotAnObject { .. })
        ));
        assert!(matches!(
            MenuDescription::from_json("{ items"),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn nested_submenu_without_items_names_its_item() {
        let err = MenuDescription::from_value(&json!({ "items": [
            { "type": "separator" },
            { "id": 1 },
            { "id": 2 },
            { "id": 3 },
            { "id": 4, "type": "submenu", "submenu": {} },
        ] }))
        .unwrap_err();

        let DecodeError::SubmenuMissingItems { path } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(path.indices(), &[4]);
        assert_eq!(err.to_string(), "items[4].submenu has no `items` list");

        let err = MenuDescription::from_value(&json!({ "items": [{
            "id": 1,
            "type": "submenu",
            "submenu": { "items": [
                { "id": 2, "type": "submenu", "submenu": { "items": "nope" } },
            ] },
        }] }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "items[0].submenu[0].submenu has no `items` list"
        );
    }

    #[test]
    fn item_type_round_trips_wire_names() {
        assert_eq!(ItemType::from_wire("submenu"), ItemType::Submenu);
        assert_eq!(ItemType::Checkbox.to_string(), "checkbox");
    }
}
