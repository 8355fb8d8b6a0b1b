//! Shortcut hints such as `"⌘⇧Space"` or `"⌘Q"`.
//!
//! Hints are only rendered next to a menu entry, they are never executed.
//! The grammar is deliberately small: a run of modifier glyphs followed by a
//! single key. Anything else is rejected and the entry gets no hint.

use std::fmt;

use unicode_segmentation::UnicodeSegmentation;

bitflags::bitflags! {
    /// Modifier keys held together with the main key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const COMMAND = 1 << 0;
        const SHIFT = 1 << 1;
        const OPTION = 1 << 2;
        const CONTROL = 1 << 3;
        const FUNCTION = 1 << 4;
        const CAPS_LOCK = 1 << 5;
    }
}

/// Prefixes stripped from the front of a hint, in lookup order.
const MODIFIER_PREFIXES: &[(&str, Modifiers)] = &[
    ("⌘", Modifiers::COMMAND),
    ("⇧", Modifiers::SHIFT),
    ("⌥", Modifiers::OPTION),
    ("⌃", Modifiers::CONTROL),
    ("fn", Modifiers::FUNCTION),
    ("⇪", Modifiers::CAPS_LOCK),
];

/// Display order of modifier glyphs, following the macOS menu convention.
const GLYPH_ORDER: &[(Modifiers, &str)] = &[
    (Modifiers::FUNCTION, "fn"),
    (Modifiers::CAPS_LOCK, "⇪"),
    (Modifiers::CONTROL, "⌃"),
    (Modifiers::OPTION, "⌥"),
    (Modifiers::SHIFT, "⇧"),
    (Modifiers::COMMAND, "⌘"),
];

/// A key plus the modifiers a native menu shows as the entry's hint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEquivalent {
    /// A single lower-cased grapheme, `" "` for space.
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEquivalent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// See [`parse`].
    pub fn parse(hint: &str) -> Option<Self> {
        parse(hint)
    }
}

impl fmt::Display for KeyEquivalent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (modifier, glyph) in GLYPH_ORDER {
            if self.modifiers.contains(*modifier) {
                f.write_str(glyph)?;
            }
        }

        match self.key.as_str() {
            " " => f.write_str("Space"),
            key => write!(f, "{}", key.to_uppercase()),
        }
    }
}

/// Parses a human readable shortcut hint.
///
/// Returns `None` for empty hints, modifier runs without a key and key names
/// longer than one grapheme other than `space`.
pub fn parse(hint: &str) -> Option<KeyEquivalent> {
    let mut rest = hint.trim();
    if rest.is_empty() {
        return None;
    }

    let mut modifiers = Modifiers::empty();
    'strip: loop {
        for (prefix, modifier) in MODIFIER_PREFIXES {
            if let Some(stripped) = strip_prefix_ignore_ascii_case(rest, prefix) {
                modifiers.insert(*modifier);
                rest = stripped;
                continue 'strip;
            }
        }
        break;
    }

    let key_label = rest.trim();
    if key_label.is_empty() {
        return None;
    }

    if key_label.eq_ignore_ascii_case("space") {
        return Some(KeyEquivalent::new(' ', modifiers));
    }

    let mut graphemes = key_label.graphemes(true);
    let (Some(key), None) = (graphemes.next(), graphemes.next()) else {
        tracing::trace!("Unsupported shortcut key `{key_label}` in `{hint}`");
        return None;
    };

    Some(KeyEquivalent::new(key.to_lowercase(), modifiers))
}

fn strip_prefix_ignore_ascii_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_q() {
        assert_eq!(
            parse("⌘Q"),
            Some(KeyEquivalent::new('q', Modifiers::COMMAND))
        );
    }

    #[test]
    fn command_shift_space() {
        assert_eq!(
            parse("⌘⇧Space"),
            Some(KeyEquivalent::new(' ', Modifiers::COMMAND | Modifiers::SHIFT))
        );
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn rejects_modifiers_without_key() {
        assert_eq!(parse("⌘"), None);
        assert_eq!(parse("⌘⇧ "), None);
        assert_eq!(parse("fn"), None);
    }

    #[test]
    fn rejects_named_keys() {
        assert_eq!(parse("F1"), None);
        assert_eq!(parse("⌘Enter"), None);
        assert_eq!(parse("⌃Tab"), None);
    }

    #[test]
    fn bare_key_has_no_modifiers() {
        assert_eq!(parse("Q"), Some(KeyEquivalent::new('q', Modifiers::empty())));
        assert_eq!(parse(" 1 "), Some(KeyEquivalent::new('1', Modifiers::empty())));
    }

    #[test]
    fn modifiers_in_any_order() {
        let expected = Some(KeyEquivalent::new(
            'k',
            Modifiers::COMMAND | Modifiers::OPTION | Modifiers::CONTROL,
        ));
        assert_eq!(parse("⌃⌥⌘K"), expected);
        assert_eq!(parse("⌘⌃⌥K"), expected);
    }

    #[test]
    fn function_and_caps_lock() {
        assert_eq!(
            parse("FN⇪a"),
            Some(KeyEquivalent::new(
                'a',
                Modifiers::FUNCTION | Modifiers::CAPS_LOCK
            ))
        );
    }

    #[test]
    fn space_is_case_insensitive_and_trimmed() {
        assert_eq!(
            parse(" ⌥ SPACE "),
            Some(KeyEquivalent::new(' ', Modifiers::OPTION))
        );
    }

    #[test]
    fn repeated_modifier_is_idempotent() {
        assert_eq!(
            parse("⌘⌘w"),
            Some(KeyEquivalent::new('w', Modifiers::COMMAND))
        );
    }

    #[test]
    fn key_is_one_grapheme_not_one_char() {
        let decomposed = parse("⌘E\u{301}").unwrap();
        assert_eq!(decomposed.key, "e\u{301}");
        assert_eq!(decomposed.modifiers, Modifiers::COMMAND);
        assert_eq!(
            parse("⌘e\u{301}"),
            Some(KeyEquivalent::new("e\u{301}", Modifiers::COMMAND))
        );

        assert_eq!(
            parse("⌘\u{e9}"),
            Some(KeyEquivalent::new('\u{e9}', Modifiers::COMMAND))
        );
        assert_eq!(parse("⌘e\u{301}x"), None);
    }

    #[test]
    fn displays_in_glyph_form() {
        let shortcut = KeyEquivalent::new(' ', Modifiers::SHIFT | Modifiers::COMMAND);
        assert_eq!(shortcut.to_string(), "⇧⌘Space");
        assert_eq!(
            KeyEquivalent::new('q', Modifiers::COMMAND).to_string(),
            "⌘Q"
        );
    }
}
