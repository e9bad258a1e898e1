use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Display attributes of one armor-stand line, fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub visible_custom_name: bool,
    pub visible_body: bool,
    pub small: bool,
    pub has_arms: bool,
    pub no_base_plate: bool,
    pub marker: bool,
}

impl DisplaySettings {
    /// Defaults for a text line: floating name over an invisible body.
    pub fn text_line() -> Self {
        Self {
            visible_custom_name: true,
            visible_body: false,
            small: false,
            has_arms: false,
            no_base_plate: false,
            marker: false,
        }
    }

    /// Defaults for an empty spacer line: nothing rendered at all.
    pub fn empty_line() -> Self {
        Self {
            visible_custom_name: false,
            ..Self::text_line()
        }
    }
}

/// Base-entity flag byte: render the body invisible.
pub const FLAG_INVISIBLE: u8 = 0x20;

pub const FLAG_SMALL: u8 = 0x01;
pub const FLAG_ARMS: u8 = 0x04;
pub const FLAG_NO_BASE_PLATE: u8 = 0x08;

/// Marker bit as the legacy dialect ships it. Overlaps the SMALL and ARMS
/// bits; preserved as observed rather than corrected to the modern 0x10.
pub const LEGACY_FLAG_MARKER: u8 = 0x16;
pub const MODERN_FLAG_MARKER: u8 = 0x10;

const LEGACY_INDEX_BASE_FLAGS: u8 = 0;
const LEGACY_INDEX_NAME: u8 = 2;
const LEGACY_INDEX_NAME_VISIBLE: u8 = 3;
const LEGACY_INDEX_STAND_FLAGS: u8 = 10;

const MODERN_SLOT_BASE_FLAGS: u8 = 0;
const MODERN_SLOT_NAME: u8 = 2;
const MODERN_SLOT_NAME_VISIBLE: u8 = 3;
const MODERN_SLOT_STAND_FLAGS: u8 = 15;

/// Untyped legacy watcher value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegacyValue {
    Byte(u8),
    Text(String),
}

/// Legacy index-to-value metadata map. BTreeMap keeps the wire order stable,
/// which the byte-exactness contract depends on.
pub type LegacyMetadata = BTreeMap<u8, LegacyValue>;

/// Chat component wrapper around a literal name string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatComponent {
    pub text: String,
}

impl ChatComponent {
    pub fn from_plain(text: &str) -> Self {
        Self {
            text: text.to_owned(),
        }
    }
}

/// Registry-typed modern watcher value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypedValue {
    Byte(u8),
    Bool(bool),
    OptChat(Option<ChatComponent>),
}

/// Ordered modern (typed-slot, value) entries.
pub type TypedMetadata = Vec<(u8, TypedValue)>;

fn stand_flags(settings: &DisplaySettings, marker_bit: u8) -> u8 {
    let mut flags = 0u8;
    if settings.small {
        flags |= FLAG_SMALL;
    }
    if settings.has_arms {
        flags |= FLAG_ARMS;
    }
    if settings.no_base_plate {
        flags |= FLAG_NO_BASE_PLATE;
    }
    if settings.marker {
        flags |= marker_bit;
    }
    flags
}

/// Legacy dialect metadata for one line.
///
/// Name and name-visibility entries are always present; the invisibility
/// entry only when the body must be hidden.
pub fn legacy_metadata(settings: &DisplaySettings, name: &str) -> LegacyMetadata {
    let mut entries = BTreeMap::new();
    if !settings.visible_body {
        entries.insert(LEGACY_INDEX_BASE_FLAGS, LegacyValue::Byte(FLAG_INVISIBLE));
    }
    entries.insert(LEGACY_INDEX_NAME, LegacyValue::Text(name.to_owned()));
    entries.insert(
        LEGACY_INDEX_NAME_VISIBLE,
        LegacyValue::Byte(u8::from(settings.visible_custom_name)),
    );
    entries.insert(
        LEGACY_INDEX_STAND_FLAGS,
        LegacyValue::Byte(stand_flags(settings, LEGACY_FLAG_MARKER)),
    );
    entries
}

/// Modern dialect metadata for one line.
///
/// The name slots are emitted only when the name must be visible; the name
/// itself travels wrapped in a chat component.
pub fn typed_metadata(settings: &DisplaySettings, name: &str) -> TypedMetadata {
    let mut entries = Vec::new();
    if !settings.visible_body {
        entries.push((MODERN_SLOT_BASE_FLAGS, TypedValue::Byte(FLAG_INVISIBLE)));
    }
    if settings.visible_custom_name {
        entries.push((
            MODERN_SLOT_NAME,
            TypedValue::OptChat(Some(ChatComponent::from_plain(name))),
        ));
        entries.push((MODERN_SLOT_NAME_VISIBLE, TypedValue::Bool(true)));
    }
    entries.push((
        MODERN_SLOT_STAND_FLAGS,
        TypedValue::Byte(stand_flags(settings, MODERN_FLAG_MARKER)),
    ));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_on() -> DisplaySettings {
        DisplaySettings {
            visible_custom_name: true,
            visible_body: true,
            small: true,
            has_arms: true,
            no_base_plate: true,
            marker: true,
        }
    }

    #[test]
    fn codec_is_idempotent_byte_for_byte() {
        let settings = all_on();
        let legacy_a = postcard::to_stdvec(&legacy_metadata(&settings, "line")).unwrap();
        let legacy_b = postcard::to_stdvec(&legacy_metadata(&settings, "line")).unwrap();
        assert_eq!(legacy_a, legacy_b);

        let modern_a = postcard::to_stdvec(&typed_metadata(&settings, "line")).unwrap();
        let modern_b = postcard::to_stdvec(&typed_metadata(&settings, "line")).unwrap();
        assert_eq!(modern_a, modern_b);
    }

    #[test]
    fn marker_bit_differs_between_dialects() {
        let settings = DisplaySettings {
            marker: true,
            ..DisplaySettings::empty_line()
        };

        let legacy = legacy_metadata(&settings, "");
        assert_eq!(
            legacy.get(&LEGACY_INDEX_STAND_FLAGS),
            Some(&LegacyValue::Byte(0x16))
        );

        let modern = typed_metadata(&settings, "");
        let flags = modern
            .iter()
            .find(|(slot, _)| *slot == MODERN_SLOT_STAND_FLAGS)
            .map(|(_, value)| value);
        assert_eq!(flags, Some(&TypedValue::Byte(0x10)));
    }

    #[test]
    fn invisibility_entry_emitted_only_for_hidden_body() {
        let hidden = legacy_metadata(&DisplaySettings::text_line(), "hi");
        assert_eq!(
            hidden.get(&LEGACY_INDEX_BASE_FLAGS),
            Some(&LegacyValue::Byte(FLAG_INVISIBLE))
        );

        let visible = legacy_metadata(&all_on(), "hi");
        assert!(!visible.contains_key(&LEGACY_INDEX_BASE_FLAGS));

        let modern_visible = typed_metadata(&all_on(), "hi");
        assert!(!modern_visible
            .iter()
            .any(|(slot, _)| *slot == MODERN_SLOT_BASE_FLAGS));
    }

    #[test]
    fn modern_name_slots_only_when_name_visible() {
        let named = typed_metadata(&DisplaySettings::text_line(), "shop");
        assert!(named.iter().any(|(slot, value)| *slot == MODERN_SLOT_NAME
            && *value == TypedValue::OptChat(Some(ChatComponent::from_plain("shop")))));
        assert!(named
            .iter()
            .any(|(slot, value)| *slot == MODERN_SLOT_NAME_VISIBLE
                && *value == TypedValue::Bool(true)));

        let unnamed = typed_metadata(&DisplaySettings::empty_line(), "shop");
        assert!(!unnamed.iter().any(|(slot, _)| *slot == MODERN_SLOT_NAME));
        assert!(!unnamed
            .iter()
            .any(|(slot, _)| *slot == MODERN_SLOT_NAME_VISIBLE));
    }

    #[test]
    fn legacy_always_carries_name_and_visibility_entries() {
        let entries = legacy_metadata(&DisplaySettings::empty_line(), "");
        assert_eq!(
            entries.get(&LEGACY_INDEX_NAME),
            Some(&LegacyValue::Text(String::new()))
        );
        assert_eq!(
            entries.get(&LEGACY_INDEX_NAME_VISIBLE),
            Some(&LegacyValue::Byte(0))
        );
    }

    #[test]
    fn stand_flags_compose() {
        let settings = DisplaySettings {
            small: true,
            has_arms: true,
            no_base_plate: true,
            marker: false,
            ..DisplaySettings::text_line()
        };
        let legacy = legacy_metadata(&settings, "x");
        assert_eq!(
            legacy.get(&LEGACY_INDEX_STAND_FLAGS),
            Some(&LegacyValue::Byte(0x01 | 0x04 | 0x08))
        );
    }
}
