//! Element type catalogue and default-prop templates.
//!
//! The set of element types is open: the registry that gates which types a
//! plan may use lives outside this crate. Known types get extra default
//! props; unknown types still receive the common `label`/`name`/`required`
//! trio.

use serde_json::{json, Map, Value};

use crate::types::ElementId;

// ---------------------------------------------------------------------------
// Element type constants
// ---------------------------------------------------------------------------

pub const TEXT: &str = "text";
pub const EMAIL: &str = "email";
pub const PHONE: &str = "phone";
pub const NUMBER: &str = "number";
pub const TEXTAREA: &str = "textarea";
pub const SELECT: &str = "select";
pub const RADIO: &str = "radio";
pub const CHECKBOX: &str = "checkbox";
pub const DATE: &str = "date";
pub const FILE: &str = "file";
pub const HEADING: &str = "heading";
pub const PARAGRAPH: &str = "paragraph";
pub const DIVIDER: &str = "divider";

/// All element types with a dedicated template.
pub const ALL: &[&str] = &[
    TEXT, EMAIL, PHONE, NUMBER, TEXTAREA, SELECT, RADIO, CHECKBOX, DATE, FILE, HEADING,
    PARAGRAPH, DIVIDER,
];

/// Types that render a free-text input and therefore carry a placeholder.
const TEXT_LIKE: &[&str] = &[TEXT, EMAIL, PHONE, NUMBER, TEXTAREA];

/// Types whose value is picked from an `options` list.
const CHOICE: &[&str] = &[SELECT, RADIO, CHECKBOX];

/// Check whether an element type has a dedicated template.
pub fn is_known_type(element_type: &str) -> bool {
    ALL.contains(&element_type)
}

/// Default field name derived from the element id, e.g. `text_1a2b3c4d`.
pub fn default_name(element_type: &str, id: &ElementId) -> String {
    let simple = id.simple().to_string();
    format!("{element_type}_{}", &simple[..8])
}

/// Build the default props for a freshly added element.
pub fn default_props(element_type: &str, id: &ElementId) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("label".into(), json!(format!("New {element_type} field")));
    props.insert("name".into(), json!(default_name(element_type, id)));
    props.insert("required".into(), json!(false));

    if TEXT_LIKE.contains(&element_type) {
        props.insert("placeholder".into(), json!(""));
    }
    if CHOICE.contains(&element_type) {
        props.insert("options".into(), json!(["Option 1", "Option 2", "Option 3"]));
    }

    match element_type {
        TEXTAREA => {
            props.insert("rows".into(), json!(4));
        }
        NUMBER => {
            props.insert("min".into(), Value::Null);
            props.insert("max".into(), Value::Null);
        }
        FILE => {
            props.insert("accept".into(), json!([]));
            props.insert("maxSizeMb".into(), json!(10));
        }
        HEADING => {
            props.insert("text".into(), json!("Heading"));
            props.insert("level".into(), json!(2));
        }
        PARAGRAPH => {
            props.insert("text".into(), json!(""));
        }
        _ => {}
    }

    props
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_props_for_every_type() {
        let id = ElementId::new_v4();
        for element_type in ALL.iter().copied().chain(["signature"]) {
            let props = default_props(element_type, &id);
            assert_eq!(props["label"], json!(format!("New {element_type} field")));
            assert_eq!(props["required"], json!(false));
            assert!(props["name"].as_str().unwrap().starts_with(element_type));
        }
    }

    #[test]
    fn name_is_derived_from_id() {
        let id = uuid::Uuid::parse_str("1a2b3c4d-0000-4000-8000-000000000000").unwrap();
        assert_eq!(default_name("email", &id), "email_1a2b3c4d");
    }

    #[test]
    fn choice_types_get_options() {
        let id = ElementId::new_v4();
        assert!(default_props(SELECT, &id)["options"].is_array());
        assert!(default_props(RADIO, &id)["options"].is_array());
        assert!(!default_props(TEXT, &id).contains_key("options"));
    }

    #[test]
    fn type_specific_extras() {
        let id = ElementId::new_v4();
        assert_eq!(default_props(TEXTAREA, &id)["rows"], json!(4));
        assert_eq!(default_props(HEADING, &id)["level"], json!(2));
        assert_eq!(default_props(FILE, &id)["maxSizeMb"], json!(10));
        assert!(default_props(EMAIL, &id).contains_key("placeholder"));
        assert!(!default_props(DIVIDER, &id).contains_key("placeholder"));
    }

    #[test]
    fn known_types() {
        assert!(is_known_type("text"));
        assert!(is_known_type("divider"));
        assert!(!is_known_type("signature"));
        assert!(!is_known_type(""));
    }
}
