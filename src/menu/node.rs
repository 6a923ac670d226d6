//! Menu node definition.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder replaced by the raw user input when rendering a node
/// reached through a free-text prompt.
pub const INPUT_PLACEHOLDER: &str = "${input}";

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Declarative definition of one menu state.
///
/// Every field is optional in the source document, and `null` counts as
/// absent. Attributes the engine does not interpret (e.g. `title`) are kept
/// in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuNode {
    /// Prompt text shown to the user.
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    /// Whether the node takes free-form input instead of an option key.
    #[serde(deserialize_with = "null_as_default")]
    pub input_required: bool,
    /// Exact input string to target state.
    #[serde(deserialize_with = "null_as_default")]
    pub options: BTreeMap<String, String>,
    /// Target state for input-required nodes.
    pub next_state: Option<String>,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl MenuNode {
    /// Create a plain option node.
    pub fn with_options<I, K, V>(text: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            text: text.into(),
            options: options
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Default::default()
        }
    }

    /// Create a free-text prompt that always advances to `next_state`.
    pub fn prompt(text: impl Into<String>, next_state: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_required: true,
            next_state: Some(next_state.into()),
            ..Default::default()
        }
    }

    /// Create a node with only text (e.g. a terminal message).
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Look up the target state for an option key.
    pub fn target_for(&self, input: &str) -> Option<&str> {
        self.options.get(input).map(String::as_str)
    }

    /// Get an uninterpreted attribute, `None` when absent.
    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }

    /// Render the node text, substituting the raw user input.
    pub fn render(&self, input: &str) -> String {
        self.text.replace(INPUT_PLACEHOLDER, input)
    }

    /// Every state this node can transition to.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        let (next, options) = if self.input_required {
            (self.next_state.as_deref(), None)
        } else {
            (None, Some(self.options.values()))
        };
        next.into_iter()
            .chain(options.into_iter().flatten().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let node: MenuNode = serde_json::from_str("{}").unwrap();
        assert_eq!(node.text, "");
        assert!(!node.input_required);
        assert!(node.options.is_empty());
        assert!(node.next_state.is_none());
        assert!(node.attribute("some_non_existent_attribute").is_none());
    }

    #[test]
    fn test_null_fields_default() {
        let node: MenuNode = serde_json::from_str(
            r#"{"text": null, "input_required": null, "options": null, "next_state": null}"#,
        )
        .unwrap();
        assert_eq!(node, MenuNode::default());
    }

    #[test]
    fn test_extra_attributes_are_kept() {
        let node: MenuNode = serde_json::from_str(
            r#"{"title": "Main Menu", "text": "Welcome!", "next_state": "next"}"#,
        )
        .unwrap();

        assert_eq!(node.text, "Welcome!");
        assert_eq!(node.next_state.as_deref(), Some("next"));
        assert_eq!(
            node.attribute("title"),
            Some(&serde_json::Value::String("Main Menu".into()))
        );
        assert!(!node.extra.contains_key("text"));
    }

    #[test]
    fn test_render_substitutes_every_placeholder() {
        let node = MenuNode::text_only("Buy ${input}? You entered ${input}.");
        assert_eq!(node.render("10"), "Buy 10? You entered 10.");
    }

    #[test]
    fn test_render_without_placeholder() {
        let node = MenuNode::text_only("Thank you.");
        assert_eq!(node.render("ignored"), "Thank you.");
    }

    #[test]
    fn test_target_for() {
        let node = MenuNode::with_options("Menu", [("1", "balance"), ("2", "buy")]);
        assert_eq!(node.target_for("1"), Some("balance"));
        assert_eq!(node.target_for("9"), None);
        assert_eq!(node.target_for(" 1"), None);
    }

    #[test]
    fn test_targets_follow_input_mode() {
        let prompt = MenuNode::prompt("Amount:", "confirm");
        assert_eq!(prompt.targets().collect::<Vec<_>>(), vec!["confirm"]);

        let menu = MenuNode::with_options("Menu", [("1", "balance"), ("3", "end")]);
        assert_eq!(menu.targets().collect::<Vec<_>>(), vec!["balance", "end"]);
    }
}
