//! Property to attribute mapping shared by markup producing backends
//!
//! Host adapters that write attributes (the DOM and string backends) use the
//! same rules so that server markup and client DOM agree:
//!
//! - `on<Event>` properties are event listeners, never attributes.
//! - `className` and `htmlFor` map to `class` and `for`.
//! - Other camel-case names map to kebab case (`ariaLabel` -> `aria-label`),
//!   except SVG attributes whose canonical spelling is camel case.
//! - `true` renders as an empty attribute, `false` removes the attribute.
//! - Style objects are serialized to CSS text.
//! - Text and attribute values are escaped with [`escape_html`].

use crate::props::PropValue;

const ATTRIBUTE_ALIASES: &[(&str, &str)] = &[
	("className", "class"),
	("htmlFor", "for"),
	("tabIndex", "tabindex"),
];

const PRESERVED_CASE: &[&str] = &[
	"viewBox",
	"preserveAspectRatio",
	"gradientTransform",
	"gradientUnits",
	"patternTransform",
	"patternUnits",
	"stdDeviation",
];

/// Converts a camel-case name to kebab case.
pub fn kebab_case(name: &str) -> String {
	let mut out = String::with_capacity(name.len() + 4);
	for ch in name.chars() {
		if ch.is_ascii_uppercase() {
			if !out.is_empty() {
				out.push('-');
			}
			out.push(ch.to_ascii_lowercase());
		} else {
			out.push(ch);
		}
	}
	out
}

/// Maps a property name to the attribute name written to the backend.
pub fn attribute_name(prop: &str) -> String {
	if let Some((_, alias)) = ATTRIBUTE_ALIASES.iter().find(|(name, _)| *name == prop) {
		return (*alias).to_string();
	}
	if PRESERVED_CASE.contains(&prop) {
		return prop.to_string();
	}
	kebab_case(prop)
}

/// Returns the event name for an `on<Event>` property key.
///
/// `onClick` yields `click`, `onMouseDown` yields `mousedown`. Keys that merely
/// start with `on` (such as `one`) are not handlers.
pub fn event_name(key: &str) -> Option<String> {
	let rest = key.strip_prefix("on")?;
	if !rest.chars().next()?.is_ascii_uppercase() {
		return None;
	}
	Some(rest.to_ascii_lowercase())
}

/// Returns the property key a handler for `event` is stored under.
pub fn handler_key(event: &str) -> String {
	let mut chars = event.chars();
	match chars.next() {
		Some(first) => format!("on{}{}", first.to_ascii_uppercase(), chars.as_str()),
		None => "on".to_string(),
	}
}

/// Maps a property value to attribute text, or `None` if the attribute must be absent.
pub fn attribute_value(value: &PropValue) -> Option<String> {
	match value {
		PropValue::Str(text) => Some(text.clone()),
		PropValue::Number(number) => Some(number.to_string()),
		PropValue::Bool(true) => Some(String::new()),
		PropValue::Bool(false) => None,
		PropValue::Style(style) if style.is_empty() => None,
		PropValue::Style(style) => Some(style.to_css()),
		PropValue::Handler(_) | PropValue::Any(_) => None,
	}
}

/// Escapes text for use in markup content and double-quoted attribute values.
pub fn escape_html(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&#x27;")
}
