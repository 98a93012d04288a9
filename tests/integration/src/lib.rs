//! Integration test utilities for Arbor
//!
//! Components and helpers shared by the integration suites under
//! `integration/tests`. Components receive a [`Log`] through their props so
//! tests can observe renders, effects and cleanups without global state.

use std::cell::RefCell;
use std::rc::Rc;

use arbor::dom::{Document, DomError, DomNode};
use arbor::ssr::{SsrHandle, SsrNode};
use arbor::{Child, Component, Context, Element, Props, RenderResult, Scope, create_element};

/// Shared, append-only list of observations.
#[derive(Debug, Clone, Default)]
pub struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
	/// Creates an empty log.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an entry.
	pub fn push(&self, entry: impl Into<String>) {
		self.0.borrow_mut().push(entry.into());
	}

	/// Returns a copy of every entry so far.
	pub fn entries(&self) -> Vec<String> {
		self.0.borrow().clone()
	}

	/// Counts the entries starting with `prefix`.
	pub fn count(&self, prefix: &str) -> usize {
		self.0
			.borrow()
			.iter()
			.filter(|entry| entry.starts_with(prefix))
			.count()
	}

	/// Attaches this log to `props` under the `log` key.
	pub fn attach(&self, props: Props) -> Props {
		props.any("log", self.clone())
	}

	/// Returns the log attached to `props`, or a detached one.
	pub fn of(props: &Props) -> Self {
		props
			.get_any::<Self>("log")
			.map(|log| (*log).clone())
			.unwrap_or_default()
	}
}

fn counter(scope: &mut Scope<'_>, _: &Props) -> RenderResult {
	let (count, set_count) = scope.use_state(|| 0)?;
	Ok(Some(create_element(
		"button",
		Props::new().on("click", move |_| set_count.update(|n| n + 1)),
		["Clicked ".into(), Child::from(count), " times!".into()],
	)))
}

/// A button counting its clicks.
pub const COUNTER: Component = Component::new("Counter", counter);

fn effect_probe(scope: &mut Scope<'_>, props: &Props) -> RenderResult {
	let log = Log::of(props);
	let label = props.get_str("label").unwrap_or("probe").to_string();
	{
		let label = label.clone();
		scope.use_effect((), move || {
			log.push(format!("mount {label}"));
			Some(arbor::Cleanup::new(move || log.push(format!("cleanup {label}"))))
		})?;
	}
	Ok(Some(create_element("em", Props::new(), [label])))
}

/// Logs `mount <label>` once mounted and `cleanup <label>` once destroyed.
pub const EFFECT_PROBE: Component = Component::new("EffectProbe", effect_probe);

fn switch(_: &mut Scope<'_>, props: &Props) -> RenderResult {
	let log = Log::of(props);
	let tag = props.get_str("tag").unwrap_or("div").to_string();
	let probe = create_element(EFFECT_PROBE, log.attach(Props::new().set("label", tag.as_str())), arbor::no_children());
	Ok(Some(create_element(tag.as_str(), Props::new(), [probe])))
}

/// Renders an [`EFFECT_PROBE`] inside a host element named by the `tag` prop.
pub const SWITCH: Component = Component::new("Switch", switch);

fn batched(scope: &mut Scope<'_>, props: &Props) -> RenderResult {
	let log = Log::of(props);
	let (first, set_first) = scope.use_state(|| 0)?;
	let (second, set_second) = scope.use_state(|| 0)?;
	log.push(format!("render {first} {second}"));
	scope.use_effect((), move || {
		set_first.set(1);
		set_second.set(2);
		None
	})?;
	Ok(Some(create_element(
		"p",
		Props::new(),
		[Child::from(first), "+".into(), Child::from(second)],
	)))
}

/// Sets two pieces of state from one mount effect.
pub const BATCHED: Component = Component::new("Batched", batched);

thread_local! {
	static THEME: Context<String> = Context::new();
}

/// Theme context shared by the context suites of the current thread.
pub fn theme() -> Context<String> {
	THEME.with(|theme| *theme)
}

fn themed(scope: &mut Scope<'_>, _: &Props) -> RenderResult {
	let value = scope.use_context(&theme())?;
	Ok(Some(create_element("span", Props::new(), [value])))
}

/// Shows the current theme.
pub const THEMED: Component = Component::new("Themed", themed);

fn themed_counter(scope: &mut Scope<'_>, _: &Props) -> RenderResult {
	let value = scope.use_context(&theme())?;
	let (count, set_count) = scope.use_state(|| 0)?;
	Ok(Some(create_element(
		"button",
		Props::new().on("click", move |_| set_count.update(|n| n + 1)),
		[value, format!(" {count}")],
	)))
}

/// A counter labelled with the current theme.
pub const THEMED_COUNTER: Component = Component::new("ThemedCounter", themed_counter);

/// Returns an element of [`COUNTER`].
pub fn counter_element() -> Element {
	create_element(COUNTER, Props::new(), arbor::no_children())
}

/// Builds the DOM a browser would parse from server markup.
///
/// Adjacent text nodes are separated by comments, as the string renderer
/// separates them in its output.
pub fn parse_server_tree(document: &Document, parent: &DomNode, nodes: &[SsrHandle]) -> Result<(), DomError> {
	let mut previous_text = false;
	for handle in nodes {
		let is_text = handle.is_text();
		if is_text && previous_text {
			parent.append_child(&document.create_comment(" "))?;
		}
		match &*handle.node() {
			SsrNode::Element {
				tag,
				attributes,
				children,
			} => {
				let element = document.create_element(tag)?;
				for (name, value) in attributes {
					element.set_attribute(name, value)?;
				}
				parent.append_child(&element)?;
				parse_server_tree(document, &element, children)?;
			}
			SsrNode::Text { text } => parent.append_child(&document.create_text_node(text))?,
		}
		previous_text = is_text;
	}
	Ok(())
}
