//! Integration tests for development hot swapping
//!
//! Swapping a component re-renders its live instances with the new render
//! function while keeping hook state, and makes later elements naming the old
//! component resolve to the new one. Only available with debug assertions.

#![cfg(debug_assertions)]

use arbor::testing::{Handle, RecordingAdapter};
use arbor::{Child, Component, Event, Props, RenderResult, Root, Scope, create_element, no_children};
use arbor_integration_tests::EFFECT_PROBE;
use rstest::{fixture, rstest};

#[fixture]
fn root() -> Root<RecordingAdapter> {
	RecordingAdapter::root()
}

fn markup(root: &Root<RecordingAdapter>) -> String {
	root.with_adapter(|adapter| adapter.markup(Handle::CONTAINER))
}

fn clicks_v1(scope: &mut Scope<'_>, _: &Props) -> RenderResult {
	let (count, set_count) = scope.use_state(|| 0)?;
	Ok(Some(create_element(
		"button",
		Props::new().on("click", move |_| set_count.update(|n| n + 1)),
		["Clicked ".into(), Child::from(count), " times!".into()],
	)))
}

fn clicks_v2(scope: &mut Scope<'_>, _: &Props) -> RenderResult {
	let (count, set_count) = scope.use_state(|| 0)?;
	Ok(Some(create_element(
		"button",
		Props::new().on("click", move |_| set_count.update(|n| n + 10)),
		["Pressed ".into(), Child::from(count), "x".into()],
	)))
}

fn clicks_v3(scope: &mut Scope<'_>, props: &Props) -> RenderResult {
	let node_ref = scope.use_ref()?;
	let label = props.get_str("label").unwrap_or("fresh").to_string();
	Ok(Some(create_element(
		"div",
		Props::new().with_ref(&node_ref),
		[create_element(EFFECT_PROBE, Props::new().set("label", label), no_children())],
	)))
}

const CLICKS_V1: Component = Component::new("Clicks", clicks_v1);
const CLICKS_V2: Component = Component::new("Clicks", clicks_v2);
const CLICKS_V3: Component = Component::new("Clicks", clicks_v3);

fn click(root: &Root<RecordingAdapter>) {
	let button = root
		.with_adapter(|adapter| adapter.find("button"))
		.expect("button should be rendered");
	let handler = root
		.with_adapter(|adapter| adapter.handler(button, "click"))
		.expect("button should listen to clicks");
	handler.call(&Event::new("click"));
}

#[rstest]
fn test_hot_swap_keeps_state_and_host_nodes(root: Root<RecordingAdapter>) {
	root.render(create_element("div", Props::new(), [create_element(CLICKS_V1, Props::new(), no_children())]))
		.expect("Failed to render");
	click(&root);
	let button = root.with_adapter(|adapter| adapter.find("button"));
	assert_eq!(root.instances_of(CLICKS_V1).len(), 1);

	root.hot_swap(CLICKS_V1, CLICKS_V2).expect("Failed to hot swap");

	assert_eq!(markup(&root), "<div><button>Pressed 1x</button></div>");
	assert_eq!(root.with_adapter(|adapter| adapter.find("button")), button);
	assert!(root.instances_of(CLICKS_V1).is_empty());
	assert_eq!(root.instances_of(CLICKS_V2).len(), 1);

	click(&root);
	assert_eq!(markup(&root), "<div><button>Pressed 11x</button></div>");
}

#[rstest]
fn test_elements_naming_old_component_resolve_to_new_one(root: Root<RecordingAdapter>) {
	let element = || create_element(CLICKS_V1, Props::new(), no_children());
	root.render(element()).expect("Failed to render");
	root.hot_swap(CLICKS_V1, CLICKS_V2).expect("Failed to hot swap");

	root.render(element()).expect("Failed to render after swap");

	assert_eq!(markup(&root), "<button>Pressed 0x</button>");
	assert_eq!(root.instances_of(CLICKS_V2).len(), 1);
}

#[rstest]
fn test_hot_swap_discards_mismatched_hook_slots(root: Root<RecordingAdapter>) {
	root.render(create_element(CLICKS_V1, Props::new(), no_children()))
		.expect("Failed to render");
	click(&root);

	root.hot_swap(CLICKS_V1, CLICKS_V3).expect("hook kind changes should not fail a hot swap");

	assert_eq!(markup(&root), "<div><em>fresh</em></div>");
	root.render(create_element(CLICKS_V1, Props::new().set("label", "again"), no_children()))
		.expect("swapped instance should render with a consistent hook list");
	assert_eq!(markup(&root), "<div><em>again</em></div>");
}
