//! Integration tests for context propagation
//!
//! Providers publish values to their subtree for the duration of one update
//! pass. These tests cover shadowing by nested providers, consumers updated
//! through their own state, and reads without any provider.

use arbor::testing::{Handle, RecordingAdapter};
use arbor::{Element, Error, Event, Props, Root, create_element, no_children};
use arbor_integration_tests::{THEMED, THEMED_COUNTER, theme};
use rstest::{fixture, rstest};

#[fixture]
fn root() -> Root<RecordingAdapter> {
	RecordingAdapter::root()
}

fn markup(root: &Root<RecordingAdapter>) -> String {
	root.with_adapter(|adapter| adapter.markup(Handle::CONTAINER))
}

fn themed() -> Element {
	create_element(THEMED, Props::new(), no_children())
}

#[rstest]
fn test_nested_provider_shadows_outer_value(root: Root<RecordingAdapter>) {
	let tree = theme().provide(
		"dark".to_string(),
		[
			themed(),
			theme().provide("light".to_string(), [themed()]),
			themed(),
		],
	);

	root.render(tree).expect("Failed to render");

	assert_eq!(markup(&root), "<span>dark</span><span>light</span><span>dark</span>");
}

#[rstest]
fn test_new_provider_value_reaches_consumers(root: Root<RecordingAdapter>) {
	let tree = |value: &str| theme().provide(value.to_string(), [create_element("div", Props::new(), [themed()])]);
	root.render(tree("dark")).expect("Failed to render");

	root.render(tree("light")).expect("Failed to re-render");

	assert_eq!(markup(&root), "<div><span>light</span></div>");
}

#[rstest]
fn test_consumer_rerendered_by_own_state_keeps_provider_value(root: Root<RecordingAdapter>) {
	root.render(theme().provide(
		"dark".to_string(),
		[create_element(THEMED_COUNTER, Props::new(), no_children())],
	))
	.expect("Failed to render");
	let button = root
		.with_adapter(|adapter| adapter.find("button"))
		.expect("button should be rendered");
	let handler = root
		.with_adapter(|adapter| adapter.handler(button, "click"))
		.expect("button should listen to clicks");

	handler.call(&Event::new("click"));

	assert_eq!(markup(&root), "<button>dark 1</button>");
}

#[rstest]
fn test_consumer_without_provider_fails(root: Root<RecordingAdapter>) {
	let err = root
		.render(create_element("main", Props::new(), [themed()]))
		.expect_err("reading an unprovided context should fail");

	match err {
		Error::MissingProvider { context } => assert_eq!(context, theme().id()),
		other => panic!("expected a missing provider error, got {other}"),
	}
}

#[rstest]
fn test_provider_value_does_not_leak_to_siblings(root: Root<RecordingAdapter>) {
	let err = root
		.render(create_element(
			"",
			Props::new(),
			[theme().provide("dark".to_string(), no_children()), themed()],
		))
		.expect_err("a sibling of a provider is outside its scope");

	assert!(matches!(err, Error::MissingProvider { .. }));
}
