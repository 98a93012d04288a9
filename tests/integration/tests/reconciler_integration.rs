//! Integration tests for reconciliation through a render root
//!
//! Covers the structural guarantees of the reconciler: a repeated render
//! touches nothing, positional matching patches in place, a changed element
//! identity replaces the whole subtree, and any sequence of renders leaves the
//! backend in the same state as a fresh render of the last element.

use arbor::testing::{Handle, HostOp, RecordingAdapter};
use arbor::{Child, Component, Element, Event, Props, RenderResult, Root, Scope, create_element, no_children};
use arbor_integration_tests::{COUNTER, EFFECT_PROBE, Log, SWITCH, counter_element};
use insta::assert_snapshot;
use proptest::prelude::*;
use rstest::{fixture, rstest};

#[fixture]
fn root() -> Root<RecordingAdapter> {
	RecordingAdapter::root()
}

/// A host tree shape, built into elements by [`Shape::build`].
#[derive(Debug, Clone)]
enum Shape {
	Text(String),
	Host { tag: &'static str, id: u8, children: Vec<Shape> },
}

impl Shape {
	fn build(&self) -> Element {
		match self {
			Self::Text(text) => arbor::text(text.as_str()),
			Self::Host { tag, id, children } => create_element(
				*tag,
				Props::new().set("id", format!("n{id}")),
				children.iter().map(Shape::build).collect::<Vec<_>>(),
			),
		}
	}
}

fn shape() -> impl Strategy<Value = Shape> {
	let leaf = "[a-z]{1,6}".prop_map(Shape::Text);
	leaf.prop_recursive(3, 24, 4, |inner| {
		(
			prop::sample::select(vec!["div", "span", "p"]),
			0u8..4,
			prop::collection::vec(inner, 0..4),
		)
			.prop_map(|(tag, id, children)| Shape::Host { tag, id, children })
	})
}

fn markup(root: &Root<RecordingAdapter>) -> String {
	root.with_adapter(|adapter| adapter.markup(Handle::CONTAINER))
}

proptest! {
	#[test]
	fn test_rendering_same_tree_twice_is_a_no_op(shapes in prop::collection::vec(shape(), 1..4)) {
		let root = RecordingAdapter::root();
		let build = || create_element("", Props::new(), shapes.iter().map(Shape::build).collect::<Vec<_>>());
		root.render(build()).expect("Failed to render");
		let before = markup(&root);
		root.with_adapter_mut(RecordingAdapter::clear_ops);

		root.render(build()).expect("Failed to render again");

		prop_assert_eq!(root.with_adapter(|adapter| adapter.ops().to_vec()), Vec::<HostOp>::new());
		prop_assert_eq!(markup(&root), before);
	}

	#[test]
	fn test_rerender_converges_to_fresh_render(first in shape(), second in shape()) {
		let updated = RecordingAdapter::root();
		updated.render(first.build()).expect("Failed to render first tree");
		updated.render(second.build()).expect("Failed to render second tree");

		let fresh = RecordingAdapter::root();
		fresh.render(second.build()).expect("Failed to render fresh tree");

		prop_assert_eq!(markup(&updated), markup(&fresh));
	}
}

#[rstest]
fn test_nested_components_produce_nested_markup(root: Root<RecordingAdapter>) {
	let log = Log::new();
	let tree = create_element(
		"section",
		Props::new().set("className", "app"),
		[
			create_element("h1", Props::new(), ["Title"]),
			create_element(SWITCH, log.attach(Props::new().set("tag", "article")), no_children()),
			counter_element(),
		],
	);

	root.render(tree).expect("Failed to render");

	assert_snapshot!(
		markup(&root),
		@r#"<section class="app"><h1>Title</h1><article><em>article</em></article><button>Clicked 0 times!</button></section>"#
	);
	assert_eq!(log.entries(), vec!["mount article".to_string()]);
}

#[rstest]
fn test_counter_click_patches_only_the_count(root: Root<RecordingAdapter>) {
	root.render(counter_element()).expect("Failed to render");
	assert_eq!(markup(&root), "<button>Clicked 0 times!</button>");
	let button = root
		.with_adapter(|adapter| adapter.find("button"))
		.expect("button should be rendered");
	root.with_adapter_mut(RecordingAdapter::clear_ops);

	let handler = root
		.with_adapter(|adapter| adapter.handler(button, "click"))
		.expect("button should listen to clicks");
	handler.call(&Event::new("click"));

	assert_eq!(markup(&root), "<button>Clicked 1 times!</button>");
	assert_eq!(root.with_adapter(|adapter| adapter.find("button")), Some(button));
	let ops = root.with_adapter(|adapter| adapter.ops().to_vec());
	assert!(
		matches!(ops.as_slice(), [HostOp::UpdateText { text, .. }] if text == "1"),
		"unexpected operations: {ops:?}"
	);
}

fn stepper(scope: &mut Scope<'_>, _: &Props) -> RenderResult {
	let (count, set_count) = scope.use_state(|| 0)?;
	Ok(Some(create_element(
		"button",
		Props::new().on("click", move |_| set_count.set(count + 1)),
		[Child::from(count)],
	)))
}

const STEPPER: Component = Component::new("Stepper", stepper);

#[rstest]
fn test_rerendered_handler_sees_latest_state(root: Root<RecordingAdapter>) {
	root.render(create_element(STEPPER, Props::new(), no_children()))
		.expect("Failed to render");
	let button = root
		.with_adapter(|adapter| adapter.find("button"))
		.expect("button should be rendered");

	for _ in 0..3 {
		let handler = root
			.with_adapter(|adapter| adapter.handler(button, "click"))
			.expect("button should listen to clicks");
		handler.call(&Event::new("click"));
	}

	assert_eq!(markup(&root), "<button>3</button>");
	let ops = root.with_adapter(|adapter| adapter.ops().to_vec());
	assert!(
		!ops.iter().any(|op| matches!(op, HostOp::UpdateHost { .. })),
		"handler swaps should not patch the host node: {ops:?}"
	);
}

#[rstest]
fn test_changed_tag_replaces_subtree_and_cleans_up_once(root: Root<RecordingAdapter>) {
	let log = Log::new();
	let switch = |tag: &str| create_element(SWITCH, log.attach(Props::new().set("tag", tag)), no_children());
	root.render(switch("div")).expect("Failed to render");
	let div = root
		.with_adapter(|adapter| adapter.find("div"))
		.expect("div should be rendered");
	root.with_adapter_mut(RecordingAdapter::clear_ops);

	root.render(switch("span")).expect("Failed to re-render");

	assert_eq!(markup(&root), "<span><em>span</em></span>");
	assert_eq!(
		log.entries(),
		vec!["mount div".to_string(), "cleanup div".to_string(), "mount span".to_string()]
	);
	let span = root
		.with_adapter(|adapter| adapter.find("span"))
		.expect("span should be rendered");
	let ops = root.with_adapter(|adapter| adapter.ops().to_vec());
	assert!(ops.contains(&HostOp::Replace {
		parent: Handle::CONTAINER,
		previous: div,
		next: span,
	}));
	assert!(!ops.iter().any(|op| matches!(op, HostOp::Detach { .. })));

	root.render(switch("span")).expect("Failed to render unchanged tree");
	assert_eq!(log.count("cleanup div"), 1);
	assert_eq!(log.count("mount span"), 1);
}

#[rstest]
fn test_component_identity_change_replaces_instance(root: Root<RecordingAdapter>) {
	let log = Log::new();
	root.render(create_element(EFFECT_PROBE, log.attach(Props::new().set("label", "a")), no_children()))
		.expect("Failed to render");

	root.render(create_element(COUNTER, Props::new(), no_children()))
		.expect("Failed to re-render");

	assert_eq!(markup(&root), "<button>Clicked 0 times!</button>");
	assert_eq!(log.entries(), vec!["mount a".to_string(), "cleanup a".to_string()]);
}

#[rstest]
fn test_removed_children_are_detached(root: Root<RecordingAdapter>) {
	let list = |count: usize| {
		create_element(
			"ul",
			Props::new(),
			(0..count)
				.map(|index| create_element("li", Props::new(), [index]))
				.collect::<Vec<_>>(),
		)
	};
	root.render(list(3)).expect("Failed to render");
	root.with_adapter_mut(RecordingAdapter::clear_ops);

	root.render(list(1)).expect("Failed to shrink list");

	assert_eq!(markup(&root), "<ul><li>0</li></ul>");
	let detached = root.with_adapter(|adapter| {
		adapter
			.ops()
			.iter()
			.filter(|op| matches!(op, HostOp::Detach { .. }))
			.count()
	});
	assert_eq!(detached, 2);
}

#[rstest]
fn test_unmount_runs_every_cleanup(root: Root<RecordingAdapter>) {
	let log = Log::new();
	let probe = |label: &str| create_element(EFFECT_PROBE, log.attach(Props::new().set("label", label)), no_children());
	root.render(create_element("div", Props::new(), [probe("a"), probe("b")]))
		.expect("Failed to render");

	root.unmount().expect("Failed to unmount");

	assert_eq!(markup(&root), "");
	assert_eq!(log.count("cleanup"), 2);
	assert!(root.with_adapter(|adapter| adapter.children(Handle::CONTAINER).is_empty()));
}
