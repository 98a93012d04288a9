//! Integration tests for hooks and update scheduling
//!
//! These tests drive components through a render root and check hook order
//! enforcement, effect timing, and how state changes made while an update
//! pass is running are batched into later tasks of the same drain.

use std::cell::Cell;

use arbor::testing::{Handle, HostOp, RecordingAdapter};
use arbor::{
	Cleanup, Error, Event, HookKind, NodeRef, Props, RenderResult, Root, Scope, create_element, no_children,
};
use arbor_integration_tests::{BATCHED, Log};
use rstest::{fixture, rstest};

#[fixture]
fn root() -> Root<RecordingAdapter> {
	RecordingAdapter::root()
}

fn markup(root: &Root<RecordingAdapter>) -> String {
	root.with_adapter(|adapter| adapter.markup(Handle::CONTAINER))
}

fn reordering(scope: &mut Scope<'_>, props: &Props) -> RenderResult {
	if props.get_bool("swap").unwrap_or(false) {
		scope.use_ref()?;
		scope.use_state(|| 0)?;
	} else {
		scope.use_state(|| 0)?;
		scope.use_ref()?;
	}
	Ok(None)
}

const REORDERING: arbor::Component = arbor::Component::new("Reordering", reordering);

fn growing(scope: &mut Scope<'_>, props: &Props) -> RenderResult {
	scope.use_state(|| "a".to_string())?;
	for _ in 0..props.get_number("extra").unwrap_or(0.0) as usize {
		scope.use_memo((), |()| 0)?;
	}
	Ok(None)
}

const GROWING: arbor::Component = arbor::Component::new("Growing", growing);

#[rstest]
fn test_hooks_called_in_different_order_fail(root: Root<RecordingAdapter>) {
	root.render(create_element(REORDERING, Props::new(), no_children()))
		.expect("Failed to render");

	let err = root
		.render(create_element(REORDERING, Props::new().set("swap", true), no_children()))
		.expect_err("reordered hooks should be rejected");

	assert!(
		matches!(
			err,
			Error::HookOrder {
				index: 0,
				expected: HookKind::State,
				found: HookKind::Ref,
				..
			}
		),
		"unexpected error: {err}"
	);
}

#[rstest]
#[case::more_hooks(0.0, 2.0, 1, 2)]
#[case::fewer_hooks(2.0, 1.0, 3, 2)]
fn test_hook_count_must_not_change(
	root: Root<RecordingAdapter>,
	#[case] initial: f64,
	#[case] next: f64,
	#[case] expected_count: usize,
	#[case] found_count: usize,
) {
	root.render(create_element(GROWING, Props::new().set("extra", initial), no_children()))
		.expect("Failed to render");

	let err = root
		.render(create_element(GROWING, Props::new().set("extra", next), no_children()))
		.expect_err("changed hook count should be rejected");

	match err {
		Error::HookCount { expected, found, .. } => {
			assert_eq!(expected, expected_count);
			assert_eq!(found, found_count);
		}
		other => panic!("expected a hook count error, got {other}"),
	}
}

#[rstest]
fn test_setters_called_from_one_effect_share_a_rerender(root: Root<RecordingAdapter>) {
	let log = Log::new();

	root.render(create_element(BATCHED, log.attach(Props::new()), no_children()))
		.expect("Failed to render");

	assert_eq!(log.entries(), vec!["render 0 0".to_string(), "render 1 2".to_string()]);
	assert_eq!(markup(&root), "<p>1+2</p>");
	assert_eq!(root.with_adapter(RecordingAdapter::commits), 2);
}

#[rstest]
fn test_state_changes_during_effects_become_visible_only_after_commit(root: Root<RecordingAdapter>) {
	let log = Log::new();
	root.render(create_element(BATCHED, log.attach(Props::new()), no_children()))
		.expect("Failed to render");

	let ops = root.with_adapter(|adapter| adapter.ops().to_vec());
	let first_update = ops
		.iter()
		.position(|op| matches!(op, HostOp::UpdateText { .. }))
		.expect("state change should patch text");
	let last_append = ops
		.iter()
		.rposition(|op| matches!(op, HostOp::Append { .. }))
		.expect("mount should append nodes");
	assert!(last_append < first_update);
	assert_eq!(
		ops.iter()
			.filter(|op| matches!(op, HostOp::UpdateText { .. }))
			.count(),
		2
	);
}

fn effect_deps(scope: &mut Scope<'_>, props: &Props) -> RenderResult {
	let log = Log::of(props);
	let value = props.get_number("value").unwrap_or(0.0) as i64;
	scope.use_effect(value, move || {
		log.push(format!("effect {value}"));
		Some(Cleanup::new(move || log.push(format!("cleanup {value}"))))
	})?;
	Ok(Some(create_element("i", Props::new(), [value])))
}

const EFFECT_DEPS: arbor::Component = arbor::Component::new("EffectDeps", effect_deps);

#[rstest]
fn test_effect_runs_again_only_when_deps_change(root: Root<RecordingAdapter>) {
	let log = Log::new();
	let element = |value: f64| create_element(EFFECT_DEPS, log.attach(Props::new().set("value", value)), no_children());

	root.render(element(1.0)).expect("Failed to render");
	root.render(element(1.0)).expect("Failed to render same deps");
	root.render(element(2.0)).expect("Failed to render new deps");
	root.unmount().expect("Failed to unmount");

	assert_eq!(
		log.entries(),
		vec![
			"effect 1".to_string(),
			"cleanup 1".to_string(),
			"effect 2".to_string(),
			"cleanup 2".to_string(),
		]
	);
}

fn memoized(scope: &mut Scope<'_>, props: &Props) -> RenderResult {
	thread_local! {
		static COMPUTATIONS: Cell<u32> = const { Cell::new(0) };
	}
	let input = props.get_number("input").unwrap_or(0.0) as i64;
	let squared = scope.use_memo(input, |input| {
		COMPUTATIONS.with(|count| count.set(count.get() + 1));
		input * input
	})?;
	let computations = COMPUTATIONS.with(Cell::get);
	Ok(Some(create_element("b", Props::new(), [format!("{squared}/{computations}")])))
}

const MEMOIZED: arbor::Component = arbor::Component::new("Memoized", memoized);

#[rstest]
fn test_memo_recomputes_only_on_new_deps(root: Root<RecordingAdapter>) {
	let element = |input: f64| create_element(MEMOIZED, Props::new().set("input", input), no_children());

	root.render(element(3.0)).expect("Failed to render");
	assert_eq!(markup(&root), "<b>9/1</b>");
	root.render(element(3.0)).expect("Failed to render same input");
	assert_eq!(markup(&root), "<b>9/1</b>");
	root.render(element(4.0)).expect("Failed to render new input");
	assert_eq!(markup(&root), "<b>16/2</b>");
}

fn focusable(scope: &mut Scope<'_>, props: &Props) -> RenderResult {
	let input_ref = scope.use_ref()?;
	if let Some(target) = props.get_any::<NodeRef>("target") {
		let input_ref = input_ref.clone();
		let target = (*target).clone();
		scope.use_effect((), move || {
			if let Some(handle) = input_ref.get::<Handle>() {
				target.set(handle);
			}
			None
		})?;
	}
	Ok(Some(create_element("input", Props::new().with_ref(&input_ref), no_children())))
}

const FOCUSABLE: arbor::Component = arbor::Component::new("Focusable", focusable);

#[rstest]
fn test_ref_receives_backend_handle_before_effects(root: Root<RecordingAdapter>) {
	let target = NodeRef::new();

	root.render(create_element(FOCUSABLE, Props::new().any("target", target.clone()), no_children()))
		.expect("Failed to render");

	let input = root
		.with_adapter(|adapter| adapter.find("input"))
		.expect("input should be rendered");
	assert_eq!(target.get::<Handle>(), Some(input));
}

#[rstest]
fn test_click_handlers_schedule_from_outside_a_drain(root: Root<RecordingAdapter>) {
	root.render(arbor_integration_tests::counter_element())
		.expect("Failed to render");
	let button = root
		.with_adapter(|adapter| adapter.find("button"))
		.expect("button should be rendered");
	let handler = root
		.with_adapter(|adapter| adapter.handler(button, "click"))
		.expect("button should listen to clicks");

	for _ in 0..3 {
		handler.call(&Event::new("click"));
	}

	assert_eq!(markup(&root), "<button>Clicked 3 times!</button>");
	assert_eq!(root.with_adapter(RecordingAdapter::commits), 4);
}
