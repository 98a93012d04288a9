//! Integration tests for server rendering followed by client hydration
//!
//! The string renderer produces markup on the "server"; the in-memory DOM
//! parses that markup back into nodes, and the DOM backend hydrates them,
//! adopting every node instead of creating new ones.

use arbor::dom::{Document, DomError, DomNode};
use arbor::ssr::{SsrOptions, render_to_string_with, render_to_tree};
use arbor::{Element, Error, Props, create_element, no_children, render_to_string};
use arbor_integration_tests::{COUNTER, counter_element, parse_server_tree};
use insta::assert_snapshot;
use rstest::{fixture, rstest};

#[fixture]
fn document() -> Document {
	Document::current().expect("Failed to get document")
}

fn app() -> Element {
	create_element(
		"main",
		Props::new().set("id", "app"),
		[
			create_element("h1", Props::new().set("className", "title"), ["Hello"]),
			create_element(COUNTER, Props::new(), no_children()),
		],
	)
}

fn hydratable() -> SsrOptions {
	SsrOptions::new().hydration_markers(true)
}

/// Renders `element` on the server and parses the result into a fresh container.
fn server_side(document: &Document, element: Element) -> DomNode {
	let tree = render_to_tree(element, &hydratable()).expect("Failed to render on the server");
	let container = document.create_element("div").expect("Failed to create container");
	parse_server_tree(document, &container, tree.nodes()).expect("Failed to parse server markup");
	container
}

#[rstest]
fn test_plain_server_markup_joins_adjacent_text() {
	let html = render_to_string(app()).expect("Failed to render on the server");

	assert_snapshot!(
		html,
		@r#"<main id="app"><h1 class="title">Hello</h1><button>Clicked 0 times!</button></main>"#
	);
}

#[rstest]
fn test_hydratable_markup_separates_adjacent_text() {
	let html = render_to_string_with(app(), &hydratable()).expect("Failed to render on the server");

	assert_snapshot!(
		html,
		@r#"<main id="app"><h1 class="title">Hello</h1><button>Clicked <!-- -->0<!-- --> times!</button></main>"#
	);
}

#[rstest]
fn test_parsed_markup_matches_server_string(document: Document) {
	let html = render_to_string_with(app(), &hydratable()).expect("Failed to render on the server");

	let container = server_side(&document, app());

	assert_eq!(container.inner_html(), html);
}

#[rstest]
fn test_hydration_adopts_server_nodes(document: Document) {
	let container = server_side(&document, app());
	let main = container.first_child().expect("server markup should have a root element");
	let button = main.child_nodes()[1].clone();
	let count = button.child_nodes()[2].clone();

	let root = arbor::hydrate(app(), &container).expect("Failed to hydrate");

	assert!(!root.with_adapter(|adapter| adapter.is_hydrating()));
	assert_eq!(container.child_nodes().len(), 1);
	assert!(container.first_child().is_some_and(|node| node.is_same_node(&main)));
	assert!(main.child_nodes()[1].is_same_node(&button));
	assert!(button.has_listener("click"));

	button.dispatch("click").expect("Failed to dispatch click");

	assert!(button.child_nodes()[2].is_same_node(&count));
	assert_eq!(count.text_content(), "1");
	assert_eq!(button.text_content(), "Clicked 1 times!");
	assert_eq!(
		container.inner_html(),
		r#"<main id="app"><h1 class="title">Hello</h1><button>Clicked <!-- -->1<!-- --> times!</button></main>"#
	);
}

#[rstest]
fn test_hydrated_root_renders_like_fresh_root(document: Document) {
	let hydrated = server_side(&document, counter_element());
	let _hydrated_root = arbor::hydrate(counter_element(), &hydrated).expect("Failed to hydrate");
	let fresh = document.create_element("div").expect("Failed to create container");
	let _fresh_root = arbor::render(counter_element(), &fresh).expect("Failed to render");

	for container in [&hydrated, &fresh] {
		let button = container.first_child().expect("button should be rendered");
		button.dispatch("click").expect("Failed to dispatch click");
		button.dispatch("click").expect("Failed to dispatch click");
	}

	assert_eq!(hydrated.text_content(), fresh.text_content());
	assert_eq!(fresh.text_content(), "Clicked 2 times!");
}

#[rstest]
fn test_hydration_against_foreign_markup_fails(document: Document) {
	let container = server_side(&document, create_element("p", Props::new(), ["static"]));

	let err = arbor::hydrate(app(), &container).expect_err("mismatched markup should fail");

	let source = match err {
		Error::Adapter(source) => source,
		other => panic!("expected an adapter error, got {other}"),
	};
	assert!(
		matches!(source.downcast_ref::<DomError>(), Some(DomError::HydrationMismatch { .. })),
		"unexpected adapter error: {source}"
	);
}
