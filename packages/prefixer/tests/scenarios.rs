//! End-to-end prefixing scenarios over a single declaration block.

use stylecraft_ast::{
    effective_name, refine, value_collection, Arena, CollectionId, NodeId, NodeKind, NullSink,
    OperatorKind, SetRegistry, TermKind,
};
use stylecraft_prefixer::{
    Browser, BrowserSelection, CompatTable, FeatureKind, Options, Prefixer, SupportMatrix,
};

fn registry() -> SetRegistry {
    SetRegistry::new().with_known(["widget", "color", "display"])
}

/// Builds one rule whose body holds `decls`, refining every declaration.
fn block(decls: &[(&str, &str)]) -> (Arena, CollectionId, Vec<NodeId>) {
    let mut arena = Arena::new();
    let rule = arena.rule(".a");
    let body = arena.children(rule).unwrap();
    let registry = registry();
    let ids = decls
        .iter()
        .map(|(name, value)| {
            let decl = arena.declaration(*name, *value);
            arena.append(body, decl).unwrap();
            refine(&mut arena, decl, &registry, &mut NullSink).unwrap();
            decl
        })
        .collect();
    (arena, body, ids)
}

fn render_term(arena: &Arena, id: NodeId) -> String {
    match arena.kind(id) {
        NodeKind::Term(TermKind::Word { text })
        | NodeKind::Term(TermKind::Hash { text })
        | NodeKind::Term(TermKind::Quoted { text }) => text.clone(),
        NodeKind::Term(TermKind::Number { value, unit }) => {
            let unit = unit.as_deref().unwrap_or("");
            if value.fract() == 0.0 {
                format!("{}{}", *value as i64, unit)
            } else {
                format!("{}{}", value, unit)
            }
        }
        NodeKind::Term(TermKind::Function { name }) => {
            let args = arena
                .children(id)
                .map(|args| {
                    arena
                        .iter(args)
                        .map(|arg| render_term(arena, arg))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            format!("{}({})", name, args)
        }
        NodeKind::Operator(OperatorKind::Comma) => ",".into(),
        NodeKind::Operator(OperatorKind::Slash) => "/".into(),
        _ => String::new(),
    }
}

/// Renders the block as `name: value` strings, in order.
fn render(arena: &Arena, body: CollectionId) -> Vec<String> {
    arena
        .iter(body)
        .map(|id| {
            let name = effective_name(arena, id).unwrap_or_default();
            let value = value_collection(arena, id)
                .map(|value| {
                    arena
                        .iter(value)
                        .map(|term| render_term(arena, term))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            format!("{}: {}", name, value)
        })
        .collect()
}

fn run_pass(prefixer: &Prefixer<'_>, arena: &mut Arena, body: CollectionId) {
    for decl in arena.members(body) {
        prefixer.declaration(arena, decl).unwrap();
    }
}

#[test]
fn scenario_a_missing_prefix_is_synthesized_before_the_subject() {
    // webkit required for `widget` (chrome floor 19 <= last-prefixed 20);
    // moz not required (firefox floor 25 > last-prefixed 15)
    let provider = CompatTable::new()
        .with_versions(Browser::Chrome, &["19", "20", "21"])
        .unwrap()
        .with_versions(Browser::Firefox, &["25", "26"])
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Chrome, "20")
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Firefox, "15")
        .unwrap();
    let mut selection = BrowserSelection::new();
    selection.all(&provider, Browser::Chrome).unwrap();
    selection.all(&provider, Browser::Firefox).unwrap();
    let prefixer = Prefixer::new(SupportMatrix::new(&selection, &provider));

    let (mut arena, body, _) = block(&[("widget", "1")]);
    run_pass(&prefixer, &mut arena, body);

    assert_eq!(render(&arena, body), vec!["-webkit-widget: 1", "widget: 1"]);
}

#[test]
fn scenario_b_prune_removes_no_longer_required_prefixes() {
    let provider = CompatTable::new()
        .with_versions(Browser::Chrome, &["21", "22"])
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Chrome, "20")
        .unwrap();
    let mut selection = BrowserSelection::new();
    selection.all(&provider, Browser::Chrome).unwrap();
    let prefixer = Prefixer::with_options(
        SupportMatrix::new(&selection, &provider),
        Options {
            rearrange: false,
            prune: true,
        },
    );

    let (mut arena, body, _) = block(&[("-webkit-widget", "1"), ("widget", "1")]);
    run_pass(&prefixer, &mut arena, body);

    assert_eq!(render(&arena, body), vec!["widget: 1"]);
}

#[test]
fn rerunning_on_own_output_changes_nothing() {
    let provider = CompatTable::new()
        .with_versions(Browser::Chrome, &["19", "20"])
        .unwrap()
        .with_versions(Browser::Ie, &["9", "10"])
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Chrome, "20")
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Ie, "10")
        .unwrap();
    let mut selection = BrowserSelection::new();
    selection.all(&provider, Browser::Chrome).unwrap();
    selection.all(&provider, Browser::Ie).unwrap();
    let prefixer = Prefixer::new(SupportMatrix::new(&selection, &provider));

    let (mut arena, body, _) = block(&[("widget", "1"), ("color", "red")]);
    run_pass(&prefixer, &mut arena, body);
    let after_first = render(&arena, body);

    run_pass(&prefixer, &mut arena, body);
    assert_eq!(render(&arena, body), after_first);
}

#[test]
fn insertion_order_is_deterministic_across_runs() {
    let provider = CompatTable::new()
        .with_versions(Browser::Chrome, &["19"])
        .unwrap()
        .with_versions(Browser::Firefox, &["20"])
        .unwrap()
        .with_versions(Browser::Ie, &["9"])
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Chrome, "20")
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Firefox, "21")
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Ie, "10")
        .unwrap();
    let mut selection = BrowserSelection::new();
    for browser in [Browser::Chrome, Browser::Firefox, Browser::Ie] {
        selection.all(&provider, browser).unwrap();
    }

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let prefixer = Prefixer::new(SupportMatrix::new(&selection, &provider));
        let (mut arena, body, _) = block(&[("widget", "1")]);
        run_pass(&prefixer, &mut arena, body);
        outputs.push(render(&arena, body));
    }

    assert_eq!(
        outputs[0],
        vec![
            "-webkit-widget: 1",
            "-moz-widget: 1",
            "-ms-widget: 1",
            "widget: 1"
        ]
    );
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn existing_equivalents_are_consumed_and_missing_ones_synthesized() {
    let provider = CompatTable::new()
        .with_versions(Browser::Chrome, &["19"])
        .unwrap()
        .with_versions(Browser::Firefox, &["20"])
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Chrome, "20")
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Firefox, "21")
        .unwrap();
    let mut selection = BrowserSelection::new();
    selection.all(&provider, Browser::Chrome).unwrap();
    selection.all(&provider, Browser::Firefox).unwrap();
    let prefixer = Prefixer::new(SupportMatrix::new(&selection, &provider));

    let (mut arena, body, _) = block(&[("-moz-widget", "1"), ("widget", "1")]);
    run_pass(&prefixer, &mut arena, body);

    let rendered = render(&arena, body);
    assert!(rendered.contains(&"-webkit-widget: 1".to_string()));
    assert!(rendered.contains(&"-moz-widget: 1".to_string()));
    assert_eq!(rendered.last().unwrap(), "widget: 1");
    assert_eq!(rendered.len(), 3);
}

#[test]
fn rearrange_relocates_equivalents_next_to_their_subject() {
    let provider = CompatTable::new()
        .with_versions(Browser::Chrome, &["19"])
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Chrome, "20")
        .unwrap();
    let mut selection = BrowserSelection::new();
    selection.all(&provider, Browser::Chrome).unwrap();
    let prefixer = Prefixer::with_options(
        SupportMatrix::new(&selection, &provider),
        Options {
            rearrange: true,
            prune: false,
        },
    );

    let (mut arena, body, ids) = block(&[
        ("-webkit-widget", "1"),
        ("color", "red"),
        ("widget", "1"),
    ]);
    prefixer.declaration(&mut arena, ids[2]).unwrap();

    assert_eq!(
        render(&arena, body),
        vec!["color: red", "-webkit-widget: 1", "widget: 1"]
    );
}

#[test]
fn prune_never_leaves_prefixes_outside_the_required_set() {
    let provider = CompatTable::new()
        .with_versions(Browser::Chrome, &["19"])
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Chrome, "20")
        .unwrap();
    let mut selection = BrowserSelection::new();
    selection.all(&provider, Browser::Chrome).unwrap();
    let prefixer = Prefixer::with_options(
        SupportMatrix::new(&selection, &provider),
        Options {
            rearrange: false,
            prune: true,
        },
    );

    // webkit required; ms and moz equivalents are stale
    let (mut arena, body, ids) = block(&[
        ("-ms-widget", "1"),
        ("-moz-widget", "1"),
        ("widget", "1"),
    ]);
    prefixer.declaration(&mut arena, ids[2]).unwrap();

    let rendered = render(&arena, body);
    assert_eq!(rendered, vec!["-webkit-widget: 1", "widget: 1"]);
}

#[test]
fn untouched_when_nothing_is_required_or_found() {
    let provider = CompatTable::new()
        .with_versions(Browser::Chrome, &["40"])
        .unwrap();
    let mut selection = BrowserSelection::new();
    selection.all(&provider, Browser::Chrome).unwrap();
    let prefixer = Prefixer::new(SupportMatrix::new(&selection, &provider));

    let (mut arena, body, _) = block(&[("color", "red"), ("widget", "1")]);
    run_pass(&prefixer, &mut arena, body);

    assert_eq!(render(&arena, body), vec!["color: red", "widget: 1"]);
}

#[test]
fn compat_tables_load_from_json() {
    let json = r#"{
        "versions": {
            "chrome": ["19", "20", "21"]
        },
        "features": {
            "property": {
                "widget": { "chrome": "20" }
            }
        }
    }"#;
    let provider: CompatTable = serde_json::from_str(json).unwrap();

    let mut selection = BrowserSelection::new();
    selection.all(&provider, Browser::Chrome).unwrap();
    let prefixer = Prefixer::new(SupportMatrix::new(&selection, &provider));

    let (mut arena, body, _) = block(&[("widget", "1")]);
    run_pass(&prefixer, &mut arena, body);

    assert_eq!(render(&arena, body), vec!["-webkit-widget: 1", "widget: 1"]);
}
