use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use stylecraft_ast::{refine, Arena, CollectionId, NodeId, NullSink, SetRegistry};
use stylecraft_prefixer::{
    Browser, BrowserSelection, CompatTable, FeatureKind, Prefixer, SupportMatrix,
};

fn provider() -> CompatTable {
    CompatTable::new()
        .with_versions(Browser::Chrome, &["19", "20", "21"])
        .unwrap()
        .with_versions(Browser::Firefox, &["20", "21"])
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Chrome, "20")
        .unwrap()
        .with_prefixed(FeatureKind::Property, "widget", Browser::Firefox, "21")
        .unwrap()
}

fn build_block(decls: usize) -> (Arena, CollectionId, Vec<NodeId>) {
    let mut arena = Arena::new();
    let rule = arena.rule(".bench");
    let body = arena.children(rule).unwrap();
    let registry = SetRegistry::new().with_known(["widget", "color"]);
    let mut ids = Vec::with_capacity(decls);
    for i in 0..decls {
        let name = if i % 2 == 0 { "widget" } else { "color" };
        let decl = arena.declaration(name, "1px");
        arena.append(body, decl).unwrap();
        refine(&mut arena, decl, &registry, &mut NullSink).unwrap();
        ids.push(decl);
    }
    (arena, body, ids)
}

fn bench_declaration_pass(c: &mut Criterion) {
    let provider = provider();
    let mut selection = BrowserSelection::new();
    selection.all(&provider, Browser::Chrome).unwrap();
    selection.all(&provider, Browser::Firefox).unwrap();

    c.bench_function("declaration_pass_200", |b| {
        b.iter_batched(
            || build_block(200),
            |(mut arena, _body, ids)| {
                let prefixer = Prefixer::new(SupportMatrix::new(&selection, &provider));
                for decl in ids {
                    prefixer.declaration(&mut arena, decl).unwrap();
                }
                arena
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_declaration_pass);
criterion_main!(benches);
