//! Code generation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use builder_codegen::{generate_project, generate_screen, GenerateOptions};
use builder_core::{ComponentType, Properties};
use builder_tree::{DesignTree, TemplateRegistry};

/// A scaffold with `rows` list rows, each holding an icon, text and switch.
fn list_screen(rows: usize) -> DesignTree {
    let mut tree = DesignTree::with_scaffold();
    let Ok(list) = tree.add(ComponentType::LazyColumn, "content", None) else {
        return tree;
    };
    for i in 0..rows {
        let Ok(row) = tree.add_with(
            ComponentType::Row,
            &list,
            None,
            Properties::new().with("padding", 8).with("fillMaxWidth", true),
        ) else {
            continue;
        };
        let _ = tree.add(ComponentType::Icon, &row, None);
        let _ = tree.add_with(
            ComponentType::Text,
            &row,
            None,
            Properties::new().with("text", format!("Row {i}")),
        );
        let _ = tree.add(ComponentType::Switch, &row, None);
    }
    tree
}

fn generate_small(c: &mut Criterion) {
    let tree = list_screen(5);
    let templates = TemplateRegistry::new();
    c.bench_function("generate_small", |b| {
        b.iter(|| generate_screen(black_box(&tree), &templates, GenerateOptions::default()))
    });
}

fn generate_large(c: &mut Criterion) {
    let tree = list_screen(200);
    let templates = TemplateRegistry::new();
    c.bench_function("generate_large_project", |b| {
        b.iter(|| generate_project(black_box(&tree), &templates, GenerateOptions::default()))
    });
}

criterion_group!(benches, generate_small, generate_large);
criterion_main!(benches);
