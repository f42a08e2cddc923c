//! Benchmarks for active path matching and sidebar rendering.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sidenav_core::{ActivePath, BodyScrollLock, SidebarOptions, SidebarTree, Tree, TreeNode, is_active};

/// Build a tree with the given depth and breadth; every level links to `/level-.../page-i`.
fn build_tree(depth: usize, breadth: usize) -> Vec<TreeNode> {
    fn build_level(prefix: &str, depth: usize, breadth: usize) -> Vec<TreeNode> {
        (0..breadth)
            .map(|i| {
                let path = format!("{prefix}/section-{i}");
                if depth == 0 {
                    TreeNode::link(format!("Page {i}"), path)
                } else {
                    TreeNode::category(format!("Section {i}"), build_level(&path, depth - 1, breadth), true)
                }
            })
            .collect()
    }

    build_level("/docs", depth, breadth)
}

/// Path of the last leaf, so matching has to visit every branch.
fn last_leaf(depth: usize, breadth: usize) -> String {
    let mut path = String::from("/docs");
    for _ in 0..=depth {
        path.push_str(&format!("/section-{}", breadth - 1));
    }
    path
}

fn bench_is_active(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_active");

    for (depth, breadth) in [(2, 10), (4, 5), (6, 3)] {
        let items = build_tree(depth, breadth);
        let root = TreeNode::category("Root", items, false);
        let hit = ActivePath::new(&last_leaf(depth, breadth));
        let miss = ActivePath::new("/blog/");

        group.bench_with_input(
            BenchmarkId::new("hit", format!("{depth}x{breadth}")),
            &hit,
            |b, active| b.iter(|| is_active(&root, active)),
        );
        group.bench_with_input(
            BenchmarkId::new("miss", format!("{depth}x{breadth}")),
            &miss,
            |b, active| b.iter(|| is_active(&root, active)),
        );
    }

    group.finish();
}

fn bench_navigate_and_render(c: &mut Criterion) {
    let tree = Tree::new(build_tree(3, 6)).unwrap();
    let first = last_leaf(3, 6);
    let second = "/docs/section-0/section-0/section-0/section-0";

    c.bench_function("navigate_and_render", |b| {
        let mut sidebar = SidebarTree::new(
            tree.clone(),
            &first,
            SidebarOptions::default(),
            BodyScrollLock::new(),
            None,
        );
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            sidebar.navigate(if flip { second } else { first.as_str() });
            sidebar.render()
        });
    });
}

criterion_group!(benches, bench_is_active, bench_navigate_and_render);
criterion_main!(benches);
