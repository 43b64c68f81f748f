//! Criterion benchmarks for [`BookmarkList`] search.
//!
//! Live search runs on every keystroke in the search field, so both
//! `find_matching` and `visibility_mask` are measured over growing lists.
//!
//! Run with:
//! ```bash
//! cargo bench --package tor-launcher-core --bench search_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tor_launcher_core::{Bookmark, BookmarkList, ValidatedFields};

/// Creates a list of `n` bookmarks with distinct names and onion-like URLs.
fn build_list(n: usize) -> BookmarkList {
    let items = (0..n)
        .map(|i| {
            Bookmark::new(ValidatedFields {
                name: format!("Hidden Service {i}"),
                url: format!("http://{:a<56}.onion", format!("site{i}")),
                icon_path: None,
            })
        })
        .collect();
    BookmarkList::from_vec(items)
}

fn bench_find_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_matching");
    for n in [10usize, 100, 1000] {
        let list = build_list(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &list, |b, list| {
            b.iter(|| list.find_matching(black_box("service 4")));
        });
    }
    group.finish();
}

fn bench_visibility_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("visibility_mask");
    for n in [10usize, 100, 1000] {
        let list = build_list(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &list, |b, list| {
            b.iter(|| list.visibility_mask(black_box("SITE1")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_find_matching, bench_visibility_mask);
criterion_main!(benches);
