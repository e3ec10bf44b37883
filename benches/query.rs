//! Query benchmark suite.
//!
//! Benchmarks selection and traversal over in-memory documents:
//! - Document sizes: 100, 1000 list items
//! - Operations: select, find, child nodes, field reads
//!
//! Run with: cargo bench --bench query
//! Results saved to: target/criterion/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use domq::{Dom, Field, MemoryDocument};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const ITEM_COUNTS: &[usize] = &[100, 1000];
const LISTS: usize = 10;

// ============================================================================
// Fixture
// ============================================================================

/// Logs go to stderr only when `RUST_LOG` asks for them.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}

fn build_document(items: usize) -> Dom {
    let doc = MemoryDocument::new();
    let per_list = items / LISTS;
    for list_index in 0..LISTS {
        let list_id = format!("list-{list_index}");
        let list = doc
            .insert(None, "ul", &[("id", list_id.as_str()), ("class", "list")])
            .expect("insert list");
        for item_index in 0..per_list {
            let class = if item_index % 3 == 0 { "item odd" } else { "item" };
            let item = doc
                .insert(Some(&list), "li", &[("class", class)])
                .expect("insert item");
            doc.insert(Some(&item), "a", &[("href", "#")])
                .expect("insert link");
        }
    }
    Dom::new(doc)
}

// ============================================================================
// Benchmark: Select
// ============================================================================

fn bench_select(c: &mut Criterion) {
    init_logging();
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("select");
    for &count in ITEM_COUNTS {
        let dom = build_document(count);
        for selector in ["li", "ul.list > li.odd", "#list-3 a[href]"] {
            group.bench_with_input(BenchmarkId::new(selector, count), &dom, |b, dom| {
                b.to_async(&rt)
                    .iter(|| async { dom.select(selector).await.unwrap() });
            });
        }
    }
    group.finish();
}

// ============================================================================
// Benchmark: Find
// ============================================================================

fn bench_find(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("find");
    for &count in ITEM_COUNTS {
        let dom = build_document(count);
        let lists = rt.block_on(dom.select("ul")).unwrap();

        group.bench_with_input(BenchmarkId::new("children", count), &lists, |b, lists| {
            b.to_async(&rt).iter(|| async { lists.find(None).await.unwrap() });
        });
        group.bench_with_input(BenchmarkId::new("child_nodes", count), &lists, |b, lists| {
            b.to_async(&rt).iter(|| async { lists.children().await.unwrap() });
        });
        group.bench_with_input(BenchmarkId::new("descendants", count), &lists, |b, lists| {
            b.to_async(&rt)
                .iter(|| async { lists.find(Some("a")).await.unwrap() });
        });
    }
    group.finish();
}

// ============================================================================
// Benchmark: Field Reads
// ============================================================================

fn bench_fields(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("fields");
    for &count in ITEM_COUNTS {
        let dom = build_document(count);
        let links = rt.block_on(dom.select("a")).unwrap();

        group.bench_with_input(BenchmarkId::new("href", count), &links, |b, links| {
            b.to_async(&rt)
                .iter(|| async { links.get_field(Field::Href).await.unwrap() });
        });
        group.bench_with_input(BenchmarkId::new("outer_html", count), &links, |b, links| {
            b.to_async(&rt)
                .iter(|| async { links.get_field(Field::OuterHtml).await.unwrap() });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_select, bench_find, bench_fields);
criterion_main!(benches);
