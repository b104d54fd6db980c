//! Benchmarks for mapping transforms and graph rendering.
//!
//! Benchmark targets:
//! - Entity to graph transform: <10us for typical entities
//! - Graph name derivation: <100ns
//! - N-Triples rendering: <100us for 1k-triple graphs

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

use tripod::repository::graph_name;
use tripod::{Graph, Iri, SubjectMapping, Triple, vocab};

// ============================================================================
// Fixtures
// ============================================================================

const HOUSE_CLASS: &str = "https://example.com/ns/House";
const HAS_ROOM: &str = "https://example.com/ns/hasRoom";

struct House {
    id: Iri,
    label: Option<String>,
    rooms: Vec<Iri>,
}

fn house_mapping() -> SubjectMapping<House> {
    SubjectMapping::builder(HOUSE_CLASS)
        .id(|h: &House| &h.id)
        .literal(vocab::rdfs::LABEL, |h: &House| h.label.clone())
        .resources(HAS_ROOM, |h: &House| h.rooms.as_slice(), Iri::clone)
        .build()
        .expect("house mapping")
}

fn house_with_rooms(count: usize) -> House {
    House {
        id: Iri::new("https://example.com/ns/House/bench"),
        label: Some("benchmark house".to_string()),
        rooms: (0..count)
            .map(|n| Iri::new(format!("https://example.com/rooms/{n}")))
            .collect(),
    }
}

fn graph_with_triples(count: usize) -> Graph {
    (0..count)
        .map(|n| {
            Triple::literal(
                Iri::new(format!("https://example.com/things/{n}")),
                vocab::rdfs::LABEL,
                format!("thing {n}\nwith \"escapes\""),
            )
        })
        .collect()
}

// ============================================================================
// Entity to Graph Transform
// ============================================================================

fn bench_to_graph(c: &mut Criterion) {
    let mapping = house_mapping();
    let mut group = c.benchmark_group("entity_to_graph");
    group.measurement_time(Duration::from_secs(5));

    for room_count in [0usize, 10, 100] {
        let house = house_with_rooms(room_count);
        group.throughput(Throughput::Elements(room_count as u64 + 2));
        group.bench_with_input(
            BenchmarkId::from_parameter(room_count),
            &house,
            |b, house| {
                b.iter(|| mapping.to_graph(black_box(house)));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Graph Naming
// ============================================================================

fn bench_graph_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_name");

    let plain = Iri::new("https://example.com/ns/House/42");
    group.bench_function("plain", |b| {
        b.iter(|| graph_name(black_box(&plain)));
    });

    let slashed = Iri::new("https://example.com/ns/House/42/");
    group.bench_function("trailing_slash", |b| {
        b.iter(|| graph_name(black_box(&slashed)));
    });

    group.finish();
}

// ============================================================================
// N-Triples Rendering
// ============================================================================

fn bench_ntriples(c: &mut Criterion) {
    let mut group = c.benchmark_group("ntriples");
    group.measurement_time(Duration::from_secs(5));

    for triple_count in [10usize, 1_000] {
        let graph = graph_with_triples(triple_count);
        group.throughput(Throughput::Elements(triple_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(triple_count),
            &graph,
            |b, graph| {
                b.iter(|| black_box(graph).to_ntriples());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_to_graph, bench_graph_name, bench_ntriples);
criterion_main!(benches);
