use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use genescape::{Ontology, QueryParams};

const TARGETS: [&str; 5] = ["ACAA1", "ACADVL", "CYP1A1", "TP53BP1", "NOTAGENE"];

fn query_benchmark(c: &mut Criterion) {
    let ontology = Ontology::from_standard("tests/example.obo", "tests/example.gaf", false)
        .expect("example files must be present");

    let fixed = QueryParams::new(TARGETS).with_min_coverage(1);
    c.bench_function("query fixed coverage", |b| {
        b.iter(|| {
            ontology
                .query(black_box(&fixed))
                .expect("example ontology is acyclic")
                .node_set()
                .len()
        })
    });

    let estimated = QueryParams::new(TARGETS).with_coverage_node_bound(5);
    c.bench_function("query estimated coverage", |b| {
        b.iter(|| {
            ontology
                .query(black_box(&estimated))
                .expect("example ontology is acyclic")
                .min_coverage()
        })
    });
}

criterion_group! {
    name = query;
    config = Criterion::default().sample_size(50).measurement_time(Duration::from_secs(5));
    targets = query_benchmark
}
criterion_main!(query);
