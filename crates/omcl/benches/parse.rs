use std::fmt::Write;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use omcl::{parse_str, serialize_document, Deserializer};

/// A document with `services` entries, each a nested object with a few scalars
/// and a short array.
fn document(services: usize) -> String {
    let mut src = String::from("// generated\nversion = 3\n");
    for i in 0..services {
        let _ = writeln!(
            src,
            "service_{i} {{\n    host = \"10.0.{}.{}\"\n    port = 0x{:X}\n    weight = {}.5\n    \
             enabled = {}\n    tags = [\"a\", 'b', \"c\" \"d\"]\n}}",
            i / 256,
            i % 256,
            8000 + i,
            i,
            i % 2 == 0,
        );
    }
    src
}

fn bench_parse(c: &mut Criterion) {
    let src = document(500);
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(src.len() as u64));
    group.bench_function("document_500", |b| b.iter(|| parse_str(black_box(&src))));
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let doc = parse_str(&document(500)).expect("generated document parses");
    c.bench_function("serialize/document_500", |b| {
        b.iter(|| serialize_document(black_box(&doc)))
    });
}

fn bench_deserialize(c: &mut Criterion) {
    use std::collections::BTreeMap;
    use omcl::Value;

    let src = document(500);
    let de = Deserializer::new();
    c.bench_function("deserialize/document_500", |b| {
        b.iter(|| de.from_str::<BTreeMap<String, Value>>(black_box(&src)))
    });
}

criterion_group!(benches, bench_parse, bench_serialize, bench_deserialize);
criterion_main!(benches);
