//! Registry Lookup Benchmarks
//!
//! Measures the read paths a directory server hits on every operation: resolving names
//! and OIDs, fetching equality normalizers and comparing DNs.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ldap_schema::dn::DnComparator;
use ldap_schema::schema::ValueComparator;
use ldap_schema::{Registries, Value, load_schema_document};

/// A document with `count` extra attribute types so lookups run against a larger catalog.
fn create_test_document(count: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                "attributetype ( 1.3.6.1.4.1.42.2.{} NAME 'benchAttribute{}' SUP name \
                 X-SCHEMA 'bench' )\n",
                i, i
            )
        })
        .collect()
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for size in [10, 100, 1000].iter() {
        let registries = Registries::bootstrap().expect("bootstrap");
        load_schema_document(&registries, &create_test_document(*size)).expect("load");
        let name = format!("benchAttribute{}", size / 2);
        let oid = format!("1.3.6.1.4.1.42.2.{}", size / 2);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("by_name", size), &name, |b, name| {
            b.iter(|| registries.attribute_types().lookup(black_box(name)))
        });
        group.bench_with_input(BenchmarkId::new("by_oid", size), &oid, |b, oid| {
            b.iter(|| registries.attribute_types().lookup(black_box(oid)))
        });
        group.bench_with_input(BenchmarkId::new("missing", size), &size, |b, _| {
            b.iter(|| registries.attribute_types().has(black_box("noSuchAttribute")))
        });
    }

    group.finish();
}

fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalization");
    let registries = Registries::bootstrap().expect("bootstrap");

    group.bench_function("oid_normalizer", |b| {
        b.iter(|| registries.oid_normalizer(black_box("commonName")))
    });

    let normalizer = registries.oid_normalizer("cn").expect("cn normalizer");
    let value = Value::from("  The   Quick  Brown Fox ");
    group.bench_function("deep_trim_to_lower", |b| {
        b.iter(|| normalizer.normalize(black_box(&value)))
    });

    group.finish();
}

fn bench_dn_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("dn_comparison");
    let registries = Registries::bootstrap().expect("bootstrap");
    let comparator = DnComparator::new(registries.handle());

    let cases = [
        ("equal_short", "cn=Alice,dc=example", "CN=alice, DC=Example"),
        (
            "equal_long",
            "cn=Alice,ou=People,ou=Engineering,o=Example,dc=example,dc=com",
            "commonName=ALICE, ou=people, ou=engineering, o=example, dc=Example, dc=COM",
        ),
        ("different", "cn=Alice,dc=example", "cn=Bob,dc=example"),
    ];
    for (label, left, right) in cases.iter() {
        let left = Value::from(*left);
        let right = Value::from(*right);
        group.bench_function(*label, |b| {
            b.iter(|| comparator.compare(black_box(&left), black_box(&right)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_lookup,
    bench_normalization,
    bench_dn_comparison
);
criterion_main!(benches);
