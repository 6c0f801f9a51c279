use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use wos_field_decomposer::address::split_into_links;
use wos_field_decomposer::reference::classify_citation_list;
use wos_field_decomposer::reprint::extract_reprint_authors;
use wos_field_decomposer::{decompose_record, AddressResolver, RawRecord};

const AFFILIATIONS: &str = "[Smith, John; Doe, Jane] Univ Calif Berkeley, Dept Chem, Berkeley, CA 94720 USA; \
    Lawrence Berkeley Natl Lab, Berkeley, CA 94720 USA [Wang, Xiaoming [Liu, Yang]] Tsinghua Univ, \
    Dept Phys, Beijing 100084, Peoples R China [Lee, Kim] Seoul Natl Univ, Seoul, South Korea";

const CITATIONS: &str = "Smith J, 2020, NATURE, V580, P123, DOI 10.1038/s41586-020-2012-7; \
    Jones A, 2019, US Patent 123456; Brown R, 2018, Some Book Title; \
    Lee K, 1999, PHYS REV B, V60, P7; Anonymous, Unpublished notes";

const REPRINT: &str = "Smith, J (reprint author), Univ Calif Berkeley, Dept Chem, Berkeley, CA 94720 USA; \
    Wang, X; Liu, Y (reprint author), Tsinghua Univ, Dept Phys, Beijing 100084, Peoples R China.";

fn bench_affiliation_split(c: &mut Criterion) {
    c.bench_function("split_into_links", |b| {
        b.iter(|| black_box(split_into_links(black_box(AFFILIATIONS))))
    });
}

fn bench_address_resolution(c: &mut Criterion) {
    let resolver = AddressResolver::default();
    let addresses = vec![
        ("USA", "Univ Calif Berkeley, Dept Chem, Berkeley, CA 94720 USA"),
        ("USA", "Mayo Clin, Rochester, MN, USA"),
        ("Peoples R China", "Tsinghua Univ, Dept Phys, Beijing 100084, Peoples R China"),
        ("Peoples R China", "Wuhan Univ, Wuhan, Hubei, Peoples R China"),
        ("France", "Univ Paris, Paris, France"),
    ];

    let mut group = c.benchmark_group("address_resolution");
    group.throughput(Throughput::Elements(addresses.len() as u64));

    group.bench_function("resolve", |b| {
        b.iter(|| {
            for (country, address) in &addresses {
                black_box(resolver.resolve(country, address));
            }
        })
    });

    group.finish();
}

fn bench_reference_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference_classification");
    group.throughput(Throughput::Elements(5));

    group.bench_function("classify_citation_list", |b| {
        b.iter(|| black_box(classify_citation_list(black_box(CITATIONS))))
    });

    group.finish();
}

fn bench_reprint_extraction(c: &mut Criterion) {
    let resolver = AddressResolver::default();
    c.bench_function("extract_reprint_authors", |b| {
        b.iter(|| black_box(extract_reprint_authors(black_box(REPRINT), &resolver)))
    });
}

fn bench_decompose_record(c: &mut Criterion) {
    let resolver = AddressResolver::default();
    let raw: RawRecord = [
        ("UT", "WOS:000123456700001"),
        ("AF", "Smith, John; Doe, Jane; Wang, Xiaoming; Liu, Yang; Lee, Kim"),
        ("C1", AFFILIATIONS),
        ("RP", REPRINT),
        ("CR", CITATIONS),
        ("FU", "NSF [DMR-1234, CHE-5678]; NSFC [21373001]"),
        ("DE", "graphene; catalysis; spectroscopy"),
    ]
    .into_iter()
    .collect();

    c.bench_function("decompose_record", |b| {
        b.iter(|| black_box(decompose_record(black_box(&raw), &resolver)))
    });
}

criterion_group!(
    benches,
    bench_affiliation_split,
    bench_address_resolution,
    bench_reference_classification,
    bench_reprint_extraction,
    bench_decompose_record,
);
criterion_main!(benches);
