//! Criterion benchmarks for the lookup pipeline:
//! - Hebrew normalization
//! - Dictionary construction and expansion
//! - Query planning
//! - Prefix search against a small on-disk index

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use seforim_lookup::analysis::{HebrewNormalizer, TextNormalizer, normalize, tokenize};
use seforim_lookup::engine::{LookupConfig, LookupEngine};
use seforim_lookup::morphology::{DictionaryEntry, DictionaryService, MorphologyDictionary};
use seforim_lookup::testing::{BookDoc, book, write_index};
use tempfile::TempDir;

const VERSES: &[&str] = &[
    "בְּרֵאשִׁ֖ית בָּרָ֣א אֱלֹהִ֑ים אֵ֥ת הַשָּׁמַ֖יִם וְאֵ֥ת הָאָֽרֶץ",
    "וַיִּקְרָ֖א אֶל־מֹשֶׁ֑ה וַיְדַבֵּ֤ר יְהוָה֙ אֵלָ֔יו מֵאֹ֥הֶל מוֹעֵ֖ד לֵאמֹֽר",
    "שִׁ֥יר הַשִּׁירִ֖ים אֲשֶׁ֥ר לִשְׁלֹמֹֽה",
    "רש״י על בראשית פרק א׳",
    "שולחן ערוך אורח חיים",
];

const ROOTS: &[&str] = &["ספר", "בית", "מלך", "דבר", "שיר", "תורה", "עולם", "לב"];
const SUFFIXES: &[&str] = &["ים", "ות", "י", "יהם", "ך", "נו"];

fn generate_entries() -> Vec<DictionaryEntry> {
    let mut entries = Vec::new();
    for (i, root) in ROOTS.iter().cycle().take(2_000).enumerate() {
        let base = format!("{root}{}", i / ROOTS.len());
        for suffix in SUFFIXES {
            entries.push(DictionaryEntry::new(
                format!("{base}{suffix}"),
                base.clone(),
                [format!("ה{base}{suffix}"), format!("ו{base}{suffix}")],
            ));
        }
    }
    entries
}

fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalization");

    group.bench_function("normalize_single_verse", |b| {
        b.iter(|| normalize(black_box(VERSES[0])))
    });

    group.throughput(Throughput::Elements(VERSES.len() as u64));
    group.bench_function("normalize_and_tokenize_batch", |b| {
        b.iter(|| {
            for verse in VERSES {
                black_box(tokenize(&normalize(black_box(verse))));
            }
        })
    });

    group.finish();
}

fn bench_dictionary(c: &mut Criterion) {
    let mut group = c.benchmark_group("dictionary");
    group.sample_size(20);

    let normalizer = HebrewNormalizer::new().unwrap();
    let entries = generate_entries();

    group.throughput(Throughput::Elements(entries.len() as u64));
    group.bench_function("build_from_entries", |b| {
        b.iter(|| MorphologyDictionary::from_entries(&normalizer, black_box(entries.clone())))
    });

    let dictionary = MorphologyDictionary::from_entries(&normalizer, entries);
    let tokens: Vec<String> = (0..100)
        .map(|i| normalizer.normalize(&format!("{}{}ים", ROOTS[i % ROOTS.len()], i)))
        .collect();

    group.throughput(Throughput::Elements(tokens.len() as u64));
    group.bench_function("expansion_for", |b| {
        b.iter(|| {
            for token in &tokens {
                black_box(dictionary.expansion_for(token));
            }
        })
    });

    let engine = LookupEngine::with_dictionary(
        LookupConfig::new("/nonexistent/lookup_index"),
        DictionaryService::from_dictionary(dictionary).unwrap(),
    )
    .unwrap();
    group.throughput(Throughput::Elements(1));
    group.bench_function("plan_query", |b| {
        b.iter(|| engine.plan(black_box("סְפָרִים בָּתִּים מְלָכִים")))
    });

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(20);

    let dir = TempDir::new().unwrap();
    let books: Vec<BookDoc> = VERSES
        .iter()
        .cycle()
        .take(500)
        .enumerate()
        .map(|(i, title)| book(i as u64, title, i % 3 == 0, i as i64))
        .collect();
    write_index(dir.path(), &books, &[]).unwrap();

    let engine = LookupEngine::open(LookupConfig::new(dir.path())).unwrap();
    group.bench_function("search_books_prefix", |b| {
        b.iter(|| engine.search_books_prefix(black_box("שיר הש"), 20).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_normalization, bench_dictionary, bench_search);
criterion_main!(benches);
