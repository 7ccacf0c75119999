use criterion::{criterion_group, criterion_main, Criterion};
use pattern_algebra::{compile_source, matcher, CompileOptions};

const TEST_PATHS: &[&str] = &[
    "/file-a.ts",
    "/dir-a/file-a.ts",
    "/dir-a/dir-c/file-a.ts",
    "/dir-a/dir-c/file-b.js",
    "/dir-b/file-a.ts",
    "/dir-b/dir-d/dir-e/dir-f/dir-g/file-a.ts",
];

const TEST_PATTERNS: &[&str] = &[
    "*",
    "*.ts",
    "dir-a/*.ts",
    "/dir-b",
    "dir-a/dir-b",
    "**/dir-*/file-*",
    "dir-*/*.{ts,js}",
    "dir-b/dir-d/dir-e/dir-f/dir-g/file-a.ts",
];

fn compile_all(patterns: &[&str]) -> Vec<pattern_algebra::CompiledPattern> {
    patterns.iter().map(|p| compile_source(p, CompileOptions::default()).unwrap()).collect()
}

fn pattern_benchmark(c: &mut Criterion) {
    c.bench_function("compiling", |b| b.iter(|| compile_all(TEST_PATTERNS)));

    let compiled = compile_all(TEST_PATTERNS);
    c.bench_function("matching", |b| {
        b.iter(|| {
            for pattern in &compiled {
                for path in TEST_PATHS {
                    matcher::matches(path, pattern);
                }
            }
        })
    });

    let a = compile_source("**/*.ts", CompileOptions::default()).unwrap();
    let b = compile_source("dir-a/**", CompileOptions::default()).unwrap();
    c.bench_function("intersect", |bench| bench.iter(|| a.intersect(&b)));
}

criterion_group!(benches, pattern_benchmark);
criterion_main!(benches);
