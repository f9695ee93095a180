//! Benchmarks for extraction, the cross-file analyzers and full comparisons.
//!
//! Run with: cargo bench
//! Run specific benchmark: cargo bench -- duplication

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;

use empathizer::analyzers::{self, duplicates, graph, patterns};
use empathizer::config::Config;
use empathizer::core::{AnalysisContext, Analyzer, FileSet, FilesystemSource, SourceFile};
use empathizer::languages::{AnalyzedFile, AnalyzerFactory};
use empathizer::pipeline::{self, Pipeline};

/// Create a temporary repository with Python and JavaScript sources.
fn create_benchmark_repo(file_count: usize) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let src_dir = temp.path().join("src");
    std::fs::create_dir_all(&src_dir).expect("Failed to create src dir");

    for i in 0..file_count {
        let (name, content) = if i % 3 == 0 {
            (format!("widget_{i}.js"), generate_js_file(i))
        } else {
            (format!("service_{i}.py"), generate_python_file(i))
        };
        std::fs::write(src_dir.join(name), content).expect("Failed to write file");
    }
    temp
}

/// Generate a Python module with varying nesting.
fn generate_python_file(seed: usize) -> String {
    let depth = seed % 4;
    let mut code = format!("\"\"\"Service {seed}.\"\"\"\n\nfrom src import service_{}\n\n", (seed + 1) % 7);
    for f in 0..(4 + depth) {
        code.push_str(&format!(
            "\n\ndef handle_{seed}_{f}(items, limit):\n    \"\"\"Handle a batch.\"\"\"\n"
        ));
        for d in 0..depth {
            code.push_str(&"    ".repeat(d + 1));
            code.push_str(&format!("for item_{d} in items:\n"));
        }
        code.push_str(&"    ".repeat(depth + 1));
        code.push_str("limit = limit - 1\n");
        if seed % 5 == 0 {
            code.push_str("    # TODO: batch writes\n");
        }
        code.push_str("    return limit\n");
    }
    code
}

/// Generate a JavaScript module.
fn generate_js_file(seed: usize) -> String {
    format!(
        "/** Widget {seed}. */\nimport {{ render }} from './widget_{}';\n\n/** Mount the widget. */\nexport function mount{seed}(root) {{\n  if (!root) {{\n    return null;\n  }}\n  return render(root);\n}}\n",
        (seed + 3) % 9
    )
}

fn load(temp: &TempDir, config: &Config) -> FileSet {
    FileSet::from_source(&FilesystemSource::new(temp.path()), config).unwrap()
}

fn extract(files: &FileSet) -> Vec<AnalyzedFile<'_>> {
    files
        .iter()
        .map(|source: &SourceFile| AnalyzedFile {
            source,
            facts: AnalyzerFactory::resolve(source).extract(source),
        })
        .collect()
}

/// Benchmark fetching and decoding a checkout.
fn bench_file_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_discovery");

    for size in [10, 50, 100].iter() {
        let temp = create_benchmark_repo(*size);
        let config = Config::default();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("files", size), size, |b, _| {
            b.iter(|| black_box(load(&temp, &config).len()));
        });
    }

    group.finish();
}

/// Benchmark per-file extraction.
fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    for size in [10, 50, 100].iter() {
        let temp = create_benchmark_repo(*size);
        let config = Config::default();
        let files = load(&temp, &config);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("files", size), size, |b, _| {
            b.iter(|| black_box(extract(&files).len()));
        });
    }

    group.finish();
}

/// Benchmark the cross-file analyzers individually and together.
fn bench_cross_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_file");
    let temp = create_benchmark_repo(100);
    let config = Config::default();
    let files = load(&temp, &config);
    let analyzed = extract(&files);
    let ctx = AnalysisContext::new(&analyzed, &config);

    group.bench_function("duplication", |b| {
        let analyzer = duplicates::Analyzer::new();
        b.iter(|| black_box(analyzer.analyze(&ctx).unwrap().duplicated_lines));
    });
    group.bench_function("dependencies", |b| {
        let analyzer = graph::Analyzer::new();
        b.iter(|| black_box(analyzer.analyze(&ctx).unwrap().edges));
    });
    group.bench_function("patterns", |b| {
        let analyzer = patterns::Analyzer::new();
        b.iter(|| black_box(analyzer.analyze(&ctx).unwrap().score));
    });
    group.bench_function("all", |b| {
        b.iter(|| black_box(analyzers::analyze_repository(&ctx).unwrap()));
    });

    group.finish();
}

/// Benchmark profiling and comparing two checkouts end to end.
fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");
    group.sample_size(10);

    for size in [10, 50].iter() {
        let reference = create_benchmark_repo(*size);
        let candidate = create_benchmark_repo(size / 2);
        let config = Config::default();

        group.bench_with_input(BenchmarkId::new("files", size), size, |b, _| {
            b.iter(|| {
                let comparison = pipeline::compare(
                    &FilesystemSource::new(reference.path()),
                    &FilesystemSource::new(candidate.path()),
                    &config,
                )
                .unwrap();
                black_box(comparison.result.score)
            });
        });
    }

    group.bench_function("single_worker", |b| {
        let temp = create_benchmark_repo(50);
        let mut config = Config::default();
        config.runtime.workers = 1;
        let files = load(&temp, &config);
        b.iter(|| black_box(Pipeline::new(&config).profile("bench", files.clone()).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_file_discovery,
    bench_extraction,
    bench_cross_file,
    bench_compare,
);
criterion_main!(benches);
