//! Benchmarks for repo-walker
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fs;
use std::path::Path;

fn benchmark_queue_operations(c: &mut Criterion) {
    use repo_walker::walker::queue::{DirTask, TaskQueue};

    c.bench_function("queue_push_pop", |b| {
        let queue = TaskQueue::new();

        b.iter(|| {
            queue.push(DirTask::new("/test/path".into(), 5));
            let task = queue.pop();
            queue.finish_work();
            black_box(task);
        })
    });
}

/// Fan-out tree with a repository in every directory
fn build_tree(root: &Path, fanout: usize, depth: usize) {
    if depth == 0 {
        return;
    }
    fs::create_dir_all(root.join("repo/.git")).unwrap();
    for i in 0..fanout {
        let child = root.join(format!("dir{i}"));
        fs::create_dir_all(&child).unwrap();
        build_tree(&child, fanout, depth - 1);
    }
}

fn benchmark_scan(c: &mut Criterion) {
    use repo_walker::metadata::NoMetadata;
    use repo_walker::{ScanConfig, Scanner};
    use std::sync::Arc;

    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path(), 5, 4);

    let mut group = c.benchmark_group("scan_tree");
    for workers in [1, 4, 8] {
        group.bench_function(format!("workers_{workers}"), |b| {
            b.iter(|| {
                let config = ScanConfig::new(dir.path()).workers(workers);
                let result = Scanner::new(config, Arc::new(NoMetadata)).run().unwrap();
                black_box(result.repos.len());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_queue_operations, benchmark_scan);
criterion_main!(benches);
