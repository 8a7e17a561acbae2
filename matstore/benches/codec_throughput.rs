use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use matstore::{CooMatrix, DenseMatrix, MatrixHandle, ReadOptions, Representation, SelfComm, Store};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn sparse(n: usize, density: f64) -> CooMatrix {
    let mut rng = StdRng::seed_from_u64(17);
    let mut matrix = CooMatrix::new(n, n);
    for row in 0..n {
        for col in 0..n {
            if rng.gen_bool(density) {
                let _ = matrix.push(row, col, rng.gen::<f64>());
            }
        }
    }
    matrix
}

fn bench_mtx(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut group = c.benchmark_group("mtx");
    for n in [200, 800] {
        let matrix = sparse(n, 0.05);
        let path = dir.path().join(format!("bench_{n}.mtx"));
        let store = Store::mtx(&path);
        let handle = MatrixHandle::LocalSparse(matrix.clone());
        group.throughput(Throughput::Elements(matrix.nnz() as u64));

        group.bench_with_input(BenchmarkId::new("write", n), &handle, |b, handle| {
            b.iter(|| store.write(&SelfComm, black_box(handle)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("read", n), &store, |b, store| {
            b.iter(|| {
                store
                    .read(&SelfComm, Representation::LocalSparse, &ReadOptions::default())
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_container(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut group = c.benchmark_group("container");
    for n in [256, 1024] {
        let mut rng = StdRng::seed_from_u64(n as u64);
        let matrix = DenseMatrix::from_fn(n, n, |_, _| rng.gen());
        let store = Store::hdf5(dir.path().join(format!("bench_{n}.h5")));
        let handle = MatrixHandle::LocalDense(matrix);
        group.throughput(Throughput::Bytes((n * n * 8) as u64));

        group.bench_with_input(BenchmarkId::new("write", n), &handle, |b, handle| {
            b.iter(|| store.write(&SelfComm, black_box(handle)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("read", n), &store, |b, store| {
            b.iter(|| {
                store
                    .read(&SelfComm, Representation::LocalDense, &ReadOptions::default())
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_mtx, bench_container);
criterion_main!(benches);
