//! Write one sparse matrix from four ranks, then read it back as three
//! representations

use matstore::{
    Communicator, CooMatrix, MatrixHandle, ReadOptions, Representation, Store, ThreadGroup,
};
use std::time::Instant;

fn main() -> matstore::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let nrows = 2_000;
    let ncols = 650;
    let matrix = build_demo_matrix(nrows, ncols);
    println!("Matrix dimensions: {nrows} x {ncols}, {} stored entries", matrix.nnz());

    let results = ThreadGroup::run(4, |comm| -> matstore::Result<()> {
        let store = Store::mtx("example_matrix.mtx");

        let start = Instant::now();
        store.write(&comm, &MatrixHandle::LocalSparse(matrix.clone()))?;
        comm.barrier();
        if comm.rank() == 0 {
            println!("Written by rank 0 in {:?}", start.elapsed());
        }

        let options = ReadOptions::default();
        let shard = store.read(&comm, Representation::DistributedSparse, &options)?;
        let local = store.read(&comm, Representation::LocalDense, &options)?;
        if let Some(shard) = shard.as_distributed_sparse() {
            println!(
                "rank {}: rows {:?} hold {} entries, dense copy {:?}",
                comm.rank(),
                shard.row_range(),
                shard.local_nnz(),
                local.shape()
            );
        }
        Ok(())
    });
    results.into_iter().collect::<matstore::Result<Vec<_>>>()?;

    println!("\nRun 'cargo run --example read_matrix' to read it back!");
    Ok(())
}

/// A banded pattern with a few dense rows
fn build_demo_matrix(nrows: usize, ncols: usize) -> CooMatrix {
    let mut matrix = CooMatrix::new(nrows, ncols);
    for row in 0..nrows {
        let dense_row = row % 500 == 0;
        for col in 0..ncols {
            if dense_row || (row % ncols).abs_diff(col) < 3 {
                let _ = matrix.push(row, col, row as f64 + col as f64 * 0.1);
            }
        }
    }
    matrix
}
