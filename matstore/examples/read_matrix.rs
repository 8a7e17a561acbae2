//! Read a MatrixMarket file on a single rank and print a summary

use matstore::{Matrix, ReadOptions, Representation, SelfComm, Store};
use std::time::Instant;

fn main() -> matstore::Result<()> {
    let filename = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "example_matrix.mtx".to_string());

    if !std::path::Path::new(&filename).exists() {
        println!("File '{filename}' not found!");
        println!("   Run 'cargo run --example write_matrix' first");
        return Ok(());
    }

    println!("Reading sparse matrix from '{filename}'...");
    let store = Store::from_path(&filename)?;
    let start = Instant::now();
    let handle = store.read(&SelfComm, Representation::LocalSparse, &ReadOptions::default())?;
    let load_time = start.elapsed();
    println!("Parsed in {:.3}ms", load_time.as_secs_f64() * 1000.0);

    let Some(matrix) = handle.as_local_sparse() else {
        return Ok(());
    };
    let (nrows, ncols) = matrix.dimensions();
    let nnz = matrix.nnz();
    println!("\nMatrix Information:");
    println!("   Dimensions: {nrows} x {ncols}");
    println!("   Non-zeros: {nnz}");
    println!(
        "   Sparsity: {:.6}%",
        (nnz as f64 / (nrows * ncols).max(1) as f64) * 100.0
    );

    println!("\nSample entries:");
    for (row, col) in [(0, 0), (1, 1), (500, 3), (nrows / 2, ncols / 2)] {
        match matrix.get_element(row, col) {
            Some(value) => println!("   matrix[{row}, {col}] = {value}"),
            None => println!("   matrix[{row}, {col}] = 0 (not stored)"),
        }
    }
    Ok(())
}
