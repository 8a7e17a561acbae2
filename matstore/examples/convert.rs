//! Convert a matrix file between store formats
//!
//! ```text
//! cargo run --example convert --features cli -- input.mtx output.h5
//! cargo run --example convert --features cli -- data.txt data.mtx --ranks 4
//! ```

use clap::Parser;
use matstore::{
    convert, Communicator, Distribution, MatrixHandle, ReadOptions, Representation, Store,
    StoreConfig, StoreFormat, ThreadGroup,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about = "Convert matrices between MatrixMarket, container and text files")]
struct Cli {
    /// Source file
    input: PathBuf,

    /// Destination file
    output: PathBuf,

    /// Source format; inferred from the extension when omitted
    #[arg(long)]
    from: Option<StoreFormat>,

    /// Destination format; inferred from the extension when omitted
    #[arg(long)]
    to: Option<StoreFormat>,

    /// Number of ranks to run the conversion on
    #[arg(long, default_value_t = 1)]
    ranks: usize,

    /// JSON store configuration applied to both files
    #[arg(long)]
    config: Option<PathBuf>,
}

fn open(path: &Path, format: Option<StoreFormat>, config: &StoreConfig) -> matstore::Result<Store> {
    let store = match format {
        Some(format) => Store::new(path, format),
        None => Store::from_path(path)?,
    };
    Ok(store.with_config(config.clone()))
}

/// Representation a format reads natively
fn source_representation(format: StoreFormat) -> Representation {
    match format {
        StoreFormat::Mtx | StoreFormat::Libsvm => Representation::LocalSparse,
        StoreFormat::Hdf5 | StoreFormat::Txt => Representation::LocalDense,
    }
}

/// Representation to hand the destination writer
fn target_representation(format: StoreFormat, ranks: usize) -> Representation {
    match format {
        StoreFormat::Mtx | StoreFormat::Libsvm => Representation::LocalSparse,
        StoreFormat::Hdf5 if ranks > 1 => Representation::DistributedDense,
        StoreFormat::Hdf5 | StoreFormat::Txt => Representation::LocalDense,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => StoreConfig::from_json_file(path)?,
        None => StoreConfig::default(),
    };
    let source = open(&cli.input, cli.from, &config)?;
    let sink = open(&cli.output, cli.to, &config)?;
    let ranks = cli.ranks.max(1);

    let start = std::time::Instant::now();
    let shapes = ThreadGroup::run(ranks, |comm| -> matstore::Result<(usize, usize)> {
        let handle: MatrixHandle = source.read(
            &comm,
            source_representation(source.format()),
            &ReadOptions::default(),
        )?;
        let shape = handle.shape();
        let target = target_representation(sink.format(), comm.size());
        let converted = convert(&comm, handle, target, Distribution::RowBlock)?;
        sink.write(&comm, &converted)?;
        comm.barrier();
        Ok(shape)
    });
    let shapes = shapes.into_iter().collect::<matstore::Result<Vec<_>>>()?;

    if let Some((nrows, ncols)) = shapes.first() {
        println!(
            "Converted {nrows} x {ncols} matrix {} ({}) -> {} ({}) on {ranks} rank(s) in {:?}",
            cli.input.display(),
            source.format(),
            cli.output.display(),
            sink.format(),
            start.elapsed()
        );
    }
    Ok(())
}
