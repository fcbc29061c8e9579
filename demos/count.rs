use std::fs::File;

use clap::Parser;
use linecsv::{LineReader, ReadSource, DEFAULT_BLOCK_LEN};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Path to target CSV file
    path: String,

    /// Whether to count records using the csv crate instead, for comparison
    #[arg(long)]
    csv: bool,

    /// Size of the blocks read from the file
    #[arg(long, default_value_t = DEFAULT_BLOCK_LEN)]
    block_len: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let delimiter = if args.path.ends_with(".tsv") {
        b'\t'
    } else {
        b','
    };

    let mut count: u64 = 0;

    if args.csv {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .from_path(&args.path)?;

        let mut record = csv::ByteRecord::new();

        while reader.read_byte_record(&mut record)? {
            count += 1;
        }
    } else {
        let file = File::open(&args.path)?;
        let mut reader = LineReader::with_block_len(args.block_len, ReadSource::new(file));
        reader.set_file_name(&args.path);

        while reader.next_line()?.is_some() {
            count += 1;
        }
    }

    println!("{}", count);

    Ok(())
}
