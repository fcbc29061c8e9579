use std::fs::File;

use clap::Parser;
use linecsv::{ByteSource, IgnoreColumns, Reader, ReaderBuilder};
use memmap2::Mmap;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Path to target CSV file
    path: String,

    /// Name of the column to sum
    column: String,

    /// Whether to memory map the file instead of streaming it
    #[arg(long)]
    mmap: bool,

    /// Whether columns can be quoted
    #[arg(short, long)]
    quoted: bool,

    /// Whether to stop on the first invalid row instead of skipping it
    #[arg(long)]
    strict: bool,
}

fn sum<S: ByteSource>(reader: &mut Reader<S, 1>, args: &Args) -> anyhow::Result<(f64, u64)> {
    reader.read_header(IgnoreColumns::EXTRA, [args.column.as_str()])?;

    let mut row = [0.0f64];
    let mut total = 0.0;
    let mut skipped: u64 = 0;

    loop {
        match reader.read_row(&mut row) {
            Ok(true) => total += row[0],
            Ok(false) => break,
            Err(err) if !args.strict && !err.is_fatal() => {
                warn!(line = ?err.line(), "{}", err);
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok((total, skipped))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = ReaderBuilder::new();
    builder.file_name(&args.path);

    if args.path.ends_with(".tsv") {
        builder.delimiter(b'\t');
    }

    if args.quoted {
        builder.quote(b'"');
    }

    let (total, skipped) = if args.mmap {
        let file = File::open(&args.path)?;
        let map = unsafe { Mmap::map(&file)? };

        sum(&mut builder.from_slice(&map), &args)?
    } else {
        sum(&mut builder.from_path(&args.path)?, &args)?
    };

    if skipped > 0 {
        warn!(skipped, "some rows were invalid");
    }

    println!("{}", total);

    Ok(())
}
