#![no_main]

use libfuzzer_sys::fuzz_target;

use linecsv::{IgnoreColumns, Reader, ReaderBuilder};

fuzz_target!(|data: &[u8]| {
    let mut reader: Reader<_, 3> = ReaderBuilder::new()
        .quote(b'"')
        .block_len(64)
        .from_slice(data);

    if reader
        .read_header(IgnoreColumns::EXTRA | IgnoreColumns::MISSING, ["a", "b", "c"])
        .is_err()
    {
        reader.set_header(["a", "b", "c"]);
    }

    let mut row = (0i64, 0.0f64, String::new());

    loop {
        match reader.read_row(&mut row) {
            Ok(true) => (),
            Ok(false) => break,
            Err(err) if err.is_fatal() => break,
            Err(_) => (),
        }
    }
});
