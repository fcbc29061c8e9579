#![no_main]

use libfuzzer_sys::fuzz_target;

use linecsv::{LineReader, SliceSource};

fuzz_target!(|data: &[u8]| {
    let mut reader = LineReader::with_block_len(16, SliceSource::new(data));

    while let Ok(Some(line)) = reader.next_line() {
        assert!(line.len() < 16);
        assert!(!line.contains(&b'\n'));
    }
});
