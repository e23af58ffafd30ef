#![no_main]

use libfuzzer_sys::fuzz_target;
use tightbeam::varint;

fuzz_target!(|data: &[u8]| {
    if let Some((value, consumed)) = varint::read_at(data, 0) {
        assert!(consumed <= varint::MAX_LEN);
        assert!(consumed <= data.len());

        // Re-encoding must produce a round-trippable prefix of the same
        // size or smaller (the decoder accepts non-canonical encodings).
        let mut out = Vec::new();
        let written = varint::write(value, &mut out);
        assert_eq!(written, varint::size(value));
        assert!(written <= consumed);
        assert_eq!(varint::read_at(&out, 0), Some((value, written)));
    }
});
