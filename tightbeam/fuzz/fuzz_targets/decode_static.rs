#![no_main]

use libfuzzer_sys::fuzz_target;
use tightbeam::serdes::{Aligned4, Aligned8, Packed};
use tightbeam::{decode_frame, integrity, message};

message! {
    pub struct FuzzMessage {
        id = 0xF0C5;
        fields = {
            1 => a: required scalar(i32),
            2 => b: optional scalar(i64),
            3 => name: optional text(12),
            4 => values: array(scalar(u16), 4),
            5 => labels: map(scalar(u8) => text(6), 3),
        };
    }
}

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the decoder; errors are fine.
    let mut msg = FuzzMessage::default();
    let _ = decode_frame::<FuzzMessage, integrity::None, Packed>(data, &mut msg);
    let _ = decode_frame::<FuzzMessage, integrity::Crc16, Packed>(data, &mut msg);
    let _ = decode_frame::<FuzzMessage, integrity::None, Aligned4>(data, &mut msg);
    let _ = decode_frame::<FuzzMessage, integrity::Parity, Aligned8>(data, &mut msg);
});
