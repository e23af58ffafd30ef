#![no_main]

use libfuzzer_sys::fuzz_target;
use tightbeam::serdes::{Serdes, Tlv};
use tightbeam::{decode_frame, integrity, message, validate};

message! {
    pub struct FuzzMessage {
        id = 0x7172;
        fields = {
            1 => a: required scalar(i32),
            2 => b: optional scalar(f64),
            3 => name: optional text(12),
            4 => values: array(scalar(u16), 4),
            5 => nested: array(text(8), 2),
            6 => labels: map(scalar(u8) => text(6), 3),
        };
    }
}

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the decoder; errors are fine.
    let mut msg = FuzzMessage::default();
    let _ = decode_frame::<FuzzMessage, integrity::None, Tlv>(data, &mut msg);
    let _ = decode_frame::<FuzzMessage, integrity::Crc16, Tlv>(data, &mut msg);

    // The raw layout entry point must hold up on its own as well.
    let mut msg = FuzzMessage::default();
    if <Tlv as Serdes<FuzzMessage>>::decode(data, &mut msg).is_ok() {
        let _ = validate(&msg);
    }
});
