//! End-to-end encode/decode across wire formats and integrity policies.

use tightbeam::serdes::{Aligned4, Packed, Serdes, Tlv};
use tightbeam::validators::Positive;
use tightbeam::{
    decode, decode_frame, encode, frame_buffer, integrity, message, Error, ErrorKind,
};

message! {
    pub struct MyMessage {
        id = 0x12345678;
        fields = {
            1 => f1: required scalar(i32, Positive),
            2 => f2: optional scalar(i16),
        };
    }
}

message! {
    pub struct OtherMessage {
        id = 0x77654321;
        fields = {
            1 => f1: optional scalar(i32),
        };
    }
}

macro_rules! round_trip_case {
    ($msg:expr, $m:ty, $i:ty, $s:ty) => {{
        let mut buffer = frame_buffer!($m, $i, $s);
        encode(&mut buffer, &$msg).unwrap();

        let mut out = <$m>::default();
        decode(&buffer, &mut out).unwrap();
        assert_eq!($msg, out);
        out
    }};
}

#[test]
fn test_round_trip_packed_crc16() {
    let mut msg = MyMessage::default();
    msg.f1.set(42).unwrap();
    msg.f2.set(-15).unwrap();

    let out = round_trip_case!(msg, MyMessage, integrity::Crc16, Packed);
    assert_eq!(out.f1.get(), Some(42));
    assert_eq!(out.f2.get(), Some(-15));
}

#[test]
fn test_round_trip_tlv_crc16() {
    let mut msg = MyMessage::default();
    msg.f1.set(42).unwrap();
    msg.f2.set(-15).unwrap();

    let out = round_trip_case!(msg, MyMessage, integrity::Crc16, Tlv);
    assert_eq!(out.f1.get(), Some(42));
    assert_eq!(out.f2.get(), Some(-15));
}

#[test]
fn test_round_trip_unset_optional() {
    let mut msg = MyMessage::default();
    msg.f1.set(123).unwrap();

    let out = round_trip_case!(msg, MyMessage, integrity::Crc16, Packed);
    assert_eq!(out.f2.get(), None);

    let out = round_trip_case!(msg, MyMessage, integrity::Crc16, Tlv);
    assert_eq!(out.f2.get(), None);
}

#[test]
fn test_aligned4_layout_bytes() {
    let mut msg = MyMessage::default();
    msg.f1.set(0x11223344).unwrap();
    msg.f2.set(0x5566).unwrap();

    let mut buffer = frame_buffer!(MyMessage, integrity::None, Aligned4);
    encode(&mut buffer, &msg).unwrap();

    // Header padding at 6..8, f1 flag at 8 with value padding at 9..12,
    // value at 12..16, f2 flag at 16 with padding at 17, value at 18..20.
    assert_eq!(buffer.capacity(), 20);
    assert_eq!(buffer.used_bytes(), 20);
    let bytes = buffer.as_slice();
    assert_eq!(bytes[6], 0);
    assert_eq!(bytes[9], 0);
    assert_eq!(bytes[17], 0);
    assert_eq!(bytes[8], 1);
    assert_eq!(&bytes[12..16], &[0x44, 0x33, 0x22, 0x11]);
    assert_eq!(bytes[16], 1);
    assert_eq!(&bytes[18..20], &[0x66, 0x55]);
}

#[test]
fn test_static_frame_size_is_exact() {
    // An unset optional field consumes its zero-filled slot, so the frame
    // length never depends on the value.
    let mut set_both = MyMessage::default();
    set_both.f1.set(1).unwrap();
    set_both.f2.set(2).unwrap();

    let mut set_one = MyMessage::default();
    set_one.f1.set(1).unwrap();

    for msg in [&set_both, &set_one] {
        let mut packed = frame_buffer!(MyMessage, integrity::None, Packed);
        encode(&mut packed, msg).unwrap();
        assert_eq!(packed.used_bytes(), MyMessage::static_frame_size(1));

        let mut aligned = frame_buffer!(MyMessage, integrity::None, Aligned4);
        encode(&mut aligned, msg).unwrap();
        assert_eq!(aligned.used_bytes(), MyMessage::static_frame_size(4));
    }
}

#[test]
fn test_tlv_frame_size_is_upper_bound() {
    let mut msg = MyMessage::default();
    msg.f1.set(i32::MAX).unwrap();
    msg.f2.set(i16::MIN).unwrap();

    let mut buffer = frame_buffer!(MyMessage, integrity::None, Tlv);
    encode(&mut buffer, &msg).unwrap();
    assert!(buffer.used_bytes() <= MyMessage::tlv_frame_size());
}

#[test]
fn test_format_mismatch() {
    let mut msg = MyMessage::default();
    msg.f1.set(1).unwrap();

    let mut packed = frame_buffer!(MyMessage, integrity::None, Packed);
    encode(&mut packed, &msg).unwrap();

    // Feed the packed frame to an Aligned4 decoder.
    let mut out = MyMessage::default();
    let err = decode_frame::<MyMessage, integrity::None, Aligned4>(packed.frame(), &mut out)
        .unwrap_err();
    assert_eq!(err, Error::invalid_format());
}

#[test]
fn test_message_id_mismatch() {
    let mut msg = MyMessage::default();
    msg.f1.set(1).unwrap();

    let mut packed = frame_buffer!(MyMessage, integrity::None, Packed);
    encode(&mut packed, &msg).unwrap();

    let mut out = OtherMessage::default();
    let err =
        decode_frame::<OtherMessage, integrity::None, Packed>(packed.frame(), &mut out)
            .unwrap_err();
    assert_eq!(err, Error::invalid_message_id());
}

#[test]
fn test_version_mismatch() {
    let mut msg = MyMessage::default();
    msg.f1.set(42).unwrap();

    let mut buffer = frame_buffer!(MyMessage, integrity::None, Packed);
    encode(&mut buffer, &msg).unwrap();

    // Corrupt the version byte.
    buffer.as_mut_slice()[0] = 0xFF;

    let mut out = MyMessage::default();
    let err = decode(&buffer, &mut out).unwrap_err();
    assert_eq!(err.message, "unsupported protocol version");
    assert_eq!(err.kind, ErrorKind::Deserialization);
}

#[test]
fn test_crc16_detects_every_single_bit_flip() {
    let mut msg = MyMessage::default();
    msg.f1.set(10).unwrap();

    let mut buffer = frame_buffer!(MyMessage, integrity::Crc16, Packed);
    encode(&mut buffer, &msg).unwrap();

    let used = buffer.used_bytes();
    for byte in 0..used {
        for bit in 0..8 {
            buffer.as_mut_slice()[byte] ^= 1 << bit;

            let mut out = MyMessage::default();
            let err = decode(&buffer, &mut out).unwrap_err();
            assert_eq!(err, Error::integrity(), "flip at byte {byte} bit {bit}");

            buffer.as_mut_slice()[byte] ^= 1 << bit;
        }
    }

    // Restored frame still decodes.
    let mut out = MyMessage::default();
    decode(&buffer, &mut out).unwrap();
    assert_eq!(out, msg);
}

#[test]
fn test_parity_detects_every_single_bit_flip() {
    let mut msg = MyMessage::default();
    msg.f1.set(10).unwrap();

    let mut buffer = frame_buffer!(MyMessage, integrity::Parity, Tlv);
    encode(&mut buffer, &msg).unwrap();

    let used = buffer.used_bytes();
    for byte in 0..used {
        for bit in 0..8 {
            buffer.as_mut_slice()[byte] ^= 1 << bit;

            let mut out = MyMessage::default();
            let err = decode(&buffer, &mut out).unwrap_err();
            assert_eq!(err, Error::integrity(), "flip at byte {byte} bit {bit}");

            buffer.as_mut_slice()[byte] ^= 1 << bit;
        }
    }
}

#[test]
fn test_tampered_payload_fails_integrity() {
    let mut msg = MyMessage::default();
    msg.f1.set(10).unwrap();

    let mut buffer = frame_buffer!(MyMessage, integrity::Crc16, Tlv);
    encode(&mut buffer, &msg).unwrap();

    let used = buffer.used_bytes();
    buffer.as_mut_slice()[used - 3] = 0xFF;

    let mut out = MyMessage::default();
    assert_eq!(decode(&buffer, &mut out).unwrap_err(), Error::integrity());
}

#[test]
fn test_encode_unchecked_skips_validation() {
    let mut msg = MyMessage::default();
    // f1 required but unset: encode refuses, encode_unchecked does not.
    msg.f2.set(1).unwrap();

    let mut buffer = frame_buffer!(MyMessage, integrity::Crc16, Packed);
    assert_eq!(
        encode(&mut buffer, &msg).unwrap_err(),
        Error::validation(1, "field is required but not set")
    );

    tightbeam::encode_unchecked(&mut buffer, &msg);
    assert_eq!(buffer.used_bytes(), MyMessage::static_frame_size(1) + 2);

    // The frame is well-formed; decoding fails only at the validation gate.
    let mut out = MyMessage::default();
    let err = decode(&buffer, &mut out).unwrap_err();
    assert_eq!(err, Error::validation(1, "field is required but not set"));
}

#[test]
fn test_truncated_static_frame() {
    let mut msg = MyMessage::default();
    msg.f1.set(5).unwrap();

    let mut buffer = frame_buffer!(MyMessage, integrity::None, Packed);
    encode(&mut buffer, &msg).unwrap();

    let mut out = MyMessage::default();
    let err = <Packed as Serdes<MyMessage>>::decode(&buffer.frame()[..8], &mut out).unwrap_err();
    assert_eq!(
        err,
        Error::deserialization("buffer too small for static layout")
    );
}
