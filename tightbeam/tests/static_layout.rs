//! Byte-exact static-layout coverage: alignment padding, slot shapes,
//! zero-filled unset fields, and hostile length prefixes.

use tightbeam::fields::Scalar;
use tightbeam::serdes::{Aligned8, Packed, Serdes};
use tightbeam::{decode, decode_frame, encode, frame_buffer, integrity, message, Error};

message! {
    pub struct Wide {
        id = 0x0101;
        fields = {
            1 => a: required scalar(u8),
            2 => b: required scalar(u64),
            3 => c: optional scalar(u16),
        };
    }
}

#[test]
fn test_aligned8_slot_offsets() {
    let mut msg = Wide::default();
    msg.a.set(0xAA).unwrap();
    msg.b.set(0x1122_3344_5566_7788).unwrap();
    msg.c.set(0x0102).unwrap();

    // Payload starts at 8. a: flag at 8, value at 9. b: flag at 10, padded
    // to 16, value at 16..24. c: flag at 24, padded to 26, value at 26..28.
    assert_eq!(Wide::static_frame_size(8), 28);

    let mut buffer = frame_buffer!(Wide, integrity::None, Aligned8);
    encode(&mut buffer, &msg).unwrap();
    assert_eq!(buffer.used_bytes(), 28);

    let bytes = buffer.as_slice();
    assert_eq!(&bytes[6..8], &[0, 0]);
    assert_eq!(bytes[8], 1);
    assert_eq!(bytes[9], 0xAA);
    assert_eq!(bytes[10], 1);
    assert_eq!(&bytes[11..16], &[0; 5]);
    assert_eq!(
        &bytes[16..24],
        &[0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]
    );
    assert_eq!(bytes[24], 1);
    assert_eq!(bytes[25], 0);
    assert_eq!(&bytes[26..28], &[0x02, 0x01]);
}

#[test]
fn test_packed_has_no_padding() {
    // 6-byte header, then flag+1, flag+8, flag+2.
    assert_eq!(Wide::static_frame_size(1), 20);

    let mut msg = Wide::default();
    msg.a.set(1).unwrap();
    msg.b.set(2).unwrap();

    let mut buffer = frame_buffer!(Wide, integrity::None, Packed);
    encode(&mut buffer, &msg).unwrap();
    assert_eq!(buffer.used_bytes(), 20);

    // The unset optional field zero-fills flag and slot.
    assert_eq!(&buffer.as_slice()[17..20], &[0, 0, 0]);
}

message! {
    pub struct Inner2 {
        id = 0x0202;
        fields = {
            1 => v: required scalar(u32),
        };
    }
}

message! {
    pub struct Holder {
        id = 0x0303;
        fields = {
            1 => inner: optional message(Inner2),
            2 => tail: required scalar(u8),
        };
    }
}

#[test]
fn test_submessage_slot_layout() {
    let mut inner = Inner2::default();
    inner.v.set(0xDEAD_BEEF).unwrap();

    let mut msg = Holder::default();
    msg.inner.set(inner).unwrap();
    msg.tail.set(7).unwrap();

    // Packed: flag at 6, inner message id at 7..11, inner flag at 11,
    // inner value at 12..16, tail flag at 16, tail value at 17.
    assert_eq!(Holder::static_frame_size(1), 18);

    let mut buffer = frame_buffer!(Holder, integrity::None, Packed);
    encode(&mut buffer, &msg).unwrap();

    let bytes = buffer.as_slice();
    assert_eq!(bytes[6], 1);
    assert_eq!(&bytes[7..11], &0x0202i32.to_le_bytes());
    assert_eq!(bytes[11], 1);
    assert_eq!(&bytes[12..16], &[0xEF, 0xBE, 0xAD, 0xDE]);
    assert_eq!(bytes[16], 1);
    assert_eq!(bytes[17], 7);
}

#[test]
fn test_unset_submessage_slot_is_zero_filled() {
    let mut msg = Holder::default();
    msg.tail.set(9).unwrap();

    let mut buffer = frame_buffer!(Holder, integrity::None, Packed);
    encode(&mut buffer, &msg).unwrap();

    // Flag plus the whole submessage slot (id included) read as zero.
    let bytes = buffer.as_slice();
    assert!(bytes[6..16].iter().all(|&b| b == 0));

    // And the decoder skips the slot without inspecting the zeroed id.
    let mut out = Holder::default();
    decode(&buffer, &mut out).unwrap();
    assert!(out.inner.get().is_none());
    assert_eq!(out.tail.get(), Some(9));
}

message! {
    pub struct Table {
        id = 0x0404;
        fields = {
            1 => pairs: map(scalar(u8) => scalar(u16), 2),
        };
    }
}

#[test]
fn test_map_slot_layout() {
    let mut msg = Table::default();
    msg.pairs.insert(Scalar::new(7), Scalar::new(0x0102)).unwrap();

    // Packed: length at 6..10, then two key/value slot pairs of 3 bytes.
    assert_eq!(Table::static_frame_size(1), 16);

    let mut buffer = frame_buffer!(Table, integrity::None, Packed);
    encode(&mut buffer, &msg).unwrap();

    let bytes = buffer.as_slice();
    assert_eq!(&bytes[6..10], &[1, 0, 0, 0]);
    assert_eq!(bytes[10], 7);
    assert_eq!(&bytes[11..13], &[0x02, 0x01]);
    // Unused second pair is zero-filled.
    assert_eq!(&bytes[13..16], &[0, 0, 0]);

    let mut out = Table::default();
    decode(&buffer, &mut out).unwrap();
    assert_eq!(out.pairs.at(&Scalar::new(7)), Some(&Scalar::new(0x0102)));
}

#[test]
fn test_hostile_map_length_prefix() {
    let mut msg = Table::default();
    msg.pairs.insert(Scalar::new(1), Scalar::new(2)).unwrap();

    let mut buffer = frame_buffer!(Table, integrity::None, Packed);
    encode(&mut buffer, &msg).unwrap();

    // Claim three pairs in a capacity-2 map.
    buffer.as_mut_slice()[6] = 3;

    let mut out = Table::default();
    assert_eq!(
        decode(&buffer, &mut out).unwrap_err(),
        Error::capacity_exceeded(1, "map capacity exceeded")
    );
}

message! {
    pub struct Samples {
        id = 0x0505;
        fields = {
            1 => values: array(scalar(u16), 4),
        };
    }
}

#[test]
fn test_hostile_array_length_prefix() {
    let mut msg = Samples::default();
    msg.values.add(Scalar::new(1)).unwrap();

    let mut buffer = frame_buffer!(Samples, integrity::None, Packed);
    encode(&mut buffer, &msg).unwrap();

    buffer.as_mut_slice()[6] = 5;

    let mut out = Samples::default();
    assert_eq!(
        decode(&buffer, &mut out).unwrap_err(),
        Error::capacity_exceeded(1, "array capacity exceeded")
    );
}

#[test]
fn test_array_round_trip_preserves_length_only() {
    // Residual bytes in unused slots never leak into the decoded value.
    let mut msg = Samples::default();
    msg.values.add(Scalar::new(0xFFFF)).unwrap();
    msg.values.add(Scalar::new(0x1234)).unwrap();

    let mut buffer = frame_buffer!(Samples, integrity::None, Packed);
    encode(&mut buffer, &msg).unwrap();

    let mut shorter = Samples::default();
    shorter.values.add(Scalar::new(0xAAAA)).unwrap();
    let mut second = frame_buffer!(Samples, integrity::None, Packed);
    encode(&mut second, &shorter).unwrap();

    let mut out = Samples::default();
    decode(&second, &mut out).unwrap();
    assert_eq!(out, shorter);
    assert_eq!(out.values.len(), 1);
}

#[test]
fn test_decode_ignores_trailing_slack() {
    // A frame longer than the fixed layout still decodes; the layout reads
    // exactly its fixed extent.
    let mut msg = Samples::default();
    msg.values.add(Scalar::new(3)).unwrap();

    let mut buffer = frame_buffer!(Samples, integrity::None, Packed);
    encode(&mut buffer, &msg).unwrap();

    let mut frame = buffer.frame().to_vec();
    frame.extend_from_slice(&[0xAB, 0xCD]);

    let mut out = Samples::default();
    decode_frame::<Samples, integrity::None, Packed>(&frame, &mut out).unwrap();
    assert_eq!(out, msg);
}

#[test]
fn test_aligned8_round_trip() {
    let mut msg = Wide::default();
    msg.a.set(255).unwrap();
    msg.b.set(u64::MAX).unwrap();

    let mut buffer = frame_buffer!(Wide, integrity::Crc16, Aligned8);
    encode(&mut buffer, &msg).unwrap();
    assert_eq!(buffer.used_bytes(), Wide::static_frame_size(8) + 2);

    let mut out = Wide::default();
    decode(&buffer, &mut out).unwrap();
    assert_eq!(msg, out);
}

#[test]
fn test_layout_decode_via_serdes_entry_point() {
    // The layout alone (no framing pipeline) also refuses short input.
    let mut out = Wide::default();
    let err = <Aligned8 as Serdes<Wide>>::decode(&[0u8; 10], &mut out).unwrap_err();
    assert_eq!(
        err,
        Error::deserialization("buffer too small for static layout")
    );
}
