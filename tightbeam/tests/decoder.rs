//! Multi-message decoder dispatch.

use tightbeam::serdes::Packed;
use tightbeam::{decoder, encode, frame_buffer, header, integrity, message, Error, ErrorKind};

message! {
    pub struct MessageA {
        id = 0x0001;
        fields = {
            1 => value: required scalar(i32),
        };
    }
}

message! {
    pub struct MessageB {
        id = 0x0002;
        fields = {
            1 => value: required scalar(i16),
        };
    }
}

message! {
    pub struct MessageC {
        id = 0x0003;
        fields = {
            1 => value: optional scalar(i32),
        };
    }
}

decoder! {
    pub enum TestFrame {
        A(MessageA),
        B(MessageB),
        C(MessageC),
    }
}

#[test]
fn test_buffer_too_small() {
    let err = TestFrame::decode::<integrity::None, Packed>(&[0u8; 2]).unwrap_err();
    assert_eq!(err, Error::deserialization("buffer too small for header"));
}

#[test]
fn test_unknown_message_id() {
    let mut frame = [0u8; header::HEADER_SIZE + 10];
    frame[0] = header::VERSION;
    frame[1] = 1; // Packed format byte.
    frame[2..6].copy_from_slice(&0x0999i32.to_le_bytes());

    let err = TestFrame::decode::<integrity::None, Packed>(&frame).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidMessageId);
}

#[test]
fn test_decodes_message_a() {
    let mut src = MessageA::default();
    src.value.set(42).unwrap();

    let mut buffer = frame_buffer!(MessageA, integrity::None, Packed);
    encode(&mut buffer, &src).unwrap();

    match TestFrame::decode::<integrity::None, Packed>(buffer.frame()).unwrap() {
        TestFrame::A(msg) => assert_eq!(msg.value.get(), Some(42)),
        other => panic!("wrong branch: {other:?}"),
    }
}

#[test]
fn test_decodes_message_b() {
    let mut src = MessageB::default();
    src.value.set(123).unwrap();

    let mut buffer = frame_buffer!(MessageB, integrity::None, Packed);
    encode(&mut buffer, &src).unwrap();

    match TestFrame::decode::<integrity::None, Packed>(buffer.frame()).unwrap() {
        TestFrame::B(msg) => assert_eq!(msg.value.get(), Some(123)),
        other => panic!("wrong branch: {other:?}"),
    }
}

#[test]
fn test_selects_branch_by_id() {
    let mut a = MessageA::default();
    a.value.set(100).unwrap();
    let mut buffer_a = frame_buffer!(MessageA, integrity::None, Packed);
    encode(&mut buffer_a, &a).unwrap();

    let mut c = MessageC::default();
    c.value.set(200).unwrap();
    let mut buffer_c = frame_buffer!(MessageC, integrity::None, Packed);
    encode(&mut buffer_c, &c).unwrap();

    let decoded_a = TestFrame::decode::<integrity::None, Packed>(buffer_a.frame()).unwrap();
    assert!(matches!(decoded_a, TestFrame::A(_)));

    let decoded_c = TestFrame::decode::<integrity::None, Packed>(buffer_c.frame()).unwrap();
    assert!(matches!(decoded_c, TestFrame::C(_)));
}

#[test]
fn test_decode_runs_full_pipeline() {
    // The matched branch still goes through integrity and validation.
    let mut a = MessageA::default();
    a.value.set(7).unwrap();
    let mut buffer = frame_buffer!(MessageA, integrity::Crc16, Packed);
    encode(&mut buffer, &a).unwrap();

    let mut tampered = buffer.frame().to_vec();
    tampered[8] ^= 0x01;
    let err = TestFrame::decode::<integrity::Crc16, Packed>(&tampered).unwrap_err();
    assert_eq!(err, Error::integrity());

    let ok = TestFrame::decode::<integrity::Crc16, Packed>(buffer.frame()).unwrap();
    assert_eq!(ok, TestFrame::A(a));
}
