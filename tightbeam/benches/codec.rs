use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tightbeam::fields::Scalar;
use tightbeam::serdes::{Aligned4, Packed, Tlv};
use tightbeam::{decode, encode, frame_buffer, integrity, message};

message! {
    pub struct Telemetry {
        id = 0xBE7C;
        fields = {
            1 => sequence: required scalar(u32),
            2 => temperature: optional scalar(f32),
            3 => ticks: optional scalar(i64),
            4 => source: optional text(12),
            5 => readings: array(scalar(i16), 16),
        };
    }
}

fn sample() -> Telemetry {
    let mut msg = Telemetry::default();
    msg.sequence.set(0xDEAD_BEEF).unwrap();
    msg.temperature.set(36.6).unwrap();
    msg.ticks.set(-123_456_789).unwrap();
    msg.source.set("bench-unit").unwrap();
    for i in 0i16..16 {
        msg.readings.add(Scalar::new(i * 37)).unwrap();
    }
    msg
}

fn bench_encode(c: &mut Criterion) {
    let msg = sample();

    c.bench_function("encode/packed/crc16", |b| {
        let mut buffer = frame_buffer!(Telemetry, integrity::Crc16, Packed);
        b.iter(|| {
            encode(&mut buffer, black_box(&msg)).unwrap();
            black_box(buffer.used_bytes())
        });
    });

    c.bench_function("encode/aligned4/crc16", |b| {
        let mut buffer = frame_buffer!(Telemetry, integrity::Crc16, Aligned4);
        b.iter(|| {
            encode(&mut buffer, black_box(&msg)).unwrap();
            black_box(buffer.used_bytes())
        });
    });

    c.bench_function("encode/tlv/crc16", |b| {
        let mut buffer = frame_buffer!(Telemetry, integrity::Crc16, Tlv);
        b.iter(|| {
            encode(&mut buffer, black_box(&msg)).unwrap();
            black_box(buffer.used_bytes())
        });
    });
}

fn bench_decode(c: &mut Criterion) {
    let msg = sample();

    c.bench_function("decode/packed/crc16", |b| {
        let mut buffer = frame_buffer!(Telemetry, integrity::Crc16, Packed);
        encode(&mut buffer, &msg).unwrap();
        let mut out = Telemetry::default();
        b.iter(|| {
            decode(black_box(&buffer), &mut out).unwrap();
            black_box(out.sequence.get())
        });
    });

    c.bench_function("decode/tlv/crc16", |b| {
        let mut buffer = frame_buffer!(Telemetry, integrity::Crc16, Tlv);
        encode(&mut buffer, &msg).unwrap();
        let mut out = Telemetry::default();
        b.iter(|| {
            decode(black_box(&buffer), &mut out).unwrap();
            black_box(out.sequence.get())
        });
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
