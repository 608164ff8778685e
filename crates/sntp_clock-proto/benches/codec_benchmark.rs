// Benchmarks for SNTP datagram parsing, serialization and clock arithmetic.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use sntp_proto::protocol::{
    ConstPackedSizeBytes, Frame, FromBytes, LeapIndicator, Mode, ReferenceIdentifier, ShortFormat,
    Stratum, TimestampFormat, ToBytes, Version,
};
use sntp_proto::wall_time::{self, HostEpoch};

fn make_test_frame() -> Frame {
    Frame {
        leap_indicator: LeapIndicator::NoWarning,
        version: Version::V4,
        mode: Mode::Server,
        stratum: Stratum(2),
        poll: 6,
        precision: -20,
        root_delay: ShortFormat {
            seconds: 0,
            fraction: 256,
        },
        root_dispersion: ShortFormat {
            seconds: 0,
            fraction: 512,
        },
        reference_id: ReferenceIdentifier::Ipv4([193, 190, 230, 66]),
        reference_timestamp: TimestampFormat {
            seconds: 3_913_056_000,
            fraction: 0xABCD_1234,
        },
        origin_timestamp: TimestampFormat {
            seconds: 3_913_056_001,
            fraction: 0x1111_2222,
        },
        receive_timestamp: TimestampFormat {
            seconds: 3_913_056_002,
            fraction: 0x3333_4444,
        },
        transmit_timestamp: TimestampFormat {
            seconds: 3_913_056_003,
            fraction: 0x5555_6666,
        },
    }
}

fn bench_frame_from_bytes(c: &mut Criterion) {
    let frame = make_test_frame();
    let mut buf = [0u8; Frame::PACKED_SIZE_BYTES];
    frame.to_bytes(&mut buf).unwrap();

    c.bench_function("frame_from_bytes", |b| {
        b.iter(|| Frame::from_bytes(black_box(&buf)).unwrap())
    });
}

fn bench_frame_to_bytes(c: &mut Criterion) {
    let frame = make_test_frame();
    let mut buf = [0u8; Frame::PACKED_SIZE_BYTES];

    c.bench_function("frame_to_bytes", |b| {
        b.iter(|| black_box(&frame).to_bytes(&mut buf).unwrap())
    });
}

fn bench_timestamp_from_bytes(c: &mut Criterion) {
    let buf = [0xE9, 0x32, 0xB8, 0x00, 0xAB, 0xCD, 0x12, 0x34];

    c.bench_function("timestamp_from_bytes", |b| {
        b.iter(|| TimestampFormat::from_bytes(black_box(&buf)).unwrap())
    });
}

fn bench_timestamp_to_bytes(c: &mut Criterion) {
    let ts = TimestampFormat {
        seconds: 3_913_056_000,
        fraction: 0xABCD_1234,
    };
    let mut buf = [0u8; 8];

    c.bench_function("timestamp_to_bytes", |b| {
        b.iter(|| black_box(&ts).to_bytes(&mut buf).unwrap())
    });
}

fn bench_frame_roundtrip(c: &mut Criterion) {
    let frame = make_test_frame();
    let mut buf = [0u8; Frame::PACKED_SIZE_BYTES];

    c.bench_function("frame_roundtrip", |b| {
        b.iter(|| {
            frame.to_bytes(&mut buf).unwrap();
            Frame::from_bytes(black_box(&buf)).unwrap()
        })
    });
}

fn bench_ntp_to_calendar(c: &mut Criterion) {
    let ts = TimestampFormat {
        seconds: 3_913_056_000,
        fraction: 0x8000_0000,
    };

    c.bench_function("ntp_to_calendar", |b| {
        b.iter(|| wall_time::ntp_to_calendar(black_box(ts), HostEpoch::Unix))
    });
}

fn bench_offset_and_delay(c: &mut Criterion) {
    let t1 = 1000.0;
    let t2 = 1000.5;
    let t3 = 1000.6;
    let t4 = 1000.1;

    c.bench_function("offset_and_delay", |b| {
        b.iter(|| wall_time::offset_and_delay(black_box(t1), t2, t3, t4))
    });
}

criterion_group!(
    benches,
    bench_frame_from_bytes,
    bench_frame_to_bytes,
    bench_timestamp_from_bytes,
    bench_timestamp_to_bytes,
    bench_frame_roundtrip,
    bench_ntp_to_calendar,
    bench_offset_and_delay,
);
criterion_main!(benches);
