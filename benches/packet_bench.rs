use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use comms_protocol::core::packet::Packet;

#[allow(clippy::unwrap_used)]
fn bench_packet_encode_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet_encode_decode");
    let payload_sizes = [64usize, 512, 4096, 65536, 1024 * 1024];

    for &size in &payload_sizes {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("encode_{size}b"), |b| {
            b.iter_batched(
                || vec![0u8; size],
                |payload| {
                    let _ = Packet::new(payload).to_bytes();
                },
                BatchSize::SmallInput,
            )
        });

        let frame = Packet::new(vec![0u8; size]).to_bytes();
        group.bench_function(format!("decode_{size}b"), |b| {
            b.iter(|| {
                let decoded = Packet::from_bytes(&frame);
                assert!(decoded.is_ok());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_packet_encode_decode);
criterion_main!(benches);
