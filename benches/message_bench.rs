use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use comms_protocol::protocol::message::Message;

#[allow(clippy::unwrap_used)]
fn bench_message_wrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_wrap");
    let messages = vec![
        Message::bare("PING"),
        Message::bare("PONG"),
        Message::new("ECHO", b"hello world".to_vec()),
        Message::new("ECHO", vec![b'a'; 1024]),
    ];

    group.bench_function("serialize", |b| {
        b.iter_batched(
            || messages.clone(),
            |msgs| {
                for m in msgs {
                    let _ = m.to_bytes();
                }
            },
            BatchSize::SmallInput,
        )
    });

    let blob = Message::new("ECHO", vec![b'a'; 1024]).to_bytes();
    group.bench_function("deserialize", |b| {
        b.iter(|| {
            let _ = Message::from_bytes(&blob).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_message_wrap);
criterion_main!(benches);
