/// Benchmarks for gateway frame handling: the parse + classify path every inbound text frame
/// takes before it reaches the event handler.
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use listen_moe_client::ws::decode;
use listen_moe_client::ws::types::InboundFrame;

const TRACK_UPDATE: &str = r#"{
    "op": 1,
    "t": "TRACK_UPDATE",
    "d": {
        "song": {
            "id": 1234,
            "title": "Lost in Paradise",
            "artists": [
                {"id": 3, "name": "ALI", "nameRomaji": null, "image": "ali.png"},
                {"id": 4, "name": "AKLO", "nameRomaji": null, "image": null}
            ],
            "albums": [{"id": 5, "name": "LOST IN PARADISE", "nameRomaji": null, "image": null}],
            "sources": [{"id": 6, "name": "呪術廻戦", "nameRomaji": "Jujutsu Kaisen", "image": null}],
            "duration": 230
        },
        "requester": null,
        "listeners": 812
    }
}"#;

const HELLO: &str = r#"{"op":0,"d":{"heartbeat":45000}}"#;

const ACK: &str = r#"{"op":10}"#;

const QUEUE_UPDATE: &str = r#"{"op":1,"t":"QUEUE_UPDATE","d":{"amount":3,"inQueueBeforeUser":false}}"#;

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("gateway/decode");

    for (name, frame) in [
        ("TRACK_UPDATE", TRACK_UPDATE),
        ("QUEUE_UPDATE", QUEUE_UPDATE),
    ] {
        group.throughput(Throughput::Bytes(frame.len() as u64));
        group.bench_with_input(BenchmarkId::new("event", name), frame, |b, frame| {
            b.iter(|| {
                let frame = InboundFrame::parse(std::hint::black_box(frame.as_bytes()))
                    .expect("Frame should parse");
                frame.into_event().expect("Frame should decode")
            });
        });
    }

    group.bench_function("decode(Value)", |b| {
        let raw: serde_json::Value =
            serde_json::from_str(TRACK_UPDATE).expect("Frame should parse");
        b.iter(|| decode(std::hint::black_box(raw.clone())).expect("Frame should decode"));
    });

    group.finish();
}

fn bench_control_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("gateway/control");

    group.bench_function("hello", |b| {
        b.iter(|| {
            InboundFrame::parse(std::hint::black_box(HELLO.as_bytes()))
                .expect("Frame should parse")
                .heartbeat_interval()
                .expect("Hello should carry an interval")
        });
    });

    group.bench_function("ack", |b| {
        b.iter(|| {
            InboundFrame::parse(std::hint::black_box(ACK.as_bytes()))
                .expect("Frame should parse")
                .op_code()
        });
    });

    group.finish();
}

criterion_group!(gateway_benches, bench_decode, bench_control_frames);
criterion_main!(gateway_benches);
