//! Benchmarks for the token codec hot paths

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vigil_auth_core::{token_fingerprint, KeyCodec, SigningSecret};
use vigil_types::{Key, KeyType};

fn codec() -> KeyCodec {
    KeyCodec::new(&SigningSecret::new("a".repeat(32)).unwrap(), "vigil.auth")
}

fn bench_encode(c: &mut Criterion) {
    let codec = codec();
    let now = Utc::now();

    let mut group = c.benchmark_group("codec_encode");

    for kt in KeyType::ALL {
        let key = Key::new(kt, "user-1", now)
            .with_issuer("admin-1")
            .with_id("0b6c2f2e-2d6e-4f7e-9d38-1b7b5c3f8a11")
            .valid_for(Duration::hours(1));

        group.bench_with_input(BenchmarkId::from_parameter(kt), &key, |b, key| {
            b.iter(|| codec.encode(black_box(key)));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let codec = codec();
    let key = Key::new(KeyType::Api, "user-1", Utc::now())
        .with_issuer("admin-1")
        .with_id("0b6c2f2e-2d6e-4f7e-9d38-1b7b5c3f8a11")
        .valid_for(Duration::hours(1));
    let token = codec.encode(&key).unwrap();

    let mut group = c.benchmark_group("codec_decode");

    group.bench_function("valid", |b| {
        b.iter(|| codec.decode(black_box(&token)));
    });

    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });
    group.bench_function("bad_signature", |b| {
        b.iter(|| codec.decode(black_box(&tampered)));
    });

    group.bench_function("garbage", |b| {
        b.iter(|| codec.decode(black_box("not.a.token")));
    });

    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let token = codec()
        .encode(&Key::new(KeyType::Access, "user-1", Utc::now()))
        .unwrap();

    c.bench_function("token_fingerprint", |b| {
        b.iter(|| token_fingerprint(black_box(&token)));
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_fingerprint);
criterion_main!(benches);
