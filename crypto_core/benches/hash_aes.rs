use criterion::{criterion_group, criterion_main, Criterion};
use crypto_core::{Block, AES_HASH};
use std::time::Duration;

fn bench_tccr_hash(c: &mut Criterion) {
    c.bench_function("AesHash::tccr_hash", |b| {
        let x = rand::random::<Block>();
        let i = rand::random::<Block>();
        b.iter(|| {
            let z = AES_HASH.tccr_hash(i, x);
            criterion::black_box(z)
        });
    });
}

criterion_group! {
    name = hash;
    config = Criterion::default().warm_up_time(Duration::from_millis(100));
    targets = bench_tccr_hash
}
criterion_main!(hash);
