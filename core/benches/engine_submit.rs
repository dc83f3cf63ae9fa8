use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mbcrypt_core::{
    Engine,
    backend::{Capabilities, CapabilityTier, CpuRef, Job, KeyHandle, MacAlg},
};
use sampling::{distributions::Distributions, source::Source};

fn bench_engine_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_submit_hmac_sha256_imix");

    fn runner(caps: Capabilities) -> impl FnMut() {
        let mut engine: Engine<CpuRef> = Engine::with_capabilities(caps);
        let mut source: Source = Source::new([0u8; 32]);
        let shape: Distributions = Distributions::imix();
        let key: KeyHandle = KeyHandle::from(source.bytes(32));

        let jobs: Vec<Job> = (0..64u64)
            .map(|id| {
                let len: usize = shape.sample_len(&mut source);
                Job::mac(MacAlg::HmacSha256, key.clone(), source.bytes(len)).with_user_data(id)
            })
            .collect();

        move || {
            jobs.iter().for_each(|job| {
                black_box(engine.submit(job.clone()));
            });
            black_box(engine.flush_all());
        }
    }

    [
        ("scalar", Capabilities::new(CapabilityTier::Scalar, false)),
        ("sse", Capabilities::new(CapabilityTier::Sse, false)),
        ("sse-sha-ext", Capabilities::new(CapabilityTier::Sse, true)),
    ]
    .into_iter()
    .for_each(|(name, caps)| {
        let mut runner = runner(caps);
        group.bench_with_input(BenchmarkId::from_parameter(name), &caps, |b, _| b.iter(&mut runner));
    });

    group.finish();
}

criterion_group!(benches, bench_engine_submit);
criterion_main!(benches);
