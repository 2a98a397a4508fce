use criterion::{Criterion, black_box, criterion_group, criterion_main};
use qm_core::{BufferPool, CircuitSimulator, EmotionEncoder, StateEncoder};

const MEMORY: &str = "古い石段を登る寺の記憶、夕日と鐘の音";

fn bench_classical(c: &mut Criterion) {
    let pool = BufferPool::new(8);
    let memory = StateEncoder::default();
    let emotion = EmotionEncoder::default();

    c.bench_function("encode_memory_classical", |b| {
        b.iter(|| {
            let v = memory.encode(black_box(MEMORY), None, &pool);
            pool.recycle(v.components.into_inner());
        })
    });
    c.bench_function("encode_emotion_classical", |b| {
        b.iter(|| emotion.encode(black_box("nostalgic"), None, &pool))
    });
}

fn bench_circuit(c: &mut Criterion) {
    let pool = BufferPool::new(8);
    let sim = CircuitSimulator::default();
    let memory = StateEncoder::default();
    let (m, e) = StateEncoder::circuit_seeds(MEMORY);

    c.bench_function("simulate_8q_1024", |b| b.iter(|| sim.simulate(black_box(m), e)));
    c.bench_function("encode_memory_circuit", |b| {
        b.iter(|| {
            let measurement = sim.simulate(m, e);
            memory.encode(black_box(MEMORY), Some(&measurement), &pool)
        })
    });
}

criterion_group!(benches, bench_classical, bench_circuit);
criterion_main!(benches);
