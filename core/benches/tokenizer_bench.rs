use criterion::{criterion_group, criterion_main, Criterion};
use marksearch_core::tokenizer::{normalize, stem, StopWords};

const SAMPLE: &str = "The quick brown fox jumped over the lazy dog, and kept \
running until the farmer's dogs started barking. Presently the walkers \
crossed the meadow; clouds gathered, rain followed, and everyone hurried \
home before the storm reached the village.";

fn bench_tokenize(c: &mut Criterion) {
    let stop_words = StopWords::builtin();
    c.bench_function("normalize_and_stem_sample", |b| {
        b.iter(|| {
            normalize(SAMPLE, &stop_words)
                .iter()
                .map(|word| stem(word).len())
                .sum::<usize>()
        })
    });
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
