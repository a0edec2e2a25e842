//! Benchmarks for the posting markup codec.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use socialtext::markup;
use socialtext::policy::EditPolicy;
use socialtext::spans::{MentionDictionary, UserRef};

fn dictionary() -> MentionDictionary {
    (0..50)
        .map(|i| UserRef::new(format!("user{i}"), format!("Nick {i}")))
        .collect()
}

fn long_markup() -> String {
    let mut markup = String::new();
    for i in 0..200 {
        markup.push_str(&format!(
            "line {i} with <tagUser>@user{}</tagUser> and #tag{i} ",
            i % 60
        ));
    }
    markup
}

fn bench_decode_simple(c: &mut Criterion) {
    let dict = dictionary();
    let markup = "hi <tagUser>@user1</tagUser> how are you";
    c.bench_function("decode_simple", |b| {
        b.iter(|| markup::decode(black_box(markup), &dict, EditPolicy::default()))
    });
}

fn bench_decode_long(c: &mut Criterion) {
    let dict = dictionary();
    let markup = long_markup();
    c.bench_function("decode_long", |b| {
        b.iter(|| markup::decode(black_box(&markup), &dict, EditPolicy::default()))
    });
}

fn bench_encode_long(c: &mut Criterion) {
    let decoded = markup::decode(&long_markup(), &dictionary(), EditPolicy::default());
    c.bench_function("encode_long", |b| {
        b.iter(|| markup::encode(black_box(&decoded.text), &decoded.spans))
    });
}

criterion_group!(benches, bench_decode_simple, bench_decode_long, bench_encode_long);
criterion_main!(benches);
