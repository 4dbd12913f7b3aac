use cookiestash::cookies::{CookieConfig, CookieStore, EncryptionConfig, Format, RequestCookies};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

fn populated(store: &CookieStore) -> RequestCookies {
    let mut request = RequestCookies::new();
    for i in 0..20 {
        store
            .set(&mut request, format!("key{}", i), json!({"n": i, "s": "value"}))
            .unwrap();
    }
    request
}

fn benchmark_plain_read(c: &mut Criterion) {
    let store = CookieStore::new(CookieConfig::new("prefs")).unwrap();
    let request = populated(&store);

    c.bench_function("cookie_all_plain", |b| {
        b.iter(|| {
            black_box(store.all(black_box(&request)).unwrap());
        })
    });
}

fn benchmark_encrypted_read(c: &mut Criterion) {
    let store = CookieStore::new(
        CookieConfig::new("prefs").with_encryption(EncryptionConfig::with_passphrase("bench")),
    )
    .unwrap();
    let request = populated(&store);

    c.bench_function("cookie_all_encrypted", |b| {
        b.iter(|| {
            black_box(store.all(black_box(&request)).unwrap());
        })
    });
}

fn benchmark_set(c: &mut Criterion) {
    let store =
        CookieStore::new(CookieConfig::new("prefs").with_format(Format::Base64Json)).unwrap();
    let mut request = populated(&store);

    c.bench_function("cookie_set_base64", |b| {
        b.iter(|| {
            store
                .set(&mut request, black_box("theme"), black_box("dark"))
                .unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_plain_read,
    benchmark_encrypted_read,
    benchmark_set
);
criterion_main!(benches);
