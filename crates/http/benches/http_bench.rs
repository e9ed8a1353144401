use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use tern_http::header::{HeaderTable, canonical_name};
use tern_http::request::{Environment, RequestContext};
use tern_http::response::{CookieOptions, ResponseBuilder};
use tern_http::stream::ByteStream;
use tern_http::transport::IoTransport;

fn bench_canonical_name(c: &mut Criterion) {
    c.bench_function("canonical_header_name", |b| {
        b.iter(|| canonical_name(black_box("access-CONTROL-allow-credentials")));
    });
}

fn bench_header_table(c: &mut Criterion) {
    c.bench_function("header_table_set_add", |b| {
        b.iter(|| {
            let mut headers = HeaderTable::new();
            headers.set("content-type", "text/html");
            headers.set("cache-control", "no-cache");
            headers.add("set-cookie", "a=1");
            headers.add("set-cookie", "b=2");
            headers.set("Content-Type", "application/json");
            black_box(headers)
        });
    });
}

fn bench_emit(c: &mut Criterion) {
    let request = RequestContext::new(Environment::new().with_server("SERVER_PROTOCOL", "HTTP/1.1"));
    let body = "x".repeat(64 * 1024);

    c.bench_function("emit_unbuffered", |b| {
        b.iter(|| {
            let mut response = ResponseBuilder::new(&request);
            response.set_content_type("html", "UTF-8").set_body(ByteStream::from_bytes(body.clone()));
            let mut transport = IoTransport::new(Vec::with_capacity(body.len() + 256));
            response.emit(&mut transport, Some(0)).unwrap();
            black_box(transport.into_inner())
        });
    });

    c.bench_function("emit_buffered_8k", |b| {
        b.iter(|| {
            let mut response = ResponseBuilder::new(&request);
            response
                .set_content_type("html", "UTF-8")
                .add_cookie("sid", "abc", 0, &CookieOptions::default())
                .set_body(ByteStream::from_bytes(body.clone()));
            let mut transport = IoTransport::new(Vec::with_capacity(body.len() + 256));
            response.emit(&mut transport, Some(8 * 1024)).unwrap();
            black_box(transport.into_inner())
        });
    });
}

criterion_group!(benches, bench_canonical_name, bench_header_table, bench_emit);
criterion_main!(benches);
