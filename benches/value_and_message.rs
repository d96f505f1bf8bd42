use criterion::{black_box, criterion_group, criterion_main, Criterion};

use varlink_service::protocol::{pack_reply, unpack_call, CallFlags, ReplyFlags};
use varlink_service::value::{parse_str, write_value, ObjectBuilder};

fn sample_call_text() -> String {
    r#"{"method":"com.acme.example.Process","parameters":{"items":[1,2,3,4,5],"name":"benchmark","nested":{"flag":true}}}"#.to_string()
}

fn sample_reply_object() -> varlink_service::value::JsonObject {
    let mut params = ObjectBuilder::new();
    params.set_string("name", "benchmark");
    params.set_int("count", 5);
    params.set_bool("ok", true);
    params.build()
}

fn bench_value_parse(c: &mut Criterion) {
    let text = sample_call_text();
    c.bench_function("value_parse_call_object", |b| {
        b.iter(|| parse_str(black_box(&text)).unwrap())
    });
}

fn bench_value_serialize(c: &mut Criterion) {
    let object = sample_reply_object();
    c.bench_function("value_serialize_reply_object", |b| {
        b.iter(|| {
            let mut buf = varlink_service::buffer::ByteBuffer::new();
            write_value(&varlink_service::value::Value::Object(black_box(object.clone())), &mut buf);
            buf
        })
    });
}

fn bench_unpack_call(c: &mut Criterion) {
    let value = parse_str(&sample_call_text()).unwrap();
    let object = value.as_object().unwrap().clone();
    c.bench_function("protocol_unpack_call", |b| {
        b.iter(|| unpack_call(black_box(&object)).unwrap())
    });
}

fn bench_pack_reply(c: &mut Criterion) {
    let parameters = sample_reply_object();
    c.bench_function("protocol_pack_reply", |b| {
        b.iter(|| {
            pack_reply(
                black_box(None),
                black_box(Some(parameters.clone())),
                ReplyFlags::default(),
            )
        })
    });
}

fn bench_call_flags_roundtrip(c: &mut Criterion) {
    let call_text = r#"{"method":"com.acme.example.Stream","more":true}"#;
    let value = parse_str(call_text).unwrap();
    let object = value.as_object().unwrap().clone();
    c.bench_function("protocol_call_flags_roundtrip", |b| {
        b.iter(|| {
            let call = unpack_call(black_box(&object)).unwrap();
            assert_eq!(call.flags, CallFlags { more: true, oneway: false });
        })
    });
}

criterion_group!(
    benches,
    bench_value_parse,
    bench_value_serialize,
    bench_unpack_call,
    bench_pack_reply,
    bench_call_flags_roundtrip
);
criterion_main!(benches);
