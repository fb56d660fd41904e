use awsdns_aws_v4::{Credential, RequestDetails, RequestSigner, X_AMZ_CONTENT_SHA_256};
use awsdns_core::hash::EMPTY_STRING_SHA256;
use awsdns_core::{Context, SignRequest, UrlContext};
use bytes::Bytes;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use http::uri::Scheme;
use http::Method;

criterion_group!(benches, bench);
criterion_main!(benches);

pub fn bench(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("must success");

    let cred = Credential::new("access_key_id", "secret_access_key").expect("must be valid");

    let mut group = c.benchmark_group("aws_v4");

    group.bench_function("sign_request", |b| {
        let s = RequestSigner::new("route53", "us-east-1");
        let ctx = Context::new();

        b.to_async(&runtime).iter(|| async {
            let mut req = http::Request::new("");
            *req.method_mut() = http::Method::GET;
            *req.uri_mut() = "https://route53.amazonaws.com/2013-04-01/hostedzone"
                .parse()
                .expect("url must be valid");
            req.headers_mut().insert(
                X_AMZ_CONTENT_SHA_256,
                EMPTY_STRING_SHA256.parse().expect("must be valid"),
            );

            let (mut parts, _) = req.into_parts();
            s.sign_request(&ctx, &mut parts, Some(&cred))
                .await
                .expect("must success")
        })
    });

    group.bench_function("compose", |b| {
        let details = RequestDetails::new(
            "us-east-1",
            "route53",
            Method::GET,
            UrlContext::new(Scheme::HTTPS, "route53.amazonaws.com")
                .with_path(["2013-04-01", "hostedzone"]),
            b"",
        );
        let now = awsdns_core::time::now();

        b.iter(|| {
            details
                .compose(&cred, now, Bytes::new())
                .expect("must success")
        })
    });

    group.finish()
}
