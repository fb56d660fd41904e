use anyhow::Result;
use awsdns_aws_v4::{
    Credential, EnvCredentialProvider, RequestDetails, RequestSigner, StaticCredentialProvider,
    AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, X_AMZ_CONTENT_SHA_256,
};
use awsdns_core::time::FixedClock;
use awsdns_core::{Context, ErrorKind, Signer, StaticEnv, UrlContext};
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use http::header;
use http::uri::Scheme;
use http::{Method, Request};
use pretty_assertions::assert_eq;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixed_context() -> Context {
    Context::new().with_clock(FixedClock(Utc.timestamp_opt(1234567890, 0).unwrap()))
}

#[tokio::test]
async fn test_signer_matches_request_composer() -> Result<()> {
    init();

    let ctx = fixed_context();
    let cred = Credential::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")?;
    let body = Bytes::from_static(b"<ChangeResourceRecordSetsRequest/>");

    let url = UrlContext::new(Scheme::HTTPS, "route53.amazonaws.com")
        .with_path(["2013-04-01", "hostedzone", "Z1", "rrset"]);
    let composed = RequestDetails::new("us-east-1", "route53", Method::POST, url, &body)
        .compose(&cred, ctx.now(), body.clone())?;

    let signer = Signer::new(
        ctx,
        StaticCredentialProvider::new(cred),
        RequestSigner::new("route53", "us-east-1"),
    );
    let req = Request::post("https://route53.amazonaws.com/2013-04-01/hostedzone/Z1/rrset")
        .header(
            X_AMZ_CONTENT_SHA_256,
            hex::encode(Sha256::digest(&body).as_slice()),
        )
        .body(body)?;
    let (mut parts, _) = req.into_parts();
    signer.sign(&mut parts).await?;

    assert_eq!(
        parts.headers[header::AUTHORIZATION],
        composed.headers()[header::AUTHORIZATION]
    );
    assert_eq!(parts.uri, *composed.uri());

    Ok(())
}

#[tokio::test]
async fn test_signer_with_env_credential() -> Result<()> {
    init();

    let ctx = fixed_context().with_env(StaticEnv {
        envs: HashMap::from([
            (AWS_ACCESS_KEY_ID.to_string(), "AKIDEXAMPLE".to_string()),
            (AWS_SECRET_ACCESS_KEY.to_string(), "secret".to_string()),
        ]),
    });
    let signer = Signer::new(
        ctx,
        EnvCredentialProvider::new(),
        RequestSigner::new("route53", "us-east-1"),
    );

    let (mut parts, _) = Request::get("https://route53.amazonaws.com/2013-04-01/hostedzone")
        .header(X_AMZ_CONTENT_SHA_256, awsdns_core::hash::EMPTY_STRING_SHA256)
        .body(())?
        .into_parts();
    signer.sign(&mut parts).await?;

    let authorization = parts.headers[header::AUTHORIZATION].to_str()?;
    assert!(authorization
        .starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20090213/us-east-1/route53/aws4_request"));

    Ok(())
}

#[tokio::test]
async fn test_signer_without_any_credential() -> Result<()> {
    init();

    let signer = Signer::new(
        fixed_context(),
        EnvCredentialProvider::new(),
        RequestSigner::new("route53", "us-east-1"),
    );

    let (mut parts, _) = Request::get("https://route53.amazonaws.com/")
        .header(X_AMZ_CONTENT_SHA_256, awsdns_core::hash::EMPTY_STRING_SHA256)
        .body(())?
        .into_parts();
    let err = signer.sign(&mut parts).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

    Ok(())
}
