// Activation workflow tests against a wiremock Qwilt CDN and a manual clock.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use qcdn_api::{ApiClient, EndpointBuilder};
use qcdn_core::resource::{SiteActivationPlan, SiteActivationResource, SiteActivationState};
use qcdn_core::{
    AcceptancePolicy, AcceptanceStatus, ActivationRequest, Activator, CertificateRef, CoreError,
    ManualClock, SiteFacade, Target,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Activator<ManualClock>, ManualClock) {
    let server = MockServer::start().await;
    let api = ApiClient::with_client(reqwest::Client::new(), EndpointBuilder::fixed(server.uri()));
    let clock = ManualClock::new();
    let activator = Activator::with_clock(
        SiteFacade::from_api(api),
        AcceptancePolicy::default(),
        clock.clone(),
    );
    (server, activator, clock)
}

fn request(certificate: CertificateRef) -> ActivationRequest {
    ActivationRequest {
        site_id: "s1".into(),
        revision_id: "r1".into(),
        target: Target::Ga,
        certificate,
    }
}

fn pub_op(publish_id: &str, acceptance: &str) -> serde_json::Value {
    json!({
        "publishId": publish_id,
        "revisionId": "r1",
        "target": "ga",
        "publishStatus": "InProgress",
        "publishAcceptanceStatus": acceptance,
        "operationType": "Publish",
    })
}

async fn mount_publish(server: &MockServer, publish_id: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v2/sites/s1/publishing-operations"))
        .and(body_json(json!({"revisionId": "r1", "target": "ga"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(pub_op(publish_id, "Pending")))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_polls(server: &MockServer, publish_id: &str, pending: u64, terminal: &str) {
    let op_path = format!("/api/v2/sites/s1/publishing-operations/{publish_id}");
    if pending > 0 {
        Mock::given(method("GET"))
            .and(path(op_path.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(pub_op(publish_id, "Pending")))
            .up_to_n_times(pending)
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(op_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(pub_op(publish_id, terminal)))
        .mount(server)
        .await;
}

async fn requests(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap()
}

fn count(reqs: &[Request], verb: &str, p: &str) -> usize {
    reqs.iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == p)
        .count()
}

fn position(reqs: &[Request], verb: &str, p: &str) -> usize {
    reqs.iter()
        .position(|r| r.method.as_str() == verb && r.url.path() == p)
        .unwrap()
}

// ── Activate ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_activate_links_publishes_and_waits_for_acceptance() {
    let (server, activator, clock) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/certificates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/sites/s1/certificates"))
        .and(body_json(json!({"certificateId": "42"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{"certificateId": "42"}])))
        .expect(1)
        .mount(&server)
        .await;
    mount_publish(&server, "p1").await;
    mount_polls(&server, "p1", 2, "Accepted").await;

    let op = activator
        .activate(&request(CertificateRef::Certificate(42)))
        .await
        .unwrap();

    assert_eq!(op.publish_id, "p1");
    assert_eq!(op.publish_acceptance_status, AcceptanceStatus::Accepted);

    let reqs = requests(&server).await;
    assert_eq!(count(&reqs, "GET", "/api/v2/sites/s1/publishing-operations/p1"), 3);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(3); 2]);
    assert!(
        position(&reqs, "POST", "/api/v2/sites/s1/certificates")
            < position(&reqs, "POST", "/api/v2/sites/s1/publishing-operations")
    );
}

#[tokio::test]
async fn test_pending_poll_with_null_fields_keeps_polling() {
    let (server, activator, clock) = setup().await;

    mount_publish(&server, "p1").await;
    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/publishing-operations/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "publishId": "p1",
            "revisionId": "r1",
            "target": null,
            "username": null,
            "publishStatus": null,
            "publishAcceptanceStatus": "Pending",
            "operationType": "Publish",
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_polls(&server, "p1", 0, "Accepted").await;

    let op = activator
        .activate(&request(CertificateRef::None))
        .await
        .unwrap();

    assert_eq!(op.publish_acceptance_status, AcceptanceStatus::Accepted);
    let reqs = requests(&server).await;
    assert_eq!(count(&reqs, "GET", "/api/v2/sites/s1/publishing-operations/p1"), 2);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(3)]);
}

#[tokio::test]
async fn test_acceptance_timeout_after_full_deadline() {
    let (server, activator, clock) = setup().await;

    mount_publish(&server, "p1").await;
    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/publishing-operations/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pub_op("p1", "Pending")))
        .mount(&server)
        .await;

    let err = activator
        .activate(&request(CertificateRef::None))
        .await
        .unwrap_err();

    match err {
        CoreError::AcceptanceTimeout {
            ref site_id,
            ref publish_id,
            elapsed,
        } => {
            assert_eq!(site_id, "s1");
            assert_eq!(publish_id, "p1");
            assert_eq!(elapsed, Duration::from_secs(180));
        }
        other => panic!("expected timeout, got {other:?}"),
    }

    // One poll per interval inside the window, none after it closed.
    let reqs = requests(&server).await;
    assert_eq!(count(&reqs, "GET", "/api/v2/sites/s1/publishing-operations/p1"), 60);
    assert_eq!(clock.elapsed(), Duration::from_secs(180));
}

#[tokio::test]
async fn test_wait_returns_first_terminal_status() {
    let (server, activator, clock) = setup().await;
    mount_polls(&server, "p7", 0, "Accepted").await;

    let op = activator.wait_for_acceptance("s1", "p7").await.unwrap();
    assert_eq!(op.publish_acceptance_status, AcceptanceStatus::Accepted);
    assert!(clock.sleeps().is_empty());
    assert_eq!(requests(&server).await.len(), 1);
}

#[tokio::test]
async fn test_rejected_acceptance_reports_details() {
    let (server, activator, _clock) = setup().await;

    mount_publish(&server, "p1").await;
    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/publishing-operations/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "publishId": "p1",
            "publishAcceptanceStatus": "Invalid",
            "statusLine": ["host index invalid", "see details"],
            "validatorsErrDetails": {"path": "hosts[0]"},
        })))
        .mount(&server)
        .await;

    let err = activator
        .activate(&request(CertificateRef::None))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PublishRejected { .. }));
    let msg = err.to_string();
    assert!(msg.contains("Invalid"));
    assert!(msg.contains("host index invalid,see details"));
    assert!(msg.contains("hosts[0]"));
}

#[tokio::test]
async fn test_both_certificate_refs_fail_before_any_request() {
    let (server, activator, _clock) = setup().await;
    let resource = SiteActivationResource::new(activator, Target::Ga);

    let plan = SiteActivationPlan {
        site_id: "s1".into(),
        revision_id: "r1".into(),
        certificate_id: Some(5),
        certificate_template_id: Some(9),
    };
    let err = resource.create(&plan).await.unwrap_err();

    assert!(matches!(err, CoreError::MutuallyExclusive { .. }));
    assert!(requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_pending_template_reports_delegations_and_never_publishes() {
    let (server, activator, _clock) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/certificate-templates/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "certificateTemplateId": 9,
            "commonName": "example.com",
            "autoManagedCertificateTemplate": true,
            "lastCertificateId": null,
            "csrIds": [2, 3],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/certificate-signing-requests/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "csrId": 3,
            "challengeDelegationOfDomainsList": [
                {"fromDomain": "_acme-challenge.example.com", "toDomain": "abc.acme.qwilt.com"},
            ],
        })))
        .mount(&server)
        .await;

    let err = activator
        .activate(&request(CertificateRef::Template(9)))
        .await
        .unwrap_err();

    match &err {
        CoreError::TemplatePendingVerification {
            template_id,
            delegations,
        } => {
            assert_eq!(*template_id, 9);
            assert_eq!(delegations.len(), 1);
        }
        other => panic!("expected pending verification, got {other:?}"),
    }
    assert!(err.to_string().contains("Record Name: _acme-challenge.example.com"));

    let reqs = requests(&server).await;
    assert!(reqs.iter().all(|r| r.method.as_str() == "GET"));
}

#[tokio::test]
async fn test_template_without_certificate_asks_for_upload() {
    let (server, activator, _clock) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/certificate-templates/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "certificateTemplateId": 9,
            "autoManagedCertificateTemplate": false,
            "lastCertificateId": null,
        })))
        .mount(&server)
        .await;

    let err = activator
        .activate(&request(CertificateRef::Template(9)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::TemplateMissingCertificate { template_id: 9 }));
}

#[tokio::test]
async fn test_template_with_certificate_links_it() {
    let (server, activator, _clock) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/certificate-templates/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "certificateTemplateId": 9,
            "lastCertificateId": 77,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/certificates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/sites/s1/certificates"))
        .and(body_json(json!({"certificateId": "77"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{"certificateId": "77"}])))
        .expect(1)
        .mount(&server)
        .await;
    mount_publish(&server, "p1").await;
    mount_polls(&server, "p1", 0, "Accepted").await;

    activator
        .activate(&request(CertificateRef::Template(9)))
        .await
        .unwrap();
}

// ── Update / deactivate ─────────────────────────────────────────────

#[tokio::test]
async fn test_update_swaps_certificate_before_publishing() {
    let (server, activator, _clock) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v2/sites/s1/certificates/5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/certificates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/sites/s1/certificates"))
        .and(body_json(json!({"certificateId": "7"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{"certificateId": "7"}])))
        .expect(1)
        .mount(&server)
        .await;
    mount_publish(&server, "p2").await;
    mount_polls(&server, "p2", 1, "Accepted").await;

    let op = activator
        .update_activation(
            CertificateRef::Certificate(5),
            &request(CertificateRef::Certificate(7)),
        )
        .await
        .unwrap();
    assert_eq!(op.publish_id, "p2");

    let reqs = requests(&server).await;
    let unlink = position(&reqs, "DELETE", "/api/v2/sites/s1/certificates/5");
    let link = position(&reqs, "POST", "/api/v2/sites/s1/certificates");
    let publish = position(&reqs, "POST", "/api/v2/sites/s1/publishing-operations");
    assert!(unlink < link && link < publish);
}

#[tokio::test]
async fn test_update_from_template_without_certificate_only_links_new() {
    let (server, activator, _clock) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/certificate-templates/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "certificateTemplateId": 9,
            "autoManagedCertificateTemplate": false,
            "lastCertificateId": null,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/certificates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/sites/s1/certificates"))
        .and(body_json(json!({"certificateId": "7"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{"certificateId": "7"}])))
        .expect(1)
        .mount(&server)
        .await;
    mount_publish(&server, "p4").await;
    mount_polls(&server, "p4", 0, "Accepted").await;

    let op = activator
        .update_activation(
            CertificateRef::Template(9),
            &request(CertificateRef::Certificate(7)),
        )
        .await
        .unwrap();
    assert_eq!(op.publish_id, "p4");

    let reqs = requests(&server).await;
    assert!(reqs.iter().all(|r| r.method.as_str() != "DELETE"));
    assert!(
        position(&reqs, "POST", "/api/v2/sites/s1/certificates")
            < position(&reqs, "POST", "/api/v2/sites/s1/publishing-operations")
    );
}

#[tokio::test]
async fn test_update_with_same_certificate_leaves_links_alone() {
    let (server, activator, _clock) = setup().await;

    mount_publish(&server, "p3").await;
    mount_polls(&server, "p3", 0, "Accepted").await;

    activator
        .update_activation(
            CertificateRef::Certificate(7),
            &request(CertificateRef::Certificate(7)),
        )
        .await
        .unwrap();

    let reqs = requests(&server).await;
    assert!(reqs.iter().all(|r| !r.url.path().contains("/certificates")));
}

#[tokio::test]
async fn test_deactivate_unpublishes_then_unlinks() {
    let (server, activator, clock) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/sites/s1/publishing-operations/actions/un-publish"))
        .and(body_json(json!({"target": "ga"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "publishId": "u1",
            "operationType": "Unpublish",
            "publishAcceptanceStatus": "Pending",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/sites/s1/certificates/42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let op = activator.deactivate("s1", Target::Ga, Some(42)).await.unwrap();

    // Unpublish is not polled.
    assert_eq!(op.publish_acceptance_status, AcceptanceStatus::Pending);
    assert!(clock.sleeps().is_empty());

    let reqs = requests(&server).await;
    assert!(
        position(&reqs, "POST", "/api/v2/sites/s1/publishing-operations/actions/un-publish")
            < position(&reqs, "DELETE", "/api/v2/sites/s1/certificates/42")
    );
}

#[tokio::test]
async fn test_deleting_template_activation_leaves_issued_certificate_linked() {
    let (server, activator, _clock) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/sites/s1/publishing-operations/actions/un-publish"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "publishId": "u2",
            "operationType": "Unpublish",
            "publishAcceptanceStatus": "Pending",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resource = SiteActivationResource::new(activator, Target::Ga);
    let state = SiteActivationState {
        id: "s1:p1".into(),
        site_id: "s1".into(),
        certificate_template_id: Some(9),
        ..SiteActivationState::default()
    };
    let op = resource.delete(&state).await.unwrap();
    assert_eq!(op.publish_id, "u2");

    let reqs = requests(&server).await;
    assert_eq!(reqs.len(), 1);
    assert!(reqs.iter().all(|r| !r.url.path().contains("/certificate")));
}

// ── Lookups ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_find_latest_prefers_in_progress() {
    let (server, activator, _clock) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/publishing-operations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"publishId": "live", "revisionId": "r1", "isActive": true, "publishStatus": "Success"},
            {"publishId": "running", "revisionId": "r1", "publishStatus": "InProgress"},
        ])))
        .mount(&server)
        .await;

    let op = activator.find_latest_pub_op("s1", "r1").await.unwrap().unwrap();
    assert_eq!(op.publish_id, "running");
}

// ── Activation resource ─────────────────────────────────────────────

#[tokio::test]
async fn test_read_reports_template_for_auto_managed_certificate() {
    let (server, activator, _clock) = setup().await;
    let resource = SiteActivationResource::new(activator, Target::Ga);

    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/publishing-operations/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pub_op("p1", "Accepted")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/certificates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"certificateId": "42"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/certificates/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"certId": 42, "csrId": "3"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/certificate-signing-requests/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "csrId": 3,
            "autoManagedCsr": true,
            "certificateTemplateIdRef": "9",
        })))
        .mount(&server)
        .await;

    let state = resource
        .read(&SiteActivationState {
            site_id: "s1".into(),
            publish_id: "p1".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(state.id, "s1:p1");
    assert_eq!(state.certificate_id, None);
    assert_eq!(state.certificate_template_id, Some(9));
    assert_eq!(state.publish_acceptance_status, "Accepted");
}

#[tokio::test]
async fn test_implicit_import_skips_unpublish() {
    let (server, activator, _clock) = setup().await;
    let resource = SiteActivationResource::new(activator, Target::Ga);

    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1"))
        .and(query_param("includePublishDetails", "true"))
        .and(query_param("publishTarget", "ga"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "siteId": "s1",
            "activeAndLastPublishingOperation": {
                "active": {"publishId": "u9", "operationType": "Unpublish"},
                "last": {"publishId": "p5", "operationType": "Publish"},
            },
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/publishing-operations/p5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pub_op("p5", "Accepted")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/certificates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let state = resource.import("s1").await.unwrap();
    assert_eq!(state.publish_id, "p5");
    assert_eq!(state.certificate_id, None);
}

#[tokio::test]
async fn test_malformed_import_id_rejected() {
    let (server, activator, _clock) = setup().await;
    let resource = SiteActivationResource::new(activator, Target::Staging);

    let err = resource.import("s1:p1:extra").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidImportId { .. }));
    assert!(requests(&server).await.is_empty());
}
