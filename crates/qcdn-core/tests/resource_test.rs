// Site, site configuration, certificate and data source lifecycles.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use qcdn_api::{ApiClient, EndpointBuilder};
use qcdn_core::resource::{
    CertificatePlan, CertificateResource, CertificateState, SiteConfigPlan, SiteConfigResource,
    SitePlan, SiteResource, SiteState, SitesFilter, data_sources,
};
use qcdn_core::{CoreError, SiteFacade};

async fn setup() -> (MockServer, SiteFacade) {
    let server = MockServer::start().await;
    let api = ApiClient::with_client(reqwest::Client::new(), EndpointBuilder::fixed(server.uri()));
    (server, SiteFacade::from_api(api))
}

// ── Site ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_site_create_and_routing_method_is_immutable() {
    let (server, facade) = setup().await;
    let sites = SiteResource::new(facade);

    Mock::given(method("POST"))
        .and(path("/api/v2/sites"))
        .and(body_json(json!({"siteName": "demo", "routingMethod": "DNS"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "siteId": "s1",
            "siteName": "demo",
            "routingMethod": "DNS",
            "siteDnsCnameDelegationTarget": "demo.cdn.qwilt.com",
        })))
        .mount(&server)
        .await;

    let state = sites
        .create(&SitePlan {
            site_name: "demo".into(),
            routing_method: Some("DNS".into()),
        })
        .await
        .unwrap();
    assert_eq!(state.id, "s1");
    assert_eq!(state.site_dns_cname_delegation_target, "demo.cdn.qwilt.com");

    let err = sites
        .update(
            &state,
            &SitePlan {
                site_name: "demo".into(),
                routing_method: Some("HTTP".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_site_rename_keeps_routing_method() {
    let (server, facade) = setup().await;
    let sites = SiteResource::new(facade);

    Mock::given(method("PUT"))
        .and(path("/api/v2/sites/s1"))
        .and(body_json(json!({"siteName": "renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "siteId": "s1",
            "siteName": "renamed",
            "routingMethod": "OVERRIDE",
        })))
        .mount(&server)
        .await;

    let state = SiteState {
        id: "s1".into(),
        site_id: "s1".into(),
        site_name: "demo".into(),
        routing_method: "DNS".into(),
        ..Default::default()
    };
    let updated = sites
        .update(
            &state,
            &SitePlan {
                site_name: "renamed".into(),
                routing_method: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.site_name, "renamed");
    assert_eq!(updated.routing_method, "DNS");
}

// ── Site configuration ──────────────────────────────────────────────

#[tokio::test]
async fn test_config_update_without_semantic_change_is_noop() {
    let (server, facade) = setup().await;
    let configs = SiteConfigResource::new(facade);

    let state = qcdn_core::resource::SiteConfigState {
        id: "s1:r1".into(),
        site_id: "s1".into(),
        revision_id: "r1".into(),
        host_index: r#"{"a": 1, "b": 2}"#.into(),
        change_description: "init".into(),
        ..Default::default()
    };
    let plan = SiteConfigPlan {
        site_id: "s1".into(),
        host_index: "{\n\t\"b\": 2,\n\t\"a\": 1\n}\n".into(),
        change_description: "init".into(),
    };

    let same = configs.update(&state, &plan).await.unwrap();
    assert_eq!(same, state);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_config_implicit_import_falls_back_to_highest_revision() {
    let (server, facade) = setup().await;
    let configs = SiteConfigResource::new(facade);

    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"siteId": "s1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/1/sites/s1/configurations"))
        .and(query_param("truncateHostIndex", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"revisionId": "r1", "revisionNum": 1},
            {"revisionId": "r3", "revisionNum": 3},
            {"revisionId": "r2", "revisionNum": 2},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/1/sites/s1/configurations/r3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "revisionId": "r3",
            "revisionNum": 3,
            "hostIndex": {"hosts": []},
            "changeDescription": "third",
        })))
        .mount(&server)
        .await;

    let state = configs.import("s1").await.unwrap();
    assert_eq!(state.id, "s1:r3");
    assert_eq!(state.revision_num, 3);
    assert_eq!(state.host_index, "{\n\t\"hosts\": []\n}\n");
}

#[tokio::test]
async fn test_config_implicit_import_prefers_active_revision() {
    let (server, facade) = setup().await;
    let configs = SiteConfigResource::new(facade);

    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "siteId": "s1",
            "activeAndLastPublishingOperation": {
                "active": {"publishId": "p1", "revisionId": "r2"},
                "last": {"publishId": "p2", "revisionId": "r4"},
            },
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/1/sites/s1/configurations/r2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"revisionId": "r2", "revisionNum": 2})),
        )
        .mount(&server)
        .await;

    let state = configs.import("s1").await.unwrap();
    assert_eq!(state.revision_id, "r2");
}

// ── Certificate ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_certificate_read_keeps_private_key() {
    let (server, facade) = setup().await;
    let certs = CertificateResource::new(facade);

    Mock::given(method("GET"))
        .and(path("/api/v2/certificates/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "certId": 42,
            "certificate": "PEM",
            "domain": "example.com",
            "status": "ACTIVE",
        })))
        .mount(&server)
        .await;

    let state = CertificateState {
        cert_id: 42,
        private_key: "KEY".into(),
        ..Default::default()
    };
    let refreshed = certs.read(&state).await.unwrap();
    assert_eq!(refreshed.private_key, "KEY");
    assert_eq!(refreshed.status, "ACTIVE");
    assert!(!format!("{refreshed:?}").contains("KEY"));
}

#[tokio::test]
async fn test_certificate_create_sends_material() {
    let (server, facade) = setup().await;
    let certs = CertificateResource::new(facade);

    Mock::given(method("POST"))
        .and(path("/api/v2/certificates"))
        .and(body_json(json!({
            "certificate": "PEM",
            "certificateChain": "CHAIN",
            "privateKey": "KEY",
            "description": "edge",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"certId": 7})))
        .mount(&server)
        .await;

    let state = certs
        .create(&CertificatePlan {
            certificate: "PEM".into(),
            certificate_chain: "CHAIN".into(),
            private_key: "KEY".into(),
            description: "edge".into(),
        })
        .await
        .unwrap();
    assert_eq!(state.cert_id, 7);
    assert_eq!(state.private_key, "KEY");
}

#[tokio::test]
async fn test_certificate_import_rejects_non_numeric_id() {
    let (_server, facade) = setup().await;
    let err = CertificateResource::new(facade).import("abc").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidImportId { .. }));
}

// ── Data sources ────────────────────────────────────────────────────

#[tokio::test]
async fn test_sites_data_source_with_site_filter() {
    let (server, facade) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"siteId": "s1", "IsDeleted": false},
            {"siteId": "s2", "IsDeleted": true},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/1/sites/s1/configurations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"revisionId": "r1"},
            {"revisionId": "r2"},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/sites/s1/publishing-operations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"publishId": "p1"},
        ])))
        .mount(&server)
        .await;

    let data = data_sources::sites(
        &facade,
        &SitesFilter {
            site_id: Some("s1".into()),
            revision_id: Some("r2".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(data.sites.len(), 1);
    assert_eq!(data.revisions.len(), 1);
    assert_eq!(data.revisions[0].revision_id, "r2");
    assert_eq!(data.publish_ops.len(), 1);
}

#[tokio::test]
async fn test_sites_data_source_without_filter_includes_deleted() {
    let (server, facade) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"siteId": "s1"},
            {"siteId": "s2", "IsDeleted": true},
        ])))
        .mount(&server)
        .await;

    let data = data_sources::sites(&facade, &SitesFilter::default()).await.unwrap();
    assert_eq!(data.sites.len(), 2);
    assert!(data.revisions.is_empty());
}
