//! Gateway behavior against a real (in-test) hospital API.
//!
//! The fake hospital records every request it receives, so these tests can
//! assert not just what the gateway returns but exactly which HTTP calls it
//! made, including the cases where it must make none at all.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::{Value, json};

use hospital_agent::hospital::{GatewayError, HospitalGateway};
use hospital_agent::relevance::RelevanceExtractor;

// ============================================================================
// Fake hospital backend
// ============================================================================

/// One request observed by the fake hospital.
#[derive(Debug, Clone)]
struct SeenRequest {
    method: String,
    path: String,
    query: Option<String>,
}

#[derive(Clone)]
struct HospitalState {
    routes: Arc<HashMap<&'static str, (StatusCode, Value)>>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// An in-process hospital API double bound to an ephemeral port. Paths
/// without a configured response answer 404.
struct FakeHospital {
    base_url: String,
    state: HospitalState,
}

impl FakeHospital {
    async fn start(routes: &[(&'static str, StatusCode, Value)]) -> Self {
        let table: HashMap<&'static str, (StatusCode, Value)> = routes
            .iter()
            .map(|(path, status, body)| (*path, (*status, body.clone())))
            .collect();
        let state = HospitalState {
            routes: Arc::new(table),
            seen: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .fallback(record_and_respond)
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake hospital");
        let addr = listener.local_addr().expect("fake hospital address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve fake hospital");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    fn gateway(&self) -> HospitalGateway {
        HospitalGateway::new(self.base_url.clone())
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().expect("seen lock").clone()
    }
}

async fn record_and_respond(
    State(state): State<HospitalState>,
    method: Method,
    uri: Uri,
) -> (StatusCode, Json<Value>) {
    state.seen.lock().expect("seen lock").push(SeenRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(ToString::to_string),
    });
    match state.routes.get(uri.path()) {
        Some((status, body)) => (*status, Json(body.clone())),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not Found"}))),
    }
}

// ============================================================================
// invoke
// ============================================================================

#[tokio::test]
async fn unknown_tool_fails_without_touching_the_backend() {
    let hospital = FakeHospital::start(&[]).await;
    let gateway = hospital.gateway();

    let err = gateway
        .invoke("get_all_wards", &json!({}))
        .await
        .expect_err("unknown tool must fail");

    assert!(matches!(err, GatewayError::UnknownTool { .. }));
    assert_eq!(err.to_string(), "Unknown function: get_all_wards");
    assert!(hospital.seen().is_empty(), "no HTTP call may be made");
}

#[tokio::test]
async fn missing_required_argument_fails_without_touching_the_backend() {
    let hospital = FakeHospital::start(&[]).await;
    let gateway = hospital.gateway();

    let err = gateway
        .invoke("get_patient", &json!({}))
        .await
        .expect_err("missing patient_id must fail");

    assert!(matches!(err, GatewayError::InvalidArguments { .. }));
    assert!(hospital.seen().is_empty(), "validation precedes dispatch");
}

#[tokio::test]
async fn room_assignment_posts_to_exactly_one_path() {
    let hospital = FakeHospital::start(&[(
        "/rooms/R1/assign-patient/P1",
        StatusCode::OK,
        json!({"success": true, "room_id": "R1", "patient_id": "P1"}),
    )])
    .await;
    let gateway = hospital.gateway();

    let result = gateway
        .invoke(
            "assign_patient_to_room",
            &json!({"room_id": "R1", "patient_id": "P1"}),
        )
        .await
        .expect("assignment should succeed");

    assert_eq!(result["success"], true);
    let seen = hospital.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/rooms/R1/assign-patient/P1");
    assert!(seen[0].query.is_none());
}

#[tokio::test]
async fn upstream_404_becomes_an_error_result_not_a_fault() {
    let hospital = FakeHospital::start(&[]).await;
    let gateway = hospital.gateway();

    let err = gateway
        .invoke(
            "assign_patient_to_room",
            &json!({"room_id": "R9", "patient_id": "P9"}),
        )
        .await
        .expect_err("404 must surface as an error value");

    match err {
        GatewayError::Upstream { status, message } => {
            assert_eq!(status, Some(404));
            assert!(message.contains("404"), "{message}");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
    // The mutating call was attempted exactly once; nothing retried it.
    assert_eq!(hospital.seen().len(), 1);
}

#[tokio::test]
async fn list_filters_travel_as_query_parameters() {
    let hospital =
        FakeHospital::start(&[("/patients/", StatusCode::OK, json!([]))]).await;
    let gateway = hospital.gateway();

    gateway
        .invoke(
            "get_all_patients",
            &json!({"ward": "ICU", "status": null, "risk_level": null}),
        )
        .await
        .expect("listing should succeed");

    let seen = hospital.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/patients/");
    assert_eq!(seen[0].query.as_deref(), Some("ward=ICU"));
}

#[tokio::test]
async fn success_payload_passes_through_verbatim() {
    let payload = json!({
        "id": "P001",
        "name": "Ada",
        "ward": "Cardiology",
        "vitals": {"heart_rate": 72, "spo2": 98.5}
    });
    let hospital =
        FakeHospital::start(&[("/patients/P001", StatusCode::OK, payload.clone())]).await;
    let gateway = hospital.gateway();

    let result = gateway
        .invoke("get_patient", &json!({"patient_id": "P001"}))
        .await
        .expect("lookup should succeed");

    assert_eq!(result, payload);
}

// ============================================================================
// Relevance extraction
// ============================================================================

#[tokio::test]
async fn extraction_fetches_exactly_the_triggered_categories() {
    let hospital = FakeHospital::start(&[(
        "/alerts/",
        StatusCode::OK,
        json!([{"id": "A1", "severity": "high", "message": "Low SpO2"}]),
    )])
    .await;
    let extractor = RelevanceExtractor::new(Arc::new(hospital.gateway()));

    let bundle = extractor.extract("What are the current alerts?").await;

    assert_eq!(bundle.len(), 1);
    assert_eq!(bundle["alerts"][0]["id"], "A1");
    let seen = hospital.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/alerts/");
    assert!(seen[0].query.is_none(), "category fetches carry no filters");
}

#[tokio::test]
async fn extraction_continues_past_a_failing_category() {
    let hospital = FakeHospital::start(&[
        (
            "/patients/",
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"detail": "database offline"}),
        ),
        ("/alerts/", StatusCode::OK, json!([{"id": "A1"}])),
    ])
    .await;
    let extractor = RelevanceExtractor::new(Arc::new(hospital.gateway()));

    let bundle = extractor.extract("Show patients and alerts").await;

    assert_eq!(bundle.len(), 2);
    let patient_error = bundle["patients"]["error"]
        .as_str()
        .expect("failed category must carry an error marker");
    assert!(patient_error.contains("500"), "{patient_error}");
    assert_eq!(bundle["alerts"], json!([{"id": "A1"}]));
}

#[tokio::test]
async fn unreachable_backend_marks_every_triggered_category() {
    // Nothing listens on this address; every fetch fails at the transport.
    let extractor = RelevanceExtractor::new(Arc::new(HospitalGateway::new("http://127.0.0.1:1")));

    let bundle = extractor.extract("free beds and rooms").await;

    assert_eq!(bundle.len(), 2);
    for key in ["rooms", "beds"] {
        let marker = bundle[key]["error"]
            .as_str()
            .unwrap_or_else(|| panic!("{key} must carry an error marker"));
        assert!(marker.starts_with("API call failed:"), "{marker}");
    }
}

#[tokio::test]
async fn extraction_is_idempotent_on_triggered_keys() {
    let hospital = FakeHospital::start(&[
        ("/beds/", StatusCode::OK, json!([{"id": "B1"}])),
        ("/rooms/", StatusCode::OK, json!([{"id": "R1"}])),
    ])
    .await;
    let extractor = RelevanceExtractor::new(Arc::new(hospital.gateway()));

    let first = extractor.extract("bed and room overview").await;
    let second = extractor.extract("bed and room overview").await;

    let first_keys: Vec<&String> = first.keys().collect();
    let second_keys: Vec<&String> = second.keys().collect();
    assert_eq!(first_keys, second_keys);
}
