//! Hospital API gateway.
//!
//! Maps catalog tool invocations onto the hospital REST API. Dispatch is
//! split in two: [`request_spec`] is a pure table from tool id + arguments
//! to an HTTP request description, and [`HospitalGateway`] executes those
//! descriptions against the configured base URL.
//!
//! Path and parameter names are a fixed upstream contract; changing one
//! breaks the tools the model was taught.

use serde_json::Value;

use super::{DataCategory, GatewayError};
use crate::tools::ToolId;

/// Upper bound on upstream error text folded into a tool result.
const ERROR_BODY_LIMIT: usize = 200;

/// HTTP method of a gateway request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

/// A fully described hospital API request, before execution.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    /// Method to use.
    pub method: HttpMethod,
    /// Path relative to the hospital base URL.
    pub path: String,
    /// Query parameters, already stringified.
    pub query: Vec<(String, String)>,
    /// JSON body for mutating requests.
    pub body: Option<Value>,
}

impl RequestSpec {
    fn get(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            query,
            body: None,
        }
    }

    fn post(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            query: Vec::new(),
            body,
        }
    }

    fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Put,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }
}

/// Build the upstream request for one tool invocation.
///
/// Validates the invocation's required arguments against the same table the
/// advertised schemas are generated from, then fills path parameters and
/// forwards the remaining non-null scalars as query parameters (reads) or
/// the declared object as the body (writes).
///
/// # Errors
///
/// [`GatewayError::InvalidArguments`] when a required argument is missing
/// or not usable in its position.
pub fn request_spec(id: ToolId, args: &Value) -> Result<RequestSpec, GatewayError> {
    let spec = match id {
        ToolId::GetAllPatients => RequestSpec::get("/patients/", query_pairs(args, &[])),
        ToolId::GetPatient => {
            let pid = path_arg(args, id, "patient_id")?;
            RequestSpec::get(format!("/patients/{pid}"), Vec::new())
        }
        ToolId::CreatePatient => {
            let data = object_arg(args, id, "patient_data")?;
            RequestSpec::post("/patients/", Some(data))
        }
        ToolId::UpdatePatient => {
            let pid = path_arg(args, id, "patient_id")?;
            let data = object_arg(args, id, "patient_data")?;
            RequestSpec::put(format!("/patients/{pid}"), data)
        }
        ToolId::GetPatientVitals => {
            let pid = path_arg(args, id, "patient_id")?;
            RequestSpec::get(
                format!("/patients/{pid}/vitals"),
                query_pairs(args, &["patient_id"]),
            )
        }
        ToolId::GetPatientTreatments => {
            let pid = path_arg(args, id, "patient_id")?;
            RequestSpec::get(
                format!("/patients/{pid}/treatments"),
                query_pairs(args, &["patient_id"]),
            )
        }
        ToolId::PredictPatientRisk => {
            let pid = path_arg(args, id, "patient_id")?;
            RequestSpec::get(format!("/predict/risk/{pid}"), Vec::new())
        }
        ToolId::GetCurrentAlerts => RequestSpec::get("/alerts/", Vec::new()),
        ToolId::GetAllStaff => RequestSpec::get("/staff/", query_pairs(args, &[])),
        ToolId::GetStaff => {
            let sid = path_arg(args, id, "staff_id")?;
            RequestSpec::get(format!("/staff/{sid}"), Vec::new())
        }
        ToolId::GetStaffSchedule => {
            let sid = path_arg(args, id, "staff_id")?;
            // start_date is required but travels as a query parameter.
            path_arg(args, id, "start_date")?;
            RequestSpec::get(
                format!("/staff/{sid}/schedule"),
                query_pairs(args, &["staff_id"]),
            )
        }
        ToolId::GetAllIotDevices => RequestSpec::get("/iotData/", Vec::new()),
        ToolId::GetDeviceData => {
            let did = path_arg(args, id, "device_id")?;
            RequestSpec::get(format!("/iotData/{did}"), Vec::new())
        }
        ToolId::GetLatestVitals => {
            let did = path_arg(args, id, "device_id")?;
            RequestSpec::get(format!("/iotData/{did}/vitals/latest"), Vec::new())
        }
        ToolId::DetectAnomaly => {
            let mid = path_arg(args, id, "monitor_id")?;
            RequestSpec::get(format!("/anomalies/detect/{mid}"), Vec::new())
        }
        ToolId::GetAllAnomalies => RequestSpec::get("/anomalies/", query_pairs(args, &[])),
        ToolId::GetAllRooms => RequestSpec::get("/rooms/", Vec::new()),
        ToolId::GetRoom => {
            let rid = path_arg(args, id, "room_id")?;
            RequestSpec::get(format!("/rooms/{rid}"), Vec::new())
        }
        ToolId::AssignPatientToRoom => {
            let rid = path_arg(args, id, "room_id")?;
            let pid = path_arg(args, id, "patient_id")?;
            RequestSpec::post(format!("/rooms/{rid}/assign-patient/{pid}"), None)
        }
        ToolId::GetAllBeds => RequestSpec::get("/beds/", Vec::new()),
        ToolId::GetBed => {
            let bid = path_arg(args, id, "bed_id")?;
            RequestSpec::get(format!("/beds/{bid}"), Vec::new())
        }
        ToolId::AssignPatientToBed => {
            let bid = path_arg(args, id, "bed_id")?;
            let pid = path_arg(args, id, "patient_id")?;
            RequestSpec::post(format!("/beds/{bid}/assign-patient/{pid}"), None)
        }
        ToolId::GetSimulationStatus => RequestSpec::get("/simulation/status", Vec::new()),
    };
    Ok(spec)
}

/// A required scalar argument, rendered for use in a URL.
fn path_arg(args: &Value, id: ToolId, key: &str) -> Result<String, GatewayError> {
    match args.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Null) | None => Err(GatewayError::InvalidArguments {
            tool: id.name(),
            reason: format!("missing required argument '{key}'"),
        }),
        Some(_) => Err(GatewayError::InvalidArguments {
            tool: id.name(),
            reason: format!("argument '{key}' must be a string"),
        }),
    }
}

/// A required object argument, forwarded verbatim as the request body.
fn object_arg(args: &Value, id: ToolId, key: &str) -> Result<Value, GatewayError> {
    match args.get(key) {
        Some(v @ Value::Object(_)) => Ok(v.clone()),
        Some(Value::Null) | None => Err(GatewayError::InvalidArguments {
            tool: id.name(),
            reason: format!("missing required argument '{key}'"),
        }),
        Some(_) => Err(GatewayError::InvalidArguments {
            tool: id.name(),
            reason: format!("argument '{key}' must be an object"),
        }),
    }
}

/// Remaining non-null scalar arguments as query parameters.
///
/// Nulls and the excluded path parameters are dropped; nested values have
/// no query representation and are dropped as well.
fn query_pairs(args: &Value, exclude: &[&str]) -> Vec<(String, String)> {
    let Some(map) = args.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter(|(k, _)| !exclude.contains(&k.as_str()))
        .filter_map(|(k, v)| {
            let rendered = match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            };
            rendered.map(|r| (k.clone(), r))
        })
        .collect()
}

/// Executes [`RequestSpec`]s against the hospital REST API.
#[derive(Debug, Clone)]
pub struct HospitalGateway {
    http: reqwest::Client,
    base_url: String,
}

impl HospitalGateway {
    /// Create a gateway for the given hospital API base URL.
    ///
    /// No request timeout is configured: a call either returns or fails
    /// outright, and failures become [`GatewayError::Upstream`] values.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve one tool invocation by name.
    ///
    /// Unknown names fail before any HTTP request is made; every other
    /// failure comes back as a [`GatewayError`] for the caller to fold into
    /// a tool result.
    ///
    /// # Errors
    ///
    /// [`GatewayError::UnknownTool`], [`GatewayError::InvalidArguments`],
    /// or [`GatewayError::Upstream`].
    pub async fn invoke(&self, name: &str, arguments: &Value) -> Result<Value, GatewayError> {
        let Some(id) = ToolId::parse(name) else {
            tracing::warn!(tool = name, "model requested a tool outside the catalog");
            return Err(GatewayError::UnknownTool {
                name: name.to_string(),
            });
        };
        let spec = request_spec(id, arguments)?;
        tracing::debug!(
            tool = name,
            method = ?spec.method,
            path = %spec.path,
            "dispatching hospital call"
        );
        self.execute(&spec).await
    }

    /// Fetch one category's unparameterized listing.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Upstream`] when the hospital API fails.
    pub async fn fetch_category(&self, category: DataCategory) -> Result<Value, GatewayError> {
        self.execute(&RequestSpec::get(category.path(), Vec::new()))
            .await
    }

    async fn execute(&self, spec: &RequestSpec) -> Result<Value, GatewayError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), spec.path);
        let mut req = match spec.method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
            HttpMethod::Put => self.http.put(&url),
        };
        if !spec.query.is_empty() {
            req = req.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| GatewayError::Upstream {
            status: None,
            message: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body = truncate(&body, ERROR_BODY_LIMIT);
            tracing::warn!(
                status = status.as_u16(),
                path = %spec.path,
                "hospital API rejected request"
            );
            let message = if body.is_empty() {
                format!("{status} from {}", spec.path)
            } else {
                format!("{status} from {}: {body}", spec.path)
            };
            return Err(GatewayError::Upstream {
                status: Some(status.as_u16()),
                message,
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| GatewayError::Upstream {
                status: None,
                message: format!("invalid JSON from hospital API: {e}"),
            })
    }
}

/// Cut `s` down to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Tests
// ============================================================================
