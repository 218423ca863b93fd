//! Hospital backend access.
//!
//! The [`HospitalGateway`] is the only component that talks to the hospital
//! REST API. Tool invocations resolve through a fixed dispatch table
//! ([`request_spec`]) and every failure is a value, never a fault: callers
//! fold [`GatewayError`]s into tool results or response envelopes.

pub mod gateway;

pub use gateway::{HospitalGateway, RequestSpec, request_spec};

/// One of the data categories the hospital API serves.
///
/// Categories drive the relevance extractor's eager fetches and the
/// `/hospital-data/{category}` passthrough endpoint. Declaration order is
/// the order bundles are probed in, so extraction stays deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataCategory {
    Patients,
    Alerts,
    Staff,
    Rooms,
    Beds,
    Devices,
    Anomalies,
    Simulation,
}

impl DataCategory {
    /// Every category, in probe order.
    pub const ALL: [Self; 8] = [
        Self::Patients,
        Self::Alerts,
        Self::Staff,
        Self::Rooms,
        Self::Beds,
        Self::Devices,
        Self::Anomalies,
        Self::Simulation,
    ];

    /// URL segment accepted by the passthrough endpoint.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Alerts => "alerts",
            Self::Staff => "staff",
            Self::Rooms => "rooms",
            Self::Beds => "beds",
            Self::Devices => "devices",
            Self::Anomalies => "anomalies",
            Self::Simulation => "simulation",
        }
    }

    /// Key this category's data is stored under in a context bundle.
    #[must_use]
    pub fn bundle_key(self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Alerts => "alerts",
            Self::Staff => "staff",
            Self::Rooms => "rooms",
            Self::Beds => "beds",
            Self::Devices => "iot_devices",
            Self::Anomalies => "anomalies",
            Self::Simulation => "simulation_status",
        }
    }

    /// Hospital API path for the unparameterized category fetch.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Patients => "/patients/",
            Self::Alerts => "/alerts/",
            Self::Staff => "/staff/",
            Self::Rooms => "/rooms/",
            Self::Beds => "/beds/",
            Self::Devices => "/iotData/",
            Self::Anomalies => "/anomalies/",
            Self::Simulation => "/simulation/status",
        }
    }

    /// Words whose presence in a user message marks this category relevant.
    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Patients => &["patient", "patients"],
            Self::Alerts => &["alert", "alerts"],
            Self::Staff => &["staff", "doctor", "nurse"],
            Self::Rooms => &["room", "rooms"],
            Self::Beds => &["bed", "beds"],
            Self::Devices => &["device", "devices", "iot", "sensor"],
            Self::Anomalies => &["anomaly", "anomalies"],
            Self::Simulation => &["simulation", "status"],
        }
    }

    /// Resolve a passthrough URL segment.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.slug() == slug)
    }
}

/// Failures of hospital tool dispatch.
///
/// None of these are faults: the orchestrator serializes them into the
/// failing invocation's tool result, and the passthrough endpoint maps them
/// to error envelopes.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The requested name is not in the tool catalog. Detected before any
    /// HTTP request is made.
    #[error("Unknown function: {name}")]
    UnknownTool {
        /// The name the model asked for.
        name: String,
    },
    /// A required argument was missing or of an unusable type.
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        /// Tool the arguments were for.
        tool: &'static str,
        /// What was wrong.
        reason: String,
    },
    /// The hospital API was unreachable, answered with a non-success
    /// status, or returned a body that was not JSON.
    #[error("API call failed: {message}")]
    Upstream {
        /// HTTP status code, when one was received.
        status: Option<u16>,
        /// Failure description.
        message: String,
    },
}

// ============================================================================
// Tests
// ============================================================================
