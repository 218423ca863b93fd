//! Hospital tool catalog.
//!
//! Every operation the model may request is a [`ToolId`] variant; the
//! catalog derives the `OpenAI` function schemas from the same table the
//! gateway validates arguments against, so a name that reaches dispatch is
//! always a name that was advertised.
//!
//! The catalog is built once at startup and never mutated afterwards.

use serde_json::{Value, json};

/// Identifier of one hospital operation exposed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    GetAllPatients,
    GetPatient,
    CreatePatient,
    UpdatePatient,
    GetPatientVitals,
    GetPatientTreatments,
    PredictPatientRisk,
    GetCurrentAlerts,
    GetAllStaff,
    GetStaff,
    GetStaffSchedule,
    GetAllIotDevices,
    GetDeviceData,
    GetLatestVitals,
    DetectAnomaly,
    GetAllAnomalies,
    GetAllRooms,
    GetRoom,
    AssignPatientToRoom,
    GetAllBeds,
    GetBed,
    AssignPatientToBed,
    GetSimulationStatus,
}

impl ToolId {
    /// Every operation, in catalog order.
    pub const ALL: [Self; 23] = [
        Self::GetAllPatients,
        Self::GetPatient,
        Self::CreatePatient,
        Self::UpdatePatient,
        Self::GetPatientVitals,
        Self::GetPatientTreatments,
        Self::PredictPatientRisk,
        Self::GetCurrentAlerts,
        Self::GetAllStaff,
        Self::GetStaff,
        Self::GetStaffSchedule,
        Self::GetAllIotDevices,
        Self::GetDeviceData,
        Self::GetLatestVitals,
        Self::DetectAnomaly,
        Self::GetAllAnomalies,
        Self::GetAllRooms,
        Self::GetRoom,
        Self::AssignPatientToRoom,
        Self::GetAllBeds,
        Self::GetBed,
        Self::AssignPatientToBed,
        Self::GetSimulationStatus,
    ];

    /// Wire name advertised to the model.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GetAllPatients => "get_all_patients",
            Self::GetPatient => "get_patient",
            Self::CreatePatient => "create_patient",
            Self::UpdatePatient => "update_patient",
            Self::GetPatientVitals => "get_patient_vitals",
            Self::GetPatientTreatments => "get_patient_treatments",
            Self::PredictPatientRisk => "predict_patient_risk",
            Self::GetCurrentAlerts => "get_current_alerts",
            Self::GetAllStaff => "get_all_staff",
            Self::GetStaff => "get_staff",
            Self::GetStaffSchedule => "get_staff_schedule",
            Self::GetAllIotDevices => "get_all_iot_devices",
            Self::GetDeviceData => "get_device_data",
            Self::GetLatestVitals => "get_latest_vitals",
            Self::DetectAnomaly => "detect_anomaly",
            Self::GetAllAnomalies => "get_all_anomalies",
            Self::GetAllRooms => "get_all_rooms",
            Self::GetRoom => "get_room",
            Self::AssignPatientToRoom => "assign_patient_to_room",
            Self::GetAllBeds => "get_all_beds",
            Self::GetBed => "get_bed",
            Self::AssignPatientToBed => "assign_patient_to_bed",
            Self::GetSimulationStatus => "get_simulation_status",
        }
    }

    /// Resolve a wire name back to its id.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.name() == name)
    }

    /// Arguments an invocation must carry.
    ///
    /// Single source of truth: the schema `required` arrays and the
    /// gateway's pre-dispatch validation are both generated from this.
    #[must_use]
    pub fn required_args(self) -> &'static [&'static str] {
        match self {
            Self::GetAllPatients
            | Self::GetCurrentAlerts
            | Self::GetAllStaff
            | Self::GetAllIotDevices
            | Self::GetAllAnomalies
            | Self::GetAllRooms
            | Self::GetAllBeds
            | Self::GetSimulationStatus => &[],
            Self::GetPatient | Self::PredictPatientRisk => &["patient_id"],
            Self::CreatePatient => &["patient_data"],
            Self::UpdatePatient => &["patient_id", "patient_data"],
            Self::GetPatientVitals | Self::GetPatientTreatments => &["patient_id"],
            Self::GetStaff => &["staff_id"],
            Self::GetStaffSchedule => &["staff_id", "start_date"],
            Self::GetDeviceData | Self::GetLatestVitals => &["device_id"],
            Self::DetectAnomaly => &["monitor_id"],
            Self::GetRoom => &["room_id"],
            Self::AssignPatientToRoom => &["room_id", "patient_id"],
            Self::GetBed => &["bed_id"],
            Self::AssignPatientToBed => &["bed_id", "patient_id"],
        }
    }

    /// Whether the operation writes upstream state. Mutating calls are
    /// never retried by this service.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::CreatePatient
                | Self::UpdatePatient
                | Self::AssignPatientToRoom
                | Self::AssignPatientToBed
        )
    }

    /// Build the descriptor advertised for this operation.
    #[must_use]
    pub fn descriptor(self) -> ToolDescriptor {
        let (description, properties) = match self {
            Self::GetAllPatients => (
                "Get all patients with optional filtering by ward, status, or risk level",
                json!({
                    "ward": {"type": "string", "description": "Filter by ward (e.g., 'Cardiology')"},
                    "status": {"type": "string", "description": "Filter by current status (stable, critical, improving, deteriorating)"},
                    "risk_level": {"type": "string", "description": "Filter by risk level (Low, Moderate, High, Critical)"}
                }),
            ),
            Self::GetPatient => (
                "Get a specific patient's complete record",
                json!({
                    "patient_id": {"type": "string", "description": "The patient ID"}
                }),
            ),
            Self::CreatePatient => (
                "Create a new patient record",
                json!({
                    "patient_data": {"type": "object", "description": "Patient data object"}
                }),
            ),
            Self::UpdatePatient => (
                "Update a patient's complete record",
                json!({
                    "patient_id": {"type": "string", "description": "The patient ID"},
                    "patient_data": {"type": "object", "description": "Updated patient data"}
                }),
            ),
            Self::GetPatientVitals => (
                "Get patient's vital signs history",
                json!({
                    "patient_id": {"type": "string", "description": "The patient ID"},
                    "start_time": {"type": "string", "description": "Start time filter"},
                    "end_time": {"type": "string", "description": "End time filter"},
                    "limit": {"type": "integer", "description": "Limit number of results", "default": 10}
                }),
            ),
            Self::GetPatientTreatments => (
                "Get patient's treatment history",
                json!({
                    "patient_id": {"type": "string", "description": "The patient ID"},
                    "status": {"type": "string", "description": "Filter by treatment status"}
                }),
            ),
            Self::PredictPatientRisk => (
                "Predict risk level for a patient",
                json!({
                    "patient_id": {"type": "string", "description": "The patient ID"}
                }),
            ),
            Self::GetCurrentAlerts => ("Get current active alerts", json!({})),
            Self::GetAllStaff => (
                "List all staff members with optional filters",
                json!({
                    "role": {"type": "string", "description": "Filter by staff role"},
                    "department": {"type": "string", "description": "Filter by department"},
                    "onDuty": {"type": "boolean", "description": "Filter by duty status"}
                }),
            ),
            Self::GetStaff => (
                "Get staff member details by ID",
                json!({
                    "staff_id": {"type": "string", "description": "The staff ID"}
                }),
            ),
            Self::GetStaffSchedule => (
                "Get staff schedule for a date range",
                json!({
                    "staff_id": {"type": "string", "description": "The staff ID"},
                    "start_date": {"type": "string", "description": "Start date in YYYY-MM-DD format"},
                    "end_date": {"type": "string", "description": "End date in YYYY-MM-DD format"}
                }),
            ),
            Self::GetAllIotDevices => ("Get all IoT devices and their vitals", json!({})),
            Self::GetDeviceData => (
                "Get all sensor data for a specific device",
                json!({
                    "device_id": {"type": "string", "description": "The device ID"}
                }),
            ),
            Self::GetLatestVitals => (
                "Get the most recent vitals reading for current patient on a device",
                json!({
                    "device_id": {"type": "string", "description": "The device ID"}
                }),
            ),
            Self::DetectAnomaly => (
                "Detect anomalies for a specific monitor",
                json!({
                    "monitor_id": {"type": "string", "description": "The monitor ID"}
                }),
            ),
            Self::GetAllAnomalies => (
                "Get all anomalies across all devices",
                json!({
                    "hours": {"type": "integer", "description": "Hours to look back", "default": 24},
                    "severity_filter": {"type": "string", "description": "Filter by severity"}
                }),
            ),
            Self::GetAllRooms => ("Get all rooms", json!({})),
            Self::GetRoom => (
                "Get a specific room by ID",
                json!({
                    "room_id": {"type": "string", "description": "The room ID"}
                }),
            ),
            Self::AssignPatientToRoom => (
                "Assign a patient to a room",
                json!({
                    "room_id": {"type": "string", "description": "The room ID"},
                    "patient_id": {"type": "string", "description": "The patient ID"}
                }),
            ),
            Self::GetAllBeds => ("Get all beds", json!({})),
            Self::GetBed => (
                "Get a specific bed by ID",
                json!({
                    "bed_id": {"type": "string", "description": "The bed ID"}
                }),
            ),
            Self::AssignPatientToBed => (
                "Assign a patient to a specific bed",
                json!({
                    "bed_id": {"type": "string", "description": "The bed ID"},
                    "patient_id": {"type": "string", "description": "The patient ID"}
                }),
            ),
            Self::GetSimulationStatus => {
                ("Get the current status of the data simulation", json!({}))
            }
        };

        let mut parameters = json!({
            "type": "object",
            "properties": properties,
        });
        let required = self.required_args();
        if !required.is_empty() {
            parameters["required"] = json!(required);
        }

        ToolDescriptor {
            name: self.name(),
            description,
            parameters,
        }
    }
}

/// A tool advertised to the model: name, human description, and JSON-schema
/// parameter object.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolDescriptor {
    /// Wire name.
    pub name: &'static str,
    /// Model-facing description.
    pub description: &'static str,
    /// JSON schema for the arguments object.
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Wrap the descriptor in the `OpenAI` `tools` array entry shape.
    #[must_use]
    pub fn to_openai(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// The fixed, ordered set of tools advertised on every tool-calling request.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    descriptors: Vec<ToolDescriptor>,
    openai_tools: Vec<Value>,
}

impl ToolCatalog {
    /// Build the catalog. Called once at startup.
    #[must_use]
    pub fn new() -> Self {
        let descriptors: Vec<_> = ToolId::ALL.iter().map(|id| id.descriptor()).collect();
        let openai_tools = descriptors.iter().map(ToolDescriptor::to_openai).collect();
        Self {
            descriptors,
            openai_tools,
        }
    }

    /// Descriptors in catalog order.
    #[must_use]
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// `OpenAI` `tools` array entries, in catalog order.
    #[must_use]
    pub fn openai_tools(&self) -> &[Value] {
        &self.openai_tools
    }

    /// Number of advertised tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the catalog is empty (it never is in practice).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_covers_all_operations_in_order() {
        let catalog = ToolCatalog::new();
        assert_eq!(catalog.len(), ToolId::ALL.len());
        let listed: Vec<&str> = catalog.list().iter().map(|d| d.name).collect();
        let expected: Vec<&str> = ToolId::ALL.iter().map(|id| id.name()).collect();
        assert_eq!(listed, expected);
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<&str> = ToolId::ALL.iter().map(|id| id.name()).collect();
        assert_eq!(names.len(), ToolId::ALL.len());
    }

    #[test]
    fn parse_round_trips_every_name() {
        for id in ToolId::ALL {
            assert_eq!(ToolId::parse(id.name()), Some(id));
        }
        assert_eq!(ToolId::parse("get_all_wards"), None);
        // Matching is exact, not case-folded.
        assert_eq!(ToolId::parse("Get_Patient"), None);
    }

    #[test]
    fn schema_required_matches_required_args() {
        for id in ToolId::ALL {
            let descriptor = id.descriptor();
            let schema_required: Vec<String> = descriptor.parameters["required"]
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(ToString::to_string))
                        .collect()
                })
                .unwrap_or_default();
            let expected: Vec<String> =
                id.required_args().iter().map(ToString::to_string).collect();
            assert_eq!(schema_required, expected, "required mismatch for {}", id.name());
            if id.required_args().is_empty() {
                assert!(
                    descriptor.parameters.get("required").is_none(),
                    "{} should omit an empty required array",
                    id.name()
                );
            }
        }
    }

    #[test]
    fn every_required_arg_is_a_declared_property() {
        for id in ToolId::ALL {
            let descriptor = id.descriptor();
            let properties = descriptor.parameters["properties"]
                .as_object()
                .expect("parameters.properties must be an object");
            for arg in id.required_args() {
                assert!(
                    properties.contains_key(*arg),
                    "{} requires undeclared property {arg}",
                    id.name()
                );
            }
        }
    }

    #[test]
    fn mutating_set_is_exactly_the_write_operations() {
        let mutating: Vec<&str> = ToolId::ALL
            .iter()
            .filter(|id| id.is_mutating())
            .map(|id| id.name())
            .collect();
        assert_eq!(
            mutating,
            vec![
                "create_patient",
                "update_patient",
                "assign_patient_to_room",
                "assign_patient_to_bed"
            ]
        );
    }

    #[test]
    fn openai_entries_use_function_wrapper() {
        let catalog = ToolCatalog::new();
        for (entry, id) in catalog.openai_tools().iter().zip(ToolId::ALL) {
            assert_eq!(entry["type"], "function");
            assert_eq!(entry["function"]["name"], id.name());
            assert_eq!(entry["function"]["parameters"]["type"], "object");
        }
    }

    #[test]
    fn documented_defaults_stay_on_the_schema() {
        let vitals = ToolId::GetPatientVitals.descriptor();
        assert_eq!(vitals.parameters["properties"]["limit"]["default"], 10);
        let anomalies = ToolId::GetAllAnomalies.descriptor();
        assert_eq!(anomalies.parameters["properties"]["hours"]["default"], 24);
    }
}
