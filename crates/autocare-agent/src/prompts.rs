//! Prompt builders for the maintenance agent kinds.
//!
//! Every builder is a pure function of its inputs so the text can be checked
//! without a model. [`build_prompt`] reads a task payload and picks the
//! builder for the task's kind.

use autocare_core::{
    AutocareError, AutocareResult, Powertrain, Task, TaskKind, VehicleRecord, VehicleSource,
};
use chrono::{Days, NaiveDate};

/// Service center slots offered for a given day.
pub const SLOT_TIMES: [&str; 2] = ["10:00 AM", "2:00 PM"];

const ICE_THRESHOLDS: &str = "\
ICE vehicles:
- Engine Temp: 80-90°C normal, >100°C critical
- Oil Pressure: 40-60 PSI normal, <30 PSI critical
- Battery Voltage: 12.6-14.4V normal, <12V critical
- Brake Wear: <50% good, >75% critical";

const EV_THRESHOLDS: &str = "\
EV vehicles:
- Battery SOH: 85-100% good, <70% critical
- Battery Temp: 20-45°C normal, >60°C critical
- Motor Temp: <80°C normal, >95°C critical
- Brake Wear: <50% good, >75% critical";

const COST_GUIDELINES: &str = "\
Cost guidelines (India):
- Brake pads: ₹3,000-6,000
- Oil change: ₹2,000-4,000
- Battery replacement: ₹8,000-15,000
- EV battery service: ₹25,000-50,000";

/// `name=value` pairs in sensor name order.
pub fn format_sensors(vehicle: &VehicleRecord) -> String {
    if vehicle.sensor_data.is_empty() {
        return "no readings".to_string();
    }
    vehicle
        .sensor_data
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Anomaly detection against the thresholds for the vehicle's powertrain.
pub fn analysis_prompt(vehicle: &VehicleRecord) -> String {
    let thresholds = match vehicle.powertrain {
        Powertrain::Ice => ICE_THRESHOLDS,
        Powertrain::Ev => EV_THRESHOLDS,
    };
    format!(
        "Analyze this {} vehicle's sensor data: {}\n\n\
         Thresholds:\n{thresholds}\n\n\
         Return a structured analysis with:\n\
         - Anomalies Found: [list]\n\
         - Severity Level: LOW/MEDIUM/HIGH/CRITICAL\n\
         - Recommended Action: [action]\n\
         - Time to Failure: [estimate]",
        vehicle.powertrain,
        format_sensors(vehicle),
    )
}

/// Failure prediction with cost estimates in INR.
pub fn diagnosis_prompt(analysis: &str, vehicle: &VehicleRecord) -> String {
    format!(
        "Based on this analysis: {analysis}\n\n\
         For vehicle: {} ({}) - {}\n\n\
         Provide a detailed diagnosis with:\n\
         1. Primary Issue: [specific component]\n\
         2. Failure Probability: [percentage]\n\
         3. Time to Failure: [days/weeks estimate]\n\
         4. Estimated Repair Cost: [in INR - Indian Rupees]\n\
         5. Safety Risk: LOW/MEDIUM/HIGH\n\
         6. Urgency: Can wait / Schedule soon / Immediate\n\n\
         {COST_GUIDELINES}",
        vehicle.model, vehicle.year, vehicle.powertrain,
    )
}

/// Owner phone script built from a diagnosis.
pub fn call_script_prompt(customer: &str, diagnosis: &str) -> String {
    format!(
        "Create a natural phone conversation script for customer: {customer}\n\n\
         Based on this diagnosis: {diagnosis}\n\n\
         Write a 5-7 exchange conversation with:\n\
         1. Warm, empathetic greeting\n\
         2. The issue explained in simple, non-technical language\n\
         3. Emphasis on safety, the savings of prevention, and convenience\n\
         4. Two or three specific appointment times\n\
         5. Handling of common objections\n\n\
         Format:\n\
         AI: [greeting]\n\
         CUSTOMER: [response]\n\
         AI: [continuation]\n\n\
         Tone: warm, professional, safety-focused. Context: Indian customer."
    )
}

/// Slots offered on `day`, formatted as `YYYY-MM-DD HH:MM AM`.
pub fn appointment_slots(day: NaiveDate) -> Vec<String> {
    SLOT_TIMES
        .iter()
        .map(|time| format!("{} {time}", day.format("%Y-%m-%d")))
        .collect()
}

/// The day after `today`.
pub fn next_service_day(today: NaiveDate) -> NaiveDate {
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}

/// Booking request offering the slots on `day`.
pub fn scheduling_prompt(name: &str, phone: &str, day: NaiveDate) -> String {
    let slots = appointment_slots(day)
        .into_iter()
        .map(|slot| format!("- {slot}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Book an appointment for: {name}\nPhone: {phone}\n\n\
         Available slots:\n{slots}\n\n\
         Confirm the booking and write the SMS notification sent to the customer."
    )
}

/// Post-service satisfaction survey, optionally mentioning the last visit.
pub fn survey_prompt(service: Option<&str>) -> String {
    let context = service
        .map(|s| format!("The customer's last visit: {s}\n\n"))
        .unwrap_or_default();
    format!(
        "{context}Generate a post-service satisfaction survey with:\n\
         1. Service quality rating (1-5)\n\
         2. Wait time satisfaction (1-5)\n\
         3. Technician professionalism (1-5)\n\
         4. Would you recommend us? (Yes/No)"
    )
}

/// Fleet-wide failure patterns for the manufacturer.
pub fn insights_prompt(vehicles: &[VehicleRecord]) -> String {
    let fleet = vehicles
        .iter()
        .map(|v| {
            format!(
                "- {} {} ({}, {}): {}",
                v.vehicle_id,
                v.model,
                v.year,
                v.powertrain,
                format_sensors(v)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Fleet telemetry for {} vehicles:\n{fleet}\n\n\
         Reference thresholds:\n{ICE_THRESHOLDS}\n{EV_THRESHOLDS}\n\n\
         Report for the manufacturer:\n\
         - Recurring Failure Patterns: [component, affected models, share of fleet]\n\
         - Likely Root Cause: [design, supplier or usage]\n\
         - Recommended Design Change: [action]\n\
         - Priority: LOW/MEDIUM/HIGH",
        vehicles.len()
    )
}

/// Build the prompt for `task`, resolving vehicles through `fleet` when the
/// payload names them by id.
///
/// Payload fields by kind:
///
/// | kind | fields |
/// |------|--------|
/// | `data_analysis` | `vehicle_id` or inline `vehicle` |
/// | `diagnosis` | vehicle, optional `analysis` text |
/// | `customer_engagement` | `diagnosis`, `customer_name` or vehicle |
/// | `scheduling` | `name` + `phone`, or vehicle |
/// | `feedback` | optional `service` |
/// | `manufacturing_insights` | inline `vehicles`, or the whole fleet |
pub fn build_prompt(
    task: &Task,
    fleet: Option<&dyn VehicleSource>,
    today: NaiveDate,
) -> AutocareResult<String> {
    let prompt = match task.kind() {
        TaskKind::DataAnalysis => analysis_prompt(&resolve_vehicle(task, fleet)?),
        TaskKind::Diagnosis => {
            let vehicle = resolve_vehicle(task, fleet)?;
            let analysis = task.payload_str("analysis").map_or_else(
                || format!("no prior analysis; raw readings: {}", format_sensors(&vehicle)),
                str::to_string,
            );
            diagnosis_prompt(&analysis, &vehicle)
        }
        TaskKind::CustomerEngagement => {
            let diagnosis = task
                .payload_str("diagnosis")
                .ok_or_else(|| missing_field(task, "diagnosis"))?;
            let customer = match task.payload_str("customer_name") {
                Some(name) => name.to_string(),
                None => resolve_vehicle(task, fleet)?.owner,
            };
            call_script_prompt(&customer, diagnosis)
        }
        TaskKind::Scheduling => {
            let (name, phone) = match (task.payload_str("name"), task.payload_str("phone")) {
                (Some(name), Some(phone)) => (name.to_string(), phone.to_string()),
                _ => {
                    let vehicle = resolve_vehicle(task, fleet)?;
                    (vehicle.owner, vehicle.phone)
                }
            };
            scheduling_prompt(&name, &phone, next_service_day(today))
        }
        TaskKind::Feedback => survey_prompt(task.payload_str("service")),
        TaskKind::ManufacturingInsights => insights_prompt(&resolve_fleet(task, fleet)?),
    };
    Ok(prompt)
}

fn resolve_vehicle(task: &Task, fleet: Option<&dyn VehicleSource>) -> AutocareResult<VehicleRecord> {
    if let Some(inline) = task.payload().get("vehicle") {
        return serde_json::from_value(inline.clone()).map_err(|e| {
            AutocareError::InvalidPayload(format!("{} task has a malformed vehicle: {e}", task.kind()))
        });
    }
    let vehicle_id = task
        .payload_str("vehicle_id")
        .ok_or_else(|| missing_field(task, "vehicle_id"))?;
    match fleet {
        Some(fleet) => fleet.require(vehicle_id),
        None => Err(AutocareError::InvalidPayload(format!(
            "{} task names vehicle '{vehicle_id}' but no fleet is attached",
            task.kind()
        ))),
    }
}

fn resolve_fleet(
    task: &Task,
    fleet: Option<&dyn VehicleSource>,
) -> AutocareResult<Vec<VehicleRecord>> {
    if let Some(inline) = task.payload().get("vehicles") {
        return serde_json::from_value(inline.clone()).map_err(|e| {
            AutocareError::InvalidPayload(format!("malformed vehicles list: {e}"))
        });
    }
    let vehicles = fleet.map(|f| f.list_all()).unwrap_or_default();
    if vehicles.is_empty() {
        return Err(AutocareError::InvalidPayload(
            "fleet insights need at least one vehicle".to_string(),
        ));
    }
    Ok(vehicles)
}

fn missing_field(task: &Task, field: &str) -> AutocareError {
    AutocareError::InvalidPayload(format!("{} task is missing '{field}'", task.kind()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use autocare_core::{InMemoryFleet, TaskPriority};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn swift() -> VehicleRecord {
        VehicleRecord {
            vehicle_id: "VEH001".into(),
            powertrain: Powertrain::Ice,
            model: "Maruti Swift".into(),
            year: 2020,
            owner: "Mr. Rajesh Sharma".into(),
            phone: "9876543210".into(),
            sensor_data: BTreeMap::from([
                ("engine_temp".to_string(), 92.0),
                ("oil_pressure".to_string(), 35.0),
            ]),
        }
    }

    fn nexon() -> VehicleRecord {
        VehicleRecord {
            vehicle_id: "VEH002".into(),
            powertrain: Powertrain::Ev,
            model: "Tata Nexon EV".into(),
            year: 2022,
            owner: "Ms. Priya Patel".into(),
            phone: "9123456789".into(),
            sensor_data: BTreeMap::from([("battery_soh".to_string(), 72.0)]),
        }
    }

    fn fleet() -> InMemoryFleet {
        InMemoryFleet::from_records([swift(), nexon()])
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
    }

    fn task(kind: TaskKind, payload: serde_json::Value) -> Task {
        Task::new(kind, payload, TaskPriority::Medium)
    }

    #[test]
    fn test_analysis_uses_powertrain_thresholds() {
        let ice = analysis_prompt(&swift());
        assert!(ice.contains("ICE vehicle"));
        assert!(ice.contains("Oil Pressure"));
        assert!(!ice.contains("Battery SOH"));
        assert!(ice.contains("engine_temp=92, oil_pressure=35"));

        let ev = analysis_prompt(&nexon());
        assert!(ev.contains("Battery SOH"));
        assert!(!ev.contains("Oil Pressure"));
    }

    #[test]
    fn test_diagnosis_includes_inr_costs() {
        let prompt = diagnosis_prompt("Low oil pressure", &swift());
        assert!(prompt.contains("Maruti Swift (2020) - ICE"));
        assert!(prompt.contains("₹2,000-4,000"));
        assert!(prompt.contains("Low oil pressure"));
    }

    #[test]
    fn test_slots_roll_over_month_end() {
        let next = next_service_day(day());
        assert_eq!(
            appointment_slots(next),
            vec!["2026-04-01 10:00 AM", "2026-04-01 2:00 PM"]
        );
    }

    #[test]
    fn test_build_prompt_resolves_vehicle_from_fleet() {
        let fleet = fleet();
        let prompt = build_prompt(
            &task(TaskKind::DataAnalysis, json!({"vehicle_id": "VEH002"})),
            Some(&fleet),
            day(),
        )
        .unwrap();
        assert!(prompt.contains("EV vehicle"));
    }

    #[test]
    fn test_build_prompt_accepts_inline_vehicle() {
        let vehicle = serde_json::to_value(swift()).unwrap();
        let prompt = build_prompt(
            &task(TaskKind::Diagnosis, json!({"vehicle": vehicle})),
            None,
            day(),
        )
        .unwrap();
        assert!(prompt.contains("no prior analysis"));
        assert!(prompt.contains("engine_temp=92"));
    }

    #[test]
    fn test_unknown_vehicle_is_reported() {
        let fleet = fleet();
        let err = build_prompt(
            &task(TaskKind::DataAnalysis, json!({"vehicle_id": "VEH999"})),
            Some(&fleet),
            day(),
        )
        .unwrap_err();
        assert!(matches!(err, AutocareError::VehicleNotFound(id) if id == "VEH999"));
    }

    #[test]
    fn test_missing_fields_are_invalid_payloads() {
        let err = build_prompt(&task(TaskKind::DataAnalysis, json!({})), None, day()).unwrap_err();
        assert!(matches!(err, AutocareError::InvalidPayload(_)));

        let err = build_prompt(
            &task(TaskKind::CustomerEngagement, json!({"customer_name": "Mr. Kumar"})),
            None,
            day(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("diagnosis"));
    }

    #[test]
    fn test_scheduling_uses_owner_contact() {
        let fleet = fleet();
        let prompt = build_prompt(
            &task(TaskKind::Scheduling, json!({"vehicle_id": "VEH001"})),
            Some(&fleet),
            day(),
        )
        .unwrap();
        assert!(prompt.contains("Mr. Rajesh Sharma"));
        assert!(prompt.contains("9876543210"));
        assert!(prompt.contains("2026-04-01 2:00 PM"));
    }

    #[test]
    fn test_feedback_needs_no_payload() {
        let prompt = build_prompt(&task(TaskKind::Feedback, json!({})), None, day()).unwrap();
        assert!(prompt.contains("Technician professionalism"));
    }

    #[test]
    fn test_insights_cover_whole_fleet() {
        let fleet = fleet();
        let prompt = build_prompt(
            &task(TaskKind::ManufacturingInsights, json!({})),
            Some(&fleet),
            day(),
        )
        .unwrap();
        assert!(prompt.contains("2 vehicles"));
        assert!(prompt.contains("VEH001 Maruti Swift"));
        assert!(prompt.contains("VEH002 Tata Nexon EV"));

        let err = build_prompt(&task(TaskKind::ManufacturingInsights, json!({})), None, day())
            .unwrap_err();
        assert!(matches!(err, AutocareError::InvalidPayload(_)));
    }
}
