use crate::backends::CompletionBackend;
use crate::config::ModelConfig;
use crate::maintenance::MaintenanceAgent;
use autocare_core::{
    Agent, AutocareResult, Task, TaskKind, TaskPriority, VehicleRecord, VehicleSource,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Output of one end-to-end maintenance run for a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowReport {
    /// Vehicle the report covers.
    pub vehicle_id: String,
    /// Record the prompts were built from.
    pub vehicle_info: VehicleRecord,
    /// Sensor analysis text.
    pub analysis: String,
    /// Diagnosis text derived from the analysis.
    pub diagnosis: String,
    /// Owner call script derived from the diagnosis.
    pub call_script: String,
}

/// Analysis, then diagnosis, then an owner call script, each step reading
/// the previous step's text.
///
/// Runs outside the orchestrator queue: the steps depend on each other, so
/// they are awaited in order instead of being dispatched independently.
pub struct MaintenanceWorkflow {
    fleet: Arc<dyn VehicleSource>,
    analysis: MaintenanceAgent,
    diagnosis: MaintenanceAgent,
    engagement: MaintenanceAgent,
}

impl MaintenanceWorkflow {
    /// Workflow whose three agents share `model` and `fleet`.
    pub fn new(model: ModelConfig, fleet: Arc<dyn VehicleSource>) -> Self {
        let agent = |kind| MaintenanceAgent::new(kind, model.clone()).with_fleet(Arc::clone(&fleet));
        Self {
            analysis: agent(TaskKind::DataAnalysis),
            diagnosis: agent(TaskKind::Diagnosis),
            engagement: agent(TaskKind::CustomerEngagement),
            fleet,
        }
    }

    /// Route every step through `backend`.
    pub fn with_backend(self, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            analysis: self.analysis.with_backend(Arc::clone(&backend)),
            diagnosis: self.diagnosis.with_backend(Arc::clone(&backend)),
            engagement: self.engagement.with_backend(backend),
            fleet: self.fleet,
        }
    }

    /// Run the three steps for one vehicle.
    pub async fn run(&self, vehicle_id: &str) -> AutocareResult<WorkflowReport> {
        let vehicle = self.fleet.require(vehicle_id)?;

        for agent in [&self.analysis, &self.diagnosis, &self.engagement] {
            if !agent.is_initialized() {
                agent.initialize().await?;
            }
        }

        let analysis = self
            .analysis
            .generate(&step(TaskKind::DataAnalysis, json!({"vehicle_id": vehicle_id})))
            .await?;
        info!(vehicle_id, "Workflow analysis complete");

        let diagnosis = self
            .diagnosis
            .generate(&step(
                TaskKind::Diagnosis,
                json!({"vehicle_id": vehicle_id, "analysis": analysis}),
            ))
            .await?;
        info!(vehicle_id, "Workflow diagnosis complete");

        let call_script = self
            .engagement
            .generate(&step(
                TaskKind::CustomerEngagement,
                json!({"customer_name": vehicle.owner, "diagnosis": diagnosis}),
            ))
            .await?;
        info!(vehicle_id, "Workflow call script complete");

        Ok(WorkflowReport {
            vehicle_id: vehicle_id.to_string(),
            vehicle_info: vehicle,
            analysis,
            diagnosis,
            call_script,
        })
    }
}

fn step(kind: TaskKind, payload: serde_json::Value) -> Task {
    Task::new(kind, payload, TaskPriority::High)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::backends::CompletionRequest;
    use async_trait::async_trait;
    use autocare_core::{AutocareError, InMemoryFleet};
    use parking_lot::Mutex;

    /// Returns a numbered answer per call and records each prompt.
    #[derive(Default)]
    struct StepBackend {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionBackend for StepBackend {
        async fn complete(&self, request: &CompletionRequest) -> AutocareResult<String> {
            let mut prompts = self.prompts.lock();
            prompts.push(request.prompt.clone());
            Ok(format!("answer-{}", prompts.len()))
        }
    }

    fn fleet() -> Arc<dyn VehicleSource> {
        let json = r#"[{
            "vehicle_id": "VEH002", "type": "EV", "model": "Tata Nexon EV", "year": 2022,
            "owner": "Ms. Priya Patel", "phone": "9123456789",
            "sensor_data": {"battery_soh": 72, "battery_temp": 58}
        }]"#;
        Arc::new(InMemoryFleet::from_json_str(json).unwrap())
    }

    #[tokio::test]
    async fn test_steps_chain_previous_output() {
        let backend = Arc::new(StepBackend::default());
        let workflow =
            MaintenanceWorkflow::new(ModelConfig::default(), fleet()).with_backend(backend.clone());

        let report = workflow.run("VEH002").await.unwrap();
        assert_eq!(report.vehicle_id, "VEH002");
        assert_eq!(report.vehicle_info.owner, "Ms. Priya Patel");
        assert_eq!(report.analysis, "answer-1");
        assert_eq!(report.diagnosis, "answer-2");
        assert_eq!(report.call_script, "answer-3");

        let prompts = backend.prompts.lock();
        assert!(prompts[0].contains("Battery SOH"));
        assert!(prompts[1].contains("Based on this analysis: answer-1"));
        assert!(prompts[2].contains("customer: Ms. Priya Patel"));
        assert!(prompts[2].contains("Based on this diagnosis: answer-2"));
    }

    #[tokio::test]
    async fn test_unknown_vehicle_stops_before_any_call() {
        let backend = Arc::new(StepBackend::default());
        let workflow =
            MaintenanceWorkflow::new(ModelConfig::default(), fleet()).with_backend(backend.clone());

        let err = workflow.run("VEH404").await.unwrap_err();
        assert!(matches!(err, AutocareError::VehicleNotFound(_)));
        assert!(backend.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_fails_at_initialize() {
        let workflow = MaintenanceWorkflow::new(ModelConfig::default(), fleet());
        let err = workflow.run("VEH002").await.unwrap_err();
        assert!(matches!(err, AutocareError::Config(_)));
    }
}
