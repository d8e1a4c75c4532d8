use crate::config::ModelConfig;
use autocare_core::TaskKind;
use serde::Serialize;

/// Persona and sampling defaults for one maintenance agent kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentProfile {
    /// Kind the profile belongs to.
    pub kind: TaskKind,
    /// Job title the model is asked to play.
    pub role: &'static str,
    /// What the agent is asked to achieve.
    pub goal: &'static str,
    /// Domain background given to the model.
    pub backstory: &'static str,
    /// Fixed sampling temperature. `None` follows the model configuration.
    pub temperature: Option<f32>,
}

impl AgentProfile {
    /// Profile temperature, falling back to the model's.
    pub fn temperature_for(&self, model: &ModelConfig) -> f32 {
        self.temperature.unwrap_or(model.temperature)
    }

    /// System message sent ahead of every prompt for this kind.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are a {}.\nYour goal: {}.\nBackground: {}.\n\
             Answer in plain text using the exact section labels the request asks for.",
            self.role, self.goal, self.backstory
        )
    }
}

/// Profiles for every kind, in [`TaskKind::ALL`] order.
pub fn default_profiles() -> Vec<AgentProfile> {
    TaskKind::ALL.into_iter().map(profile_for).collect()
}

/// Built-in profile for `kind`.
pub fn profile_for(kind: TaskKind) -> AgentProfile {
    match kind {
        TaskKind::DataAnalysis => AgentProfile {
            kind,
            role: "Vehicle Telematics Monitoring Specialist",
            goal: "Analyze vehicle sensor data from ICE and EV vehicles to detect anomalies",
            backstory: "Expert automotive analyst that monitors vehicle health around the clock \
                        across diverse powertrains",
            temperature: None,
        },
        TaskKind::Diagnosis => AgentProfile {
            kind,
            role: "Automotive Diagnostic Expert with 20 years experience",
            goal: "Predict specific component failures with time and cost estimates",
            backstory: "Master diagnostician who can predict what will fail, when, and what \
                        the repair will cost",
            temperature: None,
        },
        TaskKind::Scheduling => AgentProfile {
            kind,
            role: "Appointment Coordinator",
            goal: "Book maintenance appointments efficiently",
            backstory: "Experienced scheduler with access to service center availability",
            temperature: Some(0.3),
        },
        // Conversational output reads better with more sampling freedom.
        TaskKind::CustomerEngagement => AgentProfile {
            kind,
            role: "Customer Service Voice Assistant with excellent communication skills",
            goal: "Persuade customers to schedule maintenance through empathetic conversation",
            backstory: "Professional assistant trained in empathetic communication, objection \
                        handling, and customer psychology",
            temperature: Some(0.7),
        },
        TaskKind::Feedback => AgentProfile {
            kind,
            role: "Customer Satisfaction Analyst",
            goal: "Generate post-service surveys",
            backstory: "Expert in customer experience",
            temperature: Some(0.3),
        },
        TaskKind::ManufacturingInsights => AgentProfile {
            kind,
            role: "Manufacturing Quality Engineer",
            goal: "Find recurring failure patterns across the fleet and turn them into \
                   design and supplier feedback",
            backstory: "Reliability engineer who links field telemetry to root causes on the \
                        production line",
            temperature: None,
        },
    }
}
