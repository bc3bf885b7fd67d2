use serde::Serialize;
use tracing::{info, warn};

pub(crate) const TARGET: &str = "telemetry::call_session";
pub(crate) const EVENT_PHASE: &str = "call_phase_transition";
pub(crate) const EVENT_TRIGGER: &str = "trigger_detected";
pub(crate) const EVENT_PROVIDER_ERROR: &str = "provider_error";
pub(crate) const EVENT_GENERATION: &str = "generation_dispatch";
pub(crate) const EVENT_FEEDBACK: &str = "feedback_dispatch";

#[derive(Debug, Serialize)]
pub struct PhaseTransitionEvent {
    pub session_id: String,
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TriggerDetectedEvent {
    pub session_id: String,
    pub intent: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ProviderErrorEvent {
    pub session_id: String,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationDispatchEvent {
    pub session_id: String,
    pub outcome: &'static str,
    pub question_count: u32,
}

#[derive(Debug, Serialize)]
pub struct FeedbackDispatchEvent {
    pub session_id: String,
    pub outcome: &'static str,
    pub transcript_len: usize,
}

pub fn record_phase_transition(session_id: &str, from: &'static str, to: &'static str) {
    let event = PhaseTransitionEvent {
        session_id: session_id.to_string(),
        from,
        to,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_PHASE,
            session_id = %event.session_id,
            from = event.from,
            to = event.to,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_PHASE,
            %err,
            "failed to encode phase transition event"
        ),
    }
}

pub fn record_trigger_detected(session_id: &str, intent: &'static str) {
    let event = TriggerDetectedEvent {
        session_id: session_id.to_string(),
        intent,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_TRIGGER,
            session_id = %event.session_id,
            intent = event.intent,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_TRIGGER,
            %err,
            "failed to encode trigger detection event"
        ),
    }
}

pub fn record_provider_error(session_id: &str, kind: &'static str, message: &str) {
    let event = ProviderErrorEvent {
        session_id: session_id.to_string(),
        kind,
        message: message.to_string(),
    };

    match serde_json::to_string(&event) {
        Ok(payload) => warn!(
            target: TARGET,
            event = EVENT_PROVIDER_ERROR,
            session_id = %event.session_id,
            kind = event.kind,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_PROVIDER_ERROR,
            %err,
            "failed to encode provider error event"
        ),
    }
}

pub fn record_generation_dispatch(session_id: &str, outcome: &'static str, question_count: u32) {
    let event = GenerationDispatchEvent {
        session_id: session_id.to_string(),
        outcome,
        question_count,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_GENERATION,
            session_id = %event.session_id,
            outcome = event.outcome,
            question_count = event.question_count,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_GENERATION,
            %err,
            "failed to encode generation dispatch event"
        ),
    }
}

pub fn record_feedback_dispatch(session_id: &str, outcome: &'static str, transcript_len: usize) {
    let event = FeedbackDispatchEvent {
        session_id: session_id.to_string(),
        outcome,
        transcript_len,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_FEEDBACK,
            session_id = %event.session_id,
            outcome = event.outcome,
            transcript_len = event.transcript_len,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_FEEDBACK,
            %err,
            "failed to encode feedback dispatch event"
        ),
    }
}
