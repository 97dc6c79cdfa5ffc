//! Caller-owned state of one prediction form.
//!
//! The session holds the form values, the id of the newest request and the
//! last outcome. Responses are matched to requests through [`RequestTicket`]s:
//! only the newest ticket may update the displayed result, so an older
//! response arriving late is discarded instead of overwriting a newer one.

use crate::api::{ApiError, PredictionResult, PredictionService};
use crate::features::{
    Diagnostic, FeatureSpec, NormalizedFeatureVector, RawForm, RawFormValue, RejectedInput,
    normalize,
};

/// Identifies one request issued by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Everything needed to send one prediction request.
#[derive(Debug, Clone)]
pub struct PendingPrediction {
    pub ticket: RequestTicket,
    pub model_id: String,
    pub vector: NormalizedFeatureVector,
    pub diagnostics: Vec<Diagnostic>,
}

/// What happened to a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome is now the session's latest result.
    Applied,
    /// A newer request was issued meanwhile; the outcome was dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Input rejected: {0}")]
    Rejected(#[from] RejectedInput),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("A newer request replaced this one")]
    Superseded,
}

#[derive(Debug, Clone, Default)]
pub struct PredictionSession {
    model_id: String,
    strict: bool,
    form: RawForm,
    issued: u64,
    in_flight: Option<RequestTicket>,
    latest: Option<Result<PredictionResult, ApiError>>,
}

impl PredictionSession {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Self::default()
        }
    }

    /// Refuse to send forms whose values had to be replaced by defaults.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Switch models; any outstanding response becomes stale.
    pub fn select_model(&mut self, model_id: impl Into<String>) {
        self.model_id = model_id.into();
        self.in_flight = None;
        self.latest = None;
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<RawFormValue>) {
        self.form.insert(name.into(), value.into());
    }

    pub fn clear_field(&mut self, name: &str) -> Option<RawFormValue> {
        self.form.remove(name)
    }

    pub fn form(&self) -> &RawForm {
        &self.form
    }

    /// Fields of `specs` the user has not filled in.
    pub fn missing_fields<'a>(&self, specs: &'a [FeatureSpec]) -> Vec<&'a str> {
        specs
            .iter()
            .filter(|spec| {
                self.form
                    .get(&spec.name)
                    .is_none_or(RawFormValue::is_blank)
            })
            .map(|spec| spec.name.as_str())
            .collect()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn latest(&self) -> Option<&Result<PredictionResult, ApiError>> {
        self.latest.as_ref()
    }

    /// Normalize the form and issue a new ticket, superseding any outstanding one.
    pub fn begin(&mut self, specs: &[FeatureSpec]) -> Result<PendingPrediction, SessionError> {
        let normalized = normalize(specs, &self.form);
        let diagnostics = normalized.diagnostics.clone();
        let vector = if self.strict {
            normalized.into_strict()?
        } else {
            normalized.vector
        };
        if let Some(previous) = self.in_flight {
            tracing::debug!("Request {} superseded before completion", previous.id());
        }
        self.issued += 1;
        let ticket = RequestTicket(self.issued);
        self.in_flight = Some(ticket);
        Ok(PendingPrediction {
            ticket,
            model_id: self.model_id.clone(),
            vector,
            diagnostics,
        })
    }

    /// Record the outcome of `ticket` if it is still the newest request.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<PredictionResult, ApiError>,
    ) -> Completion {
        if self.in_flight != Some(ticket) {
            tracing::debug!("Dropping stale response for request {}", ticket.id());
            return Completion::Stale;
        }
        self.in_flight = None;
        self.latest = Some(outcome);
        Completion::Applied
    }

    /// Begin, send and complete one request against `service`.
    pub fn run<S>(
        &mut self,
        service: &S,
        specs: &[FeatureSpec],
    ) -> Result<PredictionResult, SessionError>
    where
        S: PredictionService + ?Sized,
    {
        let pending = self.begin(specs)?;
        let outcome = service.predict(&pending.model_id, &pending.vector);
        match self.complete(pending.ticket, outcome.clone()) {
            Completion::Applied => outcome.map_err(SessionError::from),
            Completion::Stale => Err(SessionError::Superseded),
        }
    }
}
