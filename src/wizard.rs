//! Step sequencing for the verification wizard.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::countries::CountryRecord;
use crate::types::{DocumentKind, DocumentType, VerificationSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    SelectCountry,
    SelectDocument,
    /// Index into the chosen document's sides.
    Capture(usize),
    Complete,
}

/// A document side the service accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedSide {
    pub document_type: DocumentType,
    pub tracking_id: String,
}

/// What the user has chosen so far, scoped to one verification session.
#[derive(Debug, Clone, Serialize)]
pub struct Wizard {
    pub session: VerificationSession,
    pub country: Option<CountryRecord>,
    pub document: Option<DocumentKind>,
    pub accepted: Vec<AcceptedSide>,
}

impl Wizard {
    pub fn new(session: VerificationSession) -> Self {
        Self { session, country: None, document: None, accepted: Vec::new() }
    }

    pub fn choose_country(&mut self, country: CountryRecord) {
        tracing::info!(session = %self.session, code = %country.country_code, "country selected");
        self.country = Some(country);
    }

    /// Picking a (different) document starts its captures over.
    pub fn choose_document(&mut self, kind: DocumentKind) {
        if self.document != Some(kind) {
            self.accepted.clear();
        }
        tracing::info!(session = %self.session, document = kind.label(), "document selected");
        self.document = Some(kind);
    }

    pub fn sides(&self) -> Vec<DocumentType> {
        self.document.map(|k| k.sides()).unwrap_or_default()
    }

    pub fn side(&self, index: usize) -> Option<DocumentType> {
        self.sides().get(index).copied()
    }

    pub fn record_accepted(&mut self, document_type: DocumentType, tracking_id: String) {
        self.accepted.retain(|a| a.document_type != document_type);
        self.accepted.push(AcceptedSide { document_type, tracking_id });
    }

    pub fn is_complete(&self) -> bool {
        let sides = self.sides();
        !sides.is_empty() && sides.iter().all(|s| self.accepted.iter().any(|a| a.document_type == *s))
    }

    pub fn next_step(&self, current: WizardStep) -> WizardStep {
        match current {
            WizardStep::SelectCountry => WizardStep::SelectDocument,
            WizardStep::SelectDocument => WizardStep::Capture(0),
            WizardStep::Capture(i) if i + 1 < self.sides().len() => WizardStep::Capture(i + 1),
            WizardStep::Capture(_) | WizardStep::Complete => WizardStep::Complete,
        }
    }
}

/// Fires once, a fixed delay after the latest selection.
#[derive(Debug, Clone)]
pub struct AutoAdvance {
    delay: Duration,
    deadline: Option<Instant>,
}

impl AutoAdvance {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
