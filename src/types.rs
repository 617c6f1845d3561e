use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Identifier threading every capture and API call of one user's check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationSession(String);

impl VerificationSession {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Fresh session id when none was handed to us upstream.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which camera the stream is opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    User,
    Environment,
}

/// The physical document the user holds up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Passport,
    IdCard,
    DrivingLicence,
}

impl DocumentKind {
    pub fn all() -> [DocumentKind; 3] {
        [DocumentKind::Passport, DocumentKind::IdCard, DocumentKind::DrivingLicence]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Passport => "Passport",
            DocumentKind::IdCard => "National ID card",
            DocumentKind::DrivingLicence => "Driving licence",
        }
    }

    /// Sides the wizard asks for, in capture order.
    pub fn sides(&self) -> Vec<DocumentType> {
        match self {
            DocumentKind::Passport => vec![DocumentType::Passport],
            DocumentKind::IdCard => vec![DocumentType::IdCardFront, DocumentType::IdCardBack],
            DocumentKind::DrivingLicence => {
                vec![DocumentType::DrivingLicenceFront, DocumentType::DrivingLicenceBack]
            }
        }
    }
}

/// One submitted document side, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    IdCardFront,
    IdCardBack,
    DrivingLicenceFront,
    DrivingLicenceBack,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Passport => "passport",
            DocumentType::IdCardFront => "id_card_front",
            DocumentType::IdCardBack => "id_card_back",
            DocumentType::DrivingLicenceFront => "driving_licence_front",
            DocumentType::DrivingLicenceBack => "driving_licence_back",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Passport => "Passport photo page",
            DocumentType::IdCardFront => "ID card (front)",
            DocumentType::IdCardBack => "ID card (back)",
            DocumentType::DrivingLicenceFront => "Driving licence (front)",
            DocumentType::DrivingLicenceBack => "Driving licence (back)",
        }
    }

    /// Documents are shot with the rear camera.
    pub fn facing(&self) -> Facing {
        Facing::Environment
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passport" => Ok(DocumentType::Passport),
            "id_card_front" => Ok(DocumentType::IdCardFront),
            "id_card_back" => Ok(DocumentType::IdCardBack),
            "driving_licence_front" => Ok(DocumentType::DrivingLicenceFront),
            "driving_licence_back" => Ok(DocumentType::DrivingLicenceBack),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}
