use std::{fmt::Display, str::FromStr};

use agency_common::Secret;
use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------   PaymentProvider     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    #[default]
    Xendit,
    Stripe,
    Midtrans,
}

impl Display for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentProvider::Xendit => write!(f, "xendit"),
            PaymentProvider::Stripe => write!(f, "stripe"),
            PaymentProvider::Midtrans => write!(f, "midtrans"),
        }
    }
}

impl FromStr for PaymentProvider {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xendit" => Ok(Self::Xendit),
            "stripe" => Ok(Self::Stripe),
            "midtrans" => Ok(Self::Midtrans),
            s => Err(ConversionError(format!("Unknown payment provider: {s}"))),
        }
    }
}

//--------------------------------------  PaymentEnvironment   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl Display for PaymentEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentEnvironment::Sandbox => write!(f, "sandbox"),
            PaymentEnvironment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for PaymentEnvironment {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            s => Err(ConversionError(format!("Unknown payment environment: {s}"))),
        }
    }
}

//--------------------------------------   PaymentCredential   ---------------------------------------------------------
/// One configured payment-provider API key pair, as held in the `payment_settings` collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentCredential {
    pub id: i64,
    pub provider: PaymentProvider,
    pub public_key: String,
    pub secret_key: Secret<String>,
    pub is_active: bool,
    pub environment: PaymentEnvironment,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields an admin submits when creating or editing a credential.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPaymentCredential {
    #[serde(default)]
    pub provider: PaymentProvider,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub secret_key: Secret<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub environment: PaymentEnvironment,
}

fn default_is_active() -> bool {
    true
}

impl NewPaymentCredential {
    pub fn new<P: Into<String>, S: Into<String>>(provider: PaymentProvider, public_key: P, secret_key: S) -> Self {
        Self {
            provider,
            public_key: public_key.into(),
            secret_key: Secret::new(secret_key.into()),
            is_active: true,
            environment: PaymentEnvironment::Sandbox,
        }
    }

    pub fn with_environment(mut self, environment: PaymentEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Both keys are required. Whitespace-only keys count as empty.
    pub fn has_required_fields(&self) -> bool {
        !self.public_key.trim().is_empty() && !self.secret_key.reveal().trim().is_empty()
    }
}

/// A partial update of a credential record. `None` fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialUpdate {
    pub provider: Option<PaymentProvider>,
    pub public_key: Option<String>,
    pub secret_key: Option<Secret<String>>,
    pub is_active: Option<bool>,
    pub environment: Option<PaymentEnvironment>,
}

impl CredentialUpdate {
    pub fn with_is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.provider.is_none() &&
            self.public_key.is_none() &&
            self.secret_key.is_none() &&
            self.is_active.is_none() &&
            self.environment.is_none()
    }
}

impl From<NewPaymentCredential> for CredentialUpdate {
    fn from(value: NewPaymentCredential) -> Self {
        Self {
            provider: Some(value.provider),
            public_key: Some(value.public_key),
            secret_key: Some(value.secret_key),
            is_active: Some(value.is_active),
            environment: Some(value.environment),
        }
    }
}

//--------------------------------------     ContactStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContactStatus {
    /// A new message that no one has followed up on yet.
    #[default]
    Pending,
    Other(String),
}

impl Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactStatus::Pending => write!(f, "pending"),
            ContactStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<String> for ContactStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            _ => Self::Other(value),
        }
    }
}

impl Serialize for ContactStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContactStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

//--------------------------------------   ContactSubmission   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl NewContactSubmission {
    pub fn new<S: Into<String>>(name: S, email: S, message: S) -> Self {
        Self { name: name.into(), email: email.into(), phone: None, message: message.into() }
    }

    pub fn with_phone<S: Into<String>>(mut self, phone: S) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

//--------------------------------------   TransactionStatus   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Success,
    Other(String),
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Success => write!(f, "success"),
            TransactionStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<String> for TransactionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => Self::Success,
            "" => {
                error!("Transaction with an empty status. Treating it as unsuccessful");
                Self::Other(value)
            },
            _ => Self::Other(value),
        }
    }
}

impl Serialize for TransactionStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

//--------------------------------------      Transaction      ---------------------------------------------------------
/// A payment transaction. The admin panel only ever reads these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: Option<f64>,
    pub currency: String,
    pub status: TransactionStatus,
    pub payment_method: Option<String>,
    pub external_id: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_successful(&self) -> bool {
        self.status == TransactionStatus::Success
    }
}
