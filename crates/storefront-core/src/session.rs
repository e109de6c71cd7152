//! # Payment Session Projection
//!
//! Read-only view of a processor checkout session, as returned by
//! `GET checkout/status/{session_id}`. The processor owns the session; the
//! client only ever sees these snapshots.

use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Whether money has moved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Lifecycle of the session itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Open,
    Complete,
    Expired,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One status check result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    #[serde(default)]
    pub payment_status: PaymentStatus,

    #[serde(default)]
    pub status: SessionState,

    /// Amount in the smallest currency unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl SessionStatus {
    pub fn new(payment_status: PaymentStatus, status: SessionState) -> Self {
        Self {
            payment_status,
            status,
            amount_total: None,
            currency: None,
        }
    }

    /// Builder: set the charged amount
    pub fn with_amount(mut self, amount_total: i64, currency: Currency) -> Self {
        self.amount_total = Some(amount_total);
        self.currency = Some(currency.as_str().to_string());
        self
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    pub fn is_expired(&self) -> bool {
        self.status == SessionState::Expired
    }

    /// Charged amount, falling back to `default_currency` when the
    /// processor did not say (or said something unrecognised)
    pub fn amount(&self, default_currency: Currency) -> Option<Money> {
        let currency = self
            .currency
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(default_currency);
        self.amount_total
            .map(|amount| Money::from_minor_units(amount, currency))
    }
}
