//! Invoice records as exported by the accounting application.
//!
//! Only what delivery needs is modelled: identity, kind, posting state, and
//! the customer's contact numbers. Lookup and PDF rendering stay with the
//! host application behind [`InvoiceStore`] and [`InvoiceRenderer`].

mod render;
mod store;

pub use render::{CommandRenderer, InvoiceRenderer, RENDER_TARGET, RenderError};
pub use store::{InvoiceStore, JsonInvoiceStore, StoreError};

use serde::{Deserialize, Serialize};

/// Minimum length of a usable phone number (country code included).
pub const MIN_PHONE_LEN: usize = 10;

/// Accounting document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    Entry,
    OutInvoice,
    OutRefund,
    InInvoice,
    InRefund,
    OutReceipt,
    InReceipt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceState {
    Draft,
    Posted,
    Cancel,
}

/// Report template used to render an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTemplate {
    /// Posted invoices, including payment information.
    InvoiceWithPayments,
    /// Drafts and cancelled invoices.
    InvoiceWithoutPayments,
}

impl ReportTemplate {
    /// The one place that maps posting state to a template.
    pub fn for_state(state: InvoiceState) -> Self {
        match state {
            InvoiceState::Posted => Self::InvoiceWithPayments,
            InvoiceState::Draft | InvoiceState::Cancel => Self::InvoiceWithoutPayments,
        }
    }

    /// Template name passed to the renderer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvoiceWithPayments => "account.account_invoices",
            Self::InvoiceWithoutPayments => "account.account_invoices_without_payment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
}

impl Partner {
    /// Mobile if set, otherwise phone, as entered.
    pub fn contact_number(&self) -> Option<&str> {
        [self.mobile.as_deref(), self.phone.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    /// Display name such as "INV/2024/00042"; unset on fresh drafts.
    #[serde(default)]
    pub name: Option<String>,
    pub kind: InvoiceKind,
    pub state: InvoiceState,
    #[serde(default)]
    pub partner: Option<Partner>,
}

impl Invoice {
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.id.to_string(),
        }
    }

    /// Only customer invoices are ever sent or served.
    pub fn is_customer_invoice(&self) -> bool {
        self.kind == InvoiceKind::OutInvoice
    }

    pub fn report_template(&self) -> ReportTemplate {
        ReportTemplate::for_state(self.state)
    }

    /// Download filename, safe to place inside a quoted header parameter.
    pub fn attachment_filename(&self) -> String {
        let name: String = self
            .display_name()
            .chars()
            .map(|c| match c {
                '"' | '\\' | '/' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        format!("Invoice-{}.pdf", name)
    }

    /// Customer number reduced to digits and `+`, if long enough to dial.
    pub fn partner_phone(&self) -> Option<String> {
        let raw = self.partner.as_ref()?.contact_number()?;
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        (cleaned.len() >= MIN_PHONE_LEN).then_some(cleaned)
    }
}
