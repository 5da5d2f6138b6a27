//! Canonical schema shared by both invoice sources.
//!
//! Each source arrives with its own native headers. After column
//! normalization the native names are mapped onto these fields, and every
//! later stage only refers to the canonical names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Party name on the invoice.
pub const CLIENT: &str = "client";
/// Integer invoice identifier.
pub const INVOICE_NUMBER: &str = "invoice_number";
/// Two-letter state (UF) code.
pub const REGION_CODE: &str = "region_code";
/// Monetary amount of the invoice.
pub const AMOUNT: &str = "amount";

/// Fields every source must provide after schema mapping.
pub const REQUIRED_FIELDS: [CanonicalField; 4] = [
    CanonicalField::Client,
    CanonicalField::InvoiceNumber,
    CanonicalField::RegionCode,
    CanonicalField::Amount,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Client,
    InvoiceNumber,
    RegionCode,
    Amount,
}

impl CanonicalField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => CLIENT,
            Self::InvoiceNumber => INVOICE_NUMBER,
            Self::RegionCode => REGION_CODE,
            Self::Amount => AMOUNT,
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two extracts a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRole {
    /// Municipal tax-filing authority (reference side).
    Authority,
    /// Internal accounting ledger.
    Ledger,
}

impl SourceRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authority => "authority",
            Self::Ledger => "ledger",
        }
    }
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag attached to each authority row after the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Key present in both sources.
    Matched,
    /// Key present only in the authority extract.
    AuthorityOnly,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::AuthorityOnly => "authority_only",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
