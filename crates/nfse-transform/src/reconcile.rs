//! One-directional reconciliation of the authority table against the ledger.
//!
//! Every authority row is kept and tagged with an [`Origin`]; the rows tagged
//! `authority_only` form the follow-up list. Ledger rows without an authority
//! counterpart are only counted.

use std::collections::BTreeSet;

use polars::prelude::{Column, DataFrame};
use tracing::{debug, warn};

use nfse_model::{CLIENT, INVOICE_NUMBER, Origin, REGION_CODE, SourceRole};

use crate::data_utils::{column_i64, column_strings, require_column};
use crate::error::Result;

/// Name of the origin marker column added to the authority table.
pub const ORIGIN: &str = "origin";

/// Result of joining the authority table to the ledger.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Authority table with an `origin` column, rows in input order.
    pub tagged: DataFrame,
    /// `authority_only` rows projected to client, invoice number and region,
    /// sorted by region, client, invoice number.
    pub unmatched: DataFrame,
    pub matched_rows: usize,
    /// Distinct ledger keys with no authority row.
    pub ledger_only_keys: usize,
    /// Authority rows whose invoice number does not read as an integer.
    pub unreadable_invoices: Vec<UnreadableInvoice>,
}

/// An authority row listed with a null invoice number, with the raw value
/// it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableInvoice {
    /// Row position in the authority table handed to [`reconcile`].
    pub row: usize,
    pub client: String,
    pub value: String,
}

type JoinKey = (String, i64);

fn join_keys(df: &DataFrame) -> Result<Vec<(String, Option<i64>)>> {
    let clients = column_strings(df, CLIENT)?;
    let invoices = column_i64(df, INVOICE_NUMBER)?;
    Ok(clients.into_iter().zip(invoices).collect())
}

/// Join `authority` (driving side) to `ledger` on `(client, invoice_number)`.
///
/// Matching is a set-membership test, so repeated ledger keys never repeat
/// an authority row. An authority invoice number that does not read as an
/// integer never matches.
pub fn reconcile(authority: &DataFrame, ledger: &DataFrame) -> Result<Reconciliation> {
    for column in [CLIENT, INVOICE_NUMBER, REGION_CODE] {
        require_column(authority, SourceRole::Authority, column)?;
    }
    for column in [CLIENT, INVOICE_NUMBER] {
        require_column(ledger, SourceRole::Ledger, column)?;
    }

    let ledger_keys: BTreeSet<JoinKey> = join_keys(ledger)?
        .into_iter()
        .filter_map(|(client, invoice)| invoice.map(|invoice| (client, invoice)))
        .collect();
    let authority_keys = join_keys(authority)?;

    let origins: Vec<Origin> = authority_keys
        .iter()
        .map(|(client, invoice)| match invoice {
            Some(invoice) if ledger_keys.contains(&(client.clone(), *invoice)) => Origin::Matched,
            _ => Origin::AuthorityOnly,
        })
        .collect();
    let matched_rows = origins.iter().filter(|o| **o == Origin::Matched).count();

    let authority_set: BTreeSet<JoinKey> = authority_keys
        .iter()
        .filter_map(|(client, invoice)| invoice.map(|invoice| (client.clone(), invoice)))
        .collect();
    let ledger_only_keys = ledger_keys.difference(&authority_set).count();

    let mut tagged = authority.clone();
    let labels: Vec<&str> = origins.iter().map(|origin| origin.as_str()).collect();
    tagged.with_column(Column::new(ORIGIN.into(), labels))?;

    let unreadable_invoices = collect_unreadable(authority, &authority_keys)?;
    if !unreadable_invoices.is_empty() {
        warn!(
            count = unreadable_invoices.len(),
            "authority invoice numbers not readable as integers, listed as null"
        );
    }

    let unmatched = unmatched_records(authority, &authority_keys, &origins)?;
    debug!(
        authority_rows = authority.height(),
        ledger_rows = ledger.height(),
        matched_rows,
        unmatched_rows = unmatched.height(),
        ledger_only_keys,
        "reconciled"
    );
    Ok(Reconciliation {
        tagged,
        unmatched,
        matched_rows,
        ledger_only_keys,
        unreadable_invoices,
    })
}

fn collect_unreadable(
    authority: &DataFrame,
    keys: &[(String, Option<i64>)],
) -> Result<Vec<UnreadableInvoice>> {
    let raw = column_strings(authority, INVOICE_NUMBER)?;
    Ok(keys
        .iter()
        .zip(raw)
        .enumerate()
        .filter(|(_, ((_, invoice), _))| invoice.is_none())
        .map(|(row, ((client, _), value))| UnreadableInvoice {
            row,
            client: client.clone(),
            value,
        })
        .collect())
}

fn unmatched_records(
    authority: &DataFrame,
    keys: &[(String, Option<i64>)],
    origins: &[Origin],
) -> Result<DataFrame> {
    let regions = column_strings(authority, REGION_CODE)?;
    let mut rows: Vec<(&str, &str, Option<i64>)> = keys
        .iter()
        .zip(&regions)
        .zip(origins)
        .filter(|(_, origin)| **origin == Origin::AuthorityOnly)
        .map(|(((client, invoice), region), _)| (region.as_str(), client.as_str(), *invoice))
        .collect();
    rows.sort();

    let clients: Vec<&str> = rows.iter().map(|(_, client, _)| *client).collect();
    let invoices: Vec<Option<i64>> = rows.iter().map(|(_, _, invoice)| *invoice).collect();
    let regions: Vec<&str> = rows.iter().map(|(region, _, _)| *region).collect();
    Ok(DataFrame::new(vec![
        Column::new(CLIENT.into(), clients),
        Column::new(INVOICE_NUMBER.into(), invoices),
        Column::new(REGION_CODE.into(), regions),
    ])?)
}
