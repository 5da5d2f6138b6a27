//! Library side of the `nfse-recon` command: logging setup, the
//! load/reconcile/emit driver, the header report and the run summary.

pub mod inspect;
pub mod logging;
pub mod pipeline;
pub mod types;
