/// Two-pass snapshot reconciliation.
pub mod grant_diff;
