//! Content fingerprints for inputs and runs.
//!
//! The dataset hash covers every raw field of every row in input order, so
//! reordering the log changes it. The run id combines the dataset hash with
//! the configuration hash: same input + same settings → same id.

use tradelens_core::RawLeg;

/// Length of the run id prefix used for artifact directory names.
pub const RUN_DIR_PREFIX_LEN: usize = 16;

/// Compute a deterministic BLAKE3 hash over raw input rows.
pub fn dataset_hash(raws: &[RawLeg]) -> String {
    let mut hasher = blake3::Hasher::new();

    for raw in raws {
        hasher.update(&(raw.row as u64).to_le_bytes());
        for field in [
            &raw.date,
            &raw.trigger_time,
            &raw.trade_ref,
            &raw.side,
            &raw.symbol,
            &raw.price,
            &raw.quantity,
            &raw.brokerage,
            &raw.other_charges,
        ] {
            // length prefix keeps ("ab","c") distinct from ("a","bc")
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
    }

    hasher.finalize().to_hex().to_string()
}

/// Run id: BLAKE3 of the config hash followed by the dataset hash.
pub fn run_id(config_hash: &str, dataset_hash: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(config_hash.as_bytes());
    hasher.update(dataset_hash.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Short form of a run id for directory names.
pub fn run_dir_name(run_id: &str) -> &str {
    &run_id[..run_id.len().min(RUN_DIR_PREFIX_LEN)]
}
