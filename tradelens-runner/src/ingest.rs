//! Execution-log ingestion: delimited text → `RawLeg` records.
//!
//! Headers are resolved once through the configured `ColumnMap`; every
//! field is kept as trimmed text for the normalizer. Row numbers count
//! data records from 1 (the header is not a row).
//!
//! A missing required header fails the load. A record that cannot be read
//! or is too short is reported for its row and skipped.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use tradelens_core::{LegError, RawLeg};

use crate::config::ColumnMap;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read header row: {0}")]
    Header(#[from] csv::Error),

    #[error("required column '{header}' (for {field}) not found in input header")]
    MissingColumn { field: &'static str, header: String },
}

/// Records read from one input file.
#[derive(Debug, Clone, Default)]
pub struct LoadedLegs {
    pub legs: Vec<RawLeg>,
    /// Rows that could not be turned into a `RawLeg` at all.
    pub unreadable: Vec<LegError>,
}

impl LoadedLegs {
    /// Data rows seen, readable or not.
    pub fn row_count(&self) -> usize {
        self.legs.len() + self.unreadable.len()
    }
}

/// Load raw legs from a CSV file.
pub fn load_legs(path: &Path, columns: &ColumnMap) -> Result<LoadedLegs, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = read_legs(file, columns)?;
    info!(
        path = %path.display(),
        rows = loaded.row_count(),
        unreadable = loaded.unreadable.len(),
        "execution log loaded"
    );
    Ok(loaded)
}

/// Read raw legs from any CSV source.
pub fn read_legs<R: Read>(reader: R, columns: &ColumnMap) -> Result<LoadedLegs, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let index = ColumnIndex::resolve(&headers, columns)?;

    let mut loaded = LoadedLegs::default();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let extracted = match result {
            Ok(record) => index.extract(row, &record),
            Err(e) => Err(unreadable(row, e.to_string())),
        };
        match extracted {
            Ok(leg) => loaded.legs.push(leg),
            Err(e) => {
                debug!(row, error = %e, "unreadable record");
                loaded.unreadable.push(e);
            }
        }
    }
    Ok(loaded)
}

fn unreadable(row: usize, detail: String) -> LegError {
    LegError::Parse {
        row,
        field: "record".into(),
        value: detail,
    }
}

/// Positions of the nine required columns, in `RawLeg` field order.
struct ColumnIndex([usize; 9]);

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, columns: &ColumnMap) -> Result<Self, LoadError> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let mut idx = [0usize; 9];
        for (slot, (field, header)) in idx.iter_mut().zip(columns.entries()) {
            let wanted = normalize_header(header);
            *slot = names
                .iter()
                .position(|n| *n == wanted)
                .ok_or_else(|| LoadError::MissingColumn {
                    field,
                    header: header.to_string(),
                })?;
        }
        Ok(Self(idx))
    }

    fn extract(&self, row: usize, record: &csv::StringRecord) -> Result<RawLeg, LegError> {
        let width = self.0.iter().copied().max().unwrap_or(0) + 1;
        if record.len() < width {
            return Err(unreadable(
                row,
                format!("{} field(s), expected at least {width}", record.len()),
            ));
        }
        let field = |i: usize| record.get(self.0[i]).unwrap_or_default().to_string();
        Ok(RawLeg {
            row,
            date: field(0),
            trigger_time: field(1),
            trade_ref: field(2),
            side: field(3),
            symbol: field(4),
            price: field(5),
            quantity: field(6),
            brokerage: field(7),
            other_charges: field(8),
        })
    }
}

/// Header comparison ignores case, surrounding space, and a UTF-8 BOM.
fn normalize_header(h: &str) -> String {
    h.trim_start_matches('\u{feff}').trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Date,Trigger Time,Trade_Ref,Buy/Sell,Symbol,Trade Price,Qty,Brokerage,Other_Charges\n";

    fn read(body: &str) -> Result<LoadedLegs, LoadError> {
        read_legs(format!("{HEADER}{body}").as_bytes(), &ColumnMap::default())
    }

    #[test]
    fn reads_rows_in_order_with_row_numbers() {
        let loaded = read(
            "2024-03-04,09:15:00,T1,Buy,NIFTYFUT,100,10,-5,-1\n\
             2024-03-04,09:45:00,T1, Sell ,NIFTYFUT,110,10,-5,-1\n",
        )
        .unwrap();
        assert_eq!(loaded.legs.len(), 2);
        assert!(loaded.unreadable.is_empty());
        assert_eq!(loaded.legs[0].row, 1);
        assert_eq!(loaded.legs[1].row, 2);
        assert_eq!(loaded.legs[1].side, "Sell");
        assert_eq!(loaded.legs[0].price, "100");
        assert_eq!(loaded.legs[0].other_charges, "-1");
    }

    #[test]
    fn columns_may_come_in_any_order() {
        let csv = "Qty,Symbol,Buy/Sell,Trade_Ref,Trade Price,Date,Trigger Time,Other_Charges,Brokerage,Notes\n\
                   5,SBIN,buy,X9,600.5,04-03-2024,10:01,-0.5,-2,manual\n";
        let loaded = read_legs(csv.as_bytes(), &ColumnMap::default()).unwrap();
        let leg = &loaded.legs[0];
        assert_eq!(leg.quantity, "5");
        assert_eq!(leg.trade_ref, "X9");
        assert_eq!(leg.date, "04-03-2024");
        assert_eq!(leg.brokerage, "-2");
        assert_eq!(leg.other_charges, "-0.5");
    }

    #[test]
    fn missing_header_is_fatal() {
        let csv = "Date,Trigger Time,Trade_Ref,Buy/Sell,Symbol,Trade Price,Qty,Brokerage\n";
        let err = read_legs(csv.as_bytes(), &ColumnMap::default()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingColumn { field: "other_charges", .. }
        ));
    }

    #[test]
    fn custom_header_names_and_bom() {
        let columns = ColumnMap {
            trade_ref: "Order ID".into(),
            ..Default::default()
        };
        let csv = "\u{feff}date,trigger time,ORDER ID,buy/sell,symbol,trade price,qty,brokerage,other_charges\n\
                   2024-03-04,09:15,A1,Buy,SBIN,1,1,0,0\n";
        let loaded = read_legs(csv.as_bytes(), &columns).unwrap();
        assert_eq!(loaded.legs[0].trade_ref, "A1");
    }

    #[test]
    fn short_row_is_reported_not_fatal() {
        let loaded = read(
            "2024-03-04,09:15:00,T1,Buy,NIFTYFUT,100,10,-5,-1\n\
             2024-03-04,09:45:00,T1\n\
             2024-03-04,09:45:00,T1,Sell,NIFTYFUT,110,10,-5,-1\n",
        )
        .unwrap();
        assert_eq!(loaded.legs.len(), 2);
        assert_eq!(loaded.unreadable.len(), 1);
        assert_eq!(loaded.unreadable[0].row(), 2);
        assert_eq!(loaded.legs[1].row, 3);
        assert_eq!(loaded.row_count(), 3);
    }

    #[test]
    fn empty_costs_stay_empty_text() {
        let loaded = read("2024-03-04,09:15:00,T1,Buy,NIFTYFUT,100,10,,\n").unwrap();
        assert_eq!(loaded.legs[0].brokerage, "");
        assert_eq!(loaded.legs[0].other_charges, "");
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_legs(Path::new("/nonexistent/log.csv"), &ColumnMap::default()).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/log.csv"));
    }
}
