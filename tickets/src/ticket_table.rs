//! Raw ticket records as read from CSV.
use crate::error::{Result, TicketError};
use std::io;
use std::path::Path;

/// Yes/no tag columns describing each ticket, in model input order.
pub const FEATURE_COLUMNS: [&str; 9] = [
    "Request",
    "Incident",
    "WebServices",
    "Login",
    "Wireless",
    "Printing",
    "IdCards",
    "Staff",
    "Students",
];

/// Column holding the team a ticket was routed to.
pub const LABEL_COLUMN: &str = "Response Team";

/// A CSV table of string cells with a header row.
#[derive(Clone, Debug, PartialEq)]
pub struct TicketTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TicketTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads a headed CSV, trimming whitespace around every cell.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.iter().map(str::to_owned).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_owned).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every cell of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<String>> {
        let index = self
            .headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| TicketError::MissingColumn(name.to_owned()))?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect())
    }
}
