use std::io::Read;

use crate::core_api::ParseError;

/// Number of player columns in every row of the export.
pub const PLAYER_SLOTS: usize = 4;
const LEADING_COLUMNS: usize = 3;

/// One data row projected onto the fixed export layout:
/// `[game number, date, field name, player 1..4]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub line: u64,
    pub game_no: String,
    pub date: String,
    pub field: String,
    pub values: [String; PLAYER_SLOTS],
}

impl RawRow {
    /// Missing trailing cells become empty strings; cells past the last
    /// player column are ignored.
    pub fn from_cells<S: AsRef<str>>(line: u64, cells: &[S]) -> Self {
        let cell = |index: usize| {
            cells
                .get(index)
                .map(|c| c.as_ref().to_string())
                .unwrap_or_default()
        };

        Self {
            line,
            game_no: cell(0).trim().to_string(),
            date: cell(1),
            field: cell(2),
            values: std::array::from_fn(|slot| cell(LEADING_COLUMNS + slot)),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.game_no.is_empty()
            && self.date.trim().is_empty()
            && self.field.trim().is_empty()
            && self.values.iter().all(|v| v.trim().is_empty())
    }
}

/// Reads the whole export at once, dropping the leading header block.
pub struct GridReader<R> {
    inner: csv::Reader<R>,
    header_rows: usize,
}

impl<R: Read> GridReader<R> {
    pub fn new(inner: R, header_rows: usize) -> Self {
        let inner = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(inner);
        Self { inner, header_rows }
    }

    pub fn read_rows(mut self) -> Result<Vec<RawRow>, ParseError> {
        let mut rows = Vec::new();
        for (index, record) in self.inner.records().enumerate() {
            let record = record?;
            if index < self.header_rows {
                continue;
            }
            let line = record
                .position()
                .map(|pos| pos.line())
                .unwrap_or(index as u64 + 1);
            let cells: Vec<&str> = record.iter().collect();
            rows.push(RawRow::from_cells(line, &cells));
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::{GridReader, RawRow};

    #[test]
    fn header_block_is_skipped() {
        let input = "Catan log,,,,,,\n#,Date,Field,P1,P2,P3,P4\n1,2021-01-02,Player,Ann,Bob,,\n";
        let rows = GridReader::new(input.as_bytes(), 2)
            .read_rows()
            .expect("grid should read");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].game_no, "1");
        assert_eq!(rows[0].field, "Player");
        assert_eq!(rows[0].values[0], "Ann");
        assert_eq!(rows[0].values[3], "");
        assert_eq!(rows[0].line, 3);
    }

    #[test]
    fn short_and_long_rows_project_onto_seven_columns() {
        let short = RawRow::from_cells(1, &["", "", "Score", "10"]);
        assert_eq!(short.values, ["10", "", "", ""].map(String::from));

        let long = RawRow::from_cells(1, &["", "", "Score", "1", "2", "3", "4", "extra"]);
        assert_eq!(long.values, ["1", "2", "3", "4"].map(String::from));
    }

    #[test]
    fn quoted_cells_keep_their_delimiters() {
        let input = "h\nh\n,,Extra points,\"roads, my\",merchant,,\n";
        let rows = GridReader::new(input.as_bytes(), 2)
            .read_rows()
            .expect("grid should read");
        assert_eq!(rows[0].values[0], "roads, my");
    }

    #[test]
    fn blank_rows_are_detected() {
        assert!(RawRow::from_cells(1, &["", " ", "", "", "", "", ""]).is_blank());
        assert!(!RawRow::from_cells(1, &["", "", "Score"]).is_blank());
    }
}
