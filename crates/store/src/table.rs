//! In-memory view of the backing CSV file.
//!
//! A [`Table`] is the header plus the rows in file order. Column types are
//! inferred per column when the file is parsed: a column is typed only when
//! every cell in it reads back to exactly the same text, otherwise it is text.

use std::collections::HashSet;

use friends_core::record::{FieldMap, FieldValue, JsonFields, Record};
use friends_core::types::{RecordId, ID_COLUMN};

use crate::error::{StoreError, StoreResult};

/// Inferred representation of a column, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    /// Pick the first typed kind that every non-empty cell round-trips
    /// through exactly, falling back to `Text`.
    ///
    /// Writing a row back out reproduces the original cell text, so rows a
    /// mutation does not touch stay byte-for-byte the same.
    fn infer<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> Self {
        let present = cells.filter(|c| !c.is_empty());

        if present.clone().next().is_none() {
            return ColumnKind::Text;
        }
        [ColumnKind::Int, ColumnKind::Float, ColumnKind::Bool]
            .into_iter()
            .find(|kind| present.clone().all(|c| kind.parse_exact(c).is_some()))
            .unwrap_or(ColumnKind::Text)
    }

    /// Typed value for `cell`, only if it formats back to the same text.
    fn parse_exact(self, cell: &str) -> Option<FieldValue> {
        let value = match self {
            ColumnKind::Int => FieldValue::Int(cell.parse().ok()?),
            ColumnKind::Float => {
                let x: f64 = cell.parse().ok()?;
                if !x.is_finite() {
                    return None;
                }
                FieldValue::Float(x)
            }
            ColumnKind::Bool => match cell {
                "true" => FieldValue::Bool(true),
                "false" => FieldValue::Bool(false),
                _ => return None,
            },
            ColumnKind::Text => FieldValue::Text(cell.to_string()),
        };
        (value.to_string() == cell).then_some(value)
    }

    fn parse(self, cell: &str) -> FieldValue {
        if cell.is_empty() {
            return FieldValue::Null;
        }
        self.parse_exact(cell)
            .unwrap_or_else(|| FieldValue::Text(cell.to_string()))
    }
}

/// The whole backing file: header and rows, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    /// Parse CSV bytes into a table.
    ///
    /// An empty input yields an empty table with no columns. Otherwise the
    /// header must name an `id` column, column names must be unique, every
    /// row must have as many fields as the header, and ids must be unique
    /// integers.
    pub fn parse(bytes: &[u8]) -> StoreResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if header.is_empty() {
            return Ok(Self::default());
        }

        let mut seen = HashSet::new();
        if let Some(dup) = header.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(StoreError::Schema(format!("duplicate column '{dup}'")));
        }
        if !header.iter().any(|c| c == ID_COLUMN) {
            return Err(StoreError::Schema(format!(
                "header has no '{ID_COLUMN}' column"
            )));
        }

        let raw = reader.records().collect::<Result<Vec<_>, _>>()?;

        let kinds: Vec<ColumnKind> = (0..header.len())
            .map(|i| ColumnKind::infer(raw.iter().map(move |r| r.get(i).unwrap_or(""))))
            .collect();

        let mut rows = Vec::with_capacity(raw.len());
        let mut ids = HashSet::with_capacity(raw.len());
        for (line, raw_row) in raw.iter().enumerate() {
            let fields: FieldMap = header
                .iter()
                .zip(&kinds)
                .zip(raw_row.iter())
                .map(|((column, kind), cell)| (column.clone(), kind.parse(cell)))
                .collect();
            let record = Record::new(fields);

            // Line numbers are 1-based and count the header.
            let id = record.id().ok_or_else(|| {
                StoreError::Schema(format!("line {}: '{ID_COLUMN}' is not an integer", line + 2))
            })?;
            if !ids.insert(id) {
                return Err(StoreError::Schema(format!("duplicate id {id}")));
            }
            rows.push(record);
        }

        Ok(Self { header, rows })
    }

    /// Serialize the table back to CSV, header first, columns in header order.
    pub fn to_csv(&self) -> StoreResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        if !self.header.is_empty() {
            writer.write_record(&self.header)?;
        }
        for row in &self.rows {
            writer.write_record(self.header.iter().map(|column| {
                row.get(column).map(ToString::to_string).unwrap_or_default()
            }))?;
        }

        writer
            .into_inner()
            .map_err(|e| StoreError::Csv(csv::Error::from(e.into_error())))
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn records(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_records(self) -> Vec<Record> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Linear scan for the row with the given id.
    pub fn find(&self, id: RecordId) -> Option<&Record> {
        self.rows.iter().find(|r| r.id() == Some(id))
    }

    fn position(&self, id: RecordId) -> StoreResult<usize> {
        self.rows
            .iter()
            .position(|r| r.id() == Some(id))
            .ok_or(StoreError::NotFound { id })
    }

    /// Merge `partial` onto the row with the given id and return the result.
    pub fn update(&mut self, id: RecordId, partial: &JsonFields) -> StoreResult<&Record> {
        let index = self.position(id)?;
        let row = &mut self.rows[index];
        row.merge(partial)?;
        Ok(row)
    }

    /// Remove the row with the given id. Other rows keep their order and ids.
    pub fn remove(&mut self, id: RecordId) -> StoreResult<Record> {
        let index = self.position(id)?;
        Ok(self.rows.remove(index))
    }

    /// Append a new row built from `fields`.
    ///
    /// The id is one past the largest existing id, so ids freed by a delete
    /// are never handed out again while a larger one remains. Missing columns
    /// are null; unknown columns and any supplied `id` are ignored without
    /// being converted.
    pub fn insert(&mut self, fields: &JsonFields) -> StoreResult<&Record> {
        if self.header.is_empty() {
            return Err(StoreError::Schema("backing file has no header".into()));
        }

        let id = self.next_id()?;
        let mut record = FieldMap::with_capacity(self.header.len());
        for column in &self.header {
            let value = match fields.get(column) {
                _ if column == ID_COLUMN => FieldValue::Int(id),
                Some(json) => FieldValue::from_json(column, json)?,
                None => FieldValue::Null,
            };
            record.insert(column.clone(), value);
        }

        self.rows.push(Record::new(record));
        Ok(&self.rows[self.rows.len() - 1])
    }

    fn next_id(&self) -> StoreResult<RecordId> {
        match self.rows.iter().filter_map(Record::id).max() {
            None => Ok(1),
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| StoreError::Schema(format!("no id left after {max}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use friends_core::error::CoreError;
    use serde_json::json;

    const FRIENDS: &str = "\
id,first_name,last_name,city,screen_time_minutes
1,Rachel,Green,,
3,Chandler,Bing,New York,
";

    #[test]
    fn parses_rows_in_file_order() {
        let table = Table::parse(FRIENDS.as_bytes()).unwrap();
        assert_eq!(table.header(), ["id", "first_name", "last_name", "city", "screen_time_minutes"]);
        let ids: Vec<_> = table.records().iter().filter_map(Record::id).collect();
        assert_eq!(ids, [1, 3]);
        assert_eq!(
            table.find(1).unwrap().get("city"),
            Some(&FieldValue::Null)
        );
    }

    #[test]
    fn infers_one_kind_per_column() {
        let csv = "id,score,flag,label\n1,2.0,true,x\n2,2.5,false,7\n3,,,\n";
        let table = Table::parse(csv.as_bytes()).unwrap();

        let first = table.find(1).unwrap();
        assert_eq!(first.get("score"), Some(&FieldValue::Float(2.0)));
        assert_eq!(first.get("flag"), Some(&FieldValue::Bool(true)));

        let second = table.find(2).unwrap();
        assert_eq!(second.get("label"), Some(&FieldValue::from("7")));

        let third = table.find(3).unwrap();
        assert_eq!(third.get("score"), Some(&FieldValue::Null));
        assert_eq!(third.get("flag"), Some(&FieldValue::Null));
    }

    #[test]
    fn non_canonical_cells_stay_text() {
        let csv = "\
id,zip,phone,active,rating,nick,mixed
1,02134,12345678901234567890,TRUE,1.50,NaN,2
2,10001,98765432109876543210,False,2,inf,2.5
";
        let table = Table::parse(csv.as_bytes()).unwrap();
        let first = table.find(1).unwrap();

        assert_eq!(first.get("zip"), Some(&FieldValue::from("02134")));
        assert_eq!(first.get("phone"), Some(&FieldValue::from("12345678901234567890")));
        assert_eq!(first.get("active"), Some(&FieldValue::from("TRUE")));
        assert_eq!(first.get("rating"), Some(&FieldValue::from("1.50")));
        assert_eq!(first.get("nick"), Some(&FieldValue::from("NaN")));
        assert_eq!(first.get("mixed"), Some(&FieldValue::from("2")));
        assert_eq!(String::from_utf8(table.to_csv().unwrap()).unwrap(), csv);
    }

    #[test]
    fn padded_numbers_are_not_trimmed() {
        let table = Table::parse(b"id,age\n1, 30\n2,31\n").unwrap();
        assert_eq!(table.find(1).unwrap().get("age"), Some(&FieldValue::from(" 30")));
        assert_eq!(table.find(2).unwrap().get("age"), Some(&FieldValue::from("31")));
    }

    #[test]
    fn empty_input_is_an_empty_table() {
        let table = Table::parse(b"").unwrap();
        assert!(table.is_empty());
        assert!(table.header().is_empty());
    }

    #[test]
    fn header_only_has_columns_but_no_rows() {
        let table = Table::parse(b"id,name\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.header(), ["id", "name"]);
    }

    #[test]
    fn rejects_missing_id_column() {
        assert_matches!(
            Table::parse(b"name\nRoss\n"),
            Err(StoreError::Schema(msg)) if msg.contains("'id'")
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        assert_matches!(
            Table::parse(b"id,name\n1,Ross\n1,Monica\n"),
            Err(StoreError::Schema(msg)) if msg.contains("duplicate id 1")
        );
    }

    #[test]
    fn rejects_non_integer_id() {
        assert_matches!(
            Table::parse(b"id,name\n1,Ross\nabc,Monica\n"),
            Err(StoreError::Schema(_))
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        assert_matches!(
            Table::parse(b"id,name\n1,Ross,extra\n"),
            Err(StoreError::Csv(_))
        );
    }

    #[test]
    fn rewrite_preserves_header_and_quoting() {
        let csv = "id,name,catchphrase\n1,Joey,\"How you doin', baby?\"\n2,Phoebe,\"Smelly cat, smelly cat\"\n";
        let table = Table::parse(csv.as_bytes()).unwrap();
        let written = String::from_utf8(table.to_csv().unwrap()).unwrap();
        assert_eq!(
            written,
            "id,name,catchphrase\n1,Joey,\"How you doin', baby?\"\n2,Phoebe,\"Smelly cat, smelly cat\"\n"
        );
        assert_eq!(Table::parse(written.as_bytes()).unwrap(), table);
    }

    #[test]
    fn update_and_remove_report_not_found() {
        let mut table = Table::parse(FRIENDS.as_bytes()).unwrap();
        assert_matches!(
            table.update(42, &JsonFields::new()),
            Err(StoreError::NotFound { id: 42 })
        );
        assert_matches!(table.remove(42), Err(StoreError::NotFound { id: 42 }));
    }

    #[test]
    fn update_leaves_other_rows_byte_identical() {
        let csv = "id,name,zip,rating\n1,Rachel,02134,1.50\n2,Ross,10001,2\n";
        let mut table = Table::parse(csv.as_bytes()).unwrap();

        table.update(2, json!({"name": "Ross G"}).as_object().unwrap()).unwrap();

        assert_eq!(
            String::from_utf8(table.to_csv().unwrap()).unwrap(),
            "id,name,zip,rating\n1,Rachel,02134,1.50\n2,Ross G,10001,2\n"
        );
    }

    #[test]
    fn insert_uses_next_id_after_max() {
        let mut table = Table::parse(FRIENDS.as_bytes()).unwrap();
        let fields = json!({"first_name": "Monica", "id": 1, "unknown": ["ignored"]});

        let created = table.insert(fields.as_object().unwrap()).unwrap().clone();

        assert_eq!(created.id(), Some(4));
        assert_eq!(created.get("first_name"), Some(&FieldValue::from("Monica")));
        assert_eq!(created.get("last_name"), Some(&FieldValue::Null));
        assert_eq!(created.get("unknown"), None);
        assert_eq!(created.len(), table.header().len());
    }

    #[test]
    fn insert_rejects_container_for_known_column() {
        let mut table = Table::parse(FRIENDS.as_bytes()).unwrap();
        let fields = json!({"first_name": {"given": "Monica"}});

        assert_matches!(
            table.insert(fields.as_object().unwrap()),
            Err(StoreError::Invalid(CoreError::Validation(msg))) if msg.contains("first_name")
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn insert_into_headerless_table_fails() {
        let mut table = Table::default();
        assert_matches!(table.insert(&JsonFields::new()), Err(StoreError::Schema(_)));
    }

    #[test]
    fn insert_after_largest_id_fails_instead_of_wrapping() {
        let mut table = Table::parse(b"id,name\n9223372036854775807,Gunther\n").unwrap();

        assert_matches!(
            table.insert(json!({"name": "Janice"}).as_object().unwrap()),
            Err(StoreError::Schema(msg)) if msg.contains("9223372036854775807")
        );
        assert_eq!(table.len(), 1);
    }
}
