use std::collections::VecDeque;

use crate::client::{self, Cursor, Executor, Target};
use crate::error;
use crate::row::decode_row;

/// A scripted client: queries replay pushed result sets in order and every
/// statement is recorded.
#[derive(Debug, Default)]
pub struct TestClient {
    results: VecDeque<Result<ResultSet>>,
    execute_results: VecDeque<Result<u64>>,
    records: Vec<Record>,
}

impl TestClient {
    pub fn new() -> Self {
        TestClient::default()
    }

    pub fn push_result(&mut self, result: ResultSet) {
        self.results.push_back(Ok(result));
    }

    pub fn push_query_error(&mut self, error: Error) {
        self.results.push_back(Err(error));
    }

    pub fn push_execute_result(&mut self, result: Result<u64>) {
        self.execute_results.push_back(result);
    }

    pub fn records(&self) -> &[Record] {
        &self.records[..]
    }
}

/// The column names and rows of one query's result.
#[derive(Debug, Default, Clone)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Reported once the rows run out, as if fetching the next one failed.
    pub error: Option<ErrorDetails>,
}

impl ResultSet {
    pub fn new(columns: &[&str]) -> Self {
        ResultSet {
            columns: columns.iter().map(|name| name.to_string()).collect(),
            ..ResultSet::default()
        }
    }

    pub fn row(mut self, values: &[Option<&str>]) -> Self {
        self.rows
            .push(Row(values.iter().map(|v| v.map(String::from)).collect()));
        self
    }

    pub fn fail_with(mut self, message: &str) -> Self {
        self.error = Some(ErrorDetails {
            message: message.into(),
        });
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Row(pub Vec<Option<String>>);

impl Row {
    fn value(&self, index: usize) -> Result<Option<&str>> {
        self.0
            .get(index)
            .map(|value| value.as_deref())
            .ok_or_else(|| Error::decode_str(format!("no column {index}"), None))
    }
}

#[derive(Debug, Clone)]
pub struct Record {
    pub text: String,
    pub params: Vec<Option<String>>,
    pub kind: Kind,
    /// Whether the cursor was closed by the time the query returned.
    pub closed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Query,
    Execute,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ErrorDetails {
    pub message: String,
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.message.fmt(f)
    }
}

pub type Error = error::Error<ErrorDetails>;
pub type Result<T> = std::result::Result<T, Error>;

impl client::Client for TestClient {
    type Row<'a> = Row;
    type Param<'a> = &'a dyn ToParam;
    type Error = ErrorDetails;
}

pub trait ToParam {
    fn to_param(&self) -> Option<String>;
}

impl ToParam for &str {
    fn to_param(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ToParam for String {
    fn to_param(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl ToParam for i32 {
    fn to_param(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ToParam for f64 {
    fn to_param(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ToParam for Option<String> {
    fn to_param(&self) -> Option<String> {
        self.clone()
    }
}

impl<T: ToParam> client::ToParam<TestClient> for T {
    fn to_param(&self) -> &dyn ToParam {
        self
    }
}

impl client::FromColumn<TestClient> for String {
    fn from_column(&mut self, row: &Row, index: usize) -> Result<()> {
        match row.value(index)? {
            Some(value) => {
                *self = value.into();
                Ok(())
            }
            None => Err(Error::decode_str(
                format!("unexpected null in column {index}"),
                None,
            )),
        }
    }
}

impl client::FromColumn<TestClient> for Option<String> {
    fn from_column(&mut self, row: &Row, index: usize) -> Result<()> {
        *self = row.value(index)?.map(String::from);
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(row: &Row, index: usize) -> Result<T> {
    let value = row
        .value(index)?
        .ok_or_else(|| Error::decode_str(format!("unexpected null in column {index}"), None))?;
    value.parse().map_err(|_| {
        Error::decode(ErrorDetails {
            message: format!("cannot parse {value:?}"),
        })
    })
}

impl client::FromColumn<TestClient> for i32 {
    fn from_column(&mut self, row: &Row, index: usize) -> Result<()> {
        *self = parse(row, index)?;
        Ok(())
    }
}

impl client::FromColumn<TestClient> for f64 {
    fn from_column(&mut self, row: &Row, index: usize) -> Result<()> {
        *self = parse(row, index)?;
        Ok(())
    }
}

impl Executor for TestClient {
    type Client = TestClient;

    fn with_cursor<T, F>(&mut self, sql: &str, params: &[&dyn ToParam], f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Cursor<TestClient>) -> Result<T>,
    {
        self.records.push(Record {
            text: sql.into(),
            params: params.iter().map(|param| param.to_param()).collect(),
            kind: Kind::Query,
            closed: false,
        });

        let set = self
            .results
            .pop_front()
            .unwrap_or_else(|| Ok(ResultSet::default()))?;

        let mut cursor = TestCursor {
            columns: set.columns,
            rows: set.rows.into_iter(),
            current: None,
            error: set.error,
            closed: false,
        };
        let result = f(&mut cursor);
        cursor.close();

        if let Some(record) = self.records.last_mut() {
            record.closed = cursor.closed;
        }
        result
    }

    fn execute(&mut self, sql: &str, params: &[&dyn ToParam]) -> Result<u64> {
        self.records.push(Record {
            text: sql.into(),
            params: params.iter().map(|param| param.to_param()).collect(),
            kind: Kind::Execute,
            closed: true,
        });
        self.execute_results.pop_front().unwrap_or(Ok(0))
    }
}

struct TestCursor {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Row>,
    current: Option<Row>,
    error: Option<ErrorDetails>,
    closed: bool,
}

fn discard(row: &Row, index: usize) -> Result<()> {
    row.value(index).map(drop)
}

impl Cursor<TestClient> for TestCursor {
    fn advance(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.current = self.rows.next();
        self.current.is_some()
    }

    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn decode_into(&mut self, targets: &mut [Target<'_, TestClient>]) -> Result<()> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| Error::decode_str("no current row to decode", None))?;
        decode_row::<TestClient, _>(row, targets, discard)
    }

    fn terminal_error(&mut self) -> Option<Error> {
        if self.current.is_some() {
            return None;
        }
        self.error.take().map(Error::execute)
    }

    fn close(&mut self) {
        self.current = None;
        self.closed = true;
    }
}
