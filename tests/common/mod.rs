//! Reply builders shared by the integration tests
//!
//! Every helper produces already decoded reply structures, the shape a
//! transport hands to the connection.

#![allow(dead_code)]

use hana_rs::constants::part_attributes;
use hana_rs::messages::{OutputParametersPart, Part, Reply, ResultSetPart, Segment};
use hana_rs::{
    ColumnMetadata, Config, Connection, Cursor, FunctionCode, ParameterMetadata, ParameterMode,
    RequestLog, ResultSetId, ResultSetMetadata, ScriptedTransport, StatementId, TypeCode, Value,
};

/// Cursor over a scripted transport, plus the log of the requests it sends
pub fn scripted_cursor(transport: ScriptedTransport, config: Config) -> (Cursor, RequestLog) {
    let log = transport.log();
    let conn = Connection::new(transport, config).expect("valid config");
    let cursor = conn.cursor().expect("open connection");
    (cursor, log)
}

/// Metadata of a result set whose columns are all integers
pub fn int_columns(names: &[&str]) -> ResultSetMetadata {
    ResultSetMetadata::new(
        names
            .iter()
            .map(|name| ColumnMetadata::new(*name, TypeCode::Int as u8))
            .collect(),
    )
}

/// Integer rows
pub fn int_rows(rows: &[&[i64]]) -> Vec<Vec<Value>> {
    rows.iter()
        .map(|row| row.iter().map(|v| Value::Integer(*v)).collect())
        .collect()
}

/// A row part, closed or still open on the server
pub fn rows_part(rows: &[&[i64]], closed: bool) -> Part {
    let attributes = if closed {
        part_attributes::LAST_PACKET | part_attributes::RESULTSET_CLOSED
    } else {
        part_attributes::NEXT_PACKET
    };
    Part::ResultSet(ResultSetPart::new(attributes, int_rows(rows)))
}

/// Metadata, id and rows of one result set, in the order the server sends them
pub fn result_set_parts(id: u64, columns: &[&str], rows: &[&[i64]], closed: bool) -> Vec<Part> {
    vec![
        Part::ResultSetMetadata(int_columns(columns)),
        Part::ResultSetId(ResultSetId::from_u64(id)),
        rows_part(rows, closed),
    ]
}

/// Reply to a directly executed query
pub fn select_reply(id: u64, columns: &[&str], rows: &[&[i64]], closed: bool) -> Reply {
    Reply::single(Segment::new(
        FunctionCode::Select,
        result_set_parts(id, columns, rows, closed),
    ))
}

/// Reply to a fetch-next request
pub fn fetch_reply(rows: &[&[i64]], closed: bool) -> Reply {
    Reply::single(Segment::new(FunctionCode::Fetch, vec![rows_part(rows, closed)]))
}

/// Reply to a prepare request
pub fn prepare_reply(
    id: u64,
    parameters: Vec<ParameterMetadata>,
    result_metadata: Option<ResultSetMetadata>,
) -> Reply {
    let mut parts = vec![
        Part::StatementId(StatementId::from_u64(id)),
        Part::ParameterMetadata(parameters),
    ];
    if let Some(metadata) = result_metadata {
        parts.push(Part::ResultSetMetadata(metadata));
    }
    Reply::single(Segment::new(FunctionCode::Select, parts))
}

/// Reply to an insert, update or delete
pub fn rows_affected_reply(function_code: FunctionCode, counts: &[i64]) -> Reply {
    Reply::single(Segment::new(
        function_code,
        vec![Part::RowsAffected(counts.to_vec())],
    ))
}

/// Reply to a write-lob request
pub fn write_lob_reply() -> Reply {
    Reply::single(Segment::new(FunctionCode::WriteLob, Vec::new()))
}

/// Output parameter part holding a single row
pub fn output_params_part(values: Vec<Value>) -> Part {
    Part::OutputParameters(OutputParametersPart::new(vec![values]))
}

/// Input parameter of the given type
pub fn input(id: &str, type_code: TypeCode) -> ParameterMetadata {
    ParameterMetadata::new(id, ParameterMode::Input, type_code)
}

/// Output parameter of the given type
pub fn output(id: &str, type_code: TypeCode) -> ParameterMetadata {
    ParameterMetadata::new(id, ParameterMode::Output, type_code)
}

/// Integer values of a row
pub fn ints(row: &hana_rs::Row) -> Vec<i64> {
    row.iter().filter_map(Value::as_i64).collect()
}
