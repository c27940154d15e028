//! Integration tests for cursor execution and fetching
//!
//! Each test scripts the server's replies and checks both the rows the
//! cursor hands out and the requests it sent to get them.

mod common;

use common::*;
use hana_rs::constants::MessageType;
use hana_rs::messages::{Part, Reply, RequestPart, Segment, ServerError};
use hana_rs::{Config, Error, FunctionCode, ResultSetId, ScriptedTransport, TypeCode, Value};

fn message_types(log: &hana_rs::RequestLog) -> Vec<MessageType> {
    log.requests().iter().map(|r| r.message_type()).collect()
}

mod procedure_result_tests {
    use super::*;

    #[test]
    fn test_three_tables_in_order() {
        let mut parts = result_set_parts(1, &["A", "B"], &[&[1, 2]], true);
        parts.extend(result_set_parts(2, &["A", "B"], &[&[3, 4]], true));
        parts.extend(result_set_parts(3, &["A", "B"], &[&[5, 6]], true));
        let transport = ScriptedTransport::new().with_reply(Reply::single(Segment::new(
            FunctionCode::DbProcedureCallWithResult,
            parts,
        )));
        let (mut cursor, log) = scripted_cursor(transport, Config::default());

        cursor.execute("CALL THREE_TABLES()", ()).unwrap();
        assert_eq!(cursor.result_set_ids().len(), 3);

        assert_eq!(ints(&cursor.fetchone().unwrap().unwrap()), vec![1, 2]);
        assert!(cursor.nextset().unwrap());
        assert_eq!(ints(&cursor.fetchone().unwrap().unwrap()), vec![3, 4]);
        assert!(cursor.nextset().unwrap());
        assert_eq!(ints(&cursor.fetchone().unwrap().unwrap()), vec![5, 6]);
        assert!(!cursor.nextset().unwrap());

        // all rows arrived with the call
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_output_parameters_come_first() {
        let mut parts = vec![output_params_part(vec![Value::Integer(5)])];
        parts.extend(result_set_parts(7, &["A", "B"], &[&[1, 2]], true));
        let transport = ScriptedTransport::new().with_reply(Reply::single(Segment::new(
            FunctionCode::DbProcedureCallWithResult,
            parts,
        )));
        let (mut cursor, _log) = scripted_cursor(transport, Config::default());

        cursor.execute("CALL SCALAR_AND_TABLE()", ()).unwrap();
        assert_eq!(ints(&cursor.fetchone().unwrap().unwrap()), vec![5]);
        assert!(cursor.fetchone().unwrap().is_none());
        assert!(cursor.nextset().unwrap());
        assert_eq!(ints(&cursor.fetchone().unwrap().unwrap()), vec![1, 2]);
        assert!(!cursor.nextset().unwrap());
    }

    #[test]
    fn test_output_parameters_only() {
        let transport = ScriptedTransport::new().with_reply(Reply::single(Segment::new(
            FunctionCode::DbProcedureCall,
            vec![output_params_part(vec![Value::from("done")])],
        )));
        let (mut cursor, _log) = scripted_cursor(transport, Config::default());

        cursor.execute("CALL STATUS()", ()).unwrap();
        let rows = cursor.fetchmany(Some(10)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].as_str(), Some("done"));
        assert!(!cursor.nextset().unwrap());
        assert!(cursor.fetchone().unwrap_err().is_usage_error());
    }

    #[test]
    fn test_metadata_after_id_pairs_up() {
        let transport = ScriptedTransport::new().with_reply(Reply::single(Segment::new(
            FunctionCode::DbProcedureCallWithResult,
            vec![
                Part::ResultSetId(ResultSetId::from_u64(4)),
                Part::ResultSetMetadata(int_columns(&["X"])),
                rows_part(&[&[9]], true),
            ],
        )));
        let (mut cursor, _log) = scripted_cursor(transport, Config::default());

        cursor.execute("CALL ONE_TABLE()", ()).unwrap();
        assert_eq!(cursor.description().unwrap()[0].name, "X");
        assert_eq!(ints(&cursor.fetchone().unwrap().unwrap()), vec![9]);
    }
}

mod fetch_tests {
    use super::*;

    #[test]
    fn test_fetch_requires_execute() {
        let (mut cursor, log) = scripted_cursor(ScriptedTransport::new(), Config::default());
        let err = cursor.fetchone().unwrap_err();
        assert!(err.is_usage_error());
        assert!(err.to_string().contains("execute"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_fetch_after_statement_without_results() {
        let transport = ScriptedTransport::new()
            .with_reply(Reply::single(Segment::new(FunctionCode::Ddl, Vec::new())));
        let (mut cursor, _log) = scripted_cursor(transport, Config::default());

        cursor.execute("CREATE TABLE T (A INT)", ()).unwrap();
        assert_eq!(cursor.rowcount(), -1);
        assert!(cursor.description().is_none());
        assert!(cursor.fetchall().unwrap_err().is_usage_error());
    }

    #[test]
    fn test_closed_result_set_never_fetches() {
        let transport = ScriptedTransport::new().with_reply(select_reply(
            1,
            &["A"],
            &[&[1], &[2]],
            true,
        ));
        let (mut cursor, log) = scripted_cursor(transport, Config::default());

        cursor.execute("SELECT A FROM T", ()).unwrap();
        assert_eq!(cursor.rowcount(), -1);
        assert_eq!(cursor.fetchall().unwrap().len(), 2);
        assert!(cursor.fetchone().unwrap().is_none());
        assert!(cursor.fetchmany(Some(5)).unwrap().is_empty());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_fetchmany_refills_from_server() {
        let transport = ScriptedTransport::new()
            .with_reply(select_reply(1, &["A"], &[&[1], &[2]], false))
            .with_reply(fetch_reply(&[&[3], &[4], &[5]], true));
        let (mut cursor, log) = scripted_cursor(transport, Config::default());

        cursor.execute("SELECT A FROM T", ()).unwrap();
        let rows = cursor.fetchmany(Some(5)).unwrap();
        assert_eq!(
            rows.iter().map(ints).collect::<Vec<_>>(),
            vec![vec![1], vec![2], vec![3], vec![4], vec![5]]
        );

        assert_eq!(
            message_types(&log),
            vec![MessageType::ExecuteDirect, MessageType::FetchNext]
        );
        let fetch = log.last().unwrap();
        assert_eq!(
            fetch.parts(),
            &[
                RequestPart::ResultSetId(ResultSetId::from_u64(1)),
                RequestPart::FetchSize(3)
            ]
        );
    }

    #[test]
    fn test_empty_refill_stops_fetchmany() {
        let transport = ScriptedTransport::new()
            .with_reply(select_reply(1, &["A"], &[], false))
            .with_reply(fetch_reply(&[], false));
        let (mut cursor, log) = scripted_cursor(transport, Config::default());

        cursor.execute("SELECT A FROM T", ()).unwrap();
        assert!(cursor.fetchmany(Some(3)).unwrap().is_empty());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_fetchall_in_blocks() {
        let transport = ScriptedTransport::new()
            .with_reply(select_reply(1, &["A"], &[&[1]], false))
            .with_reply(fetch_reply(&[&[2]], false))
            .with_reply(fetch_reply(&[&[3], &[4]], true));
        let config = Config::new().fetchall_block_size(2);
        let (mut cursor, log) = scripted_cursor(transport, config);

        cursor.execute("SELECT A FROM T", ()).unwrap();
        let rows = cursor.fetchall().unwrap();
        assert_eq!(
            rows.iter().map(ints).collect::<Vec<_>>(),
            vec![vec![1], vec![2], vec![3], vec![4]]
        );
        assert!(cursor.fetchone().unwrap().is_none());
        assert_eq!(
            message_types(&log),
            vec![
                MessageType::ExecuteDirect,
                MessageType::FetchNext,
                MessageType::FetchNext
            ]
        );
    }

    #[test]
    fn test_fetchone_uses_arraysize_independent_buffer() {
        let transport = ScriptedTransport::new().with_reply(select_reply(
            1,
            &["A"],
            &[&[1], &[2], &[3]],
            true,
        ));
        let (mut cursor, _log) = scripted_cursor(transport, Config::new().arraysize(2));

        cursor.execute("SELECT A FROM T", ()).unwrap();
        assert_eq!(cursor.fetchmany(None).unwrap().len(), 2);
        assert_eq!(ints(&cursor.fetchone().unwrap().unwrap()), vec![3]);
        assert!(cursor.fetchone().unwrap().is_none());
    }

    #[test]
    fn test_new_execution_resets_results() {
        let transport = ScriptedTransport::new()
            .with_reply(select_reply(1, &["A"], &[&[1]], true))
            .with_reply(rows_affected_reply(FunctionCode::Delete, &[4]));
        let (mut cursor, _log) = scripted_cursor(transport, Config::default());

        cursor.execute("SELECT A FROM T", ()).unwrap();
        assert!(cursor.description().is_some());
        cursor.execute("DELETE FROM T", ()).unwrap();
        assert!(cursor.description().is_none());
        assert!(cursor.result_set_ids().is_empty());
        assert_eq!(cursor.rowcount(), 4);
    }
}

mod prepared_execution_tests {
    use super::*;

    #[test]
    fn test_prepared_query() {
        let transport = ScriptedTransport::new()
            .with_reply(prepare_reply(
                10,
                vec![input("1", TypeCode::Int)],
                Some(int_columns(&["A"])),
            ))
            .with_reply(Reply::single(Segment::new(
                FunctionCode::Select,
                vec![
                    Part::ResultSetId(ResultSetId::from_u64(2)),
                    rows_part(&[&[5], &[6]], true),
                ],
            )));
        let (mut cursor, log) = scripted_cursor(transport, Config::default());

        cursor
            .execute("SELECT A FROM T WHERE A > ?", vec![Value::Integer(4)])
            .unwrap();
        assert_eq!(cursor.description().unwrap()[0].type_code, TypeCode::Int);
        assert_eq!(cursor.fetchall().unwrap().len(), 2);

        let requests = log.requests();
        assert_eq!(requests[0].message_type(), MessageType::Prepare);
        assert_eq!(requests[0].command(), Some("SELECT A FROM T WHERE A > ?"));
        assert_eq!(requests[1].message_type(), MessageType::Execute);
        match &requests[1].parts()[1] {
            RequestPart::Parameters(parameters) => {
                assert_eq!(parameters.len(), 1);
                assert_eq!(parameters.rows[0].values()[0].value, Value::Integer(4));
            }
            other => panic!("expected parameters part, got {:?}", other),
        }
    }

    #[test]
    fn test_rowcount_adds_up_across_requests() {
        let rows: Vec<Vec<Value>> = (0..10).map(|i| vec![Value::Integer(i)]).collect();
        let transport = ScriptedTransport::new()
            .with_reply(prepare_reply(3, vec![input("1", TypeCode::Int)], None))
            .with_reply(rows_affected_reply(FunctionCode::Insert, &[1; 8]))
            .with_reply(rows_affected_reply(FunctionCode::Insert, &[1; 2]));
        // five bytes per row, so eight rows fit one request
        let config = Config::new().max_payload_size(hana_rs::config::MIN_PAYLOAD_SIZE);
        let (mut cursor, log) = scripted_cursor(transport, config);

        cursor.executemany("INSERT INTO T VALUES (?)", rows).unwrap();
        assert_eq!(cursor.rowcount(), 10);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_unknown_row_count() {
        let transport = ScriptedTransport::new()
            .with_reply(rows_affected_reply(FunctionCode::Update, &[2, -2]));
        let (mut cursor, _log) = scripted_cursor(transport, Config::default());

        cursor.execute("UPDATE T SET A = 1", ()).unwrap();
        assert_eq!(cursor.rowcount(), -1);
    }

    #[test]
    fn test_server_error_is_database_error() {
        let transport = ScriptedTransport::new().with_reply(Reply::single(Segment::new(
            FunctionCode::Ddl,
            vec![Part::Error(vec![ServerError::new(
                259,
                "invalid table name: NOPE",
            )])],
        )));
        let (mut cursor, _log) = scripted_cursor(transport, Config::default());

        let err = cursor.execute("DROP TABLE NOPE", ()).unwrap_err();
        assert!(err.is_database_error());
        assert!(matches!(err, Error::Database { code: 259, .. }));
        assert!(cursor.fetchone().unwrap_err().is_usage_error());
    }

    #[test]
    fn test_transport_failure_is_interface_error() {
        let transport = ScriptedTransport::new().with_error(Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        )));
        let (mut cursor, _log) = scripted_cursor(transport, Config::default());

        let err = cursor.execute("SELECT 1 FROM DUMMY", ()).unwrap_err();
        assert!(err.is_interface_error());
        assert!(!err.is_database_error());
    }

    #[test]
    fn test_unexpected_part_is_interface_error() {
        let transport = ScriptedTransport::new().with_reply(Reply::single(Segment::new(
            FunctionCode::Select,
            vec![Part::RowsAffected(vec![1])],
        )));
        let (mut cursor, _log) = scripted_cursor(transport, Config::default());

        let err = cursor.execute("SELECT 1 FROM DUMMY", ()).unwrap_err();
        assert!(err.is_interface_error());
    }
}

mod callproc_tests {
    use super::*;
    use indexmap::IndexMap;

    fn counts_reply(counts: &[i64]) -> Reply {
        select_reply(
            1,
            &["NUM_INPUT_PARAMS", "NUM_INOUT_PARAMS", "NUM_OUTPUT_PARAMS"],
            &[counts],
            true,
        )
    }

    #[test]
    fn test_callproc_merges_outputs() {
        let transport = ScriptedTransport::new()
            .with_reply(counts_reply(&[1, 0, 1]))
            .with_reply(prepare_reply(
                5,
                vec![input("A", TypeCode::Int), output("B", TypeCode::Int)],
                None,
            ))
            .with_reply(Reply::single(Segment::new(
                FunctionCode::DbProcedureCall,
                vec![output_params_part(vec![Value::Integer(3)])],
            )));
        let (mut cursor, log) = scripted_cursor(transport, Config::default());

        let mut params = IndexMap::new();
        params.insert("A".to_string(), Value::Integer(2));
        let result = cursor.callproc("ADD_ONE", params).unwrap();
        assert_eq!(result["A"], Value::Integer(2));
        assert_eq!(result["B"], Value::Integer(3));

        let requests = log.requests();
        assert!(requests[0]
            .command()
            .unwrap()
            .ends_with("WHERE SCHEMA=CURRENT_SCHEMA AND NAME='ADD_ONE'"));
        assert_eq!(requests[1].command(), Some("CALL ADD_ONE (?, ?)"));
        assert_eq!(requests[2].message_type(), MessageType::Execute);
    }

    #[test]
    fn test_callproc_positional_inputs() {
        let transport = ScriptedTransport::new()
            .with_reply(counts_reply(&[1, 0, 1]))
            .with_reply(prepare_reply(
                5,
                vec![input("A", TypeCode::Int), output("B", TypeCode::Int)],
                None,
            ))
            .with_reply(Reply::single(Segment::new(
                FunctionCode::DbProcedureCall,
                vec![output_params_part(vec![Value::Integer(8)])],
            )));
        let (mut cursor, _log) = scripted_cursor(transport, Config::default());

        let result = cursor
            .callproc("APP.ADD_ONE", vec![Value::Integer(7)])
            .unwrap();
        assert_eq!(
            result.into_iter().collect::<Vec<_>>(),
            vec![
                ("A".to_string(), Value::Integer(7)),
                ("B".to_string(), Value::Integer(8))
            ]
        );
    }

    #[test]
    fn test_callproc_missing_procedure() {
        let transport = ScriptedTransport::new().with_reply(select_reply(
            1,
            &["NUM_INPUT_PARAMS", "NUM_INOUT_PARAMS", "NUM_OUTPUT_PARAMS"],
            &[],
            true,
        ));
        let (mut cursor, log) = scripted_cursor(transport, Config::default());

        let err = cursor.callproc("APP.NOPE", ()).unwrap_err();
        assert!(err.is_database_error());
        assert!(err.to_string().contains("'APP.NOPE' does not exist"));
        assert!(log.requests()[0]
            .command()
            .unwrap()
            .contains("SCHEMA='APP' AND NAME='NOPE'"));
    }

    #[test]
    fn test_callproc_rejects_bad_name() {
        let (mut cursor, log) = scripted_cursor(ScriptedTransport::new(), Config::default());
        assert!(cursor.callproc("A.B.C", ()).unwrap_err().is_usage_error());
        assert!(log.is_empty());
    }
}

mod custom_transport_tests {
    use super::*;
    use hana_rs::messages::Request;
    use hana_rs::{Connection, Transport};

    /// Transport answering every request with the same row count
    struct FixedTransport {
        count: i64,
        connected: bool,
    }

    impl Transport for FixedTransport {
        fn round_trip(&mut self, _request: &Request) -> hana_rs::Result<Reply> {
            if !self.connected {
                return Err(Error::ConnectionClosed);
            }
            Ok(rows_affected_reply(FunctionCode::Delete, &[self.count]))
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn close(&mut self) -> hana_rs::Result<()> {
            self.connected = false;
            Ok(())
        }
    }

    #[test]
    fn test_user_transport_drives_cursor() {
        let transport = FixedTransport {
            count: 4,
            connected: true,
        };
        let conn = Connection::new(Box::new(transport), Config::default()).unwrap();
        let mut cursor = conn.cursor().unwrap();

        cursor.execute("DELETE FROM T", ()).unwrap();
        assert_eq!(cursor.rowcount(), 4);

        conn.close().unwrap();
        assert!(cursor.execute("DELETE FROM T", ()).is_err());
    }
}
