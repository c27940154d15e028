//! Tests for statement caching functionality
//!
//! These tests verify that prepared statements are shared by every cursor
//! of a connection, keep their preparation order, and are dropped when the
//! connection closes.

mod common;

use common::*;
use hana_rs::{Config, Connection, ScriptedTransport, StatementCache, StatementId, TypeCode};

mod cache_sharing_tests {
    use super::*;

    #[test]
    fn test_statements_shared_across_cursors() {
        let transport = ScriptedTransport::new()
            .with_reply(prepare_reply(11, vec![input("1", TypeCode::Int)], None))
            .with_reply(prepare_reply(
                12,
                Vec::new(),
                Some(int_columns(&["A"])),
            ));
        let conn = Connection::new(transport, Config::default()).unwrap();
        let mut first = conn.cursor().unwrap();
        let mut second = conn.cursor().unwrap();

        let insert = first.prepare("INSERT INTO T VALUES (?)").unwrap();
        let select = second.prepare("SELECT A FROM T").unwrap();

        assert_eq!(
            first.prepared_statement_ids().unwrap(),
            vec![StatementId::from_u64(11), StatementId::from_u64(12)]
        );
        let statement = first.get_prepared_statement(&select).unwrap();
        assert_eq!(statement.sql(), "SELECT A FROM T");
        assert!(statement.result_metadata().is_some());

        let statement = second.get_prepared_statement(&insert).unwrap();
        assert_eq!(statement.input_parameters().count(), 1);
    }

    #[test]
    fn test_missing_parameter_metadata_means_no_parameters() {
        let transport = ScriptedTransport::new().with_reply(prepare_reply(1, Vec::new(), None));
        let (mut cursor, _log) = scripted_cursor(transport, Config::default());

        let id = cursor.prepare("COMMIT").unwrap();
        let statement = cursor.get_prepared_statement(&id).unwrap();
        assert!(statement.parameters().is_empty());
        assert!(statement.result_metadata().is_none());
    }
}

mod cache_lifecycle_tests {
    use super::*;

    #[test]
    fn test_close_drops_cache() {
        let transport = ScriptedTransport::new().with_reply(prepare_reply(3, Vec::new(), None));
        let conn = Connection::new(transport, Config::default()).unwrap();
        let mut cursor = conn.cursor().unwrap();
        cursor.prepare("SELECT 1 FROM DUMMY").unwrap();
        assert_eq!(conn.cached_statement_ids().unwrap().len(), 1);

        conn.close().unwrap();
        assert!(conn.cached_statement_ids().unwrap().is_empty());
        assert!(cursor.is_closed());
        assert!(cursor.prepared_statement_ids().unwrap_err().is_usage_error());
    }

    #[test]
    fn test_standalone_cache_order() {
        let mut cache = StatementCache::new();
        for id in [5u64, 2, 9] {
            cache.insert(hana_rs::PreparedStatement::new(
                StatementId::from_u64(id),
                "SELECT 1 FROM DUMMY",
                Vec::new(),
                None,
            ));
        }
        assert_eq!(
            cache.ids().iter().map(StatementId::to_u64).collect::<Vec<_>>(),
            vec![5, 2, 9]
        );
    }
}
