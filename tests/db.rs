mod common;

use diesel::RunQueryDsl;
use diesel::sql_query;

#[derive(diesel::QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    foreign_keys: i32,
}

#[test]
fn test_temporary_database_is_removed_on_drop() {
    let dir;

    {
        let test_db = common::TestDb::new("test_temporary_database.db");
        let conn = test_db.pool().get();
        assert!(conn.is_ok());
        assert!(test_db.path().exists());
        dir = test_db.dir().to_path_buf();
    }

    assert!(!dir.exists());
}

#[test]
fn test_connections_enforce_foreign_keys() {
    let test_db = common::TestDb::new("test_foreign_keys.db");
    let mut conn = test_db.pool().get().expect("connection");

    let pragma = sql_query("PRAGMA foreign_keys")
        .get_result::<ForeignKeys>(&mut conn)
        .expect("pragma should be readable");

    assert_eq!(pragma.foreign_keys, 1);
}
