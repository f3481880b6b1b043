mod common;
use common::{assert_sqlite_pragmas, count, fk_check_empty, seeded_index, setup_db};

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Text};
use std::thread::sleep;
use std::time::Duration;

#[derive(QueryableByName)]
struct TblCnt {
    #[diesel(sql_type = Integer)]
    cnt: i32,
}
#[derive(QueryableByName)]
struct TimeStr {
    #[diesel(sql_type = Text)]
    t: String,
}

#[test]
fn migrations_apply_and_pragmas_are_set() {
    let (_db, mut conn) = setup_db();

    // PRAGMAs (WAL is a persistent property of the .db file; FKs/timeout are per-connection)
    assert_sqlite_pragmas(&mut conn);

    let tbls: TblCnt = sql_query(
        "SELECT COUNT(*) AS cnt
            FROM sqlite_master
            WHERE type='table'
            AND name IN ('species','species_alias','daily_report','observation');",
    )
    .get_result(&mut conn)
    .unwrap();
    assert_eq!(tbls.cnt, 4, "expected four tables to be present");
}

#[test]
fn catalog_is_seeded() {
    let (_db, mut conn) = setup_db();
    assert_eq!(count(&mut conn, "species"), 17);
    assert_eq!(count(&mut conn, "species_alias"), 61);
    fk_check_empty(&mut conn);

    let index = seeded_index(&mut conn);
    assert_eq!(index.len(), 61);
    assert_eq!(index.resolve("  Humpback   Whales ").as_deref(), Some("humpback-whale"));
    assert_eq!(index.resolve("Mola Mola").as_deref(), Some("sunfish"));
    assert_eq!(index.resolve("Risso\u{2019}s Dolphins").as_deref(), Some("rissos-dolphin"));
    assert_eq!(index.resolve("Killer Whales").as_deref(), Some("orca"));
    assert_eq!(index.resolve("sea lions"), None);
}

#[test]
fn updated_at_moves_on_update() {
    let (_db, mut conn) = setup_db();

    sql_query(
        "INSERT INTO daily_report (report_date, tours, status, fetched_at, source_url, checksum)
         VALUES ('2025-08-12', 14, 'ok', '2025-08-13T01:00:00.000Z', 'x', 'y');",
    )
    .execute(&mut conn)
    .unwrap();

    let before: TimeStr = sql_query("SELECT updated_at AS t FROM daily_report WHERE report_date='2025-08-12';")
        .get_result(&mut conn)
        .unwrap();

    // Millisecond precision; make sure the clock moves.
    sleep(Duration::from_millis(20));

    sql_query("UPDATE daily_report SET tours = 15 WHERE report_date='2025-08-12';")
        .execute(&mut conn)
        .unwrap();

    let after: TimeStr = sql_query("SELECT updated_at AS t FROM daily_report WHERE report_date='2025-08-12';")
        .get_result(&mut conn)
        .unwrap();

    assert_ne!(before.t, after.t, "updated_at should change on UPDATE");
}

#[test]
fn constraints_reject_bad_rows() {
    let (_db, mut conn) = setup_db();

    let bad_status = sql_query(
        "INSERT INTO daily_report (report_date, tours, status, fetched_at, source_url, checksum)
         VALUES ('2025-08-12', 1, 'rainy', 'now', 'x', 'y');",
    )
    .execute(&mut conn);
    assert!(bad_status.is_err());

    let negative_tours = sql_query(
        "INSERT INTO daily_report (report_date, tours, status, fetched_at, source_url, checksum)
         VALUES ('2025-08-12', -1, 'ok', 'now', 'x', 'y');",
    )
    .execute(&mut conn);
    assert!(negative_tours.is_err());

    sql_query(
        "INSERT INTO daily_report (report_date, tours, status, fetched_at, source_url, checksum)
         VALUES ('2025-08-12', 1, 'ok', 'now', 'x', 'y');",
    )
    .execute(&mut conn)
    .unwrap();
    let unknown_species =
        sql_query("INSERT INTO observation (report_date, species_id, individuals) VALUES ('2025-08-12', 'kraken', 1);")
            .execute(&mut conn);
    assert!(unknown_species.is_err(), "observation must reference a known species");

    sql_query("INSERT INTO observation (report_date, species_id, individuals) VALUES ('2025-08-12', 'orca', 2);")
        .execute(&mut conn)
        .unwrap();
    let restrict = sql_query("DELETE FROM species WHERE id = 'orca';").execute(&mut conn);
    assert!(restrict.is_err(), "observed species cannot be deleted");

    sql_query("DELETE FROM daily_report WHERE report_date = '2025-08-12';")
        .execute(&mut conn)
        .unwrap();
    assert_eq!(count(&mut conn, "observation"), 0, "observations cascade with their day");
}
