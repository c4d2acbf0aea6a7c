#![cfg(feature = "sqlite")]

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use sql_conduit::{
    ConnectionTarget, LogicalType, SelectOutcome, SqlClient, SqlConduitError, SqlValue,
};
use tempfile::TempDir;

// Per-call connections need a file-backed database; an in-memory database
// would vanish between calls.
fn client(table: &str) -> Result<(TempDir, SqlClient), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("lifecycle.db");
    let target = ConnectionTarget::new(
        "file://local",
        "tester",
        "unused",
        path.to_string_lossy().into_owned(),
    )?;
    let client = SqlClient::sqlite(target).with_default_table(table);
    Ok((dir, client))
}

#[test]
fn create_insert_select_update_select() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (_dir, client) = client("notes")?;
        client.create_table("notes").await?;
        client.create_text_column("body").await?;
        client.insert_text("body", "hello").await?;

        let body = client.select_text("body", "id = 1").await?;
        assert_eq!(body.as_deref(), Some("hello"));

        let changed = client.update_text("body", "world", "id = 1").await?;
        assert_eq!(changed, 1);
        let body = client.select_text("body", "id = 1").await?;
        assert_eq!(body.as_deref(), Some("world"));
        Ok(())
    })
}

#[test]
fn typed_columns_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (_dir, client) = client("samples")?;
        client.create_table("samples").await?;
        client.create_int_column("count").await?;
        client.create_boolean_column("active").await?;
        client.create_float_column("ratio").await?;
        client.create_real_column("score").await?;
        client.create_date_column("day").await?;
        client.create_datetime_column("seen_at").await?;
        client.create_json_column("meta").await?;
        client.create_blob_column("payload").await?;
        client.create_image_column("thumbnail").await?;

        client.insert_int("count", 42i64).await?;
        client.update_boolean("active", true, "id = 1").await?;
        client.update_float("ratio", 0.25f32, "id = 1").await?;
        client.update_real("score", 0.1f64, "id = 1").await?;
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).ok_or("bad date")?;
        client.update_date("day", day, "id = 1").await?;
        let seen = NaiveDateTime::parse_from_str("2024-03-09 08:15:00", "%Y-%m-%d %H:%M:%S")?;
        client.update_datetime("seen_at", seen, "id = 1").await?;
        client
            .update_json("meta", json!({"tag": "alpha"}), "id = 1")
            .await?;
        client
            .update_blob("payload", vec![0xDE, 0xAD], "id = 1")
            .await?;
        client
            .update_image("thumbnail", "fake-image-bytes", "id = 1")
            .await?;

        assert_eq!(client.select_int("count", "id = 1").await?, Some(42));
        assert_eq!(client.select_boolean("active", "id = 1").await?, Some(true));
        assert_eq!(client.select_float("ratio", "id = 1").await?, Some(0.25));
        assert_eq!(client.select_real("score", "id = 1").await?, Some(0.1));
        assert_eq!(client.select_date("day", "id = 1").await?, Some(day));
        assert_eq!(client.select_datetime("seen_at", "id = 1").await?, Some(seen));
        assert_eq!(
            client.select_json("meta", "id = 1").await?,
            Some(json!({"tag": "alpha"}))
        );
        assert_eq!(
            client.select_blob("payload", "id = 1").await?,
            Some(vec![0xDE, 0xAD])
        );
        assert_eq!(
            client.select_image("thumbnail", "id = 1").await?.as_deref(),
            Some("fake-image-bytes")
        );
        Ok(())
    })
}

#[test]
fn insert_always_creates_a_new_row() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (_dir, client) = client("log")?;
        client.create_table("log").await?;
        client.create_text_column("entry").await?;
        client.insert_text("entry", "first").await?;
        client.insert_text("entry", "first").await?;

        // Two identical inserts, two rows.
        let changed = client
            .update_text("entry", "second", "entry = 'first'")
            .await?;
        assert_eq!(changed, 2);
        Ok(())
    })
}

#[test]
fn zero_match_update_is_not_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (_dir, client) = client("log")?;
        client.create_table("log").await?;
        client.create_text_column("entry").await?;
        let changed = client.update_text("entry", "x", "id = 999").await?;
        assert_eq!(changed, 0);
        Ok(())
    })
}

#[test]
fn no_row_and_stored_null_are_distinct() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (_dir, client) = client("people")?;
        client.create_table("people").await?;
        client.create_text_column("name").await?;
        client.create_text_column("nickname").await?;
        client.insert_text("name", "Ada").await?;

        let outcome = client
            .select("people", "nickname", LogicalType::Text, "id = 1")
            .await?;
        assert_eq!(outcome, SelectOutcome::Null);
        let outcome = client
            .select("people", "nickname", LogicalType::Text, "id = 999")
            .await?;
        assert_eq!(outcome, SelectOutcome::NoRow);

        // The typed surface collapses both to None.
        assert_eq!(client.select_text("nickname", "id = 1").await?, None);
        assert_eq!(client.select_text("nickname", "id = 999").await?, None);
        Ok(())
    })
}

#[test]
fn select_all_sentinel_returns_first_column() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (_dir, client) = client("notes")?;
        client.create_table("notes").await?;
        client.create_text_column("body").await?;
        client.insert_text("body", "hello").await?;

        // `all` projects `*`; the first column is the id primary key.
        let value = client
            .select_required("notes", "all", LogicalType::Int, "body = 'hello'")
            .await?;
        assert_eq!(value, SqlValue::Int(1));
        Ok(())
    })
}

#[test]
fn select_only_sees_the_first_matching_row() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (_dir, client) = client("log")?;
        client.create_table("log").await?;
        client.create_text_column("entry").await?;
        client.insert_text("entry", "one").await?;
        client.insert_text("entry", "two").await?;

        let entry = client.select_text("entry", "entry IS NOT NULL").await?;
        assert_eq!(entry.as_deref(), Some("one"));
        Ok(())
    })
}

#[test]
fn missing_column_select_is_an_execution_error() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (_dir, client) = client("notes")?;
        client.create_table("notes").await?;
        let err = client.select_text("no_such_column", "id = 1").await;
        assert!(matches!(err, Err(SqlConduitError::Execution(_))));
        Ok(())
    })
}

#[test]
fn constraint_violation_carries_backend_codes() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (_dir, client) = client("log")?;
        client.create_table("log").await?;
        client.create_text_column("entry").await?;
        client.insert_text("entry", "one").await?;
        client.insert_text("entry", "two").await?;

        // Forcing id 1 onto the second row violates the primary key.
        let err = client.update_int("id", 1, "id = 2").await;
        match err {
            Err(SqlConduitError::Execution(failure)) => {
                assert!(failure.code.is_some(), "missing extended code: {failure}");
                assert!(failure.state.is_some(), "missing state: {failure}");
            }
            other => panic!("expected an execution failure, got {other:?}"),
        }
        Ok(())
    })
}

#[test]
fn typed_surface_requires_a_default_table() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dir = TempDir::new()?;
        let path = dir.path().join("no_default.db");
        let target = ConnectionTarget::new(
            "file://local",
            "tester",
            "unused",
            path.to_string_lossy().into_owned(),
        )?;
        let client = SqlClient::sqlite(target);
        let err = client.insert_text("body", "hello").await;
        assert!(matches!(err, Err(SqlConduitError::MissingTable)));
        Ok(())
    })
}

#[test]
fn keyword_colliding_column_is_rejected_before_connecting() -> Result<(), Box<dyn std::error::Error>>
{
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        // The path points nowhere; validation must fail before the backend
        // would be touched.
        let target = ConnectionTarget::new("file://local", "tester", "unused", "/nonexistent/x.db")?;
        let client = SqlClient::sqlite(target).with_default_table("notes");
        let err = client.create_int_column("integer").await;
        assert!(matches!(err, Err(SqlConduitError::InvalidArgument(_))));
        let err = client.create_image_column("blob").await;
        assert!(matches!(err, Err(SqlConduitError::InvalidArgument(_))));
        Ok(())
    })
}
