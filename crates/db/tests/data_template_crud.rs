//! Integration tests for the data template repository.
//!
//! Exercises the repository layer against a real database. Ignored by
//! default; run with `DATABASE_URL` set and `cargo test -- --ignored`.

use datagen_db::models::data_template::{CreateDataTemplate, UpdateDataTemplate};
use datagen_db::repositories::DataTemplateRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_template(name: &str) -> CreateDataTemplate {
    CreateDataTemplate {
        name: name.to_string(),
        description: Some(format!("{name} records")),
        schema: json!({ "type": "object", "properties": {}, "required": [] }),
        field_definitions: json!([
            { "name": "id", "type": "integer", "required": true },
            { "name": "email", "type": "string" }
        ]),
        example_data: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_and_fetch_round_trip(pool: PgPool) {
    let created = DataTemplateRepo::create(&pool, &new_template("Users"))
        .await
        .unwrap();
    assert_eq!(created.field_count, 2);

    let found = DataTemplateRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .expect("template should exist");
    assert_eq!(found.name, "Users");
    assert_eq!(found.description.as_deref(), Some("Users records"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_name_violates_unique_constraint(pool: PgPool) {
    DataTemplateRepo::create(&pool, &new_template("Orders"))
        .await
        .unwrap();
    let err = DataTemplateRepo::create(&pool, &new_template("Orders"))
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_data_templates_name"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn name_exists_can_exclude_a_row(pool: PgPool) {
    let t = DataTemplateRepo::create(&pool, &new_template("Invoices"))
        .await
        .unwrap();

    assert!(DataTemplateRepo::name_exists(&pool, "Invoices", None).await.unwrap());
    assert!(!DataTemplateRepo::name_exists(&pool, "Invoices", Some(t.id)).await.unwrap());
    assert!(!DataTemplateRepo::name_exists(&pool, "Other", None).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_filters_and_counts(pool: PgPool) {
    for name in ["Alpha users", "Beta users", "Gamma orders"] {
        DataTemplateRepo::create(&pool, &new_template(name))
            .await
            .unwrap();
    }

    let (items, total) = DataTemplateRepo::list(&pool, Some("USERS"), 1, 0)
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(items.len(), 1);
    // Newest first.
    assert_eq!(items[0].name, "Beta users");

    let (_, total) = DataTemplateRepo::list(&pool, None, 20, 0).await.unwrap();
    assert_eq!(total, 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn update_applies_only_present_fields(pool: PgPool) {
    let t = DataTemplateRepo::create(&pool, &new_template("Products"))
        .await
        .unwrap();

    let patch = UpdateDataTemplate {
        name: Some("Catalog".into()),
        ..Default::default()
    };
    let updated = DataTemplateRepo::update(&pool, t.id, &patch)
        .await
        .unwrap()
        .expect("row should be updated");

    assert_eq!(updated.name, "Catalog");
    assert_eq!(updated.description, t.description);
    assert_eq!(updated.field_definitions, t.field_definitions);
    assert!(updated.updated_at >= t.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn blank_description_clears_to_null(pool: PgPool) {
    let t = DataTemplateRepo::create(&pool, &new_template("Invoices"))
        .await
        .unwrap();

    let patch = UpdateDataTemplate {
        description: Some("   ".into()),
        ..Default::default()
    };
    let updated = DataTemplateRepo::update(&pool, t.id, &patch)
        .await
        .unwrap()
        .expect("row should be updated");

    assert!(updated.description.is_none());
    assert_eq!(updated.name, "Invoices");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_reports_whether_a_row_was_removed(pool: PgPool) {
    let t = DataTemplateRepo::create(&pool, &new_template("Temp"))
        .await
        .unwrap();

    assert!(DataTemplateRepo::delete(&pool, t.id).await.unwrap());
    assert!(!DataTemplateRepo::delete(&pool, t.id).await.unwrap());
    assert!(DataTemplateRepo::find_by_id(&pool, t.id).await.unwrap().is_none());
}
