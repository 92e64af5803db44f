use crate::helper::spawn_app;
use restaurante::db::drop_database;
use serde_json::{json, Value};

#[tokio::test]
async fn created_category_shows_up_in_the_listing() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/api/categorias", &app.address))
        .json(&json!({ "name": "Postres" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["name"], "Postres");
    assert!(created["id"].is_number(), "id should be generated");

    let listing = app
        .api_client
        .get(&format!("{}/api/categorias", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(listing.status().as_u16(), 200);
    let rows: Vec<Value> = listing.json().await.unwrap();
    assert!(rows.iter().any(|row| row["id"] == created["id"]));
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn category_without_a_name_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/api/categorias", &app.address))
        .json(&json!({ "description": "sin nombre" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn partial_update_keeps_omitted_fields() {
    let app = spawn_app().await;

    let created: Value = app
        .api_client
        .post(&format!("{}/api/categorias", &app.address))
        .json(&json!({ "name": "Bebidas", "description": "frias y calientes" }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    let updated = app
        .api_client
        .put(&format!(
            "{}/api/categorias/{}",
            &app.address, created["id"]
        ))
        .json(&json!({ "description": "solo frias" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(updated.status().as_u16(), 200);
    let updated: Value = updated.json().await.unwrap();

    assert_eq!(updated["name"], "Bebidas");
    assert_eq!(updated["description"], "solo frias");
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn deleting_a_nonexistent_category_is_404_and_changes_nothing() {
    let app = spawn_app().await;

    let _ = app
        .api_client
        .post(&format!("{}/api/categorias", &app.address))
        .json(&json!({ "name": "Entrantes" }))
        .send()
        .await
        .expect("Failed to execute request.");

    let response = app
        .api_client
        .delete(&format!("{}/api/categorias/999999", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 404);

    let rows: Vec<Value> = app
        .api_client
        .get(&format!("{}/api/categorias", &app.address))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn deleting_an_existing_category_removes_it() {
    let app = spawn_app().await;

    let created: Value = app
        .api_client
        .post(&format!("{}/api/categorias", &app.address))
        .json(&json!({ "name": "Temporal" }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    let response = app
        .api_client
        .delete(&format!(
            "{}/api/categorias/{}",
            &app.address, created["id"]
        ))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 200);

    let rows: Vec<Value> = app
        .api_client
        .get(&format!("{}/api/categorias", &app.address))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();
    assert!(rows.is_empty());
    drop_database(&app.test_db_url, &app.database_name);
}
