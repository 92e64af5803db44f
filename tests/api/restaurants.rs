use crate::helper::spawn_app;
use restaurante::db::drop_database;
use serde_json::{json, Value};

#[tokio::test]
async fn created_restaurant_shows_up_in_the_listing() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/api/restaurantes", &app.address))
        .json(&json!({
            "name": "Casa Pepe",
            "address": "Calle Mayor 1",
            "capacity": "60",
            "opening_time": "12:00:00",
            "closing_time": "23:30:00"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["capacity"], 60);
    assert_eq!(created["is_active"], true);

    let rows: Vec<Value> = app
        .api_client
        .get(&format!("{}/api/restaurantes", &app.address))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();
    assert!(rows.iter().any(|row| row["name"] == "Casa Pepe"));
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn restaurant_with_non_positive_capacity_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/api/restaurantes", &app.address))
        .json(&json!({ "name": "Sin Sitio", "capacity": 0 }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn partial_restaurant_update_keeps_omitted_fields() {
    let app = spawn_app().await;

    let created: Value = app
        .api_client
        .post(&format!("{}/api/restaurantes", &app.address))
        .json(&json!({ "name": "El Patio", "phone": "600111222" }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    let updated: Value = app
        .api_client
        .put(&format!(
            "{}/api/restaurantes/{}",
            &app.address, created["id"]
        ))
        .json(&json!({ "is_active": false }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    assert_eq!(updated["is_active"], false);
    assert_eq!(updated["name"], "El Patio");
    assert_eq!(updated["phone"], "600111222");
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn updating_a_nonexistent_restaurant_is_404() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .put(&format!("{}/api/restaurantes/999999", &app.address))
        .json(&json!({ "name": "Fantasma" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 404);
    drop_database(&app.test_db_url, &app.database_name);
}
