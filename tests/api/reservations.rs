use crate::helper::{spawn_app, TestApp, TestUser};
use restaurante::db::drop_database;
use serde_json::{json, Value};

async fn seed_restaurant(app: &TestApp) -> i64 {
    let restaurant: Value = app
        .api_client
        .post(&format!("{}/api/restaurantes", &app.address))
        .json(&json!({ "name": "La Parrilla" }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();
    restaurant["id"].as_i64().unwrap()
}

async fn seed_slot(app: &TestApp, restaurant_id: i64, max_capacity: i32) -> Value {
    let response = app
        .api_client
        .post(&format!("{}/api/disponibilidad", &app.address))
        .json(&json!({
            "restaurant_id": restaurant_id,
            "date": "2026-09-18",
            "time": "20:00:00",
            "max_capacity": max_capacity
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 201);
    response.json().await.unwrap()
}

async fn create_reservation(app: &TestApp, token: &str, restaurant_id: i64) -> reqwest::Response {
    app.api_client
        .post(&format!("{}/api/reservas", &app.address))
        .bearer_auth(token)
        .json(&json!({
            "restaurant_id": restaurant_id,
            "date": "2026-09-18",
            "time": "20:00:00",
            "party_size": 2
        }))
        .send()
        .await
        .expect("Failed to execute request.")
}

async fn fetch_slot(app: &TestApp, slot_id: &Value) -> Value {
    let rows: Vec<Value> = app
        .api_client
        .get(&format!("{}/api/disponibilidad", &app.address))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();
    rows.into_iter()
        .find(|row| &row["id"] == slot_id)
        .expect("slot not found")
}

#[tokio::test]
async fn reservations_require_a_bearer_token() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/api/reservas", &app.address))
        .json(&json!({
            "restaurant_id": 1,
            "date": "2026-09-18",
            "time": "20:00:00",
            "party_size": 2
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 401);
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn created_reservation_is_pending_and_listed_for_its_owner() {
    let app = spawn_app().await;
    let token = app.login_test_user().await;
    let restaurant_id = seed_restaurant(&app).await;

    let response = create_reservation(&app, &token, restaurant_id).await;
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["status"], "PENDING");
    assert_eq!(created["user_id"], app.test_user.user_id);

    let rows: Vec<Value> = app
        .api_client
        .get(&format!("{}/api/reservas", &app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();
    assert!(rows.iter().any(|row| row["id"] == created["id"]));
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn a_full_slot_rejects_further_reservations() {
    let app = spawn_app().await;
    let token = app.login_test_user().await;
    let restaurant_id = seed_restaurant(&app).await;
    let slot = seed_slot(&app, restaurant_id, 1).await;

    let first = create_reservation(&app, &token, restaurant_id).await;
    assert_eq!(first.status().as_u16(), 201);

    let mut second_user = TestUser::generate();
    second_user.store(&app.db_pool, true).await;
    let second_token = {
        let response = app
            .login(json!({
                "email": second_user.email,
                "password": second_user.password
            }))
            .await;
        let body: Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    };

    let second = create_reservation(&app, &second_token, restaurant_id).await;
    assert_eq!(second.status().as_u16(), 400);

    // The loser must not have pushed the counter past capacity.
    let slot_after = fetch_slot(&app, &slot["id"]).await;
    assert_eq!(slot_after["current_reservations"], 1);
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn deleting_a_reservation_releases_its_slot() {
    let app = spawn_app().await;
    let token = app.login_test_user().await;
    let restaurant_id = seed_restaurant(&app).await;
    let slot = seed_slot(&app, restaurant_id, 4).await;

    let created: Value = create_reservation(&app, &token, restaurant_id)
        .await
        .json()
        .await
        .unwrap();
    let slot_after_create = fetch_slot(&app, &slot["id"]).await;
    assert_eq!(slot_after_create["current_reservations"], 1);

    let deleted = app
        .api_client
        .delete(&format!("{}/api/reservas/{}", &app.address, created["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(deleted.status().as_u16(), 200);

    let slot_after_delete = fetch_slot(&app, &slot["id"]).await;
    assert_eq!(slot_after_delete["current_reservations"], 0);
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn clients_cannot_touch_another_users_reservation() {
    let app = spawn_app().await;
    let token = app.login_test_user().await;
    let restaurant_id = seed_restaurant(&app).await;

    let created: Value = create_reservation(&app, &token, restaurant_id)
        .await
        .json()
        .await
        .unwrap();

    let mut intruder = TestUser::generate();
    intruder.store(&app.db_pool, true).await;
    let intruder_token = {
        let response = app
            .login(json!({
                "email": intruder.email,
                "password": intruder.password
            }))
            .await;
        let body: Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    };

    let response = app
        .api_client
        .put(&format!("{}/api/reservas/{}", &app.address, created["id"]))
        .bearer_auth(&intruder_token)
        .json(&json!({ "status": "CANCELLED" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 403);
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn owner_can_confirm_their_reservation() {
    let app = spawn_app().await;
    let token = app.login_test_user().await;
    let restaurant_id = seed_restaurant(&app).await;

    let created: Value = create_reservation(&app, &token, restaurant_id)
        .await
        .json()
        .await
        .unwrap();

    let updated: Value = app
        .api_client
        .put(&format!("{}/api/reservas/{}", &app.address, created["id"]))
        .bearer_auth(&token)
        .json(&json!({ "status": "CONFIRMED" }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    assert_eq!(updated["status"], "CONFIRMED");
    assert_eq!(updated["party_size"], created["party_size"]);
    drop_database(&app.test_db_url, &app.database_name);
}
