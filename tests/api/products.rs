use crate::helper::{spawn_app, TestApp};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use restaurante::db::drop_database;
use restaurante::schema::products::dsl as product_dsl;
use serde_json::{json, Value};

async fn seed_category_and_restaurant(app: &TestApp) -> (i64, i64) {
    let category: Value = app
        .api_client
        .post(&format!("{}/api/categorias", &app.address))
        .json(&json!({ "name": "Principales" }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    let restaurant: Value = app
        .api_client
        .post(&format!("{}/api/restaurantes", &app.address))
        .json(&json!({ "name": "La Terraza", "capacity": 40 }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    (
        category["id"].as_i64().unwrap(),
        restaurant["id"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn product_creation_requires_category_and_restaurant() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/api/productos", &app.address))
        .json(&json!({ "name": "Tortilla", "price": 8.5 }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 400);

    let mut conn = app.db_pool.get().await.unwrap();
    let count: i64 = product_dsl::products
        .count()
        .get_result(&mut conn)
        .await
        .unwrap();
    assert_eq!(count, 0);
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn listed_products_carry_their_category_and_restaurant() {
    let app = spawn_app().await;
    let (category_id, restaurant_id) = seed_category_and_restaurant(&app).await;

    // Numeric fields arrive as strings from the admin forms.
    let created = app
        .api_client
        .post(&format!("{}/api/productos", &app.address))
        .json(&json!({
            "name": "Paella",
            "price": "14.50",
            "category_id": category_id.to_string(),
            "restaurant_id": restaurant_id
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(created.status().as_u16(), 201);
    let created: Value = created.json().await.unwrap();
    assert_eq!(created["price"], 14.5);

    let rows: Vec<Value> = app
        .api_client
        .get(&format!("{}/api/productos", &app.address))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Paella");
    assert_eq!(rows[0]["category"]["name"], "Principales");
    assert_eq!(rows[0]["restaurant"]["name"], "La Terraza");
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn partial_product_update_keeps_omitted_fields() {
    let app = spawn_app().await;
    let (category_id, restaurant_id) = seed_category_and_restaurant(&app).await;

    let created: Value = app
        .api_client
        .post(&format!("{}/api/productos", &app.address))
        .json(&json!({
            "name": "Gazpacho",
            "description": "frio",
            "price": 6.0,
            "category_id": category_id,
            "restaurant_id": restaurant_id
        }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    let updated: Value = app
        .api_client
        .put(&format!("{}/api/productos/{}", &app.address, created["id"]))
        .json(&json!({ "price": 7.5 }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    assert_eq!(updated["price"], 7.5);
    assert_eq!(updated["name"], "Gazpacho");
    assert_eq!(updated["description"], "frio");
    assert_eq!(updated["category_id"], created["category_id"]);
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn quote_endpoint_sums_selected_options_over_the_base_price() {
    let app = spawn_app().await;
    let (category_id, restaurant_id) = seed_category_and_restaurant(&app).await;

    let product: Value = app
        .api_client
        .post(&format!("{}/api/productos", &app.address))
        .json(&json!({
            "name": "Pizza",
            "price": 10.0,
            "category_id": category_id,
            "restaurant_id": restaurant_id
        }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    let extra_cheese: Value = app
        .api_client
        .post(&format!(
            "{}/api/productos/{}/opciones",
            &app.address, product["id"]
        ))
        .json(&json!({
            "option_type": "topping",
            "option_value": "queso extra",
            "extra_price": 2.0
        }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    let large_size: Value = app
        .api_client
        .post(&format!(
            "{}/api/productos/{}/opciones",
            &app.address, product["id"]
        ))
        .json(&json!({
            "option_type": "size",
            "option_value": "grande",
            "extra_price": 1.5
        }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    let quote = app
        .api_client
        .post(&format!(
            "{}/api/productos/{}/precio",
            &app.address, product["id"]
        ))
        .json(&json!({
            "options": [
                { "option_id": extra_cheese["id"], "quantity": 3 },
                { "option_id": large_size["id"], "quantity": 1 }
            ]
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(quote.status().as_u16(), 200);
    let quote: Value = quote.json().await.unwrap();

    assert_eq!(quote["base_price"], 10.0);
    assert_eq!(quote["total"], 17.5);
    assert!(quote["options"]["topping"].is_array());
    assert!(quote["options"]["size"].is_array());
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn quoting_an_option_of_another_product_is_rejected() {
    let app = spawn_app().await;
    let (category_id, restaurant_id) = seed_category_and_restaurant(&app).await;

    let product: Value = app
        .api_client
        .post(&format!("{}/api/productos", &app.address))
        .json(&json!({
            "name": "Ensalada",
            "price": 7.0,
            "category_id": category_id,
            "restaurant_id": restaurant_id
        }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    let quote = app
        .api_client
        .post(&format!(
            "{}/api/productos/{}/precio",
            &app.address, product["id"]
        ))
        .json(&json!({ "options": [{ "option_id": 424242, "quantity": 1 }] }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(quote.status().as_u16(), 400);
    drop_database(&app.test_db_url, &app.database_name);
}

#[tokio::test]
async fn multipart_product_creation_without_required_fields_is_rejected() {
    let app = spawn_app().await;

    let body = "--boundary\r\n\
        Content-Disposition: form-data; name=\"description\"\r\n\r\n\
        solo una descripcion\r\n\
        --boundary--\r\n";
    let response = app
        .api_client
        .post(&format!("{}/api/productos", &app.address))
        .header(
            "Content-Type",
            "multipart/form-data; boundary=boundary",
        )
        .body(body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
    drop_database(&app.test_db_url, &app.database_name);
}
