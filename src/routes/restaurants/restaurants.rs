use crate::db::PgPool;
use crate::db_models::{NewRestaurant, Restaurant};
use crate::errors::custom::{map_diesel_error, CustomError, DbError};
use crate::schema::restaurants::dsl as restaurant_dsl;
use crate::validations::coerce;
use crate::validations::name_email::EntityName;
use actix_web::{web, HttpResponse};
use chrono::NaiveTime;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

#[derive(Deserialize)]
pub struct CreateRestaurantBody {
    name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    capacity: Option<i32>,
    opening_time: Option<NaiveTime>,
    closing_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "coerce::flexible_bool")]
    is_active: Option<bool>,
}

#[derive(Deserialize, AsChangeset)]
#[diesel(table_name = crate::schema::restaurants)]
pub struct UpdateRestaurantBody {
    name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    capacity: Option<i32>,
    opening_time: Option<NaiveTime>,
    closing_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "coerce::flexible_bool")]
    is_active: Option<bool>,
}

fn validate_capacity(capacity: Option<i32>) -> Result<(), CustomError> {
    if let Some(capacity) = capacity {
        if capacity <= 0 {
            return Err(CustomError::ValidationError(
                "capacity must be a positive integer".to_string(),
            ));
        }
    }
    Ok(())
}

/******************************************/
// Listing Restaurants Route
/******************************************/
/**
 * @route   GET /api/restaurantes
 * @access  Public
 */
#[instrument(name = "List restaurants", skip(pool))]
pub async fn list_restaurants(pool: web::Data<PgPool>) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let rows = restaurant_dsl::restaurants
        .order(restaurant_dsl::id.asc())
        .load::<Restaurant>(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(HttpResponse::Ok().json(rows))
}

/******************************************/
// Restaurant Creation Route
/******************************************/
/**
 * @route   POST /api/restaurantes
 * @access  Public
 */
#[instrument(name = "Create restaurant", skip(req_body, pool))]
pub async fn create_restaurant(
    pool: web::Data<PgPool>,
    req_body: web::Json<CreateRestaurantBody>,
) -> Result<HttpResponse, CustomError> {
    let data = req_body.into_inner();
    let name = data
        .name
        .ok_or_else(|| CustomError::ValidationError("name is required".to_string()))?;
    let validated_name =
        EntityName::parse(name).map_err(|err| CustomError::ValidationError(err.to_string()))?;
    validate_capacity(data.capacity)?;

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let restaurant: Restaurant = diesel::insert_into(restaurant_dsl::restaurants)
        .values(&NewRestaurant {
            name: validated_name.as_ref().to_string(),
            address: data.address,
            phone: data.phone,
            email: data.email,
            capacity: data.capacity,
            opening_time: data.opening_time,
            closing_time: data.closing_time,
            is_active: data.is_active.unwrap_or(true),
        })
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(HttpResponse::Created().json(restaurant))
}

/******************************************/
// Restaurant Update Route
/******************************************/
/**
 * @route   PUT /api/restaurantes/{id}
 * @access  Public
 */
#[instrument(name = "Update restaurant", skip(req_body, pool))]
pub async fn update_restaurant(
    pool: web::Data<PgPool>,
    restaurant_id: web::Path<i32>,
    req_body: web::Json<UpdateRestaurantBody>,
) -> Result<HttpResponse, CustomError> {
    let mut data = req_body.into_inner();
    if let Some(name) = data.name.take() {
        let validated =
            EntityName::parse(name).map_err(|err| CustomError::ValidationError(err.to_string()))?;
        data.name = Some(validated.as_ref().to_string());
    }
    validate_capacity(data.capacity)?;

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let updated = diesel::update(restaurant_dsl::restaurants.find(restaurant_id.into_inner()))
        .set(&data)
        .get_result::<Restaurant>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CustomError::NotFoundError("Restaurant not found".to_string()))?;

    Ok(HttpResponse::Ok().json(updated))
}

/******************************************/
// Restaurant Deletion Route
/******************************************/
/**
 * @route   DELETE /api/restaurantes/{id}
 * @access  Public
 */
#[instrument(name = "Delete restaurant", skip(pool))]
pub async fn delete_restaurant(
    pool: web::Data<PgPool>,
    restaurant_id: web::Path<i32>,
) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let deleted = diesel::delete(restaurant_dsl::restaurants.find(restaurant_id.into_inner()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
    if deleted == 0 {
        return Err(CustomError::NotFoundError(
            "Restaurant not found".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Restaurant deleted successfully" })))
}
