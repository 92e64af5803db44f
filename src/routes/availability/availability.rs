use crate::db::PgPool;
use crate::db_models::{AvailabilitySlot, NewAvailabilitySlot};
use crate::errors::custom::{map_diesel_error, CustomError, DbError};
use crate::schema::availability_slots::dsl as slot_dsl;
use crate::validations::coerce;
use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct AvailabilityFilter {
    pub restaurant_id: Option<i32>,
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct CreateSlotBody {
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    restaurant_id: Option<i32>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    max_capacity: Option<i32>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    current_reservations: Option<i32>,
    #[serde(default, deserialize_with = "coerce::flexible_bool")]
    is_available: Option<bool>,
}

#[derive(Deserialize, AsChangeset)]
#[diesel(table_name = crate::schema::availability_slots)]
pub struct UpdateSlotBody {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    max_capacity: Option<i32>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    current_reservations: Option<i32>,
    #[serde(default, deserialize_with = "coerce::flexible_bool")]
    is_available: Option<bool>,
}

fn validate_counts(max_capacity: i32, current_reservations: i32) -> Result<(), CustomError> {
    if max_capacity <= 0 {
        return Err(CustomError::ValidationError(
            "max_capacity must be a positive integer".to_string(),
        ));
    }
    if current_reservations < 0 {
        return Err(CustomError::ValidationError(
            "current_reservations must not be negative".to_string(),
        ));
    }
    if current_reservations > max_capacity {
        return Err(CustomError::ValidationError(
            "current_reservations must not exceed max_capacity".to_string(),
        ));
    }
    Ok(())
}

/******************************************/
// Listing Availability Slots Route
/******************************************/
/**
 * @route   GET /api/disponibilidad?restaurant_id=&date=
 * @access  Public
 */
#[instrument(name = "List availability slots", skip(pool))]
pub async fn list_slots(
    pool: web::Data<PgPool>,
    filter: web::Query<AvailabilityFilter>,
) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let mut query = slot_dsl::availability_slots.into_boxed();
    if let Some(restaurant_id) = filter.restaurant_id {
        query = query.filter(slot_dsl::restaurant_id.eq(restaurant_id));
    }
    if let Some(date) = filter.date {
        query = query.filter(slot_dsl::date.eq(date));
    }

    let rows = query
        .order(slot_dsl::id.asc())
        .load::<AvailabilitySlot>(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(HttpResponse::Ok().json(rows))
}

/******************************************/
// Availability Slot Creation Route
/******************************************/
/**
 * @route   POST /api/disponibilidad
 * @access  Public
 */
#[instrument(name = "Create availability slot", skip(req_body, pool))]
pub async fn create_slot(
    pool: web::Data<PgPool>,
    req_body: web::Json<CreateSlotBody>,
) -> Result<HttpResponse, CustomError> {
    let data = req_body.into_inner();
    let (restaurant_id, date, time, max_capacity) =
        match (data.restaurant_id, data.date, data.time, data.max_capacity) {
            (Some(r), Some(d), Some(t), Some(m)) => (r, d, t, m),
            _ => {
                return Err(CustomError::ValidationError(
                    "restaurant_id, date, time and max_capacity are required".to_string(),
                ));
            }
        };
    let current_reservations = data.current_reservations.unwrap_or(0);
    validate_counts(max_capacity, current_reservations)?;

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let slot: AvailabilitySlot = diesel::insert_into(slot_dsl::availability_slots)
        .values(&NewAvailabilitySlot {
            restaurant_id,
            date,
            time,
            max_capacity,
            current_reservations,
            is_available: data.is_available.unwrap_or(true),
        })
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(HttpResponse::Created().json(slot))
}

/******************************************/
// Availability Slot Update Route
/******************************************/
/**
 * @route   PUT /api/disponibilidad/{id}
 * @access  Public
 */
#[instrument(name = "Update availability slot", skip(req_body, pool))]
pub async fn update_slot(
    pool: web::Data<PgPool>,
    slot_id: web::Path<i32>,
    req_body: web::Json<UpdateSlotBody>,
) -> Result<HttpResponse, CustomError> {
    let slot_id = slot_id.into_inner();
    let data = req_body.into_inner();

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    // The capacity invariant spans two columns, check it against the merged row.
    let existing = slot_dsl::availability_slots
        .find(slot_id)
        .first::<AvailabilitySlot>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CustomError::NotFoundError("Availability slot not found".to_string()))?;

    let effective_max = data.max_capacity.unwrap_or(existing.max_capacity);
    let effective_current = data
        .current_reservations
        .unwrap_or(existing.current_reservations);
    validate_counts(effective_max, effective_current)?;

    let updated = diesel::update(slot_dsl::availability_slots.find(slot_id))
        .set(&data)
        .get_result::<AvailabilitySlot>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CustomError::NotFoundError("Availability slot not found".to_string()))?;

    Ok(HttpResponse::Ok().json(updated))
}

/******************************************/
// Availability Slot Deletion Route
/******************************************/
/**
 * @route   DELETE /api/disponibilidad/{id}
 * @access  Public
 */
#[instrument(name = "Delete availability slot", skip(pool))]
pub async fn delete_slot(
    pool: web::Data<PgPool>,
    slot_id: web::Path<i32>,
) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let deleted = diesel::delete(slot_dsl::availability_slots.find(slot_id.into_inner()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
    if deleted == 0 {
        return Err(CustomError::NotFoundError(
            "Availability slot not found".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Availability slot deleted successfully" })))
}
