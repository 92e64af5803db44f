use crate::auth_jwt::auth::Claims;
use crate::db::PgPool;
use crate::db_models::{NewReservation, Reservation, ReservationStatus, UserRole};
use crate::errors::custom::{map_diesel_error, AuthError, CustomError, DbError};
use crate::schema::availability_slots::dsl as slot_dsl;
use crate::schema::reservations::dsl as reservation_dsl;
use crate::validations::coerce;
use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

#[derive(Deserialize)]
pub struct CreateReservationBody {
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    restaurant_id: Option<i32>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    party_size: Option<i32>,
    special_requests: Option<String>,
}

#[derive(Deserialize, AsChangeset)]
#[diesel(table_name = crate::schema::reservations)]
pub struct UpdateReservationBody {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    party_size: Option<i32>,
    status: Option<ReservationStatus>,
    special_requests: Option<String>,
}

/// Atomically claims one seat on the slot matching the reservation, when one
/// is defined. Returns the claimed slot id so a failed insert can release it.
async fn claim_slot(
    conn: &mut AsyncPgConnection,
    restaurant_id: i32,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<Option<i32>, CustomError> {
    let slot_id = slot_dsl::availability_slots
        .filter(slot_dsl::restaurant_id.eq(restaurant_id))
        .filter(slot_dsl::date.eq(date))
        .filter(slot_dsl::time.eq(time))
        .select(slot_dsl::id)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

    let slot_id = match slot_id {
        Some(id) => id,
        // No slot configured for this date/time, nothing to claim.
        None => return Ok(None),
    };

    // The conditional increment is one statement, so two racing reservations
    // serialize on the row lock and the loser sees the full slot.
    let claimed = diesel::update(
        slot_dsl::availability_slots
            .find(slot_id)
            .filter(slot_dsl::is_available.eq(true))
            .filter(slot_dsl::current_reservations.lt(slot_dsl::max_capacity)),
    )
    .set(slot_dsl::current_reservations.eq(slot_dsl::current_reservations + 1))
    .execute(conn)
    .await
    .map_err(map_diesel_error)?;

    if claimed == 0 {
        return Err(CustomError::ConflictError(
            "The selected time slot is fully booked".to_string(),
        ));
    }
    Ok(Some(slot_id))
}

async fn release_slot(conn: &mut AsyncPgConnection, slot_id: i32) -> Result<(), CustomError> {
    diesel::update(
        slot_dsl::availability_slots
            .find(slot_id)
            .filter(slot_dsl::current_reservations.gt(0)),
    )
    .set(slot_dsl::current_reservations.eq(slot_dsl::current_reservations - 1))
    .execute(conn)
    .await
    .map_err(map_diesel_error)?;
    Ok(())
}

async fn load_reservation(
    conn: &mut AsyncPgConnection,
    reservation_id: i32,
) -> Result<Reservation, CustomError> {
    reservation_dsl::reservations
        .find(reservation_id)
        .first::<Reservation>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CustomError::NotFoundError("Reservation not found".to_string()))
}

fn ensure_owner_or_admin(claims: &Claims, reservation: &Reservation) -> Result<(), CustomError> {
    if claims.role != UserRole::Admin && reservation.user_id != claims.sub {
        return Err(CustomError::AuthenticationError(AuthError::Forbidden(
            "Reservation belongs to another user".to_string(),
        )));
    }
    Ok(())
}

/******************************************/
// Listing Reservations Route
/******************************************/
/**
 * @route   GET /api/reservas
 * @access  JWT Protected
 */
// Admins see every reservation, clients only their own.
#[instrument(name = "List reservations", skip(pool, claims), fields(user_id = %claims.sub))]
pub async fn list_reservations(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let mut query = reservation_dsl::reservations.into_boxed();
    if claims.role != UserRole::Admin {
        query = query.filter(reservation_dsl::user_id.eq(claims.sub));
    }

    let rows = query
        .order(reservation_dsl::id.asc())
        .load::<Reservation>(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(HttpResponse::Ok().json(rows))
}

/******************************************/
// Reservation Creation Route
/******************************************/
/**
 * @route   POST /api/reservas
 * @access  JWT Protected
 */
#[instrument(name = "Create reservation", skip(req_body, pool, claims), fields(user_id = %claims.sub))]
pub async fn create_reservation(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
    req_body: web::Json<CreateReservationBody>,
) -> Result<HttpResponse, CustomError> {
    let data = req_body.into_inner();
    let (restaurant_id, date, time, party_size) =
        match (data.restaurant_id, data.date, data.time, data.party_size) {
            (Some(r), Some(d), Some(t), Some(p)) => (r, d, t, p),
            _ => {
                return Err(CustomError::ValidationError(
                    "restaurant_id, date, time and party_size are required".to_string(),
                ));
            }
        };
    if party_size <= 0 {
        return Err(CustomError::ValidationError(
            "party_size must be a positive integer".to_string(),
        ));
    }

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let claimed_slot = claim_slot(&mut conn, restaurant_id, date, time).await?;

    let inserted = diesel::insert_into(reservation_dsl::reservations)
        .values(&NewReservation {
            user_id: claims.sub,
            restaurant_id,
            date,
            time,
            party_size,
            status: ReservationStatus::Pending,
            special_requests: data.special_requests,
        })
        .get_result::<Reservation>(&mut conn)
        .await;

    let reservation = match inserted {
        Ok(reservation) => reservation,
        Err(err) => {
            // Give the claimed seat back before surfacing the failure.
            if let Some(slot_id) = claimed_slot {
                release_slot(&mut conn, slot_id).await?;
            }
            return Err(map_diesel_error(err));
        }
    };

    Ok(HttpResponse::Created().json(reservation))
}

/******************************************/
// Reservation Update Route
/******************************************/
/**
 * @route   PUT /api/reservas/{id}
 * @access  JWT Protected
 */
#[instrument(name = "Update reservation", skip(req_body, pool, claims), fields(user_id = %claims.sub))]
pub async fn update_reservation(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
    reservation_id: web::Path<i32>,
    req_body: web::Json<UpdateReservationBody>,
) -> Result<HttpResponse, CustomError> {
    let reservation_id = reservation_id.into_inner();
    let data = req_body.into_inner();
    if let Some(party_size) = data.party_size {
        if party_size <= 0 {
            return Err(CustomError::ValidationError(
                "party_size must be a positive integer".to_string(),
            ));
        }
    }

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let existing = load_reservation(&mut conn, reservation_id).await?;
    ensure_owner_or_admin(&claims, &existing)?;

    let updated = diesel::update(reservation_dsl::reservations.find(reservation_id))
        .set(&data)
        .get_result::<Reservation>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CustomError::NotFoundError("Reservation not found".to_string()))?;

    Ok(HttpResponse::Ok().json(updated))
}

/******************************************/
// Reservation Deletion Route
/******************************************/
/**
 * @route   DELETE /api/reservas/{id}
 * @access  JWT Protected
 */
#[instrument(name = "Delete reservation", skip(pool, claims), fields(user_id = %claims.sub))]
pub async fn delete_reservation(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
    reservation_id: web::Path<i32>,
) -> Result<HttpResponse, CustomError> {
    let reservation_id = reservation_id.into_inner();
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let existing = load_reservation(&mut conn, reservation_id).await?;
    ensure_owner_or_admin(&claims, &existing)?;

    diesel::delete(reservation_dsl::reservations.find(reservation_id))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    // Free the seat on the matching slot, if one is configured.
    let slot_id = slot_dsl::availability_slots
        .filter(slot_dsl::restaurant_id.eq(existing.restaurant_id))
        .filter(slot_dsl::date.eq(existing.date))
        .filter(slot_dsl::time.eq(existing.time))
        .select(slot_dsl::id)
        .first::<i32>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    if let Some(slot_id) = slot_id {
        release_slot(&mut conn, slot_id).await?;
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Reservation deleted successfully" })))
}
