use super::products::validate_price;
use crate::db::PgPool;
use crate::db_models::{NewProductOption, ProductOption};
use crate::errors::custom::{map_diesel_error, CustomError, DbError};
use crate::schema::product_options::dsl as option_dsl;
use crate::schema::products::dsl as product_dsl;
use crate::validations::coerce;
use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

#[derive(Deserialize)]
pub struct CreateOptionBody {
    option_type: Option<String>,
    option_value: Option<String>,
    #[serde(default, deserialize_with = "coerce::flexible_f64")]
    extra_price: Option<f64>,
}

#[derive(Deserialize, AsChangeset)]
#[diesel(table_name = crate::schema::product_options)]
pub struct UpdateOptionBody {
    option_type: Option<String>,
    option_value: Option<String>,
    #[serde(default, deserialize_with = "coerce::flexible_f64")]
    extra_price: Option<f64>,
}

async fn ensure_product_exists(
    conn: &mut diesel_async::AsyncPgConnection,
    product_id: i32,
) -> Result<(), CustomError> {
    product_dsl::products
        .find(product_id)
        .select(product_dsl::id)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CustomError::NotFoundError("Product not found".to_string()))?;
    Ok(())
}

/******************************************/
// Listing Product Options Route
/******************************************/
/**
 * @route   GET /api/productos/{id}/opciones
 * @access  Public
 */
#[instrument(name = "List product options", skip(pool))]
pub async fn list_product_options(
    pool: web::Data<PgPool>,
    product_id: web::Path<i32>,
) -> Result<HttpResponse, CustomError> {
    let product_id = product_id.into_inner();
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;
    ensure_product_exists(&mut conn, product_id).await?;

    let rows = option_dsl::product_options
        .filter(option_dsl::product_id.eq(product_id))
        .order(option_dsl::id.asc())
        .load::<ProductOption>(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(HttpResponse::Ok().json(rows))
}

/******************************************/
// Product Option Creation Route
/******************************************/
/**
 * @route   POST /api/productos/{id}/opciones
 * @access  Public
 */
#[instrument(name = "Create product option", skip(req_body, pool))]
pub async fn create_product_option(
    pool: web::Data<PgPool>,
    product_id: web::Path<i32>,
    req_body: web::Json<CreateOptionBody>,
) -> Result<HttpResponse, CustomError> {
    let product_id = product_id.into_inner();
    let data = req_body.into_inner();
    let (option_type, option_value) = match (data.option_type, data.option_value) {
        (Some(t), Some(v)) if !t.trim().is_empty() && !v.trim().is_empty() => (t, v),
        _ => {
            return Err(CustomError::ValidationError(
                "option_type and option_value are required".to_string(),
            ));
        }
    };
    validate_price(data.extra_price)?;

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;
    ensure_product_exists(&mut conn, product_id).await?;

    let option: ProductOption = diesel::insert_into(option_dsl::product_options)
        .values(&NewProductOption {
            product_id,
            option_type,
            option_value,
            extra_price: data.extra_price.unwrap_or(0.0),
        })
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(HttpResponse::Created().json(option))
}

/******************************************/
// Product Option Update Route
/******************************************/
/**
 * @route   PUT /api/opciones/{id}
 * @access  Public
 */
#[instrument(name = "Update product option", skip(req_body, pool))]
pub async fn update_product_option(
    pool: web::Data<PgPool>,
    option_id: web::Path<i32>,
    req_body: web::Json<UpdateOptionBody>,
) -> Result<HttpResponse, CustomError> {
    let data = req_body.into_inner();
    validate_price(data.extra_price)?;

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let updated = diesel::update(option_dsl::product_options.find(option_id.into_inner()))
        .set(&data)
        .get_result::<ProductOption>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CustomError::NotFoundError("Product option not found".to_string()))?;

    Ok(HttpResponse::Ok().json(updated))
}

/******************************************/
// Product Option Deletion Route
/******************************************/
/**
 * @route   DELETE /api/opciones/{id}
 * @access  Public
 */
#[instrument(name = "Delete product option", skip(pool))]
pub async fn delete_product_option(
    pool: web::Data<PgPool>,
    option_id: web::Path<i32>,
) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let deleted = diesel::delete(option_dsl::product_options.find(option_id.into_inner()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
    if deleted == 0 {
        return Err(CustomError::NotFoundError(
            "Product option not found".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Product option deleted successfully" })))
}
