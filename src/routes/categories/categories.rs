use crate::db::PgPool;
use crate::db_models::{Category, NewCategory};
use crate::errors::custom::{map_diesel_error, CustomError, DbError};
use crate::schema::categories::dsl as category_dsl;
use crate::validations::name_email::EntityName;
use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

#[derive(Deserialize)]
pub struct CreateCategoryBody {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, AsChangeset)]
#[diesel(table_name = crate::schema::categories)]
pub struct UpdateCategoryBody {
    name: Option<String>,
    description: Option<String>,
}

/******************************************/
// Listing Categories Route
/******************************************/
/**
 * @route   GET /api/categorias
 * @access  Public
 */
#[instrument(name = "List categories", skip(pool))]
pub async fn list_categories(pool: web::Data<PgPool>) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let rows = category_dsl::categories
        .order(category_dsl::id.asc())
        .load::<Category>(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(HttpResponse::Ok().json(rows))
}

/******************************************/
// Category Creation Route
/******************************************/
/**
 * @route   POST /api/categorias
 * @access  Public
 */
#[instrument(name = "Create category", skip(req_body, pool))]
pub async fn create_category(
    pool: web::Data<PgPool>,
    req_body: web::Json<CreateCategoryBody>,
) -> Result<HttpResponse, CustomError> {
    let data = req_body.into_inner();
    let name = data
        .name
        .ok_or_else(|| CustomError::ValidationError("name is required".to_string()))?;
    let validated_name =
        EntityName::parse(name).map_err(|err| CustomError::ValidationError(err.to_string()))?;

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let category: Category = diesel::insert_into(category_dsl::categories)
        .values(&NewCategory {
            name: validated_name.as_ref().to_string(),
            description: data.description,
        })
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(HttpResponse::Created().json(category))
}

/******************************************/
// Category Update Route
/******************************************/
/**
 * @route   PUT /api/categorias/{id}
 * @access  Public
 */
#[instrument(name = "Update category", skip(req_body, pool))]
pub async fn update_category(
    pool: web::Data<PgPool>,
    category_id: web::Path<i32>,
    req_body: web::Json<UpdateCategoryBody>,
) -> Result<HttpResponse, CustomError> {
    let mut data = req_body.into_inner();
    if let Some(name) = data.name.take() {
        let validated =
            EntityName::parse(name).map_err(|err| CustomError::ValidationError(err.to_string()))?;
        data.name = Some(validated.as_ref().to_string());
    }

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let updated = diesel::update(category_dsl::categories.find(category_id.into_inner()))
        .set(&data)
        .get_result::<Category>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CustomError::NotFoundError("Category not found".to_string()))?;

    Ok(HttpResponse::Ok().json(updated))
}

/******************************************/
// Category Deletion Route
/******************************************/
/**
 * @route   DELETE /api/categorias/{id}
 * @access  Public
 */
#[instrument(name = "Delete category", skip(pool))]
pub async fn delete_category(
    pool: web::Data<PgPool>,
    category_id: web::Path<i32>,
) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let deleted = diesel::delete(category_dsl::categories.find(category_id.into_inner()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
    if deleted == 0 {
        return Err(CustomError::NotFoundError("Category not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Category deleted successfully" })))
}
