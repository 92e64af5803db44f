use crate::db::PgPool;
use crate::db_models::{Category, NewProduct, Product, ProductOption, Restaurant};
use crate::errors::custom::{map_diesel_error, CustomError, DbError};
use crate::pricing::{quote_total, QuoteLine, SelectedOption};
use crate::schema::product_options::dsl as option_dsl;
use crate::schema::products::dsl as product_dsl;
use crate::schema::{categories, products, restaurants};
use crate::validations::coerce;
use crate::validations::name_email::EntityName;
use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::instrument;

#[derive(Deserialize)]
pub struct CreateProductBody {
    name: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "coerce::flexible_f64")]
    price: Option<f64>,
    image: Option<String>,
    #[serde(default, deserialize_with = "coerce::flexible_bool")]
    is_available: Option<bool>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    category_id: Option<i32>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    restaurant_id: Option<i32>,
}

#[derive(Deserialize, AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct UpdateProductBody {
    name: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "coerce::flexible_f64")]
    price: Option<f64>,
    image: Option<String>,
    #[serde(default, deserialize_with = "coerce::flexible_bool")]
    is_available: Option<bool>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    category_id: Option<i32>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    restaurant_id: Option<i32>,
}

#[derive(Serialize)]
pub struct ProductWithRelations {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
    pub restaurant: Restaurant,
}

pub(crate) fn validate_price(price: Option<f64>) -> Result<(), CustomError> {
    if let Some(price) = price {
        if price < 0.0 || !price.is_finite() {
            return Err(CustomError::ValidationError(
                "price must be a non-negative number".to_string(),
            ));
        }
    }
    Ok(())
}

/******************************************/
// Listing Products Route
/******************************************/
/**
 * @route   GET /api/productos
 * @access  Public
 */
// Each product ships with its category and restaurant joined in.
#[instrument(name = "List products", skip(pool))]
pub async fn list_products(pool: web::Data<PgPool>) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let rows = products::table
        .inner_join(categories::table)
        .inner_join(restaurants::table)
        .order(products::id.asc())
        .select((
            Product::as_select(),
            Category::as_select(),
            Restaurant::as_select(),
        ))
        .load::<(Product, Category, Restaurant)>(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    let rows: Vec<ProductWithRelations> = rows
        .into_iter()
        .map(|(product, category, restaurant)| ProductWithRelations {
            product,
            category,
            restaurant,
        })
        .collect();

    Ok(HttpResponse::Ok().json(rows))
}

/******************************************/
// Product Creation Route (JSON variant)
/******************************************/
/**
 * @route   POST /api/productos
 * @access  Public
 */
#[instrument(name = "Create product", skip(req_body, pool))]
pub async fn create_product(
    pool: web::Data<PgPool>,
    req_body: web::Json<CreateProductBody>,
) -> Result<HttpResponse, CustomError> {
    let data = req_body.into_inner();
    let (name, category_id, restaurant_id) = match (data.name, data.category_id, data.restaurant_id)
    {
        (Some(n), Some(c), Some(r)) => (n, c, r),
        _ => {
            return Err(CustomError::ValidationError(
                "name, category_id and restaurant_id are required".to_string(),
            ));
        }
    };
    let validated_name =
        EntityName::parse(name).map_err(|err| CustomError::ValidationError(err.to_string()))?;
    validate_price(data.price)?;

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let product: Product = diesel::insert_into(product_dsl::products)
        .values(&NewProduct {
            name: validated_name.as_ref().to_string(),
            description: data.description,
            price: data.price.unwrap_or(0.0),
            image: data.image,
            is_available: data.is_available.unwrap_or(true),
            category_id,
            restaurant_id,
        })
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(HttpResponse::Created().json(product))
}

/******************************************/
// Product Update Route
/******************************************/
/**
 * @route   PUT /api/productos/{id}
 * @access  Public
 */
#[instrument(name = "Update product", skip(req_body, pool))]
pub async fn update_product(
    pool: web::Data<PgPool>,
    product_id: web::Path<i32>,
    req_body: web::Json<UpdateProductBody>,
) -> Result<HttpResponse, CustomError> {
    let mut data = req_body.into_inner();
    if let Some(name) = data.name.take() {
        let validated =
            EntityName::parse(name).map_err(|err| CustomError::ValidationError(err.to_string()))?;
        data.name = Some(validated.as_ref().to_string());
    }
    validate_price(data.price)?;

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let updated = diesel::update(product_dsl::products.find(product_id.into_inner()))
        .set(&data)
        .get_result::<Product>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CustomError::NotFoundError("Product not found".to_string()))?;

    Ok(HttpResponse::Ok().json(updated))
}

/******************************************/
// Product Deletion Route
/******************************************/
/**
 * @route   DELETE /api/productos/{id}
 * @access  Public
 */
#[instrument(name = "Delete product", skip(pool))]
pub async fn delete_product(
    pool: web::Data<PgPool>,
    product_id: web::Path<i32>,
) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let deleted = diesel::delete(product_dsl::products.find(product_id.into_inner()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
    if deleted == 0 {
        return Err(CustomError::NotFoundError("Product not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}

#[derive(Deserialize)]
pub struct QuoteSelectionBody {
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    option_id: Option<i32>,
    #[serde(default, deserialize_with = "coerce::flexible_i32")]
    quantity: Option<i32>,
}

#[derive(Deserialize)]
pub struct QuoteRequestBody {
    #[serde(default)]
    options: Vec<QuoteSelectionBody>,
}

/******************************************/
// Price Quote Route
/******************************************/
/**
 * @route   POST /api/productos/{id}/precio
 * @access  Public
 */
#[instrument(name = "Quote product price", skip(req_body, pool))]
pub async fn quote_product_price(
    pool: web::Data<PgPool>,
    product_id: web::Path<i32>,
    req_body: web::Json<QuoteRequestBody>,
) -> Result<HttpResponse, CustomError> {
    let product_id = product_id.into_inner();
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let product = product_dsl::products
        .find(product_id)
        .first::<Product>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CustomError::NotFoundError("Product not found".to_string()))?;

    let options = option_dsl::product_options
        .filter(option_dsl::product_id.eq(product_id))
        .load::<ProductOption>(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    let mut selections = Vec::new();
    let mut breakdown: BTreeMap<String, Vec<QuoteLine>> = BTreeMap::new();
    for selection in &req_body.options {
        let option_id = selection.option_id.ok_or_else(|| {
            CustomError::ValidationError("option_id is required for every selection".to_string())
        })?;
        let quantity = selection.quantity.unwrap_or(0);
        if quantity < 0 {
            return Err(CustomError::ValidationError(
                "quantity must not be negative".to_string(),
            ));
        }
        let option = options
            .iter()
            .find(|opt| opt.id == option_id)
            .ok_or_else(|| {
                CustomError::ValidationError(format!(
                    "option {} does not belong to product {}",
                    option_id, product_id
                ))
            })?;
        if quantity == 0 {
            continue;
        }

        let quantity = quantity as u32;
        selections.push(SelectedOption {
            extra_price: option.extra_price,
            quantity,
        });
        breakdown
            .entry(option.option_type.clone())
            .or_default()
            .push(QuoteLine {
                option_id: option.id,
                option_type: option.option_type.clone(),
                option_value: option.option_value.clone(),
                extra_price: option.extra_price,
                quantity,
                subtotal: option.extra_price * f64::from(quantity),
            });
    }

    let total = quote_total(product.price, &selections);

    Ok(HttpResponse::Ok().json(json!({
        "product_id": product.id,
        "base_price": product.price,
        "options": breakdown,
        "total": total,
    })))
}
