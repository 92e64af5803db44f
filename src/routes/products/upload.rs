use crate::db::PgPool;
use crate::db_models::{NewProduct, Product};
use crate::errors::custom::{map_diesel_error, CustomError, DbError};
use crate::schema::products::dsl as product_dsl;
use crate::startup::UploadDir;
use crate::validations::coerce;
use crate::validations::name_email::EntityName;
use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::text::Text;
use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::path::Path;
use tracing::instrument;
use uuid::Uuid;

/// 5 MB cap, matching what the admin screens enforce for dish photos.
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

#[derive(MultipartForm)]
pub struct ProductUploadForm {
    #[multipart(limit = "5MB")]
    pub imagen: Option<TempFile>,
    pub name: Option<Text<String>>,
    pub description: Option<Text<String>>,
    pub price: Option<Text<String>>,
    pub category_id: Option<Text<String>>,
    pub restaurant_id: Option<Text<String>>,
    pub is_available: Option<Text<String>>,
}

fn extract_extension(file: &TempFile) -> Result<String, CustomError> {
    let file_name = file.file_name.as_deref().ok_or_else(|| {
        CustomError::ValidationError("uploaded file has no filename".to_string())
    })?;
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .ok_or_else(|| {
            CustomError::ValidationError(format!("invalid file extension for {}", file_name))
        })?;
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(CustomError::ValidationError(format!(
            "unsupported file format '{}', supported: {}",
            extension,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(extension)
}

/******************************************/
// Product Creation Route (multipart variant)
/******************************************/
/**
 * @route   POST /api/productos (multipart/form-data)
 * @access  Public
 */
// Stores the `imagen` file part under the uploads dir as
// <unix-millis>-<uuid>.<ext> and records that name on the product row.
#[instrument(name = "Create product with image", skip(form, pool, upload_dir))]
pub async fn create_product_multipart(
    pool: web::Data<PgPool>,
    upload_dir: web::Data<UploadDir>,
    form: MultipartForm<ProductUploadForm>,
) -> Result<HttpResponse, CustomError> {
    let form = form.into_inner();

    let (name, category_id, restaurant_id) = match (
        form.name.map(|t| t.0),
        form.category_id.map(|t| t.0),
        form.restaurant_id.map(|t| t.0),
    ) {
        (Some(n), Some(c), Some(r)) => (n, c, r),
        _ => {
            return Err(CustomError::ValidationError(
                "name, category_id and restaurant_id are required".to_string(),
            ));
        }
    };

    let validated_name =
        EntityName::parse(name).map_err(|err| CustomError::ValidationError(err.to_string()))?;
    let category_id =
        coerce::parse_i32_field(&category_id).map_err(CustomError::ValidationError)?;
    let restaurant_id =
        coerce::parse_i32_field(&restaurant_id).map_err(CustomError::ValidationError)?;
    let price = match form.price {
        Some(raw) => {
            let price = coerce::parse_f64_field(&raw).map_err(CustomError::ValidationError)?;
            super::products::validate_price(Some(price))?;
            price
        }
        None => 0.0,
    };
    let is_available = match form.is_available {
        Some(raw) => coerce::parse_bool_field(&raw).map_err(CustomError::ValidationError)?,
        None => true,
    };

    let image = match form.imagen {
        Some(file) => {
            if file.size > MAX_FILE_SIZE {
                return Err(CustomError::ValidationError(format!(
                    "file too large, maximum size is {} bytes",
                    MAX_FILE_SIZE
                )));
            }
            let extension = extract_extension(&file)?;
            let filename = format!(
                "{}-{}.{}",
                Utc::now().timestamp_millis(),
                Uuid::new_v4(),
                extension
            );
            let destination = upload_dir.get_ref().0.join(&filename);

            // The temp file may live on another filesystem, copy instead of rename.
            web::block(move || std::fs::copy(file.file.path(), &destination).map(|_| ()))
                .await
                .map_err(|err| CustomError::BlockingError(err.to_string()))?
                .map_err(|err| {
                    CustomError::FileStorageError(format!("failed to store uploaded file: {}", err))
                })?;

            Some(filename)
        }
        None => None,
    };

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let product: Product = diesel::insert_into(product_dsl::products)
        .values(&NewProduct {
            name: validated_name.as_ref().to_string(),
            description: form.description.map(|t| t.0),
            price,
            image,
            is_available,
            category_id,
            restaurant_id,
        })
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(HttpResponse::Created().json(product))
}
