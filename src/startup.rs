use crate::db::PgPool;
use crate::middleware::jwt_auth_middleware;
use crate::routes::{
    auth::auth::{get_profile, login_user, logout_user, register_user, verify_token},
    availability::availability::{create_slot, delete_slot, list_slots, update_slot},
    categories::categories::{
        create_category, delete_category, list_categories, update_category,
    },
    health_check::health_check,
    products::options::{
        create_product_option, delete_product_option, list_product_options, update_product_option,
    },
    products::products::{
        create_product, delete_product, list_products, quote_product_price, update_product,
    },
    products::upload::create_product_multipart,
    reservations::reservations::{
        create_reservation, delete_reservation, list_reservations, update_reservation,
    },
    restaurants::restaurants::{
        create_restaurant, delete_restaurant, list_restaurants, update_restaurant,
    },
};
use actix_files::Files;
use actix_web::guard::{self, GuardContext};
use actix_web::http::header;
use actix_web::middleware::from_fn;
use actix_web::{dev::Server, web, App, HttpServer};
use std::net::TcpListener;
use std::path::PathBuf;
use tracing_actix_web::TracingLogger;

/// Directory uploaded product images are written to, shared with the upload
/// handler through app data.
#[derive(Clone)]
pub struct UploadDir(pub PathBuf);

// The JSON and multipart variants of product creation share one path; the
// content type decides which handler runs.
fn is_multipart(ctx: &GuardContext<'_>) -> bool {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/**************************************************************/
// Application State to reuse the same code in main and tests
/***************************************************************/
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(
        port: u16,
        pool: PgPool,
        upload_dir: PathBuf,
    ) -> Result<Self, std::io::Error> {
        let listener = if port == 0 {
            TcpListener::bind("127.0.0.1:0")?
        } else {
            let address = format!("127.0.0.1:{}", port);
            TcpListener::bind(&address)?
        };

        let actual_port = listener.local_addr()?.port();

        let server = run_server(listener, pool.clone(), upload_dir).await?;
        Ok(Self {
            port: actual_port,
            server,
        })
    }
    pub fn port(&self) -> u16 {
        self.port
    }
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/******************************************/
// Running Server
/******************************************/
pub async fn run_server(
    listener: TcpListener,
    pool: PgPool,
    upload_dir: PathBuf,
) -> Result<Server, std::io::Error> {
    std::fs::create_dir_all(&upload_dir)?;
    let upload_data = web::Data::new(UploadDir(upload_dir.clone()));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(upload_data.clone())
            .route("/health_check", web::get().to(health_check))
            .service(Files::new("/uploads", upload_dir.clone()))
            .service(
                web::scope("/api")
                    .route("/auth/register", web::post().to(register_user))
                    .route("/auth/login", web::post().to(login_user))
                    .service(
                        web::scope("/auth")
                            .wrap(from_fn(jwt_auth_middleware))
                            .route("/profile", web::get().to(get_profile))
                            .route("/verify-token", web::get().to(verify_token))
                            .route("/logout", web::post().to(logout_user)),
                    )
                    .service(
                        web::resource("/categorias")
                            .route(web::get().to(list_categories))
                            .route(web::post().to(create_category)),
                    )
                    .service(
                        web::resource("/categorias/{id}")
                            .route(web::put().to(update_category))
                            .route(web::delete().to(delete_category)),
                    )
                    .service(
                        web::resource("/restaurantes")
                            .route(web::get().to(list_restaurants))
                            .route(web::post().to(create_restaurant)),
                    )
                    .service(
                        web::resource("/restaurantes/{id}")
                            .route(web::put().to(update_restaurant))
                            .route(web::delete().to(delete_restaurant)),
                    )
                    .service(
                        web::resource("/productos")
                            .route(web::get().to(list_products))
                            .route(
                                web::post()
                                    .guard(guard::fn_guard(is_multipart))
                                    .to(create_product_multipart),
                            )
                            .route(web::post().to(create_product)),
                    )
                    .service(
                        web::resource("/productos/{id}")
                            .route(web::put().to(update_product))
                            .route(web::delete().to(delete_product)),
                    )
                    .service(
                        web::resource("/productos/{id}/opciones")
                            .route(web::get().to(list_product_options))
                            .route(web::post().to(create_product_option)),
                    )
                    .route("/productos/{id}/precio", web::post().to(quote_product_price))
                    .service(
                        web::resource("/opciones/{id}")
                            .route(web::put().to(update_product_option))
                            .route(web::delete().to(delete_product_option)),
                    )
                    .service(
                        web::resource("/disponibilidad")
                            .route(web::get().to(list_slots))
                            .route(web::post().to(create_slot)),
                    )
                    .service(
                        web::resource("/disponibilidad/{id}")
                            .route(web::put().to(update_slot))
                            .route(web::delete().to(delete_slot)),
                    )
                    .service(
                        web::scope("/reservas")
                            .wrap(from_fn(jwt_auth_middleware))
                            .service(
                                web::resource("")
                                    .route(web::get().to(list_reservations))
                                    .route(web::post().to(create_reservation)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::put().to(update_reservation))
                                    .route(web::delete().to(delete_reservation)),
                            ),
                    ),
            )
    })
    .listen(listener)?
    .run();
    Ok(server)
}
