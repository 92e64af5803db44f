use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

pub type PgPool = Pool<AsyncPgConnection>;

/******************************************/
// Establishing Db Connection
/******************************************/
pub async fn establish_connection(database_url: &str) -> PgPool {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Pool::builder(manager)
        .build()
        .expect("Failed to create pool.")
}

/******************************************/
// Creating new db for tests
/******************************************/
pub fn create_database(maintenance_url: &str, database_name: &str) {
    let mut connection =
        PgConnection::establish(maintenance_url).expect("Failed to connect to Postgres");

    let create_db_query = format!(r#"CREATE DATABASE "{}";"#, database_name);
    sql_query(&create_db_query)
        .execute(&mut connection)
        .expect("Failed to create database");
}

/******************************************/
// Dropping db code
/******************************************/
pub fn drop_database(maintenance_url: &str, database_name: &str) {
    let mut connection = PgConnection::establish(maintenance_url)
        .expect("Failed to connect to the maintenance database");

    // Active connections keep DROP DATABASE from succeeding, terminate them first.
    let terminate_query = format!(
        r#"
        SELECT pg_terminate_backend(pid)
        FROM pg_stat_activity
        WHERE datname = '{}';
    "#,
        database_name
    );

    if let Err(e) = sql_query(&terminate_query).execute(&mut connection) {
        eprintln!("Failed to terminate connections: {}", e);
        return;
    }

    let drop_query = format!(r#"DROP DATABASE IF EXISTS "{}";"#, database_name);

    if let Err(e) = sql_query(&drop_query).execute(&mut connection) {
        eprintln!("Failed to drop database: {}", e);
    }
}
