use crate::schema::{
    availability_slots, categories, product_options, products, reservations, restaurants, users,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum)]
#[ExistingTypePath = "crate::schema::sql_types::UserRole"]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Client,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum)]
#[ExistingTypePath = "crate::schema::sql_types::ReservationStatus"]
#[serde(rename_all = "UPPERCASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub email: String,
    // Never leaves the server.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub newsletter: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub newsletter: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub capacity: Option<i32>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurant {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub capacity: Option<i32>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image: Option<String>,
    pub is_available: bool,
    pub category_id: i32,
    pub restaurant_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image: Option<String>,
    pub is_available: bool,
    pub category_id: i32,
    pub restaurant_id: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = product_options)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductOption {
    pub id: i32,
    pub product_id: i32,
    pub option_type: String,
    pub option_value: String,
    pub extra_price: f64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = product_options)]
pub struct NewProductOption {
    pub product_id: i32,
    pub option_type: String,
    pub option_value: String,
    pub extra_price: f64,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reservation {
    pub id: i32,
    pub user_id: i32,
    pub restaurant_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub special_requests: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservation {
    pub user_id: i32,
    pub restaurant_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = availability_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AvailabilitySlot {
    pub id: i32,
    pub restaurant_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub max_capacity: i32,
    pub current_reservations: i32,
    pub is_available: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = availability_slots)]
pub struct NewAvailabilitySlot {
    pub restaurant_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub max_capacity: i32,
    pub current_reservations: i32,
    pub is_available: bool,
}
