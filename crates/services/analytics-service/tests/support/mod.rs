//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fmt::Debug;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;

use analytics_service_lib::infra::Database;
use analytics_service_lib::repository::{CommerceRepository, CommerceStore};
use common::DatabaseConfig;
use domain::{NewOrder, OrderStatus};

/// Fresh in-memory database with every migration applied
pub async fn seeded_database() -> Database {
    Database::connect(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database should migrate")
}

pub fn commerce(db: &Database) -> CommerceStore {
    CommerceStore::new(db.get_connection())
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

/// Money within half a cent of `expected`
pub fn assert_money<E>(actual: Decimal, expected: E)
where
    E: TryInto<Decimal>,
    E::Error: Debug,
{
    let expected: Decimal = expected.try_into().unwrap();
    assert!(
        (actual - expected).abs() <= Decimal::new(5, 3),
        "expected {:.2}, got {}",
        expected,
        actual
    );
}

/// Insert a user and return its id
pub async fn add_user(db: &Database, username: &str, city: &str) -> i32 {
    db.connection()
        .execute_unprepared(&format!(
            "INSERT INTO users (username, email, city) VALUES ('{0}', '{0}@example.com', '{1}')",
            username, city
        ))
        .await
        .unwrap();

    commerce(db)
        .find_user_by_username(username)
        .await
        .unwrap()
        .expect("inserted user should exist")
        .id
}

pub async fn add_completed_order(
    db: &Database,
    user_id: i32,
    placed_at: NaiveDateTime,
    amount: Decimal,
) -> i32 {
    commerce(db)
        .record_order(NewOrder {
            user_id,
            order_date: placed_at,
            status: OrderStatus::Completed,
            amount,
        })
        .await
        .unwrap()
}
