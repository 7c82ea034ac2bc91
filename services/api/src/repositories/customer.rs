//! Customer repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::customer::{Customer, CustomerRequest};

fn map_customer(row: &PgRow) -> Customer {
    Customer {
        id: row.get("id"),
        name: row.get("name"),
        address: row.get("address"),
    }
}

/// Customer repository
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Create a new customer repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all customers
    pub async fn list_all(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query("SELECT id, name, address FROM customers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_customer).collect())
    }

    /// Find a customer by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT id, name, address FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_customer))
    }

    /// Create a customer
    pub async fn create(&self, payload: &CustomerRequest) -> Result<Customer> {
        let row = sqlx::query(
            "INSERT INTO customers (name, address) VALUES ($1, $2) RETURNING id, name, address",
        )
        .bind(&payload.name)
        .bind(&payload.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_customer(&row))
    }

    /// Replace a customer; returns whether the id resolved
    pub async fn update(&self, id: i64, payload: &CustomerRequest) -> Result<bool> {
        let result = sqlx::query("UPDATE customers SET name = $1, address = $2 WHERE id = $3")
            .bind(&payload.name)
            .bind(&payload.address)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a customer; returns whether the id resolved
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
