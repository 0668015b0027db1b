//! Tracked product catalog backed by SQLite.

pub mod url_parser;

pub use url_parser::{parse_product_url, ProductDetails};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::models::{NewProduct, Product, ProductRow, Vendor};
use crate::utils::error::AppError;
use crate::Result;

/// Row source for a run. Any failure is `AppError::DataAccess`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// All products in insertion order, optionally limited to one vendor tag.
    async fn load_products(&self, vendor: Option<Vendor>) -> Result<Vec<Product>>;
}

const CREATE_PRODUCTS: &str = "CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    product_identifier TEXT NOT NULL,
    vendor_tag TEXT NOT NULL,
    affiliate_link TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (vendor_tag, product_identifier)
)";

const SELECT_PRODUCTS: &str = "SELECT id, name, url, product_identifier, vendor_tag, affiliate_link, created_at \
     FROM products WHERE (? IS NULL OR vendor_tag = ?) ORDER BY rowid";

/// Opens a fresh connection for every call and closes it before returning.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    options: SqliteConnectOptions,
}

impl SqliteCatalog {
    pub fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        Ok(Self { options })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            options: SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true),
        }
    }

    async fn connect(&self) -> Result<SqliteConnection> {
        Ok(self.options.connect().await?)
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        let mut conn = self.connect().await?;
        sqlx::query(CREATE_PRODUCTS).execute(&mut conn).await?;
        conn.close().await?;
        info!("Catalog schema ready");
        Ok(())
    }

    pub async fn list_products(&self, vendor: Option<&Vendor>) -> Result<Vec<Product>> {
        let tag = vendor.map(|v| v.tag().to_string());

        let mut conn = self.connect().await?;
        let rows = sqlx::query_as::<_, ProductRow>(SELECT_PRODUCTS)
            .bind(tag.clone())
            .bind(tag)
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn insert_product(&self, new_product: NewProduct) -> Result<Product> {
        let product = Product::new(new_product);

        let mut conn = self.connect().await?;
        let inserted = sqlx::query(
            "INSERT INTO products (id, name, url, product_identifier, vendor_tag, affiliate_link, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.url)
        .bind(&product.product_identifier)
        .bind(product.vendor.tag())
        .bind(&product.affiliate_link)
        .bind(product.created_at)
        .execute(&mut conn)
        .await;
        conn.close().await?;

        match inserted {
            Ok(_) => {
                info!(id = %product.id, vendor = %product.vendor, name = %product.name, "Product added");
                Ok(product)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::Conflict(format!(
                "{} product {} is already tracked",
                product.vendor, product.product_identifier
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns `false` when no row had that id.
    pub async fn delete_product(&self, id: &str) -> Result<bool> {
        let mut conn = self.connect().await?;
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(id, "Product deleted");
        }
        Ok(deleted)
    }
}

#[async_trait]
impl CatalogSource for SqliteCatalog {
    async fn load_products(&self, vendor: Option<Vendor>) -> Result<Vec<Product>> {
        let products = self.list_products(vendor.as_ref()).await?;
        debug!(count = products.len(), "Catalog loaded");
        Ok(products)
    }
}
