//! # Warehouse Client Module
//!
//! HTTP client for the warehouse REST service. Every operation issues one
//! request (creation issues two) and converts transport failures, timeouts
//! and non-success statuses into [`WarehouseError`].

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::warehouse_errors::WarehouseError;
use crate::warehouse_model::{
    CategoryAttributes, NewThermocup, Product, ProductCategory, ReservedChange,
    ServerAttributes, StockChange, ThermocupAttributes,
};

/// Operations the bot needs from the warehouse service
#[async_trait]
pub trait WarehouseApi: Send + Sync {
    /// `GET /products/{id}`
    async fn fetch_product(&self, product_id: i64) -> Result<Product, WarehouseError>;

    /// `GET /products?<filters>`
    async fn fetch_products(
        &self,
        filters: &[(String, String)],
    ) -> Result<Vec<Product>, WarehouseError>;

    /// `GET /products/thermocups/{id}`
    async fn fetch_thermocup_attributes(
        &self,
        product_id: i64,
    ) -> Result<ThermocupAttributes, WarehouseError>;

    /// `GET /products/servers/{id}`
    async fn fetch_server_attributes(
        &self,
        product_id: i64,
    ) -> Result<ServerAttributes, WarehouseError>;

    /// Creates the product and then its thermocup attributes; returns the new product id
    async fn create_thermocup(&self, draft: &NewThermocup) -> Result<i64, WarehouseError>;

    /// `PUT /products/thermocups/update/{id}` with the product fields and attributes
    async fn update_thermocup(
        &self,
        product_id: i64,
        update: &NewThermocup,
    ) -> Result<(), WarehouseError>;

    /// `PATCH /products/thermocups/update/{id}/stock`
    async fn update_stock(
        &self,
        product_id: i64,
        warehouse_id: i64,
        quantity_change: i32,
    ) -> Result<(), WarehouseError>;

    /// `PATCH /products/thermocups/update/{id}/reserved`
    async fn update_reserved(
        &self,
        product_id: i64,
        quantity_change: i32,
    ) -> Result<(), WarehouseError>;

    /// Fetches the attribute record matching the product's category.
    ///
    /// Categories without an attribute schema resolve to
    /// [`CategoryAttributes::Unknown`] without a network call.
    async fn fetch_category_attributes(
        &self,
        product: &Product,
    ) -> Result<CategoryAttributes, WarehouseError> {
        let category = product.category();
        let product_id = match (product.id, &category) {
            (_, ProductCategory::Other(label)) => {
                return Ok(CategoryAttributes::Unknown(label.clone()))
            }
            (Some(id), _) => id,
            (None, _) => {
                return Err(WarehouseError::NotFound(format!(
                    "attributes of unsaved product {}",
                    product.name
                )))
            }
        };

        match category {
            ProductCategory::Thermocups => self
                .fetch_thermocup_attributes(product_id)
                .await
                .map(CategoryAttributes::Thermocup),
            ProductCategory::Servers => self
                .fetch_server_attributes(product_id)
                .await
                .map(CategoryAttributes::Server),
            ProductCategory::Other(label) => Ok(CategoryAttributes::Unknown(label)),
        }
    }
}

/// [`WarehouseApi`] over HTTP
#[derive(Debug, Clone)]
pub struct WarehouseClient {
    http: reqwest::Client,
    base_url: String,
}

impl WarehouseClient {
    /// Create a client for `base_url` with the given connect and request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WarehouseError> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and map 404 and other non-success statuses to errors
    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<Response, WarehouseError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                error!(resource, "Warehouse request timed out");
            } else {
                error!(resource, error = %e, "Warehouse request failed");
            }
            WarehouseError::from(e)
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(resource, "Warehouse resource not found");
            return Err(WarehouseError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(resource, status = status.as_u16(), body = %body, "Warehouse returned an error status");
            return Err(WarehouseError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: &str,
    ) -> Result<T, WarehouseError> {
        let response = self.send(self.http.get(self.url(path)), resource).await?;
        response.json::<T>().await.map_err(|e| {
            error!(resource, error = %e, "Failed to decode warehouse response");
            WarehouseError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl WarehouseApi for WarehouseClient {
    async fn fetch_product(&self, product_id: i64) -> Result<Product, WarehouseError> {
        self.get_json(
            &format!("/products/{product_id}"),
            &format!("product {product_id}"),
        )
        .await
    }

    async fn fetch_products(
        &self,
        filters: &[(String, String)],
    ) -> Result<Vec<Product>, WarehouseError> {
        let request = self.http.get(self.url("/products")).query(filters);
        let response = self.send(request, "products").await?;
        let products: Vec<Product> = response
            .json()
            .await
            .map_err(|e| WarehouseError::Decode(e.to_string()))?;
        debug!(count = products.len(), filters = filters.len(), "Fetched product listing");
        Ok(products)
    }

    async fn fetch_thermocup_attributes(
        &self,
        product_id: i64,
    ) -> Result<ThermocupAttributes, WarehouseError> {
        self.get_json(
            &format!("/products/thermocups/{product_id}"),
            &format!("thermocup {product_id}"),
        )
        .await
    }

    async fn fetch_server_attributes(
        &self,
        product_id: i64,
    ) -> Result<ServerAttributes, WarehouseError> {
        self.get_json(
            &format!("/products/servers/{product_id}"),
            &format!("server {product_id}"),
        )
        .await
    }

    async fn create_thermocup(&self, draft: &NewThermocup) -> Result<i64, WarehouseError> {
        let request = self.http.post(self.url("/products")).json(&draft.product);
        let created: Product = self
            .send(request, "new product")
            .await?
            .json()
            .await
            .map_err(|e| WarehouseError::Decode(e.to_string()))?;

        let product_id = created.id.ok_or_else(|| {
            WarehouseError::Decode("created product has no id".to_string())
        })?;

        let attributes = ThermocupAttributes {
            product_id: Some(product_id),
            ..draft.attributes.clone()
        };
        let request = self
            .http
            .post(self.url("/products/thermocups/create"))
            .json(&attributes);
        self.send(request, &format!("thermocup attributes {product_id}"))
            .await?;

        info!(product_id, name = %draft.product.name, "Thermocup created");
        Ok(product_id)
    }

    async fn update_thermocup(
        &self,
        product_id: i64,
        update: &NewThermocup,
    ) -> Result<(), WarehouseError> {
        let request = self
            .http
            .put(self.url(&format!("/products/thermocups/update/{product_id}")))
            .json(update);
        self.send(request, &format!("thermocup {product_id}")).await?;

        info!(product_id, name = %update.product.name, "Thermocup updated");
        Ok(())
    }

    async fn update_stock(
        &self,
        product_id: i64,
        warehouse_id: i64,
        quantity_change: i32,
    ) -> Result<(), WarehouseError> {
        let body = StockChange {
            warehouse_id,
            quantity_change,
        };
        let request = self
            .http
            .patch(self.url(&format!("/products/thermocups/update/{product_id}/stock")))
            .json(&body);
        self.send(request, &format!("stock of product {product_id}"))
            .await?;

        info!(product_id, warehouse_id, quantity_change, "Stock quantity updated");
        Ok(())
    }

    async fn update_reserved(
        &self,
        product_id: i64,
        quantity_change: i32,
    ) -> Result<(), WarehouseError> {
        let body = ReservedChange { quantity_change };
        let request = self
            .http
            .patch(self.url(&format!("/products/thermocups/update/{product_id}/reserved")))
            .json(&body);
        self.send(request, &format!("reservations of product {product_id}"))
            .await?;

        info!(product_id, quantity_change, "Reserved quantity updated");
        Ok(())
    }
}
