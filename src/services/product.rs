//! Products: multipart writes and the variant sub-resource.

use super::{RestEndpoints, RestService};
use crate::endpoint::Endpoint;
use crate::envelope::{unwrap_envelope, ListPage};
use crate::error::Result;
use crate::filter::Filters;
use crate::form::{encode_product, encode_variant};
use crate::http::ApiClient;
use crate::model::{Product, ProductInput, VariantInput};
use crate::repository::ResourceService;
use serde_json::json;

/// Product service. Reads are plain JSON; writes are multipart forms built by
/// [`crate::form`].
#[derive(Clone)]
pub struct ProductService {
    rest: RestService<Product>,
}

impl ProductService {
    pub fn new(client: ApiClient) -> Self {
        ProductService {
            rest: RestService::new(client, RestEndpoints::PRODUCTS),
        }
    }

    fn client(&self) -> &ApiClient {
        self.rest.client()
    }

    /// Attach a variant to an existing product.
    pub async fn add_variant(&self, product_id: &str, variant: &VariantInput) -> Result<Option<Product>> {
        let path = Endpoint::ProductVariants.with_id(&product_id);
        let value = self
            .client()
            .post_multipart(&path, encode_variant(variant))
            .await?;
        self.rest.decode_written(value)
    }

    pub async fn remove_variant(&self, product_id: &str, variant_id: &str) -> Result<()> {
        let path = Endpoint::ProductVariant.path(&[("id", product_id), ("variantId", variant_id)]);
        let value = self.client().delete(&path).await?;
        unwrap_envelope(value)?;
        Ok(())
    }

    /// Show or hide a product in the storefront.
    pub async fn set_availability(&self, product_id: &str, available: bool) -> Result<()> {
        let path = Endpoint::ProductAvailability.with_id(&product_id);
        let value = self
            .client()
            .patch(&path, &json!({ "isAvailable": available }))
            .await?;
        unwrap_envelope(value)?;
        Ok(())
    }
}

impl ResourceService<Product> for ProductService {
    async fn list(&self, filters: &Filters) -> Result<ListPage<Product>> {
        self.rest.list(filters).await
    }

    async fn get(&self, key: &String) -> Result<Product> {
        self.rest.get(key).await
    }

    async fn create(&self, draft: &ProductInput) -> Result<Option<Product>> {
        draft.validate()?;
        let value = self
            .client()
            .post_multipart(Endpoint::Products.template(), encode_product(draft))
            .await?;
        self.rest.decode_written(value)
    }

    async fn update(&self, key: &String, draft: &ProductInput) -> Result<Option<Product>> {
        draft.validate()?;
        let path = Endpoint::Product.with_id(key);
        let value = self
            .client()
            .put_multipart(&path, encode_product(draft))
            .await?;
        self.rest.decode_written(value)
    }

    async fn delete(&self, key: &String) -> Result<()> {
        self.rest.delete(key).await
    }
}
