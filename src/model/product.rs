//! Products and their variants.
//!
//! The backend names the product title `dishName`; the UI calls it `name`.
//! Records read either and always write `dishName`.

use super::{lenient_f64, lenient_u32};
use crate::entity::{generate_id, NormalizeContext, Resource};
use crate::error::{Error, Result};
use crate::image::resolve_in_place;
use crate::storage::keys;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(rename = "dishName", alias = "name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub stock: u32,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

fn default_true() -> bool {
    true
}

/// A sellable size/pack of a product (e.g. 500 ml, 1 l).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(alias = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub stock: u32,
    #[serde(default)]
    pub image: Option<String>,
}

/// A file selected for upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        FileUpload {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Image supplied with a product or variant: a new file or an existing URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Url(String),
    File(FileUpload),
}

/// Create/update payload for products.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    pub unit: String,
    pub category: Option<String>,
    pub is_available: bool,
    pub is_featured: bool,
    pub tags: Vec<String>,
    pub image: Option<ImageSource>,
    pub variants: Vec<VariantInput>,
}

/// Variant part of a [`ProductInput`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VariantInput {
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub price: f64,
    pub stock: u32,
    pub image: Option<ImageSource>,
}

impl ProductInput {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        ProductInput {
            name: name.into(),
            price,
            is_available: true,
            ..Default::default()
        }
    }

    /// # Errors
    /// Returns `Error::Validation` for an empty name or a negative price.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("product name is required".to_string()));
        }
        if self.price < 0.0 || self.variants.iter().any(|v| v.price < 0.0) {
            return Err(Error::Validation("prices must not be negative".to_string()));
        }
        Ok(())
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        ProductInput {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            unit: product.unit.clone(),
            category: product.category.clone(),
            is_available: product.is_available,
            is_featured: product.is_featured,
            tags: product.tags.clone(),
            image: product.image.clone().map(ImageSource::Url),
            variants: product.variants.iter().map(VariantInput::from).collect(),
        }
    }
}

impl From<&Variant> for VariantInput {
    fn from(variant: &Variant) -> Self {
        VariantInput {
            label: variant.label.clone(),
            value: variant.value,
            unit: variant.unit.clone(),
            price: variant.price,
            stock: variant.stock,
            image: variant.image.clone().map(ImageSource::Url),
        }
    }
}

/// Local stand-in for a file that only exists client-side.
fn local_image(source: Option<ImageSource>) -> Option<String> {
    source.map(|s| match s {
        ImageSource::Url(url) => url,
        ImageSource::File(file) => format!("blob:local/{}", file.file_name),
    })
}

impl From<VariantInput> for Variant {
    fn from(input: VariantInput) -> Self {
        Variant {
            id: Some(generate_id()),
            label: input.label,
            value: input.value,
            unit: input.unit,
            price: input.price,
            stock: input.stock,
            image: local_image(input.image),
        }
    }
}

impl Resource for Product {
    type Key = String;
    type Draft = ProductInput;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn resource_name() -> &'static str {
        "product"
    }

    fn collection_key() -> &'static str {
        "products"
    }

    fn storage_key() -> &'static str {
        keys::PRODUCTS
    }

    fn from_draft(draft: ProductInput, key: Option<String>) -> Product {
        Product {
            id: key.unwrap_or_default(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            stock: draft.stock,
            unit: draft.unit,
            category: draft.category,
            image: local_image(draft.image),
            is_available: draft.is_available,
            is_featured: draft.is_featured,
            tags: draft.tags,
            variants: draft.variants.into_iter().map(Variant::from).collect(),
        }
    }

    fn assign_key(&mut self, _existing: &[Self]) {
        if self.id.is_empty() {
            self.id = generate_id();
        }
    }

    fn normalize(mut self, ctx: &NormalizeContext) -> Self {
        resolve_in_place(&mut self.image, &ctx.backend_origin);
        for variant in &mut self.variants {
            resolve_in_place(&mut variant.image, &ctx.backend_origin);
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("product name is required".to_string()));
        }
        Ok(())
    }
}
