//! Multipart encoding of product payloads.
//!
//! Products travel as `multipart/form-data`: scalar fields as text parts,
//! booleans as `"true"`/`"false"`, arrays as repeated keys, and the variant
//! list as one JSON text part. A variant whose image is a new file refers to
//! a sibling file part by key:
//!
//! ```text
//! variants         = [{"label":"1 l", ..., "image":"variantImage_0"},
//!                     {"label":"500 ml", ..., "image":"https://cdn/x.png"}]
//! variantImage_0   = <file bytes>
//! ```
//!
//! [`VariantDescriptor`] is the schema of one entry of that JSON array.
//! Encoding is kept separate from transport so the payload can be inspected
//! without a network.

use crate::error::Result;
use crate::model::{FileUpload, ImageSource, ProductInput, VariantInput};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

pub const FIELD_NAME: &str = "dishName";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_PRICE: &str = "price";
pub const FIELD_STOCK: &str = "stock";
pub const FIELD_UNIT: &str = "unit";
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_AVAILABLE: &str = "isAvailable";
pub const FIELD_FEATURED: &str = "isFeatured";
pub const FIELD_TAGS: &str = "tags";
pub const FIELD_IMAGE: &str = "image";
pub const FIELD_VARIANTS: &str = "variants";

/// Key of the file part holding variant `index`'s image.
pub fn variant_image_key(index: usize) -> String {
    format!("variantImage_{}", index)
}

/// One entry of the `variants` JSON part.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDescriptor {
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub price: f64,
    pub stock: u32,
    /// Image URL, or the key of a sibling file part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormValue {
    Text(String),
    File(FileUpload),
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileUpload> {
        match self {
            FormValue::File(file) => Some(file),
            FormValue::Text(_) => None,
        }
    }
}

/// Ordered list of form parts; keys may repeat.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormPayload {
    parts: Vec<(String, FormValue)>,
}

impl FormPayload {
    pub fn new() -> Self {
        FormPayload { parts: Vec::new() }
    }

    pub fn text(&mut self, key: &str, value: impl Into<String>) {
        self.parts.push((key.to_string(), FormValue::Text(value.into())));
    }

    pub fn file(&mut self, key: &str, file: FileUpload) {
        self.parts.push((key.to_string(), FormValue::File(file)));
    }

    pub fn flag(&mut self, key: &str, value: bool) {
        self.text(key, if value { "true" } else { "false" });
    }

    /// First part under `key`.
    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.parts.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Every part under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a FormValue> + 'a {
        self.parts.iter().filter(move |(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn parts(&self) -> &[(String, FormValue)] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Keys of all file parts.
    pub fn file_keys(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter(|(_, v)| matches!(v, FormValue::File(_)))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Build the transport form.
    ///
    /// # Errors
    /// Returns `Error::Config` when a file carries an invalid MIME type.
    pub fn into_multipart(self) -> Result<Form> {
        let mut form = Form::new();
        for (key, value) in self.parts {
            form = match value {
                FormValue::Text(text) => form.text(key, text),
                FormValue::File(file) => {
                    let part = Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.mime)?;
                    form.part(key, part)
                }
            };
        }
        Ok(form)
    }
}

/// Encode a product create/update payload.
pub fn encode_product(input: &ProductInput) -> FormPayload {
    let mut form = FormPayload::new();

    form.text(FIELD_NAME, input.name.as_str());
    form.text(FIELD_DESCRIPTION, input.description.as_str());
    form.text(FIELD_PRICE, input.price.to_string());
    form.text(FIELD_STOCK, input.stock.to_string());
    form.text(FIELD_UNIT, input.unit.as_str());
    if let Some(category) = &input.category {
        form.text(FIELD_CATEGORY, category.as_str());
    }
    form.flag(FIELD_AVAILABLE, input.is_available);
    form.flag(FIELD_FEATURED, input.is_featured);
    for tag in &input.tags {
        form.text(FIELD_TAGS, tag.as_str());
    }
    append_image(&mut form, FIELD_IMAGE, input.image.as_ref());

    let mut descriptors = Vec::with_capacity(input.variants.len());
    let mut variant_files = Vec::new();
    for (index, variant) in input.variants.iter().enumerate() {
        let image = match &variant.image {
            Some(ImageSource::File(file)) => {
                let key = variant_image_key(index);
                variant_files.push((key.clone(), file.clone()));
                Some(key)
            }
            Some(ImageSource::Url(url)) => Some(url.clone()),
            None => None,
        };
        descriptors.push(descriptor(variant, image));
    }

    // Vec<VariantDescriptor> has no fallible fields.
    let json = serde_json::to_string(&descriptors).unwrap_or_else(|_| "[]".to_string());
    form.text(FIELD_VARIANTS, json);
    for (key, file) in variant_files {
        form.file(&key, file);
    }

    form
}

/// Encode a single variant for the variant sub-resource.
pub fn encode_variant(input: &VariantInput) -> FormPayload {
    let mut form = FormPayload::new();
    form.text("label", input.label.as_str());
    form.text("value", input.value.to_string());
    form.text("unit", input.unit.as_str());
    form.text("price", input.price.to_string());
    form.text("stock", input.stock.to_string());
    append_image(&mut form, FIELD_IMAGE, input.image.as_ref());
    form
}

fn append_image(form: &mut FormPayload, key: &str, image: Option<&ImageSource>) {
    match image {
        Some(ImageSource::File(file)) => form.file(key, file.clone()),
        Some(ImageSource::Url(url)) if !url.is_empty() => form.text(key, url.as_str()),
        _ => {}
    }
}

fn descriptor(variant: &VariantInput, image: Option<String>) -> VariantDescriptor {
    VariantDescriptor {
        label: variant.label.clone(),
        value: variant.value,
        unit: variant.unit.clone(),
        price: variant.price,
        stock: variant.stock,
        image,
    }
}
