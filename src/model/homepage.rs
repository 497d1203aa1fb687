//! Storefront homepage content.

use crate::entity::{generate_id, NormalizeContext, Resource};
use crate::error::{Error, Result};
use crate::image::resolve_in_place;
use crate::storage::keys;
use serde::{Deserialize, Serialize};

/// Singleton settings document for the storefront homepage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomepageSettings {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub hero_image: Option<String>,
    pub announcement: Option<String>,
    pub featured_product_ids: Vec<String>,
    pub show_categories: bool,
    pub show_testimonials: bool,
    pub banners: Vec<Banner>,
}

impl HomepageSettings {
    pub fn normalize(mut self, ctx: &NormalizeContext) -> Self {
        resolve_in_place(&mut self.hero_image, &ctx.backend_origin);
        self.banners = self
            .banners
            .into_iter()
            .map(|b| b.normalize(ctx))
            .collect();
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, alias = "order")]
    pub position: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Resource for Banner {
    type Key = String;
    type Draft = Banner;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn resource_name() -> &'static str {
        "banner"
    }

    fn collection_key() -> &'static str {
        "banners"
    }

    fn storage_key() -> &'static str {
        keys::HOMEPAGE_BANNERS
    }

    fn from_draft(draft: Banner, key: Option<String>) -> Banner {
        Banner {
            id: key.unwrap_or(draft.id.clone()),
            ..draft
        }
    }

    fn assign_key(&mut self, existing: &[Self]) {
        if self.id.is_empty() {
            self.id = generate_id();
        }
        if self.position == 0 {
            self.position = existing.iter().map(|b| b.position).max().unwrap_or(0) + 1;
        }
    }

    fn normalize(mut self, ctx: &NormalizeContext) -> Self {
        resolve_in_place(&mut self.image, &ctx.backend_origin);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.image.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Validation("banner image is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_tolerate_missing_fields() {
        let settings: HomepageSettings = serde_json::from_value(json!({
            "heroTitle": "Fresh every morning",
            "banners": [{"_id": "b1", "image": "/banners/b1.jpg", "order": 2}]
        }))
        .unwrap();

        let settings = settings.normalize(&NormalizeContext::new("https://api.example.com"));
        assert_eq!(settings.hero_title, "Fresh every morning");
        assert!(settings.featured_product_ids.is_empty());
        assert_eq!(settings.banners[0].position, 2);
        assert_eq!(
            settings.banners[0].image.as_deref(),
            Some("https://api.example.com/banners/b1.jpg")
        );
    }

    #[test]
    fn test_new_banner_goes_last() {
        let existing = vec![
            Banner { id: "a".into(), position: 1, ..Default::default() },
            Banner { id: "b".into(), position: 4, ..Default::default() },
        ];
        let mut banner = Banner::default();
        banner.assign_key(&existing);
        assert_eq!(banner.position, 5);
        assert!(!banner.id.is_empty());
    }
}
