//! Storefront homepage settings and banners.

use super::{RestEndpoints, RestService};
use crate::endpoint::Endpoint;
use crate::envelope::decode_record;
use crate::error::Result;
use crate::http::ApiClient;
use crate::model::{Banner, HomepageSettings};

#[derive(Clone)]
pub struct HomepageService {
    client: ApiClient,
    banners: RestService<Banner>,
}

impl HomepageService {
    pub fn new(client: ApiClient) -> Self {
        HomepageService {
            banners: RestService::new(client.clone(), RestEndpoints::BANNERS),
            client,
        }
    }

    pub async fn settings(&self) -> Result<HomepageSettings> {
        let value = self
            .client
            .get(Endpoint::HomepageSettings.template(), &Default::default())
            .await?;
        let settings: HomepageSettings = decode_record(value, "settings")?;
        Ok(settings.normalize(&self.client.normalize_context()))
    }

    /// Replace the settings document. Returns what the backend stored, or the
    /// submitted settings when it only acknowledges.
    pub async fn update_settings(&self, settings: &HomepageSettings) -> Result<HomepageSettings> {
        let value = self
            .client
            .put(Endpoint::HomepageSettings.template(), settings)
            .await?;
        let value = crate::envelope::unwrap_envelope(value)?;
        let stored = decode_record::<HomepageSettings>(value, "settings")
            .ok()
            .filter(|s| *s != HomepageSettings::default())
            .unwrap_or_else(|| settings.clone());
        Ok(stored.normalize(&self.client.normalize_context()))
    }

    /// CRUD over the banner carousel.
    pub fn banners(&self) -> &RestService<Banner> {
        &self.banners
    }
}
