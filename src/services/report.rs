//! Reports.

use crate::endpoint::Endpoint;
use crate::envelope::decode_record;
use crate::error::Result;
use crate::filter::Filters;
use crate::http::ApiClient;
use crate::model::{CustomerReport, OverviewReport, ProductReport, SalesReport};
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct ReportService {
    client: ApiClient,
}

impl ReportService {
    pub fn new(client: ApiClient) -> Self {
        ReportService { client }
    }

    async fn fetch<R: DeserializeOwned>(&self, endpoint: Endpoint, filters: &Filters) -> Result<R> {
        let value = self.client.get(endpoint.template(), filters).await?;
        decode_record(value, "report")
    }

    pub async fn sales(&self, filters: &Filters) -> Result<SalesReport> {
        self.fetch(Endpoint::ReportSales, filters).await
    }

    pub async fn customers(&self, filters: &Filters) -> Result<CustomerReport> {
        self.fetch(Endpoint::ReportCustomers, filters).await
    }

    pub async fn products(&self, filters: &Filters) -> Result<ProductReport> {
        self.fetch(Endpoint::ReportProducts, filters).await
    }

    /// All three reports, requested concurrently.
    ///
    /// # Errors
    /// Any single failure fails the whole overview; there is no partial result.
    pub async fn overview(&self, filters: &Filters) -> Result<OverviewReport> {
        let (sales, customers, products) = tokio::try_join!(
            self.sales(filters),
            self.customers(filters),
            self.products(filters)
        )?;
        Ok(OverviewReport {
            sales,
            customers,
            products,
        })
    }
}
