use tracing::debug;

use crate::catalog::CatalogClient;
use crate::charts::{derive_chart, ChartSpec, ReportFilter};
use crate::error::Result;
use crate::models::{Catalog, Category, Product};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardState {
    NoCategory,
    CategorySelected,
    ReportRun,
}

/// What the user has picked in the filter sidebar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub category: Option<String>,
    pub products: Vec<String>,
}

/// Owns the catalog and the filter state. The chart is never stored; every
/// call to [`DashboardController::chart`] derives it from the source lists.
#[derive(Debug)]
pub struct DashboardController {
    catalog: Option<Catalog>,
    selection: Selection,
    applied: Option<ReportFilter>,
    state: DashboardState,
}

impl Default for DashboardController {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardController {
    pub fn new() -> Self {
        Self {
            catalog: None,
            selection: Selection::default(),
            applied: None,
            state: DashboardState::NoCategory,
        }
    }

    /// Fetch and install the catalog. On failure nothing is installed and the
    /// chart stays at [`ChartSpec::Loading`].
    pub async fn load_catalog(&mut self, client: &CatalogClient) -> Result<()> {
        let result = client.load_catalog().await;
        self.finish_load(result)
    }

    /// Install the outcome of a fetch that ran elsewhere (the dashboard runs
    /// it on a background task).
    pub fn finish_load(&mut self, result: Result<Catalog>) -> Result<()> {
        match result {
            Ok(catalog) => {
                debug!(
                    categories = catalog.categories.len(),
                    products = catalog.products.len(),
                    "catalog installed"
                );
                self.catalog = Some(catalog);
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "no catalog installed, chart stays at loading");
                Err(e)
            }
        }
    }

    pub fn select_category(&mut self, name: &str) {
        debug!(category = name, "select category");
        self.selection.category = Some(name.to_string());
        self.selection.products.clear();
        self.state = DashboardState::CategorySelected;
    }

    /// Replace the product sub-selection. Ignored while no category is active.
    pub fn select_products<I, S>(&mut self, titles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.selection.category.is_none() {
            return;
        }
        let mut products: Vec<String> = Vec::new();
        for title in titles {
            let title = title.into();
            if !products.contains(&title) {
                products.push(title);
            }
        }
        debug!(count = products.len(), "select products");
        self.selection.products = products;
    }

    /// Add or remove one title from the sub-selection.
    pub fn toggle_product(&mut self, title: &str) {
        let mut products = self.selection.products.clone();
        if let Some(pos) = products.iter().position(|t| t == title) {
            products.remove(pos);
        } else {
            products.push(title.to_string());
        }
        self.select_products(products);
    }

    /// Switch the chart to the column report for the active category.
    /// Returns false (and changes nothing) when no category is active.
    pub fn run_report(&mut self) -> bool {
        let Some(category) = self.selection.category.clone() else {
            return false;
        };
        debug!(category = %category, products = self.selection.products.len(), "run report");
        self.applied = Some(ReportFilter {
            category,
            products: self.selection.products.clone(),
        });
        self.state = DashboardState::ReportRun;
        true
    }

    pub fn clear(&mut self) {
        debug!("clear filters");
        self.selection = Selection::default();
        self.applied = None;
        self.state = DashboardState::NoCategory;
    }

    pub fn chart(&self) -> ChartSpec {
        derive_chart(self.catalog.as_ref(), self.applied.as_ref())
    }

    pub fn state(&self) -> DashboardState {
        self.state
    }

    pub fn report_enabled(&self) -> bool {
        self.state == DashboardState::CategorySelected
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.is_some()
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selection.category.as_deref()
    }

    pub fn selected_products(&self) -> &[String] {
        &self.selection.products
    }

    pub fn is_product_selected(&self, title: &str) -> bool {
        self.selection.products.iter().any(|t| t == title)
    }

    pub fn categories(&self) -> &[Category] {
        self.catalog
            .as_ref()
            .map(|c| c.categories.as_slice())
            .unwrap_or(&[])
    }

    /// Options for the product picker. Empty until a category is chosen.
    pub fn products_in_active_category(&self) -> Vec<&Product> {
        match (&self.catalog, &self.selection.category) {
            (Some(catalog), Some(category)) => catalog.products_in(category).collect(),
            _ => Vec::new(),
        }
    }
}
