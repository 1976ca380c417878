//! Chart datasets derived from the catalog and the applied report filter.
//!
//! Everything here is a pure function of its inputs. Nothing is cached: the
//! dashboard calls [`derive_chart`] every time it needs to draw.

use serde_json::{json, Value};

use crate::models::{Catalog, Category, Product};

pub const LOADING_TITLE: &str = "Loading...";
pub const PIE_TITLE: &str = "Default View - Pie Chart";

/// Category + product titles captured when a report is run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub category: String,
    /// Empty means every product in the category.
    pub products: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub name: String,
    pub count: usize,
    /// Id of the matching [`DrilldownSeries`].
    pub drilldown: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrilldownSeries {
    pub id: String,
    pub name: String,
    pub points: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
    pub drilldown: Vec<DrilldownSeries>,
}

impl PieChart {
    pub fn total(&self) -> usize {
        self.slices.iter().map(|s| s.count).sum()
    }

    /// Share of the whole, 0.0..=100.0. Zero when the chart is empty.
    pub fn percentage(&self, slice: &PieSlice) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            slice.count as f64 * 100.0 / total as f64
        }
    }

    pub fn drilldown_for(&self, id: &str) -> Option<&DrilldownSeries> {
        self.drilldown.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChart {
    pub title: String,
    pub category: String,
    /// (product title, price) in catalog order.
    pub points: Vec<(String, f64)>,
}

impl ColumnChart {
    pub fn titles(&self) -> Vec<&str> {
        self.points.iter().map(|(t, _)| t.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    /// No catalog yet (still fetching, or the fetch failed).
    Loading,
    Pie(PieChart),
    Column(ColumnChart),
    /// Title only, nothing to plot.
    Placeholder { title: String },
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Loading => LOADING_TITLE,
            ChartSpec::Pie(pie) => pie.title.as_str(),
            ChartSpec::Column(col) => col.title.as_str(),
            ChartSpec::Placeholder { title } => title.as_str(),
        }
    }

    pub fn has_series(&self) -> bool {
        matches!(self, ChartSpec::Pie(_) | ChartSpec::Column(_))
    }

    /// Highcharts options for this dataset, so a browser front end can draw
    /// exactly what the terminal shows.
    pub fn to_highcharts(&self) -> Value {
        match self {
            ChartSpec::Loading | ChartSpec::Placeholder { .. } => {
                json!({ "title": { "text": self.title() } })
            }
            ChartSpec::Pie(pie) => pie_options(pie),
            ChartSpec::Column(col) => column_options(col),
        }
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Product count per category, with each category's prices as its drilldown.
pub fn pie_summary(categories: &[Category], products: &[Product]) -> ChartSpec {
    let mut slices = Vec::with_capacity(categories.len());
    let mut drilldown = Vec::with_capacity(categories.len());

    for cat in categories {
        let points: Vec<(String, f64)> = products
            .iter()
            .filter(|p| p.in_category(&cat.name))
            .map(|p| (p.title.clone(), p.price))
            .collect();
        slices.push(PieSlice {
            name: cat.name.clone(),
            count: points.len(),
            drilldown: cat.name.clone(),
        });
        drilldown.push(DrilldownSeries {
            id: cat.name.clone(),
            name: cat.name.clone(),
            points,
        });
    }

    ChartSpec::Pie(PieChart {
        title: PIE_TITLE.to_string(),
        slices,
        drilldown,
    })
}

/// Prices of the products in `category`, optionally narrowed to exact
/// (case-sensitive) `titles`. Degenerates to a placeholder when nothing is left.
pub fn column_report(products: &[Product], category: &str, titles: &[String]) -> ChartSpec {
    let points: Vec<(String, f64)> = products
        .iter()
        .filter(|p| p.in_category(category))
        .filter(|p| titles.is_empty() || titles.iter().any(|t| *t == p.title))
        .map(|p| (p.title.clone(), p.price))
        .collect();

    if points.is_empty() {
        return ChartSpec::Placeholder {
            title: format!("No products found in {category}"),
        };
    }

    ChartSpec::Column(ColumnChart {
        title: format!("Product Prices in {category}"),
        category: category.to_string(),
        points,
    })
}

/// The single rendering rule: the chart is always recomputed from the source
/// lists and the applied filter. A missing catalog reports as empty.
pub fn derive_chart(catalog: Option<&Catalog>, applied: Option<&ReportFilter>) -> ChartSpec {
    match (catalog, applied) {
        (None, None) => ChartSpec::Loading,
        (Some(catalog), None) => pie_summary(&catalog.categories, &catalog.products),
        (catalog, Some(filter)) => {
            let products = catalog.map(|c| c.products.as_slice()).unwrap_or(&[]);
            column_report(products, &filter.category, &filter.products)
        }
    }
}

// ---------------------------------------------------------------------------
// Highcharts export
// ---------------------------------------------------------------------------

fn pie_options(pie: &PieChart) -> Value {
    let data: Vec<Value> = pie
        .slices
        .iter()
        .map(|s| json!({ "name": s.name, "y": s.count, "drilldown": s.drilldown }))
        .collect();
    let drilldown: Vec<Value> = pie
        .drilldown
        .iter()
        .map(|d| json!({ "name": d.name, "id": d.id, "data": point_pairs(&d.points) }))
        .collect();

    json!({
        "chart": { "type": "pie" },
        "title": { "text": pie.title },
        "tooltip": { "pointFormat": "{series.name}: <b>{point.percentage:.1f}%</b>" },
        "plotOptions": {
            "pie": {
                "allowPointSelect": true,
                "cursor": "pointer",
                "dataLabels": {
                    "enabled": true,
                    "format": "{point.name}: {point.y} products"
                }
            }
        },
        "series": [{ "name": "Categories", "colorByPoint": true, "data": data }],
        "drilldown": { "series": drilldown }
    })
}

fn column_options(col: &ColumnChart) -> Value {
    json!({
        "chart": { "type": "column" },
        "title": { "text": col.title },
        "xAxis": {
            "categories": col.titles(),
            "title": { "text": "Products" }
        },
        "yAxis": { "title": { "text": "Price (in USD)" } },
        "legend": { "enabled": false },
        "series": [{
            "name": "Prices",
            "data": point_pairs(&col.points),
            "dataLabels": {
                "enabled": true,
                "format": "{point.y:.2f}$",
                "style": { "fontSize": "12px", "color": "black" }
            },
            "tooltip": { "pointFormat": "Price: <b>${point.y:.2f}</b><br>" },
            "colorByPoint": true,
            "borderRadius": 3
        }],
        "plotOptions": { "column": { "dataLabels": { "enabled": true } } }
    })
}

fn point_pairs(points: &[(String, f64)]) -> Vec<Value> {
    points.iter().map(|(t, p)| json!([t, p])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> Category {
        Category {
            slug: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            url: format!("https://dummyjson.com/products/category/{name}"),
        }
    }

    fn product(title: &str, category: &str, price: f64) -> Product {
        Product {
            title: title.to_string(),
            category: category.to_string(),
            price,
        }
    }

    fn phones() -> Catalog {
        Catalog::new(
            vec![category("smartphones")],
            vec![
                product("iPhone 9", "smartphones", 549.0),
                product("Galaxy", "Smartphones", 499.0),
            ],
        )
    }

    fn mixed() -> Catalog {
        Catalog::new(
            vec![category("Beauty"), category("Laptops"), category("Groceries")],
            vec![
                product("Mascara", "beauty", 9.99),
                product("Lipstick", " Beauty ", 12.99),
                product("MacBook Pro", "laptops", 1749.0),
                product("Eyeshadow", "BEAUTY", 19.99),
            ],
        )
    }

    #[test]
    fn test_pie_counts_sum_to_product_total() {
        let catalog = mixed();
        let ChartSpec::Pie(pie) = pie_summary(&catalog.categories, &catalog.products) else {
            panic!("expected pie");
        };
        assert_eq!(pie.total(), catalog.products.len());
        let counts: Vec<usize> = pie.slices.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![3, 1, 0]);
        assert_eq!(pie.title, PIE_TITLE);
    }

    #[test]
    fn test_pie_drilldown_ids_match_slices() {
        let catalog = mixed();
        let ChartSpec::Pie(pie) = pie_summary(&catalog.categories, &catalog.products) else {
            panic!("expected pie");
        };
        for slice in &pie.slices {
            let series = pie.drilldown_for(&slice.drilldown).unwrap();
            assert_eq!(series.points.len(), slice.count);
        }
        let laptops = pie.drilldown_for("Laptops").unwrap();
        assert_eq!(laptops.points, vec![("MacBook Pro".to_string(), 1749.0)]);
    }

    #[test]
    fn test_pie_percentage_handles_empty_catalog() {
        let ChartSpec::Pie(pie) = pie_summary(&[category("Beauty")], &[]) else {
            panic!("expected pie");
        };
        assert_eq!(pie.total(), 0);
        assert_eq!(pie.percentage(&pie.slices[0]), 0.0);
    }

    #[test]
    fn test_column_matches_category_case_insensitively() {
        let catalog = phones();
        let ChartSpec::Column(col) = column_report(&catalog.products, "smartphones", &[]) else {
            panic!("expected column chart");
        };
        assert_eq!(col.titles(), vec!["iPhone 9", "Galaxy"]);
        assert_eq!(
            col.points.iter().map(|(_, p)| *p).collect::<Vec<_>>(),
            vec![549.0, 499.0]
        );
        assert_eq!(col.title, "Product Prices in smartphones");
    }

    #[test]
    fn test_column_restricts_to_selected_titles() {
        let catalog = phones();
        let chart = column_report(&catalog.products, "smartphones", &["iPhone 9".to_string()]);
        let ChartSpec::Column(col) = chart else {
            panic!("expected column chart");
        };
        assert_eq!(col.points, vec![("iPhone 9".to_string(), 549.0)]);
    }

    #[test]
    fn test_column_title_match_is_case_sensitive() {
        let catalog = phones();
        let chart = column_report(&catalog.products, "smartphones", &["iphone 9".to_string()]);
        assert_eq!(
            chart,
            ChartSpec::Placeholder {
                title: "No products found in smartphones".to_string()
            }
        );
    }

    #[test]
    fn test_column_titles_outside_category_are_ignored() {
        let catalog = mixed();
        let titles = vec!["Mascara".to_string(), "MacBook Pro".to_string()];
        let ChartSpec::Column(col) = column_report(&catalog.products, "beauty", &titles) else {
            panic!("expected column chart");
        };
        assert_eq!(col.titles(), vec!["Mascara"]);
    }

    #[test]
    fn test_unknown_category_is_placeholder() {
        let catalog = phones();
        let chart = column_report(&catalog.products, "nonexistent", &[]);
        assert!(!chart.has_series());
        assert_eq!(chart.title(), "No products found in nonexistent");
    }

    #[test]
    fn test_derive_chart_states() {
        let catalog = phones();
        assert_eq!(derive_chart(None, None), ChartSpec::Loading);
        assert!(matches!(derive_chart(Some(&catalog), None), ChartSpec::Pie(_)));

        let filter = ReportFilter {
            category: "smartphones".into(),
            products: vec![],
        };
        assert!(matches!(
            derive_chart(Some(&catalog), Some(&filter)),
            ChartSpec::Column(_)
        ));
        assert!(matches!(
            derive_chart(None, Some(&filter)),
            ChartSpec::Placeholder { .. }
        ));
    }

    #[test]
    fn test_highcharts_pie_options() {
        let catalog = phones();
        let options = derive_chart(Some(&catalog), None).to_highcharts();
        assert_eq!(options["chart"]["type"], "pie");
        assert_eq!(options["series"][0]["name"], "Categories");
        assert_eq!(options["series"][0]["data"][0]["y"], 2);
        assert_eq!(options["series"][0]["data"][0]["drilldown"], "smartphones");
        assert_eq!(options["drilldown"]["series"][0]["data"][1][0], "Galaxy");
    }

    #[test]
    fn test_highcharts_column_options() {
        let catalog = phones();
        let filter = ReportFilter {
            category: "smartphones".into(),
            products: vec!["Galaxy".into()],
        };
        let options = derive_chart(Some(&catalog), Some(&filter)).to_highcharts();
        assert_eq!(options["chart"]["type"], "column");
        assert_eq!(options["xAxis"]["categories"], json!(["Galaxy"]));
        assert_eq!(options["series"][0]["data"], json!([["Galaxy", 499.0]]));
        assert_eq!(options["legend"]["enabled"], false);
    }

    #[test]
    fn test_highcharts_placeholder_has_no_series() {
        let options = ChartSpec::Placeholder {
            title: "No products found in x".into(),
        }
        .to_highcharts();
        assert_eq!(options["title"]["text"], "No products found in x");
        assert!(options.get("series").is_none());
        assert_eq!(ChartSpec::Loading.to_highcharts()["title"]["text"], LOADING_TITLE);
    }
}
