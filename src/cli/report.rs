use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};
use tracing::warn;

use crate::charts::{ChartSpec, ColumnChart, PieChart};
use crate::cli::{load_controller, OutputArgs, OutputFormat};
use crate::controller::DashboardController;
use crate::error::Result;
use crate::fmt::{percent, price, product_count};
use crate::models::Category;
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn categories(settings: &Settings) -> Result<()> {
    let controller = load_controller(settings)?;
    let chart = controller.chart();
    let counts = match &chart {
        ChartSpec::Pie(pie) => pie.slices.iter().map(|s| s.count).collect(),
        _ => Vec::new(),
    };
    println!("{}", format_categories(controller.categories(), &counts));
    Ok(())
}

pub fn summary(settings: &Settings, drilldown: bool, output: OutputArgs) -> Result<()> {
    let controller = load_controller(settings)?;
    emit(&controller.chart(), drilldown, &output)
}

pub fn report(
    settings: &Settings,
    category: &str,
    products: Vec<String>,
    output: OutputArgs,
) -> Result<()> {
    let mut controller = load_controller(settings)?;
    let chart = run_report(&mut controller, category, products);
    if !chart.has_series() {
        warn!(category, "report has nothing to plot");
    }
    emit(&chart, false, &output)
}

/// Drive the controller the same way the dashboard does: pick the category,
/// then the products, then run.
pub(crate) fn run_report(
    controller: &mut DashboardController,
    category: &str,
    products: Vec<String>,
) -> ChartSpec {
    controller.select_category(category);
    controller.select_products(products);
    controller.run_report();
    controller.chart()
}

fn emit(chart: &ChartSpec, drilldown: bool, output: &OutputArgs) -> Result<()> {
    let content = match output.format {
        OutputFormat::Json => serde_json::to_string_pretty(&chart.to_highcharts())?,
        OutputFormat::Text => format_chart(chart, drilldown),
    };

    match &output.output {
        Some(path) => {
            let p = PathBuf::from(path);
            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&p, format!("{content}\n"))?;
            println!("Wrote {}", p.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure formatting functions (chart data → String)
// ---------------------------------------------------------------------------

pub fn format_chart(chart: &ChartSpec, drilldown: bool) -> String {
    match chart {
        ChartSpec::Pie(pie) => format_pie(pie, drilldown),
        ChartSpec::Column(col) => format_column(col),
        ChartSpec::Loading | ChartSpec::Placeholder { .. } => chart.title().to_string(),
    }
}

pub fn format_pie(pie: &PieChart, drilldown: bool) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Products", "Share"]);
    for slice in &pie.slices {
        table.add_row(vec![
            Cell::new(&slice.name),
            Cell::new(slice.count),
            Cell::new(percent(pie.percentage(slice))),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(pie.total().to_string().bold()),
        Cell::new(""),
    ]);

    let mut out = format!("{}\n{table}", pie.title.bold());

    if drilldown {
        for slice in &pie.slices {
            let Some(series) = pie.drilldown_for(&slice.drilldown) else {
                continue;
            };
            if series.points.is_empty() {
                continue;
            }
            let mut t = Table::new();
            t.set_header(vec!["Product", "Price"]);
            for (title, amount) in &series.points {
                t.add_row(vec![Cell::new(title), Cell::new(price(*amount))]);
            }
            out.push_str(&format!(
                "\n\n{} ({})\n{t}",
                series.name.green().bold(),
                product_count(series.points.len())
            ));
        }
    }
    out
}

pub fn format_column(col: &ColumnChart) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Product", "Price (in USD)"]);
    for (title, amount) in &col.points {
        table.add_row(vec![Cell::new(title), Cell::new(price(*amount))]);
    }
    format!(
        "{}\n{table}\n{} in {}",
        col.title.bold(),
        product_count(col.points.len()),
        col.category
    )
}

pub fn format_categories(categories: &[Category], counts: &[usize]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Slug", "Name", "Products"]);
    for (i, cat) in categories.iter().enumerate() {
        let count = counts.get(i).copied().unwrap_or(0);
        table.add_row(vec![
            Cell::new(&cat.slug),
            Cell::new(&cat.name),
            Cell::new(count),
        ]);
    }
    table.to_string()
}
