//! wdi_trends - World Bank Indicator Analysis & Chart Generation
//!
//! Fetches a fixed set of indicators, reshapes them, prints the tables and
//! their descriptive statistics, and renders the report charts as SVG files.

mod charts;
mod config;
mod data;
mod stats;

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use log::info;
use plotters::style::colors::{BLACK, BLUE, GREEN, MAGENTA, RED};
use plotters::style::full_palette::{ORANGE, PURPLE};

use charts::{ChartRenderer, SeriesBundle, COUNTRY_PALETTE};
use config::{IndicatorConfig, RunConfig, INDICATORS};
use data::{fetch_table, IndicatorTable};
use stats::{CompositeTable, StatsCalculator};

/// One indicator after fetch and reshape.
struct LoadedIndicator {
    table: IndicatorTable,
    transposed: IndicatorTable,
}

fn main() -> Result<()> {
    env_logger::init();

    let run = RunConfig::world_bank_defaults();
    fs::create_dir_all(&run.output_dir)
        .with_context(|| format!("creating {}", run.output_dir.display()))?;

    // One generic load path, driven by the indicator catalog.
    let mut loaded = BTreeMap::new();
    for cfg in &INDICATORS {
        loaded.insert(cfg.slug, load_indicator(cfg, &run)?);
    }

    let gdp = indicator(&loaded, "gdp_growth")?;
    println!("{}", gdp.transposed);
    println!("{}", StatsCalculator::describe_table(&gdp.transposed));

    ChartRenderer::multi_line_plot(
        &run.output_dir.join("gdp_growth_lines.svg"),
        &run.years,
        &country_bundle(&gdp.transposed, &run.countries)?,
        "Years",
        "(%) GDP Growth",
        "Annual (%) GDP Growth for Selected Countries",
    )?;

    let agriculture = indicator(&loaded, "agriculture_value")?;
    println!("{}", agriculture.table);
    println!("{}", agriculture.transposed);

    // Grouped bars: four sample years across every country.
    let bar_years = ["1990", "1995", "2000", "2005"];
    let bar_values = bar_years
        .iter()
        .map(|y| agriculture.table.column(y))
        .collect::<Result<Vec<_>, _>>()?;
    let bars = SeriesBundle::new(
        bar_years.iter().map(|y| format!("Year {y}")).collect(),
        vec![BLUE, ORANGE, GREEN, RED],
        bar_values,
    )?;
    ChartRenderer::grouped_bar_plot(
        &run.output_dir.join("agriculture_value_bars.svg"),
        &run.countries,
        0.2,
        &bars,
        "% of GDP",
        "Agriculture, forestry, and fishing, value added (% of GDP)",
        true,
    )?;

    let urban = indicator(&loaded, "urban_growth")?;
    println!("{}", urban.table);
    println!("Urban Population Growth Data:");
    println!("{}", urban.transposed);

    ChartRenderer::multi_line_plot(
        &run.output_dir.join("urban_growth_lines.svg"),
        &run.years,
        &country_bundle(&urban.transposed, &run.countries)?,
        "Years",
        "(%) Urban Population Growth",
        "Annual (%) Urban Population Growth for Selected Countries",
    )?;

    // Per-country indicator composites and their correlation heatmaps.
    for entity in ["Mexico", "China"] {
        let composite = CompositeTable::from_indicators(
            entity,
            &[
                ("Urban pop. growth", &indicator(&loaded, "urban_growth")?.table),
                (
                    "Electricity production",
                    &indicator(&loaded, "electricity_fossil")?.table,
                ),
                (
                    "Agric. forestry and Fisheries",
                    &indicator(&loaded, "agriculture_value")?.table,
                ),
                ("CO2 Emissions", &indicator(&loaded, "co2_emissions")?.table),
                ("Forest Area", &indicator(&loaded, "forest_area")?.table),
                ("GDP Annual Growth", &indicator(&loaded, "gdp_growth")?.table),
            ],
        )?;
        println!("{composite}");
        let corr = composite.correlation();
        println!("{corr}");

        ChartRenderer::correlation_heatmap(
            &run.output_dir
                .join(format!("{}_correlation_heatmap.svg", entity.to_lowercase())),
            &composite,
            &corr,
            composite.entity(),
        )?;
    }

    let electricity = indicator(&loaded, "electricity_fossil")?;
    ChartRenderer::multi_line_plot(
        &run.output_dir.join("electricity_fossil_lines.svg"),
        &run.years,
        &country_bundle(&electricity.transposed, &run.countries)?,
        "Years",
        "(%) Electricity Production",
        "Annual (%) of Electricity Production of different Countries",
    )?;

    let arable = indicator(&loaded, "arable_land")?;
    ChartRenderer::multi_line_plot(
        &run.output_dir.join("arable_land_lines.svg"),
        &run.years,
        &country_bundle(&arable.transposed, &run.countries)?,
        "Years",
        "(%) Arable Land",
        "Annual (%) of Arable Land of different Countries",
    )?;

    // CO2 for a six-country subset, labels and colors aligned 1:1.
    let co2 = indicator(&loaded, "co2_emissions")?;
    let co2_countries = ["Germany", "United States", "Nigeria", "China", "Pakistan", "India"];
    let co2_labels = ["Germany", "USA", "Nigeria", "China", "Pakistan", "India"];
    let co2_values = co2_countries
        .iter()
        .map(|c| co2.transposed.column(c))
        .collect::<Result<Vec<_>, _>>()?;
    let co2_bundle = SeriesBundle::new(
        co2_labels.iter().map(|l| l.to_string()).collect(),
        vec![RED, MAGENTA, BLUE, GREEN, PURPLE, BLACK],
        co2_values,
    )?;
    ChartRenderer::multi_line_plot(
        &run.output_dir.join("co2_emissions_lines.svg"),
        &run.years,
        &co2_bundle,
        "Year",
        "metric tons",
        "CO2 emissions (metric tons per capita)",
    )?;
    ChartRenderer::scatter_plot(
        &run.output_dir.join("co2_emissions_scatter.svg"),
        &run.years,
        &co2_bundle,
        "Year",
        "metric tons",
        "CO2 emissions (metric tons per capita)",
    )?;

    info!("report written to {}", run.output_dir.display());
    Ok(())
}

/// Fetch and reshape one indicator.
fn load_indicator(cfg: &IndicatorConfig, run: &RunConfig) -> Result<LoadedIndicator> {
    info!("fetching {} ({})", cfg.title, cfg.code);
    let raw = fetch_table(&cfg.excel_url(), &run.sheet_name, run.skip_rows)
        .with_context(|| format!("fetching {}", cfg.title))?;
    let (table, transposed) = IndicatorTable::load(&raw, &run.countries, &run.column_filter())
        .with_context(|| format!("reshaping {}", cfg.title))?;
    info!(
        "loaded {}: {} countries x {} years",
        cfg.title,
        table.row_labels().len(),
        table.column_labels().len()
    );
    Ok(LoadedIndicator { table, transposed })
}

fn indicator<'a>(
    loaded: &'a BTreeMap<&'static str, LoadedIndicator>,
    slug: &str,
) -> Result<&'a LoadedIndicator> {
    loaded
        .get(slug)
        .with_context(|| format!("indicator {slug} was not loaded"))
}

/// One colored series per country, pulled from a transposed view.
fn country_bundle(view: &IndicatorTable, countries: &[String]) -> Result<SeriesBundle> {
    let colors = countries
        .iter()
        .enumerate()
        .map(|(i, _)| COUNTRY_PALETTE[i % COUNTRY_PALETTE.len()])
        .collect();
    let values = countries
        .iter()
        .map(|c| view.column(c))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SeriesBundle::new(countries.to_vec(), colors, values)?)
}
