//! Run Configuration Module
//! Indicator catalog plus the fixed country/year selection for one run.

use std::path::PathBuf;

/// Key column of every World Bank indicator sheet.
pub const KEY_COLUMN: &str = "Country Name";

/// One World Bank indicator series.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorConfig {
    /// Short identifier used for lookups and output file names.
    pub slug: &'static str,
    /// World Bank series code, e.g. `NY.GDP.MKTP.KD.ZG`.
    pub code: &'static str,
    /// Human-readable name used in log lines.
    pub title: &'static str,
}

impl IndicatorConfig {
    /// Download locator for the indicator workbook.
    pub fn excel_url(&self) -> String {
        format!(
            "https://api.worldbank.org/v2/en/indicator/{}?downloadformat=excel",
            self.code
        )
    }
}

/// The seven indicators covered by the report, in load order.
pub const INDICATORS: [IndicatorConfig; 7] = [
    IndicatorConfig {
        slug: "gdp_growth",
        code: "NY.GDP.MKTP.KD.ZG",
        title: "GDP growth (annual %)",
    },
    IndicatorConfig {
        slug: "arable_land",
        code: "AG.LND.ARBL.ZS",
        title: "Arable land (% of land area)",
    },
    IndicatorConfig {
        slug: "forest_area",
        code: "AG.LND.FRST.ZS",
        title: "Forest area (% of land area)",
    },
    IndicatorConfig {
        slug: "urban_growth",
        code: "SP.URB.GROW",
        title: "Urban population growth (annual %)",
    },
    IndicatorConfig {
        slug: "electricity_fossil",
        code: "EG.ELC.FOSL.ZS",
        title: "Electricity production from oil, gas and coal sources (% of total)",
    },
    IndicatorConfig {
        slug: "agriculture_value",
        code: "NV.AGR.TOTL.ZS",
        title: "Agriculture, forestry, and fishing, value added (% of GDP)",
    },
    IndicatorConfig {
        slug: "co2_emissions",
        code: "EN.ATM.CO2E.PC",
        title: "CO2 emissions (metric tons per capita)",
    },
];

/// Everything the loaders and renderers need for one run.
///
/// Passed explicitly to every call site; there is no process-wide state.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sheet_name: String,
    pub skip_rows: usize,
    pub countries: Vec<String>,
    pub years: Vec<String>,
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// The fixed selection the report is built around.
    pub fn world_bank_defaults() -> Self {
        let countries = [
            "South Africa",
            "China",
            "India",
            "United States",
            "Germany",
            "France",
            "United Kingdom",
            "Japan",
            "Mexico",
            "Indonesia",
            "Argentina",
            "Nigeria",
            "Italy",
            "Pakistan",
        ];
        let years = [
            "1984", "1990", "1995", "2000", "2005", "2010", "2015", "2020", "2022",
        ];

        Self {
            sheet_name: "Data".to_string(),
            skip_rows: 3,
            countries: countries.iter().map(|s| s.to_string()).collect(),
            years: years.iter().map(|s| s.to_string()).collect(),
            output_dir: PathBuf::from("charts"),
        }
    }

    /// Column projection handed to the loader: key column first, then years.
    pub fn column_filter(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.years.len() + 1);
        columns.push(KEY_COLUMN.to_string());
        columns.extend(self.years.iter().cloned());
        columns
    }
}
