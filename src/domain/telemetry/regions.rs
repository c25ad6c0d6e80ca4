//! Annual regional consumption tables backing the heatmap view.
//!
//! Static reference data; the router adds per-request jitter so repeated
//! queries look like live measurements.

use super::RegionLoad;

/// Years the server holds regional tables for.
pub const AVAILABLE_YEARS: [&str; 5] = ["2020", "2021", "2022", "2023", "2024"];

/// Base annual consumption per region in GWh, one column per year in
/// [`AVAILABLE_YEARS`] order.
const REGION_BASE: &[(&str, [i64; 5])] = &[
    ("Beijing", [3200, 3350, 3500, 3700, 3900]),
    ("Tianjin", [2500, 2650, 2800, 3000, 3200]),
    ("Hebei", [3800, 3950, 4200, 4500, 4800]),
    ("Shanxi", [3400, 3550, 3800, 4050, 4300]),
    ("Inner Mongolia", [2800, 2950, 3200, 3450, 3700]),
    ("Liaoning", [4000, 4150, 4500, 4800, 5100]),
    ("Heilongjiang", [3400, 3550, 3800, 4050, 4300]),
    ("Shanghai", [4300, 4450, 4800, 5100, 5400]),
    ("Jiangsu", [4700, 4850, 5200, 5500, 5800]),
    ("Zhejiang", [4400, 4550, 4900, 5200, 5500]),
    ("Anhui", [3700, 3850, 4100, 4350, 4600]),
    ("Fujian", [3400, 3550, 3800, 4050, 4300]),
    ("Shandong", [4800, 4950, 5300, 5600, 5900]),
    ("Henan", [4200, 4350, 4700, 4950, 5200]),
    ("Hubei", [3800, 3950, 4200, 4450, 4700]),
    ("Hunan", [3600, 3750, 4000, 4250, 4500]),
    ("Guangdong", [5200, 5350, 5800, 6100, 6400]),
    ("Chongqing", [3400, 3550, 3800, 4050, 4300]),
    ("Sichuan", [4000, 4150, 4500, 4800, 5100]),
    ("Shaanxi", [3500, 3650, 3900, 4150, 4400]),
    ("Gansu", [2700, 2850, 3000, 3200, 3400]),
    ("Xinjiang", [2600, 2750, 2900, 3100, 3300]),
];

/// Looks up the base table for a year. `None` for years without data,
/// which the router reports as a `year_data_error`.
pub fn year_table(year: &str) -> Option<Vec<RegionLoad>> {
    let column = AVAILABLE_YEARS.iter().position(|y| *y == year)?;
    Some(
        REGION_BASE
            .iter()
            .map(|(name, values)| RegionLoad {
                name: (*name).to_string(),
                value: values[column],
            })
            .collect(),
    )
}

/// Region names in table order, for locally synthesized fallback data.
pub fn region_names() -> impl Iterator<Item = &'static str> {
    REGION_BASE.iter().map(|(name, _)| *name)
}
