//! Read-only grouped reductions over the preprocessed listing table.
//!
//! Each view is a pure grouping and reduction; none of them mutate the
//! source table. Group order is kept stable so the outputs are
//! deterministic for a given table.

use crate::columns;
use crate::error::Result;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// The six summary tables backing the advanced-analysis views.
#[derive(Debug, Clone)]
pub struct AggregateViews {
    /// Mean price per country.
    pub country_mean_price: DataFrame,
    /// Mean price per (country, property type).
    pub property_type_mean_price: DataFrame,
    /// Mean 365-day availability per (country, property type).
    pub country_availability_mean: DataFrame,
    /// Mean price per (country, property type, room type).
    pub room_type_property_mean_price: DataFrame,
    /// Listing count per (country, property type).
    pub listing_count_by_property: DataFrame,
    /// Best-reviewed property type per country, among well-reviewed listings.
    pub preferred_property_by_country: DataFrame,
}

impl AggregateViews {
    /// Compute all six views from a preprocessed listing table.
    pub fn compute(table: &DataFrame, min_reviews_for_preference: i64) -> Result<Self> {
        debug!("Computing aggregate views over {} rows", table.height());
        Ok(Self {
            country_mean_price: country_mean_price(table)?,
            property_type_mean_price: property_type_mean_price(table)?,
            country_availability_mean: country_availability_mean(table)?,
            room_type_property_mean_price: room_type_property_mean_price(table)?,
            listing_count_by_property: listing_count_by_property(table)?,
            preferred_property_by_country: preferred_property_by_country(
                table,
                min_reviews_for_preference,
            )?,
        })
    }
}

/// Mean price per country.
pub fn country_mean_price(table: &DataFrame) -> Result<DataFrame> {
    let df = table
        .clone()
        .lazy()
        .group_by_stable([col(columns::COUNTRY)])
        .agg([col(columns::PRICE).mean()])
        .collect()?;
    Ok(df)
}

/// Mean price per (country, property type).
pub fn property_type_mean_price(table: &DataFrame) -> Result<DataFrame> {
    let df = table
        .clone()
        .lazy()
        .group_by_stable([col(columns::COUNTRY), col(columns::PROPERTY_TYPE)])
        .agg([col(columns::PRICE).mean()])
        .collect()?;
    Ok(df)
}

/// Mean 365-day availability per (country, property type).
pub fn country_availability_mean(table: &DataFrame) -> Result<DataFrame> {
    let df = table
        .clone()
        .lazy()
        .group_by_stable([col(columns::COUNTRY), col(columns::PROPERTY_TYPE)])
        .agg([col(columns::AVAILABILITY_365).mean()])
        .collect()?;
    Ok(df)
}

/// Mean price per (country, property type, room type).
pub fn room_type_property_mean_price(table: &DataFrame) -> Result<DataFrame> {
    let df = table
        .clone()
        .lazy()
        .group_by_stable([
            col(columns::COUNTRY),
            col(columns::PROPERTY_TYPE),
            col(columns::ROOM_TYPE),
        ])
        .agg([col(columns::PRICE).mean()])
        .collect()?;
    Ok(df)
}

/// Listing count per (country, property type), as a `count` column.
pub fn listing_count_by_property(table: &DataFrame) -> Result<DataFrame> {
    let df = table
        .clone()
        .lazy()
        .group_by_stable([col(columns::COUNTRY), col(columns::PROPERTY_TYPE)])
        .agg([len().alias("count")])
        .collect()?;
    Ok(df)
}

/// Best-reviewed property type per country.
///
/// Restricts to listings with at least `min_reviews` reviews, computes the
/// mean review score per (country, property type), and keeps the row with
/// the maximum mean per country. Ties keep the first-encountered maximum.
pub fn preferred_property_by_country(table: &DataFrame, min_reviews: i64) -> Result<DataFrame> {
    let grouped = table
        .clone()
        .lazy()
        .filter(col(columns::NUMBER_OF_REVIEWS).gt_eq(lit(min_reviews)))
        .group_by_stable([col(columns::COUNTRY), col(columns::PROPERTY_TYPE)])
        .agg([col(columns::REVIEW_SCORES).mean()])
        .collect()?;

    let countries = grouped
        .column(columns::COUNTRY)?
        .as_materialized_series()
        .str()?
        .clone();
    let scores = grouped
        .column(columns::REVIEW_SCORES)?
        .as_materialized_series()
        .f64()?
        .clone();

    // Per-country argmax, strictly greater so the first maximum wins ties.
    let mut best: HashMap<&str, (usize, f64)> = HashMap::new();
    let mut country_order: Vec<&str> = Vec::new();
    for index in 0..grouped.height() {
        let (Some(country), Some(score)) = (countries.get(index), scores.get(index)) else {
            continue;
        };
        match best.get(country).copied() {
            Some((_, current)) if score <= current => {}
            previous => {
                if previous.is_none() {
                    country_order.push(country);
                }
                best.insert(country, (index, score));
            }
        }
    }

    let indices: Vec<IdxSize> = country_order
        .iter()
        .map(|country| best[country].0 as IdxSize)
        .collect();
    let selected = grouped.take(&IdxCa::from_vec("idx".into(), indices))?;
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn listing_table() -> DataFrame {
        df![
            columns::COUNTRY => ["US", "US", "US", "Portugal"],
            columns::PROPERTY_TYPE => ["House", "House", "Apartment", "House"],
            columns::ROOM_TYPE => ["Entire home/apt", "Private room", "Entire home/apt", "Entire home/apt"],
            columns::PRICE => [100.0, 200.0, 50.0, 80.0],
            columns::AVAILABILITY_365 => [100_i64, 300, 200, 239],
            columns::NUMBER_OF_REVIEWS => [120_i64, 150, 80, 51],
            columns::REVIEW_SCORES => [90.0, 92.0, 95.0, 89.0],
        ]
        .unwrap()
    }

    fn lookup_f64(df: &DataFrame, key_col: &str, key: &str, value_col: &str) -> f64 {
        let keys = df.column(key_col).unwrap().as_materialized_series().str().unwrap().clone();
        let values = df.column(value_col).unwrap().as_materialized_series().f64().unwrap().clone();
        for i in 0..df.height() {
            if keys.get(i) == Some(key) {
                return values.get(i).unwrap();
            }
        }
        panic!("no row with {key_col} == {key}");
    }

    #[test]
    fn test_country_mean_price() {
        let view = country_mean_price(&listing_table()).unwrap();

        assert_eq!(view.height(), 2);
        // mean([100, 200, 50]) for US
        assert_eq!(
            lookup_f64(&view, columns::COUNTRY, "US", columns::PRICE),
            350.0 / 3.0
        );
        assert_eq!(
            lookup_f64(&view, columns::COUNTRY, "Portugal", columns::PRICE),
            80.0
        );
    }

    #[test]
    fn test_country_mean_price_example() {
        // Two US House listings at 100 and 200 average to 150
        let table = df![
            columns::COUNTRY => ["US", "US"],
            columns::PROPERTY_TYPE => ["House", "House"],
            columns::ROOM_TYPE => ["Entire home/apt", "Entire home/apt"],
            columns::PRICE => [100.0, 200.0],
            columns::AVAILABILITY_365 => [100_i64, 200],
            columns::NUMBER_OF_REVIEWS => [10_i64, 20],
            columns::REVIEW_SCORES => [90.0, 91.0],
        ]
        .unwrap();

        let view = country_mean_price(&table).unwrap();
        assert_eq!(view.height(), 1);
        assert_eq!(
            lookup_f64(&view, columns::COUNTRY, "US", columns::PRICE),
            150.0
        );
    }

    #[test]
    fn test_property_type_mean_price_groups_pairwise() {
        let view = property_type_mean_price(&listing_table()).unwrap();
        // (US, House), (US, Apartment), (Portugal, House)
        assert_eq!(view.height(), 3);
    }

    #[test]
    fn test_listing_count_by_property() {
        let view = listing_count_by_property(&listing_table()).unwrap();

        let counts = view.column("count").unwrap();
        let properties = view
            .column(columns::PROPERTY_TYPE)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .clone();
        let countries = view
            .column(columns::COUNTRY)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .clone();
        for i in 0..view.height() {
            let expected = match (countries.get(i).unwrap(), properties.get(i).unwrap()) {
                ("US", "House") => 2,
                ("US", "Apartment") => 1,
                ("Portugal", "House") => 1,
                other => panic!("unexpected group {other:?}"),
            };
            assert_eq!(
                counts.get(i).unwrap().try_extract::<u32>().unwrap(),
                expected
            );
        }
    }

    #[test]
    fn test_preferred_property_excludes_low_review_listings() {
        // US: House has >= 100 reviews with mean score 91; Apartment has a
        // higher score (95) but only 80 reviews and must not win.
        let view = preferred_property_by_country(&listing_table(), 100).unwrap();

        assert_eq!(view.height(), 1);
        let property = view.column(columns::PROPERTY_TYPE).unwrap();
        assert_eq!(property.get(0).unwrap().to_string(), "\"House\"");
    }

    #[test]
    fn test_preferred_property_picks_max_per_country() {
        let table = df![
            columns::COUNTRY => ["US", "US", "Spain"],
            columns::PROPERTY_TYPE => ["House", "Loft", "Villa"],
            columns::ROOM_TYPE => ["Entire home/apt", "Entire home/apt", "Entire home/apt"],
            columns::PRICE => [100.0, 120.0, 90.0],
            columns::AVAILABILITY_365 => [100_i64, 120, 90],
            columns::NUMBER_OF_REVIEWS => [150_i64, 200, 300],
            columns::REVIEW_SCORES => [90.0, 95.0, 88.0],
        ]
        .unwrap();

        let view = preferred_property_by_country(&table, 100).unwrap();
        assert_eq!(view.height(), 2);

        let properties = view
            .column(columns::PROPERTY_TYPE)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .clone();
        let collected: Vec<&str> = (0..view.height())
            .map(|i| properties.get(i).unwrap())
            .collect();
        assert!(collected.contains(&"Loft"));
        assert!(collected.contains(&"Villa"));
    }

    #[test]
    fn test_preferred_property_tie_keeps_first_encountered() {
        let table = df![
            columns::COUNTRY => ["US", "US"],
            columns::PROPERTY_TYPE => ["House", "Loft"],
            columns::ROOM_TYPE => ["Entire home/apt", "Entire home/apt"],
            columns::PRICE => [100.0, 120.0],
            columns::AVAILABILITY_365 => [100_i64, 120],
            columns::NUMBER_OF_REVIEWS => [150_i64, 200],
            columns::REVIEW_SCORES => [90.0, 90.0],
        ]
        .unwrap();

        let view = preferred_property_by_country(&table, 100).unwrap();
        assert_eq!(view.height(), 1);
        // House appears first in row order and wins the tie
        let property = view.column(columns::PROPERTY_TYPE).unwrap();
        assert_eq!(property.get(0).unwrap().to_string(), "\"House\"");
    }

    #[test]
    fn test_preferred_property_empty_after_filter() {
        let view = preferred_property_by_country(&listing_table(), 1_000).unwrap();
        assert_eq!(view.height(), 0);
    }

    #[test]
    fn test_compute_bundles_all_views() {
        let views = AggregateViews::compute(&listing_table(), 100).unwrap();

        assert_eq!(views.country_mean_price.height(), 2);
        assert_eq!(views.property_type_mean_price.height(), 3);
        assert_eq!(views.country_availability_mean.height(), 3);
        assert_eq!(views.room_type_property_mean_price.height(), 4);
        assert_eq!(views.listing_count_by_property.height(), 3);
        assert_eq!(views.preferred_property_by_country.height(), 1);
    }

    #[test]
    fn test_aggregates_do_not_mutate_source() {
        let table = listing_table();
        let before = table.clone();
        let _ = AggregateViews::compute(&table, 100).unwrap();
        assert!(table.equals_missing(&before));
    }
}
