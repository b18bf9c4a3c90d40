//! Row-predicate filtering and the per-filter summary tables.
//!
//! The geospatial view narrows the preprocessed table by user-selected
//! criteria before rendering; the filter itself is plain data work and
//! lives here. Filters always produce a new table and never mutate the
//! source.

use crate::columns;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Optional row predicates over the preprocessed listing table.
///
/// Unset fields do not constrain. Ranges are inclusive on both ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingFilter {
    pub country: Option<String>,
    pub property_type: Option<String>,
    pub price_range: Option<(f64, f64)>,
    pub review_score_range: Option<(f64, f64)>,
}

impl ListingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn property_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = Some(property_type.into());
        self
    }

    pub fn price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = Some((min, max));
        self
    }

    pub fn review_score_range(mut self, min: f64, max: f64) -> Self {
        self.review_score_range = Some((min, max));
        self
    }

    /// Apply the predicates, producing a filtered copy of the table.
    pub fn apply(&self, table: &DataFrame) -> Result<DataFrame> {
        let mut predicate = lit(true);

        if let Some(ref country) = self.country {
            predicate = predicate.and(col(columns::COUNTRY).eq(lit(country.as_str())));
        }
        if let Some(ref property_type) = self.property_type {
            predicate =
                predicate.and(col(columns::PROPERTY_TYPE).eq(lit(property_type.as_str())));
        }
        if let Some((min, max)) = self.price_range {
            predicate = predicate
                .and(col(columns::PRICE).gt_eq(lit(min)))
                .and(col(columns::PRICE).lt_eq(lit(max)));
        }
        if let Some((min, max)) = self.review_score_range {
            predicate = predicate
                .and(col(columns::REVIEW_SCORES).gt_eq(lit(min)))
                .and(col(columns::REVIEW_SCORES).lt_eq(lit(max)));
        }

        let df = table.clone().lazy().filter(predicate).collect()?;
        Ok(df)
    }
}

/// Listing count per country, as a `Total_Listings` column.
pub fn listings_per_country(table: &DataFrame) -> Result<DataFrame> {
    let df = table
        .clone()
        .lazy()
        .group_by_stable([col(columns::COUNTRY)])
        .agg([len().alias("Total_Listings")])
        .collect()?;
    Ok(df)
}

/// The hosts with the most listings, as `Host_name` and `Listings` columns,
/// most listings first.
pub fn top_hosts(table: &DataFrame, limit: u32) -> Result<DataFrame> {
    let df = table
        .clone()
        .lazy()
        .group_by_stable([col(columns::HOST_NAME)])
        .agg([len().alias("Listings")])
        .sort(
            ["Listings"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .limit(limit)
        .collect()?;
    Ok(df)
}
