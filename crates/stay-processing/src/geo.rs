//! Projection of listing rows to map marker records.
//!
//! The map renderer consumes one record per listing with the fields shown
//! in the marker popup. This is a pure projection over a (usually filtered)
//! preprocessed table; rendering stays with the UI layer.

use crate::columns;
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;

/// One map marker with its popup fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub name: Option<String>,
    pub host_name: String,
    pub price: f64,
    pub number_of_reviews: i64,
    pub review_score: f64,
    pub bedrooms: i64,
    pub room_type: String,
    pub accommodates: i64,
    pub security_deposit: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Project a preprocessed listing table to map marker records.
pub fn map_points(table: &DataFrame) -> Result<Vec<MapPoint>> {
    let name = table
        .column(columns::NAME)?
        .as_materialized_series()
        .str()?
        .clone();
    let host_name = table
        .column(columns::HOST_NAME)?
        .as_materialized_series()
        .str()?
        .clone();
    let price = table
        .column(columns::PRICE)?
        .as_materialized_series()
        .f64()?
        .clone();
    let number_of_reviews = table
        .column(columns::NUMBER_OF_REVIEWS)?
        .as_materialized_series()
        .i64()?
        .clone();
    let review_score = table
        .column(columns::REVIEW_SCORES)?
        .as_materialized_series()
        .f64()?
        .clone();
    let bedrooms = table
        .column(columns::TOTAL_BEDROOMS)?
        .as_materialized_series()
        .i64()?
        .clone();
    let room_type = table
        .column(columns::ROOM_TYPE)?
        .as_materialized_series()
        .str()?
        .clone();
    let accommodates = table
        .column(columns::ACCOMMODATES)?
        .as_materialized_series()
        .i64()?
        .clone();
    let security_deposit = table
        .column(columns::SECURITY_DEPOSIT)?
        .as_materialized_series()
        .f64()?
        .clone();
    let latitude = table
        .column(columns::LATITUDE)?
        .as_materialized_series()
        .f64()?
        .clone();
    let longitude = table
        .column(columns::LONGITUDE)?
        .as_materialized_series()
        .f64()?
        .clone();

    let mut points = Vec::with_capacity(table.height());
    for i in 0..table.height() {
        // Popup fields are never null after preprocessing; rows with nulls
        // are skipped rather than rendered half-empty.
        let (Some(host), Some(price), Some(reviews), Some(score)) = (
            host_name.get(i),
            price.get(i),
            number_of_reviews.get(i),
            review_score.get(i),
        ) else {
            continue;
        };
        let (Some(bedrooms), Some(room), Some(accommodates)) =
            (bedrooms.get(i), room_type.get(i), accommodates.get(i))
        else {
            continue;
        };
        let (Some(deposit), Some(lat), Some(lon)) = (
            security_deposit.get(i),
            latitude.get(i),
            longitude.get(i),
        ) else {
            continue;
        };

        points.push(MapPoint {
            name: name.get(i).map(|s| s.to_string()),
            host_name: host.to_string(),
            price,
            number_of_reviews: reviews,
            review_score: score,
            bedrooms,
            room_type: room.to_string(),
            accommodates,
            security_deposit: deposit,
            latitude: lat,
            longitude: lon,
        });
    }

    Ok(points)
}
