//! Flattening of raw listing documents into the tabular listing form.
//!
//! One raw document becomes one flat row of named scalar fields. The
//! transform is pure and stateless; all stateful concerns (error policy,
//! table lifecycle) live with the caller.
//!
//! Numeric fields that arrive in mixed representations (`Price`,
//! `Security_deposit`, `Cleaning_fee`, `Extra_people`, `Guests_included`)
//! are kept as text here and coerced by the preprocessor. Night counts are
//! the exception: they are coerced to integers at flatten time, and a
//! malformed value aborts the record.

use crate::columns;
use crate::config::RecordErrorPolicy;
use crate::document::{Document, as_f64, as_text};
use crate::error::{ProcessingError, Result};
use polars::prelude::*;
use serde_json::Value;
use tracing::{debug, warn};

/// One flattened listing. Field names mirror the listing table columns.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ListingRow {
    pub id: String,
    pub listing_url: String,
    pub name: Option<String>,
    pub description: String,
    pub house_rules: Option<String>,
    pub property_type: String,
    pub room_type: String,
    pub bed_type: String,
    pub minimum_nights: i64,
    pub maximum_nights: i64,
    pub cancellation_policy: String,
    pub accommodates: i64,
    pub total_bedrooms: Option<i64>,
    pub total_beds: Option<i64>,
    pub number_of_reviews: i64,
    /// Joined with `", "` at flatten time; the original sequence is not kept.
    pub amenities: String,
    pub price: String,
    pub security_deposit: Option<String>,
    pub cleaning_fee: Option<String>,
    pub extra_people: String,
    pub guests_included: String,
    pub host_id: String,
    pub host_name: String,
    pub street: String,
    pub country: String,
    pub country_code: String,
    pub location_type: String,
    pub longitude: f64,
    pub latitude: f64,
    pub is_location_exact: bool,
    pub availability_365: i64,
    pub review_scores: Option<f64>,
}

/// Outcome of extracting a full record iterable.
#[derive(Debug)]
pub struct Extraction {
    /// The flattened listing table.
    pub table: DataFrame,
    /// Records dropped under [`RecordErrorPolicy::Skip`]. Always 0 under
    /// `Abort`.
    pub skipped: usize,
}

/// Map one raw listing document to a flat row.
pub fn flatten(record: &Value) -> Result<ListingRow> {
    let doc = Document::new(record);

    // The rating lives inside a required review_scores subdocument; the
    // subdocument must exist even when the rating key is absent.
    doc.required("review_scores")?;
    let review_scores = doc.optional_f64("review_scores.review_scores_rating")?;

    let coordinates = doc.required_array("address.location.coordinates")?;
    if coordinates.len() != 2 {
        return Err(ProcessingError::MalformedField {
            field: "address.location.coordinates".to_string(),
            reason: format!("expected [longitude, latitude], got {} elements", coordinates.len()),
        });
    }
    // GeoJSON order: index 0 is longitude, index 1 is latitude.
    let longitude = as_f64(&coordinates[0], "address.location.coordinates[0]")?;
    let latitude = as_f64(&coordinates[1], "address.location.coordinates[1]")?;

    let amenities = doc
        .required_array("amenities")?
        .iter()
        .map(|item| as_text(item, "amenities"))
        .collect::<Result<Vec<_>>>()?
        .join(", ");

    Ok(ListingRow {
        id: doc.required_text("_id")?,
        listing_url: doc.required_text("listing_url")?,
        name: doc.optional_text("name")?,
        description: doc.required_text("description")?,
        house_rules: doc.optional_text("house_rules")?,
        property_type: doc.required_text("property_type")?,
        room_type: doc.required_text("room_type")?,
        bed_type: doc.required_text("bed_type")?,
        minimum_nights: doc.required_i64("minimum_nights")?,
        maximum_nights: doc.required_i64("maximum_nights")?,
        cancellation_policy: doc.required_text("cancellation_policy")?,
        accommodates: doc.required_i64("accommodates")?,
        total_bedrooms: doc.optional_i64("bedrooms")?,
        total_beds: doc.optional_i64("beds")?,
        number_of_reviews: doc.required_i64("number_of_reviews")?,
        amenities,
        price: doc.required_text("price")?,
        security_deposit: doc.optional_text("security_deposit")?,
        cleaning_fee: doc.optional_text("cleaning_fee")?,
        extra_people: doc.required_text("extra_people")?,
        guests_included: doc.required_text("guests_included")?,
        host_id: doc.required_text("host.host_id")?,
        host_name: doc.required_text("host.host_name")?,
        street: doc.required_text("address.street")?,
        country: doc.required_text("address.country")?,
        country_code: doc.required_text("address.country_code")?,
        location_type: doc.required_text("address.location.type")?,
        longitude,
        latitude,
        is_location_exact: doc.required_bool("address.location.is_location_exact")?,
        availability_365: doc.required_i64("availability.availability_365")?,
        review_scores,
    })
}

/// Flatten a full iterable of raw listing documents into one table.
///
/// Under [`RecordErrorPolicy::Abort`] the first record-level integrity error
/// fails the whole extraction; under [`RecordErrorPolicy::Skip`] bad records
/// are dropped and counted. Errors that are not record-level (e.g. table
/// construction) always propagate.
pub fn extract_listings<I>(records: I, policy: RecordErrorPolicy) -> Result<Extraction>
where
    I: IntoIterator<Item = Value>,
{
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (index, record) in records.into_iter().enumerate() {
        match flatten(&record) {
            Ok(row) => rows.push(row),
            Err(e) if policy == RecordErrorPolicy::Skip && e.is_record_error() => {
                warn!("Skipping record {}: {}", index, e);
                skipped += 1;
            }
            Err(e) => {
                return Err(e.with_context(format!("While flattening record {index}")));
            }
        }
    }

    debug!("Flattened {} records ({} skipped)", rows.len(), skipped);
    let table = rows_to_dataframe(rows)?;
    Ok(Extraction { table, skipped })
}

/// Build the listing table from flattened rows.
pub fn rows_to_dataframe(rows: Vec<ListingRow>) -> Result<DataFrame> {
    let n = rows.len();
    let mut id = Vec::with_capacity(n);
    let mut listing_url = Vec::with_capacity(n);
    let mut name = Vec::with_capacity(n);
    let mut description = Vec::with_capacity(n);
    let mut house_rules = Vec::with_capacity(n);
    let mut property_type = Vec::with_capacity(n);
    let mut room_type = Vec::with_capacity(n);
    let mut bed_type = Vec::with_capacity(n);
    let mut minimum_nights: Vec<i64> = Vec::with_capacity(n);
    let mut maximum_nights: Vec<i64> = Vec::with_capacity(n);
    let mut cancellation_policy = Vec::with_capacity(n);
    let mut accommodates: Vec<i64> = Vec::with_capacity(n);
    let mut total_bedrooms: Vec<Option<i64>> = Vec::with_capacity(n);
    let mut total_beds: Vec<Option<i64>> = Vec::with_capacity(n);
    let mut number_of_reviews: Vec<i64> = Vec::with_capacity(n);
    let mut amenities = Vec::with_capacity(n);
    let mut price = Vec::with_capacity(n);
    let mut security_deposit: Vec<Option<String>> = Vec::with_capacity(n);
    let mut cleaning_fee: Vec<Option<String>> = Vec::with_capacity(n);
    let mut extra_people = Vec::with_capacity(n);
    let mut guests_included = Vec::with_capacity(n);
    let mut host_id = Vec::with_capacity(n);
    let mut host_name = Vec::with_capacity(n);
    let mut street = Vec::with_capacity(n);
    let mut country = Vec::with_capacity(n);
    let mut country_code = Vec::with_capacity(n);
    let mut location_type = Vec::with_capacity(n);
    let mut longitude: Vec<f64> = Vec::with_capacity(n);
    let mut latitude: Vec<f64> = Vec::with_capacity(n);
    let mut is_location_exact: Vec<bool> = Vec::with_capacity(n);
    let mut availability_365: Vec<i64> = Vec::with_capacity(n);
    let mut review_scores: Vec<Option<f64>> = Vec::with_capacity(n);

    for row in rows {
        id.push(row.id);
        listing_url.push(row.listing_url);
        name.push(row.name);
        description.push(row.description);
        house_rules.push(row.house_rules);
        property_type.push(row.property_type);
        room_type.push(row.room_type);
        bed_type.push(row.bed_type);
        minimum_nights.push(row.minimum_nights);
        maximum_nights.push(row.maximum_nights);
        cancellation_policy.push(row.cancellation_policy);
        accommodates.push(row.accommodates);
        total_bedrooms.push(row.total_bedrooms);
        total_beds.push(row.total_beds);
        number_of_reviews.push(row.number_of_reviews);
        amenities.push(row.amenities);
        price.push(row.price);
        security_deposit.push(row.security_deposit);
        cleaning_fee.push(row.cleaning_fee);
        extra_people.push(row.extra_people);
        guests_included.push(row.guests_included);
        host_id.push(row.host_id);
        host_name.push(row.host_name);
        street.push(row.street);
        country.push(row.country);
        country_code.push(row.country_code);
        location_type.push(row.location_type);
        longitude.push(row.longitude);
        latitude.push(row.latitude);
        is_location_exact.push(row.is_location_exact);
        availability_365.push(row.availability_365);
        review_scores.push(row.review_scores);
    }

    let df = DataFrame::new(vec![
        Column::new(columns::ID.into(), id),
        Column::new(columns::LISTING_URL.into(), listing_url),
        Column::new(columns::NAME.into(), name),
        Column::new(columns::DESCRIPTION.into(), description),
        Column::new(columns::HOUSE_RULES.into(), house_rules),
        Column::new(columns::PROPERTY_TYPE.into(), property_type),
        Column::new(columns::ROOM_TYPE.into(), room_type),
        Column::new(columns::BED_TYPE.into(), bed_type),
        Column::new(columns::MINIMUM_NIGHTS.into(), minimum_nights),
        Column::new(columns::MAXIMUM_NIGHTS.into(), maximum_nights),
        Column::new(columns::CANCELLATION_POLICY.into(), cancellation_policy),
        Column::new(columns::ACCOMMODATES.into(), accommodates),
        Column::new(columns::TOTAL_BEDROOMS.into(), total_bedrooms),
        Column::new(columns::TOTAL_BEDS.into(), total_beds),
        Column::new(columns::NUMBER_OF_REVIEWS.into(), number_of_reviews),
        Column::new(columns::AMENITIES.into(), amenities),
        Column::new(columns::PRICE.into(), price),
        Column::new(columns::SECURITY_DEPOSIT.into(), security_deposit),
        Column::new(columns::CLEANING_FEE.into(), cleaning_fee),
        Column::new(columns::EXTRA_PEOPLE.into(), extra_people),
        Column::new(columns::GUESTS_INCLUDED.into(), guests_included),
        Column::new(columns::HOST_ID.into(), host_id),
        Column::new(columns::HOST_NAME.into(), host_name),
        Column::new(columns::STREET.into(), street),
        Column::new(columns::COUNTRY.into(), country),
        Column::new(columns::COUNTRY_CODE.into(), country_code),
        Column::new(columns::LOCATION_TYPE.into(), location_type),
        Column::new(columns::LONGITUDE.into(), longitude),
        Column::new(columns::LATITUDE.into(), latitude),
        Column::new(columns::IS_LOCATION_EXACT.into(), is_location_exact),
        Column::new(columns::AVAILABILITY_365.into(), availability_365),
        Column::new(columns::REVIEW_SCORES.into(), review_scores),
    ])?;

    Ok(df)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// A complete raw listing document for tests.
    pub(crate) fn sample_record() -> Value {
        json!({
            "_id": "10006546",
            "listing_url": "https://www.airbnb.com/rooms/10006546",
            "name": "Ribeira Charming Duplex",
            "description": "Fantastic duplex apartment with three bedrooms",
            "house_rules": "No parties",
            "property_type": "House",
            "room_type": "Entire home/apt",
            "bed_type": "Real Bed",
            "minimum_nights": "2",
            "maximum_nights": "30",
            "cancellation_policy": "moderate",
            "accommodates": 8,
            "bedrooms": 3,
            "beds": 5,
            "number_of_reviews": 51,
            "amenities": ["TV", "Wifi", "Kitchen"],
            "price": "80.00",
            "security_deposit": "200.00",
            "cleaning_fee": "35.00",
            "extra_people": "15.00",
            "guests_included": "6",
            "host": {"host_id": "51399391", "host_name": "Ana&Gonçalo"},
            "address": {
                "street": "Porto, Porto, Portugal",
                "country": "Portugal",
                "country_code": "PT",
                "location": {
                    "type": "Point",
                    "coordinates": [-8.61308, 41.1413],
                    "is_location_exact": false
                }
            },
            "availability": {"availability_365": 239},
            "review_scores": {"review_scores_rating": 89}
        })
    }

    #[test]
    fn test_flatten_complete_record() {
        let row = flatten(&sample_record()).unwrap();

        assert_eq!(row.id, "10006546");
        assert_eq!(row.minimum_nights, 2);
        assert_eq!(row.maximum_nights, 30);
        assert_eq!(row.amenities, "TV, Wifi, Kitchen");
        assert_eq!(row.price, "80.00");
        assert_eq!(row.host_id, "51399391");
        assert_eq!(row.country_code, "PT");
        assert_eq!(row.availability_365, 239);
        assert_eq!(row.review_scores, Some(89.0));
        assert!(!row.is_location_exact);
    }

    #[test]
    fn test_flatten_preserves_coordinate_order() {
        let mut record = sample_record();
        record["address"]["location"]["coordinates"] = json!([12.5, 45.0]);

        let row = flatten(&record).unwrap();
        assert_eq!(row.longitude, 12.5);
        assert_eq!(row.latitude, 45.0);
    }

    #[test]
    fn test_flatten_optional_fields_absent() {
        let mut record = sample_record();
        record.as_object_mut().unwrap().remove("name");
        record.as_object_mut().unwrap().remove("house_rules");
        record.as_object_mut().unwrap().remove("bedrooms");
        record.as_object_mut().unwrap().remove("beds");
        record.as_object_mut().unwrap().remove("security_deposit");
        record.as_object_mut().unwrap().remove("cleaning_fee");
        record["review_scores"] = json!({});

        let row = flatten(&record).unwrap();
        assert_eq!(row.name, None);
        assert_eq!(row.house_rules, None);
        assert_eq!(row.total_bedrooms, None);
        assert_eq!(row.total_beds, None);
        assert_eq!(row.security_deposit, None);
        assert_eq!(row.cleaning_fee, None);
        assert_eq!(row.review_scores, None);
    }

    #[test]
    fn test_flatten_missing_required_field_fails() {
        let mut record = sample_record();
        record.as_object_mut().unwrap().remove("price");

        let err = flatten(&record).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_flatten_missing_review_scores_subdocument_fails() {
        let mut record = sample_record();
        record.as_object_mut().unwrap().remove("review_scores");

        assert!(flatten(&record).is_err());
    }

    #[test]
    fn test_flatten_malformed_nights_aborts_record() {
        let mut record = sample_record();
        record["minimum_nights"] = json!("two");

        let err = flatten(&record).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_FIELD");
    }

    #[test]
    fn test_extract_abort_policy_fails_on_bad_record() {
        let mut bad = sample_record();
        bad.as_object_mut().unwrap().remove("description");
        let records = vec![sample_record(), bad];

        let err = extract_listings(records, RecordErrorPolicy::Abort).unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_extract_skip_policy_counts_bad_records() {
        let mut bad = sample_record();
        bad.as_object_mut().unwrap().remove("description");
        let records = vec![sample_record(), bad, sample_record()];

        let extraction = extract_listings(records, RecordErrorPolicy::Skip).unwrap();
        assert_eq!(extraction.table.height(), 2);
        assert_eq!(extraction.skipped, 1);
    }

    #[test]
    fn test_extract_empty_source() {
        let extraction = extract_listings(Vec::new(), RecordErrorPolicy::Abort).unwrap();
        assert_eq!(extraction.table.height(), 0);
        assert_eq!(extraction.table.width(), crate::columns::ALL.len());
    }

    #[test]
    fn test_table_column_order() {
        let extraction =
            extract_listings(vec![sample_record()], RecordErrorPolicy::Abort).unwrap();
        let names: Vec<&str> = extraction
            .table
            .get_column_names()
            .iter()
            .map(|s| s.as_str())
            .collect();
        assert_eq!(names, crate::columns::ALL);
    }
}
