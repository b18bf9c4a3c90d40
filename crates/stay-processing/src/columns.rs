//! Column names of the flattened listing table.
//!
//! Every module addresses the table through these constants so a rename
//! stays a one-line change.

pub const ID: &str = "Id";
pub const LISTING_URL: &str = "Listing_url";
pub const NAME: &str = "Name";
pub const DESCRIPTION: &str = "Description";
pub const HOUSE_RULES: &str = "House_rules";
pub const PROPERTY_TYPE: &str = "Property_type";
pub const ROOM_TYPE: &str = "Room_type";
pub const BED_TYPE: &str = "Bed_type";
pub const MINIMUM_NIGHTS: &str = "Minimum_nights";
pub const MAXIMUM_NIGHTS: &str = "Maximum_nights";
pub const CANCELLATION_POLICY: &str = "Cancellation_policy";
pub const ACCOMMODATES: &str = "Accommodates";
pub const TOTAL_BEDROOMS: &str = "Total_bedrooms";
pub const TOTAL_BEDS: &str = "Total_beds";
pub const NUMBER_OF_REVIEWS: &str = "Number_of_reviews";
pub const AMENITIES: &str = "Amenities";
pub const PRICE: &str = "Price";
pub const SECURITY_DEPOSIT: &str = "Security_deposit";
pub const CLEANING_FEE: &str = "Cleaning_fee";
pub const EXTRA_PEOPLE: &str = "Extra_people";
pub const GUESTS_INCLUDED: &str = "Guests_included";
pub const HOST_ID: &str = "Host_id";
pub const HOST_NAME: &str = "Host_name";
pub const STREET: &str = "Street";
pub const COUNTRY: &str = "Country";
pub const COUNTRY_CODE: &str = "Country_code";
pub const LOCATION_TYPE: &str = "Location_type";
pub const LONGITUDE: &str = "Longitude";
pub const LATITUDE: &str = "Latitude";
pub const IS_LOCATION_EXACT: &str = "Is_location_exact";
pub const AVAILABILITY_365: &str = "Availability_365";
pub const REVIEW_SCORES: &str = "Review_scores";

/// All column names in table order.
pub const ALL: [&str; 32] = [
    ID,
    LISTING_URL,
    NAME,
    DESCRIPTION,
    HOUSE_RULES,
    PROPERTY_TYPE,
    ROOM_TYPE,
    BED_TYPE,
    MINIMUM_NIGHTS,
    MAXIMUM_NIGHTS,
    CANCELLATION_POLICY,
    ACCOMMODATES,
    TOTAL_BEDROOMS,
    TOTAL_BEDS,
    NUMBER_OF_REVIEWS,
    AMENITIES,
    PRICE,
    SECURITY_DEPOSIT,
    CLEANING_FEE,
    EXTRA_PEOPLE,
    GUESTS_INCLUDED,
    HOST_ID,
    HOST_NAME,
    STREET,
    COUNTRY,
    COUNTRY_CODE,
    LOCATION_TYPE,
    LONGITUDE,
    LATITUDE,
    IS_LOCATION_EXACT,
    AVAILABILITY_365,
    REVIEW_SCORES,
];
