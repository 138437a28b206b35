#![allow(dead_code)]

use httpmock::MockServer;
use neo_etl::config::{ApiConfig, DatabaseConfig, EtlConfig, RetryConfig};
use serde_json::{json, Value};

pub const FEED_PATH: &str = "/neo/rest/v1/feed";

/// Config pointed at a mock server with no retry delay.
pub fn test_config(server: &MockServer) -> EtlConfig {
    let mut api = ApiConfig::new("TEST_KEY");
    api.url = server.url(FEED_PATH);
    api.timeout_seconds = 5;

    let mut config = EtlConfig::new(
        api,
        Some(DatabaseConfig::new("postgres", "postgres", "127.0.0.1:1")),
    );
    config.start_date = "2022-12-04".to_string();
    config.retry = RetryConfig {
        max_retries: 1,
        delay_seconds: 0,
    };
    config
}

fn neo(id: &str, name: &str, magnitude: f64, min_km: f64, max_km: f64, hazardous: bool) -> Value {
    json!({
        "links": {"self": format!("http://api.nasa.gov/neo/rest/v1/neo/{}", id)},
        "id": id,
        "neo_reference_id": id,
        "name": name,
        "absolute_magnitude_h": magnitude,
        "estimated_diameter": {
            "kilometers": {
                "estimated_diameter_min": min_km,
                "estimated_diameter_max": max_km
            },
            "miles": {
                "estimated_diameter_min": min_km * 0.621371,
                "estimated_diameter_max": max_km * 0.621371
            }
        },
        "is_potentially_hazardous_asteroid": hazardous,
        "close_approach_data": []
    })
}

/// Two days, three valid objects and one without `estimated_diameter`.
pub fn feed_body() -> Value {
    let mut broken = neo("3730577", "(2015 TX237)", 23.3, 0.06, 0.13, false);
    broken.as_object_mut().unwrap().remove("estimated_diameter");

    json!({
        "links": {
            "next": "http://api.nasa.gov/neo/rest/v1/feed?start_date=2022-12-05&end_date=2022-12-12",
            "self": "http://api.nasa.gov/neo/rest/v1/feed?start_date=2022-12-04&end_date=2022-12-11"
        },
        "element_count": 4,
        "near_earth_objects": {
            "2022-12-04": [
                neo("2465633", "465633 (2009 JR5)", 20.44, 0.2170475943, 0.4853331752, true),
                neo("3426410", "(2008 QV11)", 21.34, 0.1434019235, 0.320656449, false),
                broken
            ],
            "2022-12-05": [
                neo("54016477", "(2020 JB)", 25.9, 0.0192555822, 0.0430568537, false)
            ]
        }
    })
}

/// Connection string for an opt-in PostgreSQL test database.
pub fn test_database_url() -> Option<String> {
    std::env::var("NEO_ETL_TEST_DATABASE_URL")
        .ok()
        .filter(|v| !v.is_empty())
}
