use crate::domain::model::{AsteroidRecord, AsteroidTable, FetchResult};
use crate::utils::error::{EtlError, Result};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawNearEarthObject {
    id: String,
    name: String,
    absolute_magnitude_h: f64,
    estimated_diameter: RawEstimatedDiameter,
    is_potentially_hazardous_asteroid: bool,
}

#[derive(Debug, Deserialize)]
struct RawEstimatedDiameter {
    kilometers: RawDiameterRange,
}

#[derive(Debug, Deserialize)]
struct RawDiameterRange {
    estimated_diameter_min: f64,
    estimated_diameter_max: f64,
}

impl RawNearEarthObject {
    fn into_record(self, date: &str) -> AsteroidRecord {
        AsteroidRecord {
            id: self.id,
            name: self.name,
            absolute_magnitude_h: self.absolute_magnitude_h,
            estimated_diameter_min_km: self.estimated_diameter.kilometers.estimated_diameter_min,
            estimated_diameter_max_km: self.estimated_diameter.kilometers.estimated_diameter_max,
            is_potentially_hazardous_asteroid: self.is_potentially_hazardous_asteroid,
            date: date.to_string(),
        }
    }
}

/// Flatten a single NeoWs object nested under `date`.
pub fn parse_record(
    date: &str,
    raw: &Value,
) -> std::result::Result<AsteroidRecord, serde_json::Error> {
    RawNearEarthObject::deserialize(raw).map(|neo| neo.into_record(date))
}

/// Flatten `near_earth_objects` into one row per (date, object) pair.
///
/// Bad records are logged and skipped. A payload that has no usable
/// `near_earth_objects` map is an error, never an empty table.
pub fn transform_feed(data: &FetchResult) -> Result<AsteroidTable> {
    let feed = match data {
        FetchResult::Feed(value) => value,
        FetchResult::ApiFailure(failure) => {
            return Err(EtlError::malformed(format!(
                "fetch result has no `near_earth_objects`: {}",
                failure
            )))
        }
    };

    let days = feed
        .get("near_earth_objects")
        .ok_or_else(|| EtlError::malformed("missing `near_earth_objects`"))?
        .as_object()
        .ok_or_else(|| EtlError::malformed("`near_earth_objects` is not an object"))?;

    let mut table = AsteroidTable::new();

    for (date, objects) in days {
        let objects = objects.as_array().ok_or_else(|| {
            EtlError::malformed(format!("objects for day {} are not a list", date))
        })?;

        let mut kept = 0usize;
        for raw in objects {
            match parse_record(date, raw) {
                Ok(record) => {
                    table.push(record);
                    kept += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Got this error for day {} & asteroid {}: {}",
                        date,
                        raw,
                        e
                    );
                    table.record_skip();
                }
            }
        }

        tracing::info!("Processing worked for {} ({} asteroids)", date, kept);
    }

    let (rows, columns) = table.shape();
    tracing::info!(
        "Final shape: ({}, {}), {} records skipped",
        rows,
        columns,
        table.skipped()
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ApiFailure, ASTEROID_COLUMNS};
    use serde_json::json;

    fn neo(id: &str, name: &str, hazardous: bool) -> Value {
        json!({
            "id": id,
            "name": name,
            "absolute_magnitude_h": 21.3,
            "estimated_diameter": {
                "kilometers": {
                    "estimated_diameter_min": 0.14,
                    "estimated_diameter_max": 0.31
                },
                "meters": {
                    "estimated_diameter_min": 140.0,
                    "estimated_diameter_max": 310.0
                }
            },
            "is_potentially_hazardous_asteroid": hazardous
        })
    }

    #[test]
    fn test_single_record_is_flattened() {
        let input = FetchResult::Feed(json!({
            "near_earth_objects": {
                "2022-12-04": [{
                    "id": "1",
                    "name": "A",
                    "absolute_magnitude_h": 5.0,
                    "estimated_diameter": {
                        "kilometers": {
                            "estimated_diameter_min": 0.1,
                            "estimated_diameter_max": 0.2
                        }
                    },
                    "is_potentially_hazardous_asteroid": false
                }]
            }
        }));

        let table = transform_feed(&input).unwrap();

        assert_eq!(table.columns(), &ASTEROID_COLUMNS);
        assert_eq!(
            table.rows(),
            &[AsteroidRecord {
                id: "1".to_string(),
                name: "A".to_string(),
                absolute_magnitude_h: 5.0,
                estimated_diameter_min_km: 0.1,
                estimated_diameter_max_km: 0.2,
                is_potentially_hazardous_asteroid: false,
                date: "2022-12-04".to_string(),
            }]
        );
        assert_eq!(table.skipped(), 0);
    }

    #[test]
    fn test_record_missing_diameter_is_skipped() {
        let mut broken = neo("2", "(2022 XB)", false);
        broken.as_object_mut().unwrap().remove("estimated_diameter");

        let input = FetchResult::Feed(json!({
            "near_earth_objects": {
                "2022-12-04": [neo("1", "(2022 XA)", false), broken, neo("3", "(2022 XC)", true)]
            }
        }));

        let table = transform_feed(&input).unwrap();

        let ids: Vec<&str> = table.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(table.skipped(), 1);
    }

    #[test]
    fn test_mistyped_field_is_skipped() {
        let mut numeric_id = neo("1", "(2022 XA)", false);
        numeric_id["id"] = json!(1);
        let mut string_hazard = neo("2", "(2022 XB)", false);
        string_hazard["is_potentially_hazardous_asteroid"] = json!("no");

        let input = FetchResult::Feed(json!({
            "near_earth_objects": {
                "2022-12-04": [numeric_id, string_hazard, neo("3", "(2022 XC)", false)]
            }
        }));

        let table = transform_feed(&input).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].id, "3");
        assert_eq!(table.skipped(), 2);
    }

    #[test]
    fn test_integer_magnitude_is_accepted() {
        let mut record = neo("1", "(2022 XA)", false);
        record["absolute_magnitude_h"] = json!(22);

        let parsed = parse_record("2022-12-04", &record).unwrap();
        assert_eq!(parsed.absolute_magnitude_h, 22.0);
    }

    #[test]
    fn test_rows_keep_their_day_and_payload_order() {
        let input = FetchResult::Feed(json!({
            "near_earth_objects": {
                "2022-12-06": [neo("6a", "six-a", false), neo("6b", "six-b", true)],
                "2022-12-04": [neo("4a", "four-a", false)],
                "2022-12-05": []
            }
        }));

        let table = transform_feed(&input).unwrap();

        let pairs: Vec<(&str, &str)> = table
            .iter()
            .map(|r| (r.id.as_str(), r.date.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("6a", "2022-12-06"),
                ("6b", "2022-12-06"),
                ("4a", "2022-12-04")
            ]
        );
    }

    #[test]
    fn test_empty_feed_is_an_empty_table() {
        let input = FetchResult::Feed(json!({"element_count": 0, "near_earth_objects": {}}));

        let table = transform_feed(&input).unwrap();

        assert!(table.is_empty());
        assert_eq!(table.shape(), (0, 7));
    }

    #[test]
    fn test_api_failure_is_rejected() {
        let input = FetchResult::ApiFailure(ApiFailure { status: 403 });

        let err = transform_feed(&input).unwrap_err();

        assert!(matches!(err, EtlError::MalformedPayload { .. }));
        assert!(err.to_string().contains("got a 403 status code"));
    }

    #[test]
    fn test_missing_near_earth_objects_is_rejected() {
        let input = FetchResult::Feed(json!({"links": {}, "element_count": 0}));
        assert!(matches!(
            transform_feed(&input),
            Err(EtlError::MalformedPayload { .. })
        ));

        let input = FetchResult::Feed(json!({"near_earth_objects": []}));
        assert!(matches!(
            transform_feed(&input),
            Err(EtlError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_day_that_is_not_a_list_is_rejected() {
        let input = FetchResult::Feed(json!({
            "near_earth_objects": {"2022-12-04": {"id": "1"}}
        }));

        let err = transform_feed(&input).unwrap_err();
        assert!(err.to_string().contains("2022-12-04"));
    }
}
