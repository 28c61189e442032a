use crate::{error::AppError, model::attendance::Coordinates};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

/// How far ahead of the server clock a device timestamp may be.
const CLOCK_SKEW_SECS: i64 = 30;

/// GPS fix the device acquired for exactly one check-in or check-out.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LocationFix {
    #[schema(example = json!(-6.2))]
    pub latitude: Option<f64>,
    #[schema(example = json!(106.8))]
    pub longitude: Option<f64>,
    #[schema(value_type = Option<String>, format = "date-time", example = "2024-01-01T08:00:00Z")]
    pub acquired_at: Option<DateTime<Utc>>,
}

impl LocationFix {
    /// Accepts the fix only if both coordinates are present, on the globe, and fresh.
    pub fn validate(&self, now: DateTime<Utc>, max_age_secs: i64) -> Result<Coordinates, AppError> {
        let (latitude, longitude) = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(AppError::LocationUnavailable),
        };

        if !latitude.is_finite()
            || !longitude.is_finite()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
        {
            return Err(AppError::InvalidCoordinates);
        }

        let acquired_at = self.acquired_at.ok_or(AppError::StaleLocation)?;
        if acquired_at < now - Duration::seconds(max_age_secs)
            || acquired_at > now + Duration::seconds(CLOCK_SKEW_SECS)
        {
            return Err(AppError::StaleLocation);
        }

        Ok(Coordinates {
            latitude,
            longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    fn fix(lat: Option<f64>, lon: Option<f64>, age_secs: i64) -> LocationFix {
        LocationFix {
            latitude: lat,
            longitude: lon,
            acquired_at: Some(now() - Duration::seconds(age_secs)),
        }
    }

    #[test]
    fn fresh_fix_is_accepted() {
        let c = fix(Some(-6.2), Some(106.8), 5).validate(now(), 120).unwrap();
        assert_eq!(
            c,
            Coordinates {
                latitude: -6.2,
                longitude: 106.8
            }
        );
    }

    #[test]
    fn missing_coordinate_means_no_location() {
        assert!(matches!(
            fix(None, Some(106.8), 5).validate(now(), 120),
            Err(AppError::LocationUnavailable)
        ));
        assert!(matches!(
            LocationFix::default().validate(now(), 120),
            Err(AppError::LocationUnavailable)
        ));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        for (lat, lon) in [(91.0, 0.0), (0.0, -180.5), (f64::NAN, 0.0), (0.0, f64::INFINITY)] {
            assert!(matches!(
                fix(Some(lat), Some(lon), 5).validate(now(), 120),
                Err(AppError::InvalidCoordinates)
            ));
        }
    }

    #[test]
    fn old_or_future_fix_is_stale() {
        assert!(matches!(
            fix(Some(-6.2), Some(106.8), 121).validate(now(), 120),
            Err(AppError::StaleLocation)
        ));
        assert!(matches!(
            fix(Some(-6.2), Some(106.8), -60).validate(now(), 120),
            Err(AppError::StaleLocation)
        ));

        let mut undated = fix(Some(-6.2), Some(106.8), 0);
        undated.acquired_at = None;
        assert!(matches!(
            undated.validate(now(), 120),
            Err(AppError::StaleLocation)
        ));
    }
}
