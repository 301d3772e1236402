//! Encoded polyline decoding
//!
//! Google uses precision 5, Valhalla precision 6.

use super::DirectionsError;
use crate::types::Coordinates;

/// Decode an encoded polyline into points
pub fn decode_polyline(encoded: &str, precision: u32) -> Result<Vec<Coordinates>, DirectionsError> {
    let factor = 10_f64.powi(precision as i32);
    let mut coordinates = Vec::new();
    let mut lat = 0i64;
    let mut lng = 0i64;

    let mut bytes = encoded.bytes();
    while bytes.len() > 0 {
        lat = accumulate(lat, next_delta(&mut bytes)?)?;
        lng = accumulate(lng, next_delta(&mut bytes)?)?;

        coordinates.push(Coordinates::new(lat as f64 / factor, lng as f64 / factor));
    }

    Ok(coordinates)
}

fn accumulate(value: i64, delta: i64) -> Result<i64, DirectionsError> {
    value
        .checked_add(delta)
        .ok_or_else(|| DirectionsError::InvalidResponse("polyline coordinate overflow".to_string()))
}

/// Read one zigzag-encoded varint value
fn next_delta(bytes: &mut std::str::Bytes<'_>) -> Result<i64, DirectionsError> {
    let mut shift = 0;
    let mut result = 0i64;
    loop {
        let Some(byte) = bytes.next() else {
            return Err(DirectionsError::InvalidResponse("truncated polyline".to_string()));
        };
        let chunk = i64::from(byte) - 63;
        if !(0..64).contains(&chunk) || shift > 60 {
            return Err(DirectionsError::InvalidResponse(format!(
                "invalid polyline character {:?}",
                byte as char
            )));
        }
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &Coordinates, lat: f64, lng: f64) {
        assert!((actual.lat - lat).abs() < 1e-6, "lat {} != {}", actual.lat, lat);
        assert!((actual.lng - lng).abs() < 1e-6, "lng {} != {}", actual.lng, lng);
    }

    #[test]
    fn decodes_reference_google_polyline() {
        // Example from the Google encoded polyline algorithm documentation
        let points = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@", 5).unwrap();

        assert_eq!(points.len(), 3);
        assert_close(&points[0], 38.5, -120.2);
        assert_close(&points[1], 40.7, -120.95);
        assert_close(&points[2], 43.252, -126.453);
    }

    #[test]
    fn precision_six_scales_down() {
        let p5 = decode_polyline("_p~iF~ps|U", 5).unwrap();
        let p6 = decode_polyline("_p~iF~ps|U", 6).unwrap();
        assert_close(&p6[0], p5[0].lat / 10.0, p5[0].lng / 10.0);
    }

    #[test]
    fn empty_polyline_is_empty() {
        assert!(decode_polyline("", 5).unwrap().is_empty());
    }

    #[test]
    fn truncated_polyline_is_error() {
        // Latitude without longitude
        assert!(decode_polyline("_p~iF", 5).is_err());
        // Continuation bit set on the last byte
        assert!(decode_polyline("_p~iF~ps|", 5).is_err());
    }

    #[test]
    fn coordinate_overflow_is_error() {
        // Zigzag varint for a delta of 2^62 - 1
        let delta = ["}", &"~".repeat(11), "F"].concat();

        assert_eq!(decode_polyline(&delta.repeat(4), 5).unwrap().len(), 2);
        // Third point would push the running latitude past i64::MAX
        assert!(matches!(
            decode_polyline(&delta.repeat(6), 5),
            Err(DirectionsError::InvalidResponse(_))
        ));
    }

    #[test]
    fn invalid_character_is_error() {
        assert!(decode_polyline(" ", 5).is_err());
    }
}
