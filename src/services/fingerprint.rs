//! Cache key derivation for route requests

use crate::types::RouteOptimizationOptions;

/// Build the cache fingerprint of a request.
///
/// Format: `{startLat},{startLng}-{destLat},{destLng}-{passengers}-{optimizeOrder}`
/// where `passengers` is the `|`-joined, lexicographically sorted list of
/// `{id}-{lat},{lng}` tokens, so any permutation of the same passengers
/// maps to the same key. Departure time is deliberately not part of the key.
pub fn build_key(options: &RouteOptimizationOptions) -> String {
    let mut tokens: Vec<String> = options
        .passengers
        .iter()
        .map(|p| format!("{}-{},{}", p.id, p.position.lat, p.position.lng))
        .collect();
    tokens.sort_unstable();

    format!(
        "{},{}-{},{}-{}-{}",
        options.start_location.lat,
        options.start_location.lng,
        options.destination.lat,
        options.destination.lng,
        tokens.join("|"),
        options.optimize_order,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinates, Passenger};

    fn passenger(id: &str, lat: f64, lng: f64) -> Passenger {
        Passenger { id: id.to_string(), position: Coordinates { lat, lng } }
    }

    fn options(passengers: Vec<Passenger>, optimize_order: bool) -> RouteOptimizationOptions {
        RouteOptimizationOptions {
            start_location: Coordinates { lat: -23.5, lng: -46.6 },
            destination: Coordinates { lat: -23.6, lng: -46.7 },
            passengers,
            optimize_order,
            departure_time: None,
        }
    }

    #[test]
    fn key_format() {
        let key = build_key(&options(vec![passenger("b", 1.5, 2.0), passenger("a", 3.0, 4.25)], true));
        assert_eq!(key, "-23.5,-46.6--23.6,-46.7-a-3,4.25|b-1.5,2-true");
    }

    #[test]
    fn empty_passenger_list_still_produces_key() {
        let key = build_key(&options(vec![], false));
        assert_eq!(key, "-23.5,-46.6--23.6,-46.7--false");
    }

    #[test]
    fn passenger_permutations_share_key() {
        let a = passenger("p1", -23.51, -46.61);
        let b = passenger("p2", -23.52, -46.62);
        let c = passenger("p3", -23.53, -46.63);

        let permutations = vec![
            vec![a.clone(), b.clone(), c.clone()],
            vec![a.clone(), c.clone(), b.clone()],
            vec![b.clone(), a.clone(), c.clone()],
            vec![b.clone(), c.clone(), a.clone()],
            vec![c.clone(), a.clone(), b.clone()],
            vec![c, b, a],
        ];

        let expected = build_key(&options(permutations[0].clone(), true));
        for passengers in permutations {
            assert_eq!(build_key(&options(passengers, true)), expected);
        }
    }

    #[test]
    fn optimize_flag_changes_key() {
        let passengers = vec![passenger("p1", -23.51, -46.61)];
        assert_ne!(
            build_key(&options(passengers.clone(), true)),
            build_key(&options(passengers, false)),
        );
    }

    #[test]
    fn departure_time_not_part_of_key() {
        let mut with_departure = options(vec![passenger("p1", -23.51, -46.61)], true);
        let without = with_departure.clone();
        with_departure.departure_time = Some(chrono::Utc::now());
        assert_eq!(build_key(&with_departure), build_key(&without));
    }
}
