//! Enemy route management utilities.

use lane_defence_core::{Position, RouteError};

/// Polyline the enemies march along, from spawn point to base.
///
/// A route always holds at least two waypoints: the spawn point and the
/// base. Enemies track the index of the waypoint they last reached and
/// march toward the next one.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    waypoints: Vec<Position>,
}

impl Route {
    /// Builds a route from ordered waypoints.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InsufficientWaypoints`] when fewer than two
    /// waypoints are provided.
    pub fn new(waypoints: Vec<Position>) -> Result<Self, RouteError> {
        if waypoints.len() < 2 {
            return Err(RouteError::InsufficientWaypoints);
        }
        Ok(Self { waypoints })
    }

    /// Builds a route from waypoints already known to satisfy the length
    /// requirement.
    pub(crate) fn from_vetted(waypoints: Vec<Position>) -> Self {
        Self { waypoints }
    }

    /// Ordered waypoints of the route.
    #[must_use]
    pub fn waypoints(&self) -> &[Position] {
        &self.waypoints
    }

    /// Position where enemies enter the route.
    #[must_use]
    pub fn spawn_point(&self) -> Position {
        self.waypoints[0]
    }

    /// Index of the final waypoint, where the base sits.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.waypoints.len() - 1
    }

    /// Shortest distance from the position to any route segment.
    pub(crate) fn distance_to(&self, position: Position) -> f32 {
        let mut best = f32::INFINITY;
        for pair in self.waypoints.windows(2) {
            let distance = position.distance_to_segment(pair[0], pair[1]);
            if distance < best {
                best = distance;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_requires_two_waypoints() {
        assert_eq!(
            Route::new(vec![Position::new(0.0, 0.0)]).err(),
            Some(RouteError::InsufficientWaypoints)
        );
        assert_eq!(Route::new(Vec::new()).err(), Some(RouteError::InsufficientWaypoints));
    }

    #[test]
    fn route_exposes_endpoints() {
        let route = Route::new(vec![
            Position::new(0.0, 0.0),
            Position::new(100.0, 0.0),
            Position::new(100.0, 50.0),
        ])
        .expect("route");
        assert_eq!(route.spawn_point(), Position::new(0.0, 0.0));
        assert_eq!(route.last_index(), 2);
        assert_eq!(route.waypoints().len(), 3);
    }

    #[test]
    fn distance_measures_the_nearest_segment() {
        let route = Route::new(vec![
            Position::new(0.0, 0.0),
            Position::new(100.0, 0.0),
            Position::new(100.0, 100.0),
        ])
        .expect("route");
        let probe = Position::new(90.0, 20.0);
        assert!((route.distance_to(probe) - 10.0).abs() < 1e-6);
    }
}
