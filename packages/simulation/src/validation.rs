//! Pre-network input validation.
//!
//! Every field is checked before the simulation service is contacted so
//! an out-of-range request never costs a network round trip. All
//! violations are collected and reported together.

use crate::{FieldError, GRID_SIZES, SimulationError, SimulationRequest};

/// Validates a simulation request, collecting every violated constraint.
///
/// # Errors
///
/// Returns [`SimulationError::Invalid`] with one [`FieldError`] per
/// out-of-range field.
pub fn validate(request: &SimulationRequest) -> Result<(), SimulationError> {
    let mut errors = Vec::new();

    if !(-90.0..=90.0).contains(&request.lat) {
        push(&mut errors, "lat", "must be between -90 and 90");
    }
    if !(-180.0..=180.0).contains(&request.lon) {
        push(&mut errors, "lon", "must be between -180 and 180");
    }
    if !(2020..=2030).contains(&request.year) {
        push(&mut errors, "year", "must be between 2020 and 2030");
    }
    if !(1..=12).contains(&request.month) {
        push(&mut errors, "month", "must be between 1 and 12");
    }
    if !(1..=31).contains(&request.day) {
        push(&mut errors, "day", "must be between 1 and 31");
    }
    if !GRID_SIZES.contains(&request.grid_x) {
        push(&mut errors, "grid_x", "must be one of 25, 50, 100");
    }
    if !GRID_SIZES.contains(&request.grid_y) {
        push(&mut errors, "grid_y", "must be one of 25, 50, 100");
    }
    if !(1..=360).contains(&request.sim_minutes) {
        push(&mut errors, "sim_minutes", "must be between 1 and 360");
    }
    if request.cell_size <= 0.0 {
        push(&mut errors, "cell_size", "must be greater than 0");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SimulationError::Invalid(errors))
    }
}

fn push(errors: &mut Vec<FieldError>, field: &str, message: &str) {
    errors.push(FieldError {
        field: field.to_string(),
        message: message.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SimulationRequest {
        SimulationRequest {
            lat: 18.7883,
            lon: 98.9853,
            year: 2025,
            month: 11,
            day: 2,
            grid_x: 50,
            grid_y: 50,
            sim_minutes: 120,
            cell_size: 30.0,
        }
    }

    #[test]
    fn accepts_in_range_request() {
        assert!(validate(&valid_request()).is_ok());
    }

    #[test]
    fn accepts_boundary_values() {
        let mut request = valid_request();
        request.lat = -90.0;
        request.lon = 180.0;
        request.year = 2030;
        request.month = 12;
        request.day = 31;
        request.grid_x = 25;
        request.grid_y = 100;
        request.sim_minutes = 360;
        assert!(validate(&request).is_ok());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut request = valid_request();
        request.lat = 91.0;
        request.lon = -181.0;

        let Err(SimulationError::Invalid(errors)) = validate(&request) else {
            panic!("expected validation failure");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["lat", "lon"]);
    }

    #[test]
    fn rejects_unsupported_grid_size() {
        let mut request = valid_request();
        request.grid_x = 75;

        let Err(SimulationError::Invalid(errors)) = validate(&request) else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "grid_x");
    }

    #[test]
    fn rejects_zero_cell_size_and_minutes() {
        let mut request = valid_request();
        request.cell_size = 0.0;
        request.sim_minutes = 0;

        let Err(SimulationError::Invalid(errors)) = validate(&request) else {
            panic!("expected validation failure");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["sim_minutes", "cell_size"]);
    }

    #[test]
    fn collects_every_violation() {
        let request = SimulationRequest {
            lat: 100.0,
            lon: 200.0,
            year: 2019,
            month: 0,
            day: 32,
            grid_x: 10,
            grid_y: 10,
            sim_minutes: 500,
            cell_size: -1.0,
        };

        let Err(SimulationError::Invalid(errors)) = validate(&request) else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 9);
    }
}
