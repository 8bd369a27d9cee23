//! Request DTOs for the catalog API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Longest accepted entity name
pub const MAX_NAME_LENGTH: usize = 100;

fn check_name(field: &str, name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return Some(format!("{} cannot be empty", field));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Some(format!(
            "{} exceeds maximum length of {} characters",
            field, MAX_NAME_LENGTH
        ));
    }
    None
}

fn check_city_name(name: &str) -> Option<String> {
    check_name("City name", name).or_else(|| {
        let allowed = |c: char| c.is_ascii_alphanumeric() || " -,.".contains(c);
        (!name.chars().all(allowed)).then(|| format!("Invalid city name: {}", name))
    })
}

fn check_amount(field: &str, value: Option<f64>) -> Option<String> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Some(format!("{} must be a non-negative number", field))
        }
        _ => None,
    }
}

/// Request body for creating a country (POST /api/country)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRequest {
    pub name: String,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub population: Option<f64>,
    #[serde(default)]
    pub area_square_km: Option<f64>,
    #[serde(default)]
    pub gdp: Option<f64>,
}

impl CountryRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        check_name("Country name", &self.name)
            .or_else(|| check_amount("Population", self.population))
            .or_else(|| check_amount("Area", self.area_square_km))
            .or_else(|| check_amount("GDP", self.gdp))
    }
}

/// Partial update of a country (PUT /api/country/:id); absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub population: Option<f64>,
    #[serde(default)]
    pub area_square_km: Option<f64>,
    #[serde(default)]
    pub gdp: Option<f64>,
}

impl CountryUpdate {
    pub fn validate(&self) -> Option<String> {
        self.name
            .as_deref()
            .and_then(|name| check_name("Country name", name))
            .or_else(|| check_amount("Population", self.population))
            .or_else(|| check_amount("Area", self.area_square_km))
            .or_else(|| check_amount("GDP", self.gdp))
    }
}

/// Request body for one city in POST /api/countries/:id/cities
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRequest {
    pub name: String,
    #[serde(default)]
    pub population: Option<f64>,
    #[serde(default)]
    pub area_square_km: Option<f64>,
}

impl CityRequest {
    pub fn validate(&self) -> Option<String> {
        check_city_name(&self.name)
            .or_else(|| check_amount("Population", self.population))
            .or_else(|| check_amount("Area", self.area_square_km))
    }
}

/// Partial update of a city (PUT /api/cities/:id)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub population: Option<f64>,
    #[serde(default)]
    pub area_square_km: Option<f64>,
}

impl CityUpdate {
    pub fn validate(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            if let Some(err) = check_city_name(name) {
                return Some(err);
            }
        }
        if let Some(area) = self.area_square_km {
            if !area.is_finite() || area <= 0.0 {
                return Some("Area must be a positive number".to_string());
            }
        }
        check_amount("Population", self.population)
    }
}

/// Request body for POST /api/countries/:id/nations
#[derive(Debug, Clone, Deserialize)]
pub struct NationRequest {
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub religion: Option<String>,
}

impl NationRequest {
    pub fn validate(&self) -> Option<String> {
        check_name("Nation name", &self.name)
    }
}

/// Partial update of a nation (PUT /api/nations/:id); empty strings are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NationUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub religion: Option<String>,
}

impl NationUpdate {
    pub fn validate(&self) -> Option<String> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .and_then(|name| check_name("Nation name", name))
    }
}

/// Query string of GET /search
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub city_name: String,
}

/// Query string of GET /api/visits
#[derive(Debug, Clone, Deserialize)]
pub struct VisitQuery {
    pub url: String,
}

/// Query string of the /api/logs endpoints; `yyyy-MM-dd`
#[derive(Debug, Clone, Deserialize)]
pub struct LogDateQuery {
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_request_deserialize() {
        let json = r#"{"name": "Belarus", "capital": "Minsk", "areaSquareKm": 207600.0}"#;
        let req: CountryRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.name, "Belarus");
        assert_eq!(req.area_square_km, Some(207_600.0));
        assert!(req.gdp.is_none());
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_country_request_rejects_blank_name() {
        let req: CountryRequest = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_country_update_rejects_negative_population() {
        let update = CountryUpdate {
            population: Some(-1.0),
            ..Default::default()
        };
        assert!(update.validate().is_some());
        assert!(CountryUpdate::default().validate().is_none());
    }

    #[test]
    fn test_city_name_charset() {
        let ok = CityRequest {
            name: "Saint-Petersburg, Old Town.".to_string(),
            population: None,
            area_square_km: None,
        };
        assert!(ok.validate().is_none());

        let bad = CityRequest {
            name: "Minsk<script>".to_string(),
            ..ok
        };
        assert!(bad.validate().is_some());
    }

    #[test]
    fn test_city_update_requires_positive_area() {
        let update = CityUpdate {
            area_square_km: Some(0.0),
            ..Default::default()
        };
        assert!(update.validate().is_some());
    }

    #[test]
    fn test_nation_update_ignores_empty_name() {
        let update = NationUpdate {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_none());
    }

    #[test]
    fn test_search_query_deserialize() {
        let query: SearchQuery = serde_json::from_str(r#"{"cityName": "Minsk"}"#).unwrap();
        assert_eq!(query.city_name, "Minsk");
    }
}
