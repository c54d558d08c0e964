use crate::{error::FetchError, model::CurrentConditions};
use async_trait::async_trait;
use std::fmt::{self, Debug};

pub mod weatherapi;

/// Location sent upstream as the `q` parameter: a city name, optionally
/// qualified with a country (`"Cali,Colombia"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery {
    city: String,
    country: Option<String>,
}

impl CityQuery {
    pub fn new(city: &str, country: Option<&str>) -> Result<Self, FetchError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FetchError::EmptyCity);
        }

        let country = country.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string);

        Ok(Self { city: city.to_string(), country })
    }

    pub fn city(&self) -> &str {
        &self.city
    }
}

impl fmt::Display for CityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{},{}", self.city, country),
            None => f.write_str(&self.city),
        }
    }
}

/// Source of current conditions for a single location.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, query: &CityQuery) -> Result<CurrentConditions, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_with_country_qualifier() {
        let q = CityQuery::new("Santa Marta", Some("Colombia")).unwrap();
        assert_eq!(q.to_string(), "Santa Marta,Colombia");
        assert_eq!(q.city(), "Santa Marta");
    }

    #[test]
    fn query_without_country() {
        let q = CityQuery::new(" London ", None).unwrap();
        assert_eq!(q.to_string(), "London");

        let q = CityQuery::new("London", Some("  ")).unwrap();
        assert_eq!(q.to_string(), "London");
    }

    #[test]
    fn empty_city_is_rejected() {
        let err = CityQuery::new("   ", Some("Colombia")).unwrap_err();
        assert!(matches!(err, FetchError::EmptyCity));
    }
}
