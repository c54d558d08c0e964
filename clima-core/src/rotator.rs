use crate::error::ConfigError;

/// Cyclic cursor over a fixed, non-empty list of cities.
#[derive(Debug, Clone)]
pub struct CityRotator {
    cities: Vec<String>,
    cursor: usize,
}

impl CityRotator {
    pub fn new(cities: Vec<String>) -> Result<Self, ConfigError> {
        if cities.is_empty() {
            return Err(ConfigError::NoCities);
        }
        if let Some(index) = cities.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::BlankCity(index));
        }

        Ok(Self { cities, cursor: 0 })
    }

    /// City due for the next poll cycle.
    pub fn current(&self) -> &str {
        &self.cities[self.cursor]
    }

    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.cities.len();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}
