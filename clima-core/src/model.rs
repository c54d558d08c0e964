use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of WeatherAPI.com `/v1/current.json`, restricted to the fields the
/// pipeline persists. A missing field fails deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub location: UpstreamLocation,
    pub current: UpstreamCurrent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamLocation {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub localtime: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamCondition {
    pub text: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamCurrent {
    pub last_updated: String,
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub humidity: u8,
    pub pressure_mb: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub precip_mm: f64,
    pub cloud: u8,
    pub uv: f64,
    pub condition: UpstreamCondition,
}

/// One stored observation. Field names on the wire match the documents
/// already present in the `Clima.ciudad` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(rename = "fecha_insercion")]
    pub inserted_at: DateTime<Utc>,
    #[serde(rename = "ubicacion")]
    pub location: RecordLocation,
    #[serde(rename = "clima")]
    pub weather: RecordWeather,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordLocation {
    #[serde(rename = "ciudad")]
    pub city: String,
    pub region: String,
    #[serde(rename = "pais")]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "hora_local")]
    pub local_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordWeather {
    #[serde(rename = "ultima_actualizacion")]
    pub last_updated: String,
    #[serde(rename = "temperatura_c")]
    pub temperature_c: f64,
    #[serde(rename = "sensacion_c")]
    pub feels_like_c: f64,
    #[serde(rename = "humedad")]
    pub humidity_pct: u8,
    #[serde(rename = "presion_mb")]
    pub pressure_mb: f64,
    #[serde(rename = "viento_kph")]
    pub wind_kph: f64,
    #[serde(rename = "direccion_viento")]
    pub wind_dir: String,
    #[serde(rename = "precipitacion_mm")]
    pub precip_mm: f64,
    #[serde(rename = "nubes")]
    pub cloud_pct: u8,
    pub uv: f64,
    #[serde(rename = "condicion")]
    pub condition: String,
    #[serde(rename = "icono")]
    pub icon_url: String,
}

impl WeatherRecord {
    /// Remap a parsed upstream response into a record stamped with `inserted_at`.
    pub fn from_conditions(conditions: CurrentConditions, inserted_at: DateTime<Utc>) -> Self {
        let CurrentConditions { location, current } = conditions;

        Self {
            inserted_at,
            location: RecordLocation {
                city: location.name,
                region: location.region,
                country: location.country,
                lat: location.lat,
                lon: location.lon,
                local_time: location.localtime,
            },
            weather: RecordWeather {
                last_updated: current.last_updated,
                temperature_c: current.temp_c,
                feels_like_c: current.feelslike_c,
                humidity_pct: current.humidity,
                pressure_mb: current.pressure_mb,
                wind_kph: current.wind_kph,
                wind_dir: current.wind_dir,
                precip_mm: current.precip_mm,
                cloud_pct: current.cloud,
                uv: current.uv,
                condition: current.condition.text,
                icon_url: icon_url(&current.condition.icon),
            },
        }
    }
}

/// WeatherAPI hands out protocol-relative icon paths (`//cdn...`).
fn icon_url(icon: &str) -> String {
    if icon.starts_with("//") {
        format!("https:{icon}")
    } else {
        icon.to_string()
    }
}
