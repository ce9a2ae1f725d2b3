use serde::{Deserialize, Serialize};

// Open-Meteo /v1/forecast response, reduced to the fields we read.
// Everything is optional or defaulted: the upstream omits blocks that
// were not requested and individual values can be null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub current: CurrentConditions,
    #[serde(default)]
    pub daily: DailySeries,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentConditions {
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    pub weather_code: Option<i32>,
    pub wind_speed_10m: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<f64>,
    #[serde(default)]
    pub temperature_2m_min: Vec<f64>,
    #[serde(default)]
    pub weather_code: Vec<i32>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

/// What `/api/weather` returns and what the cache stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub city: String,
    pub temperature: Option<f64>,
    pub wind: Option<f64>,
    pub weather_code: Option<i32>,
    pub weather_text: String,
    pub time: Option<String>,
    pub forecast: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub tmax: f64,
    pub tmin: f64,
    pub weather_code: i32,
    pub weather_text: String,
    pub precipitation_sum: Option<f64>,
}
