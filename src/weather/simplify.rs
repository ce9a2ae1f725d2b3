use super::types::{ForecastDay, ForecastResponse, WeatherPayload};

/// Open-Meteo WMO weather codes, rendered for the German frontend.
pub fn weather_code_text(code: i32) -> &'static str {
    match code {
        0 => "Klar",
        1 => "Überwiegend klar",
        2 => "Teilweise bewölkt",
        3 => "Bewölkt",
        45 => "Nebel",
        48 => "Nebel mit Raureif",
        51 => "Leichter Nieselregen",
        53 => "Mässiger Nieselregen",
        55 => "Starker Nieselregen",
        61 => "Leichter Regen",
        63 => "Mässiger Regen",
        65 => "Starker Regen",
        71 => "Leichter Schneefall",
        73 => "Mässiger Schneefall",
        75 => "Starker Schneefall",
        80 => "Leichte Regenschauer",
        81 => "Mässige Regenschauer",
        82 => "Starke Regenschauer",
        95 => "Gewitter",
        _ => "Unbekannt",
    }
}

/// Reshapes the raw upstream response into the payload the frontend
/// consumes. The daily arrays are zipped up to the shortest one; the
/// precipitation series may be shorter still and yields `None` per day.
pub fn simplify_forecast(label: &str, raw: &ForecastResponse) -> WeatherPayload {
    let daily = &raw.daily;
    let days = daily
        .time
        .len()
        .min(daily.temperature_2m_max.len())
        .min(daily.temperature_2m_min.len())
        .min(daily.weather_code.len());

    let forecast = (0..days)
        .map(|i| {
            let code = daily.weather_code[i];
            ForecastDay {
                date: daily.time[i].clone(),
                tmax: daily.temperature_2m_max[i],
                tmin: daily.temperature_2m_min[i],
                weather_code: code,
                weather_text: weather_code_text(code).to_string(),
                precipitation_sum: daily.precipitation_sum.get(i).copied().flatten(),
            }
        })
        .collect();

    let current = &raw.current;
    WeatherPayload {
        city: label.to_string(),
        temperature: current.temperature_2m,
        wind: current.wind_speed_10m,
        weather_code: current.weather_code,
        weather_text: current
            .weather_code
            .map(weather_code_text)
            .unwrap_or("Unbekannt")
            .to_string(),
        time: current.time.clone(),
        forecast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> ForecastResponse {
        serde_json::from_value(serde_json::json!({
            "latitude": 47.38,
            "longitude": 8.54,
            "timezone": "Europe/Zurich",
            "current": {
                "time": "2024-03-01T14:15",
                "temperature_2m": 11.4,
                "weather_code": 61,
                "wind_speed_10m": 7.2
            },
            "daily": {
                "time": ["2024-03-01", "2024-03-02", "2024-03-03"],
                "temperature_2m_max": [12.1, 9.8, 8.0],
                "temperature_2m_min": [3.4, 2.2, 1.0],
                "weather_code": [61, 3, 0],
                "precipitation_sum": [4.2, null]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_simplify_forecast_payload() {
        let payload = simplify_forecast("Zürich", &fixture());

        assert_eq!(payload.city, "Zürich");
        assert_eq!(payload.temperature, Some(11.4));
        assert_eq!(payload.wind, Some(7.2));
        assert_eq!(payload.weather_text, "Leichter Regen");
        assert_eq!(payload.time.as_deref(), Some("2024-03-01T14:15"));

        assert_eq!(payload.forecast.len(), 3);
        assert_eq!(payload.forecast[0].precipitation_sum, Some(4.2));
        // Shorter precipitation series pads with None.
        assert_eq!(payload.forecast[1].precipitation_sum, None);
        assert_eq!(payload.forecast[2].precipitation_sum, None);
        assert_eq!(payload.forecast[2].weather_text, "Klar");
    }

    #[test]
    fn test_daily_arrays_zip_to_shortest() {
        let mut raw = fixture();
        raw.daily.temperature_2m_min.truncate(1);
        let payload = simplify_forecast("Basel", &raw);
        assert_eq!(payload.forecast.len(), 1);
    }

    #[test]
    fn test_unknown_weather_code() {
        assert_eq!(weather_code_text(42), "Unbekannt");
        assert_eq!(weather_code_text(95), "Gewitter");
    }

    #[test]
    fn test_empty_response_still_produces_payload() {
        let payload = simplify_forecast("Bern", &ForecastResponse::default());
        assert_eq!(payload.weather_text, "Unbekannt");
        assert!(payload.forecast.is_empty());
        assert_eq!(payload.temperature, None);
    }
}
