use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    cache::{coord_key, TtlCache},
    config::Config,
    error::ApiError,
    flights::{simplify_flights, AviationstackClient, SimplifiedFlight},
    messages::MessageStore,
    pages,
    places::{
        GeoapifyClient, GeocodedCity, Place, DEFAULT_CATEGORIES, DEFAULT_LIMIT, DEFAULT_RADIUS_M,
        MAX_LIMIT,
    },
    weather::{
        self,
        openmeteo::{OpenMeteoClient, WeatherError},
        simplify::simplify_forecast,
        types::WeatherPayload,
    },
};

pub const CACHE_TTL: Duration = Duration::from_secs(600);

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub flights: Arc<AviationstackClient>,
    pub weather: Arc<OpenMeteoClient>,
    pub places: Arc<GeoapifyClient>,
    pub weather_cache: Arc<TtlCache<WeatherPayload>>,
    pub geocode_cache: Arc<TtlCache<GeocodedCity>>,
    pub messages: Arc<MessageStore>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let flights = Arc::new(AviationstackClient::new(
            config.aviationstack_base_url.clone(),
            config.aviationstack_api_key.clone(),
        ));
        let weather = Arc::new(OpenMeteoClient::new(config.openmeteo_base_url.clone()));
        let places = Arc::new(GeoapifyClient::new(
            config.geoapify_base_url.clone(),
            config.geoapify_api_key.clone(),
        ));
        let messages = Arc::new(MessageStore::new(config.messages_dir.clone()));

        Self {
            config: Arc::new(config),
            flights,
            weather,
            places,
            weather_cache: Arc::new(TtlCache::new(CACHE_TTL)),
            geocode_cache: Arc::new(TtlCache::new(CACHE_TTL)),
            messages,
        }
    }
}

// Request/Response types
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    pub city: Option<String>,
    pub country: Option<String>,
    pub categories: Option<String>,
    pub radius: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PlacesPayload {
    pub city: String,
    pub center: GeocodedCity,
    pub places: Vec<Place>,
}

#[derive(Debug, Serialize)]
pub struct ServerTime {
    pub server_time: String,
}

// Route handlers
pub async fn get_flights(
    State(state): State<AppState>,
    Path((dep, arr)): Path<(String, String)>,
) -> Result<Json<Vec<SimplifiedFlight>>, ApiError> {
    let records = state.flights.fetch(&dep, &arr).await?;
    Ok(Json(simplify_flights(records)))
}

pub async fn api_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<WeatherPayload>, ApiError> {
    let (lat, lon, label, key) = resolve_weather_target(&params)?;

    let payload = state
        .weather_cache
        .get_or_fetch(&key, || async {
            let raw = state.weather.fetch(lat, lon).await?;
            Ok::<_, WeatherError>(simplify_forecast(&label, &raw))
        })
        .await?;

    Ok(Json(payload))
}

/// Either a known city name or a validated lat/lon pair. The cache key
/// is the city name, or the coordinates rounded to 4 decimals.
fn resolve_weather_target(params: &WeatherQuery) -> Result<(f64, f64, String, String), ApiError> {
    if let Some(city) = &params.city {
        let (lat, lon) = weather::city_coords(city)
            .ok_or_else(|| ApiError::Validation("Unbekannte Stadt".to_string()))?;
        return Ok((lat, lon, city.clone(), city.clone()));
    }

    match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => {
            weather::validate_coordinates(lat, lon).map_err(ApiError::Validation)?;
            let key = coord_key(lat, lon);
            let label = params.label.clone().unwrap_or_else(|| key.clone());
            Ok((lat, lon, label, key))
        }
        _ => Err(ApiError::Validation(
            "Parameter city oder lat/lon erforderlich".to_string(),
        )),
    }
}

pub async fn api_places(
    State(state): State<AppState>,
    Query(params): Query<PlacesQuery>,
) -> Result<Json<PlacesPayload>, ApiError> {
    let city = params
        .city
        .as_deref()
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .ok_or_else(|| ApiError::Validation("Parameter city erforderlich".to_string()))?;
    let country = params.country.as_deref();
    let categories = params.categories.as_deref().unwrap_or(DEFAULT_CATEGORIES);
    let radius = params.radius.unwrap_or(DEFAULT_RADIUS_M);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    let key = geocode_key(city, country);
    let center = state
        .geocode_cache
        .get_or_fetch(&key, || async { state.places.geocode(city, country).await })
        .await?;

    let places = state
        .places
        .search(center.lat, center.lon, categories, radius, limit)
        .await?;

    Ok(Json(PlacesPayload {
        city: city.to_string(),
        center,
        places,
    }))
}

fn geocode_key(city: &str, country: Option<&str>) -> String {
    match country {
        Some(country) => format!("{},{}", city.to_lowercase(), country.to_lowercase()),
        None => city.to_lowercase(),
    }
}

pub async fn api_cities() -> Json<Vec<&'static str>> {
    Json(weather::cities())
}

pub async fn server_time() -> Json<ServerTime> {
    Json(ServerTime {
        server_time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/flights/:dep/:arr", get(get_flights))
        .route("/api/weather", get(api_weather))
        .route("/api/places", get(api_places))
        .route("/api/cities", get(api_cities))
        .route("/time", get(server_time))
        .route("/kontakt", get(pages::kontakt).post(pages::kontakt_submit))
        .route("/messages", get(pages::messages_page))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app() -> Router {
        create_router(AppState::from_config(Config::for_tests()))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_server_time_shape() {
        let response = test_app()
            .oneshot(Request::builder().uri("/time").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let server_time = body["server_time"].as_str().unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(server_time, "%Y-%m-%d %H:%M:%S").is_ok());
    }

    #[tokio::test]
    async fn test_weather_rejects_out_of_range_latitude() {
        // lat=91 is invalid no matter what lon says.
        for uri in [
            "/api/weather?lat=91&lon=8.5",
            "/api/weather?lat=91",
            "/api/weather?lat=91&lon=999",
        ] {
            let response = test_app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");

            let body = body_json(response).await;
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_weather_rejects_unknown_city() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/weather?city=Atlantis")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_places_requires_city() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/places")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_places_without_key_is_config_error() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/places?city=Z%C3%BCrich")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("GEOAPIFY_API_KEY"));
    }

    #[tokio::test]
    async fn test_flights_without_key_is_config_error() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/flights/ZRH/BER")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_cities_listing() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/cities")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let cities: Vec<String> = serde_json::from_value(body).unwrap();
        assert!(cities.contains(&"Zürich".to_string()));
    }

    #[test]
    fn test_geocode_key_normalization() {
        assert_eq!(geocode_key("Zürich", None), "zürich");
        assert_eq!(
            geocode_key("Zürich", Some("Schweiz")),
            geocode_key("ZÜRICH", Some("schweiz"))
        );
    }
}
