//! Ordering and geolocation behaviour of the lookup component against a mock server.

use std::{sync::Arc, time::Duration};

use weather_core::{
    Config, LookupState, WeatherLookup,
    error::{GEOLOCATION_DENIED_MESSAGE, GEOLOCATION_UNSUPPORTED_MESSAGE},
    locator_from_config,
    location::{DisabledLocator, IpLocator},
    provider::openweather::OpenWeatherProvider,
    provider_from_config,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_body(name: &str) -> serde_json::Value {
    serde_json::json!({
        "weather": [{"description": "clear sky"}],
        "main": {"temp": 12.3, "pressure": 1020, "humidity": 40},
        "visibility": 10000,
        "wind": {"speed": 1.5},
        "sys": {"country": "UA"},
        "name": name
    })
}

async fn mount_city(server: &MockServer, city: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", city))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body(city))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

fn lookup(server: &MockServer) -> WeatherLookup {
    let provider =
        OpenWeatherProvider::with_base_url("KEY".into(), &server.uri(), Duration::from_secs(5))
            .unwrap();
    WeatherLookup::new(Arc::new(provider))
}

fn place(state: &LookupState) -> Option<&str> {
    state.reading().map(|r| r.place_name.as_str())
}

#[tokio::test]
async fn test_latest_request_wins_over_slower_earlier_one() {
    let mock_server = MockServer::start().await;
    mount_city(&mock_server, "Slow", Duration::from_millis(500)).await;
    mount_city(&mock_server, "Fast", Duration::ZERO).await;

    let lookup = lookup(&mock_server);

    let slow = lookup.start_text("Slow").unwrap();
    let handle = lookup.clone();
    let slow_task = tokio::spawn(async move { handle.run(slow).await });

    let state = lookup.fetch_by_text("Fast").await;
    assert_eq!(place(&state), Some("Fast"));

    slow_task.await.unwrap();
    assert_eq!(place(&lookup.state()), Some("Fast"));
}

#[tokio::test]
async fn test_teardown_drops_in_flight_result() {
    let mock_server = MockServer::start().await;
    mount_city(&mock_server, "Kyiv", Duration::from_millis(200)).await;

    let lookup = lookup(&mock_server);
    let pending = lookup.start_text("Kyiv").unwrap();
    let handle = lookup.clone();
    let task = tokio::spawn(async move { handle.run(pending).await });

    lookup.teardown();
    task.await.unwrap();

    assert_eq!(lookup.state(), LookupState::Loading);
}

#[tokio::test]
async fn test_ip_geolocation_then_coordinate_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.7",
            "city": "Kyiv",
            "region": "Kyiv City",
            "country": "UA",
            "loc": "50.4501,30.5234",
            "timezone": "Europe/Kyiv"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "50.4501"))
        .and(query_param("lon", "30.5234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Kyiv")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let locator =
        IpLocator::new(&format!("{}/json", mock_server.uri()), Duration::from_secs(5)).unwrap();
    let state = lookup(&mock_server).locate_and_fetch(&locator).await;

    assert_eq!(place(&state), Some("Kyiv"));
}

#[tokio::test]
async fn test_geolocation_failure_is_advisory() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let locator =
        IpLocator::new(&format!("{}/json", mock_server.uri()), Duration::from_secs(5)).unwrap();
    let lookup = lookup(&mock_server);

    let state = lookup.locate_and_fetch(&locator).await;
    assert_eq!(state.error(), Some(GEOLOCATION_DENIED_MESSAGE));

    let state = lookup.locate_and_fetch(&DisabledLocator).await;
    assert_eq!(state.error(), Some(GEOLOCATION_UNSUPPORTED_MESSAGE));
}

#[tokio::test]
async fn test_late_geolocation_does_not_override_search() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"loc": "1.0,2.0"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Nowhere")))
        .expect(0)
        .mount(&mock_server)
        .await;

    mount_city(&mock_server, "Lviv", Duration::ZERO).await;

    let lookup = lookup(&mock_server);
    let locator =
        IpLocator::new(&format!("{}/json", mock_server.uri()), Duration::from_secs(5)).unwrap();

    let handle = lookup.clone();
    let locate_task = tokio::spawn(async move { handle.locate_and_fetch(&locator).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    lookup.fetch_by_text("Lviv").await;
    locate_task.await.unwrap();

    assert_eq!(place(&lookup.state()), Some("Lviv"));
}

#[tokio::test]
async fn test_components_from_config() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("appid", "CONFIGURED"))
        .and(query_param("lat", "10"))
        .and(query_param("lon", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Configured")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.set_api_key("CONFIGURED".into());
    config.provider.base_url = Some(mock_server.uri());
    config.geolocation.latitude = Some(10.0);
    config.geolocation.longitude = Some(20.0);

    let lookup = WeatherLookup::new(Arc::from(provider_from_config(&config).unwrap()));
    let locator = locator_from_config(&config);
    let state = lookup.locate_and_fetch(locator.as_ref()).await;

    assert_eq!(place(&state), Some("Configured"));
}
