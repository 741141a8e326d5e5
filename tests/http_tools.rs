//! The network-backed tools against mocked upstream services.

use react_agent::tools::{WeatherTool, WikipediaSearchTool};
use react_agent::{default_toolkit, Tool, ToolsConfig};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn weather_summarises_current_conditions() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Paris"))
        .and(query_param("format", "j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current_condition": [{
                "temp_C": "18",
                "temp_F": "64",
                "weatherDesc": [{"value": "Partly cloudy"}]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WeatherTool::new(reqwest::Client::new(), server.uri());

    assert_eq!(
        tool.call(Some("Paris")).await,
        "Weather in Paris: Partly cloudy, Temperature: 18°C (64°F)"
    );
}

#[tokio::test]
async fn weather_fills_missing_fields_with_na() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Oslo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let tool = WeatherTool::new(reqwest::Client::new(), server.uri());

    assert_eq!(
        tool.call(Some("Oslo")).await,
        "Weather in Oslo: N/A, Temperature: N/A°C (N/A°F)"
    );
}

#[tokio::test]
async fn weather_upstream_failure_becomes_observation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tool = WeatherTool::new(reqwest::Client::new(), server.uri());
    let observation = tool.call(Some("Nowhere")).await;

    assert!(observation.starts_with("Error fetching weather: "), "{observation}");
    assert!(observation.contains("503"));
}

#[tokio::test]
async fn wikipedia_returns_title_and_summary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rest_v1/page/summary/Rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Rust",
            "extract": "Rust is an iron oxide."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WikipediaSearchTool::new(reqwest::Client::new(), server.uri());

    assert_eq!(
        tool.call(Some("Rust")).await,
        "Title: Rust\n\nSummary: Rust is an iron oxide."
    );
}

#[tokio::test]
async fn wikipedia_uses_underscores_for_spaces() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rest_v1/page/summary/Alan_Turing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Alan Turing"})))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WikipediaSearchTool::new(reqwest::Client::new(), server.uri());

    assert_eq!(
        tool.call(Some("Alan Turing")).await,
        "Title: Alan Turing\n\nSummary: No summary available"
    );
}

#[tokio::test]
async fn wikipedia_missing_article_becomes_observation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tool = WikipediaSearchTool::new(reqwest::Client::new(), server.uri());
    let observation = tool.call(Some("Nonexistent page")).await;

    assert!(observation.starts_with("Error searching Wikipedia: "), "{observation}");
    assert!(observation.contains("404"));
}

#[tokio::test]
async fn toolkit_routes_through_configured_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Rome"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current_condition": [{"temp_C": 30, "temp_F": 86, "weatherDesc": [{"value": "Sunny"}]}]
        })))
        .mount(&server)
        .await;

    let config = ToolsConfig {
        weather_base_url: server.uri(),
        wikipedia_base_url: server.uri(),
        ..ToolsConfig::default()
    };
    let tools = default_toolkit(&config).unwrap();

    assert_eq!(
        tools.dispatch("weather", Some("Rome")).await.unwrap(),
        "Weather in Rome: Sunny, Temperature: 30°C (86°F)"
    );
}
