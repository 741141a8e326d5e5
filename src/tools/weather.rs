//! Weather lookup backed by the wttr.in JSON API.

use async_trait::async_trait;
use serde_json::Value;

use crate::tool::Tool;

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://wttr.in";

pub struct WeatherTool {
    http: reqwest::Client,
    base_url: String,
}

impl WeatherTool {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn lookup(&self, city: &str) -> Result<String, reqwest::Error> {
        let url = format!("{}/{}?format=j1", self.base_url, urlencoding::encode(city));
        let report: Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let current = &report["current_condition"][0];
        let temp_c = text_or_na(&current["temp_C"]);
        let temp_f = text_or_na(&current["temp_F"]);
        let description = text_or_na(&current["weatherDesc"][0]["value"]);

        Ok(format!(
            "Weather in {city}: {description}, Temperature: {temp_c}°C ({temp_f}°F)"
        ))
    }
}

fn text_or_na(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => "N/A".to_string(),
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get weather for a city. Input: city name as string"
    }

    async fn call(&self, input: Option<&str>) -> String {
        let city = input.unwrap_or_default();
        match self.lookup(city).await {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(city, error = %err, "weather lookup failed");
                format!("Error fetching weather: {err}")
            }
        }
    }
}
