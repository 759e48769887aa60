use crate::config::HttpConfig;
use crate::error::{AgentError, Result};
use serde_json::{json, Value};
use tracing::{debug, instrument};

const WEATHER_BASE_URL: &str = "http://api.weatherapi.com/v1";

const MAX_FORECAST_DAYS: u8 = 7;

/// WeatherAPI.com forecast client. Returns the provider's JSON unmodified;
/// the agent hands it straight to the LLM as a tool result.
pub struct WeatherService {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WeatherService {
    pub fn new(api_key: String, http: &HttpConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AgentError::Config("Weather API key is empty".to_string()));
        }
        Ok(Self {
            client: http.build_client()?,
            api_key,
            base_url: WEATHER_BASE_URL.to_string(),
        })
    }

    /// Reads the API key from `WEATHER_API_KEY`, failing fast if unset.
    pub fn from_env(http: &HttpConfig) -> Result<Self> {
        Self::new(std::env::var("WEATHER_API_KEY")?, http)
    }

    /// Current conditions plus a `days`-day forecast (1-7, current day
    /// included) for one city.
    #[instrument(skip(self))]
    pub async fn fetch_weather(&self, city: &str, days: u8) -> Result<Value> {
        if days < 1 || days > MAX_FORECAST_DAYS {
            return Err(AgentError::invalid_argument("Days must be between 1 and 7"));
        }
        if city.trim().is_empty() {
            return Err(AgentError::invalid_argument(
                "City parameter cannot be empty",
            ));
        }

        let url = format!("{}/forecast.json", self.base_url);
        let params = [
            ("key", self.api_key.as_str()),
            ("q", city.trim()),
            ("days", &days.to_string()),
        ];

        debug!(days, "querying WeatherAPI forecast");
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AgentError::source(format!("Error fetching weather data: {}", e)))?;

        response
            .json()
            .await
            .map_err(|e| AgentError::source(format!("Error parsing weather data: {}", e)))
    }

    /// OpenAI function-calling descriptor for this service.
    pub fn descriptor() -> Value {
        json!({
            "type": "function",
            "function": {
                "name": "get_weather",
                "description": "Get current weather and forecast data for a specified city. \
                    Supports multi-day forecasts up to 7 days ahead with detailed conditions, \
                    temperature, and weather metrics.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "city": {
                            "type": "string",
                            "description": "The name of the city to get weather for (e.g., 'London', 'New York', 'Tokyo'). Supports international cities worldwide."
                        },
                        "days": {
                            "type": "integer",
                            "description": "Number of forecast days to retrieve (1-7). Includes current day plus future days.",
                            "minimum": 1,
                            "maximum": 7,
                            "default": 1
                        }
                    },
                    "required": ["city"],
                    "additionalProperties": false
                }
            }
        })
    }
}
