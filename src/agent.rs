use crate::aggregator::EventAggregator;
use crate::config::Config;
use crate::domain::SearchCriteria;
use crate::error::{AgentError, Result};
use crate::llm::{ChatMessage, LlmClient, ToolDispatcher};
use crate::weather::WeatherService;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

const DEFAULT_NUMBER_OF_ACTIVITIES: usize = 7;

fn system_prompt() -> String {
    format!(
        "You are a funny and helpful activity planner, who helps to find the best things to do \
based on the weather. Your job is to recommend up to {DEFAULT_NUMBER_OF_ACTIVITIES} activities \
based on real-time weather obtained from a weather tool, ensuring a mix of indoor and outdoor \
activities whenever possible.

### IMPORTANT: Always Use Your Tools First
ALWAYS start by calling the get_weather tool to get current weather conditions when a user \
mentions a city, even for general questions like \"what can I do in [city]\". Then use the \
get_events tool to find local events. Only after gathering this data should you provide \
recommendations.

### Activity and Event Suggestion Process
Step 1: Retrieve Weather Data - ALWAYS use the get_weather tool first when a city is mentioned. \
For multi-day requests, use days=7 to get a full week forecast.
Step 2: Fetch Activities - Use the get_events tool to find relevant events in the user's area.
Step 3: Suggest Activities - Recommend suitable indoor or outdoor activities based on the \
weather data you retrieved.

### Process Rules
- ALWAYS call get_weather first when a city is mentioned, even for vague requests
- For \"next week\" or \"this weekend\" requests, get the weather forecast with days=7
- Evaluate weather conditions to decide if outdoor activities are suitable
- Check event availability and select the most relevant ones
- Balance indoor and outdoor activities (weather allowing). If one of these categories is \
unavailable, that's fine, just provide the best possible suggestions.

### Event Formatting in Output
**Event Name**:
- 📅 Date: Give the date like 19th March 2025
- 📍 Venue: Name of the venue here
- 🔗 Ticket Link: Put the URL here
(Separate events with a snazzy divider)

### User Interaction Rules
- If the user doesn't mention a city, ask them to provide one.
- ALWAYS use tools to get real data before making recommendations
- Use a friendly and funny tone, be concise but don't forget to add a dash of humor!"
    )
}

#[derive(Deserialize)]
struct WeatherArgs {
    city: String,
    #[serde(default = "default_days")]
    days: u8,
}

fn default_days() -> u8 {
    1
}

/// The two data tools exposed to the model: weather forecasts and the
/// aggregated event search.
pub struct AgentToolbox {
    weather: WeatherService,
    events: EventAggregator,
}

impl AgentToolbox {
    pub fn new(weather: WeatherService, events: EventAggregator) -> Self {
        Self { weather, events }
    }
}

#[async_trait::async_trait]
impl ToolDispatcher for AgentToolbox {
    fn tools(&self) -> Vec<Value> {
        vec![WeatherService::descriptor(), EventAggregator::descriptor()]
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<Value> {
        info!(tool = name, "dispatching tool call");
        match name {
            "get_weather" => {
                let args: WeatherArgs = serde_json::from_value(arguments).map_err(|e| {
                    AgentError::invalid_argument(format!("invalid get_weather arguments: {}", e))
                })?;
                self.weather.fetch_weather(&args.city, args.days).await
            }
            "get_events" => {
                let criteria: SearchCriteria =
                    serde_json::from_value(arguments).map_err(|e| {
                        AgentError::invalid_argument(format!(
                            "invalid get_events arguments: {}",
                            e
                        ))
                    })?;
                let result = self.events.search(&criteria).await?;
                Ok(serde_json::to_value(result)?)
            }
            other => Ok(json!({ "error": format!("Unknown function: {}", other) })),
        }
    }
}

/// Conversational activity planner: owns the system prompt, the chat
/// history across turns, and the tool wiring.
pub struct AdventureAgent {
    llm: LlmClient,
    toolbox: AgentToolbox,
    history: Vec<ChatMessage>,
}

impl AdventureAgent {
    pub fn new(llm: LlmClient, toolbox: AgentToolbox) -> Self {
        Self {
            llm,
            toolbox,
            history: Vec::new(),
        }
    }

    /// Builds the full agent from environment keys and config. Fails fast if
    /// any of the four API keys is missing.
    pub fn from_env(config: &Config) -> Result<Self> {
        let llm = LlmClient::from_env(config)?;
        let weather = WeatherService::from_env(&config.http)?;
        let events = EventAggregator::from_env(config)?;
        Ok(Self::new(llm, AgentToolbox::new(weather, events)))
    }

    /// Answer one user message, running the tool-calling loop as needed.
    /// The transcript (including tool traffic) is carried into later turns.
    pub async fn chat(&mut self, message: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(system_prompt()));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(message));

        let (reply, transcript) = self.llm.chat_with_tools(messages, &self.toolbox).await?;

        // Everything after the system message becomes the new history.
        self.history = transcript.into_iter().skip(1).collect();
        Ok(reply)
    }
}
