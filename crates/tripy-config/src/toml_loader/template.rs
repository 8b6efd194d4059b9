//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Tripy Configuration
# Only override what you want to change -- missing fields use defaults.
#
# Credentials are never read from this file. Put them in the environment
# or in ./config/.env:
#   API_KEY=...                  (OpenRouter / OpenAI-compatible key)
#   OPENWEATHERMAP_API_KEY=...   (optional, enables live weather)

[model]
# base_url = "https://openrouter.ai/api/v1"
# model = "openai/gpt-4.1-nano"
# temperature = 0.7          # 0.0-2.0
# max_tokens = 200           # 1-32000
# presence_penalty = 0.0     # -2.0-2.0, omit to leave unset
# max_tool_rounds = 5        # 1-20
# request_timeout_secs = 120 # 5-600
# stream = true

[weather]
# base_url = "https://api.openweathermap.org/data/2.5"
# include_forecast = true
# forecast_days = 5          # 1-5
# timeout_secs = 15          # 1-120

[history]
# window = 40                # turns sent to the model, 0 = all
# database = "/path/to/conversations.db"

[logging]
# level = "warn"             # trace, debug, info, warn, error
"##
    .to_string()
}
