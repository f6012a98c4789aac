use std::env;

const ENV_HOST: &str = "HOST";
const ENV_PORT: &str = "PORT";
const ENV_LOKI_URL: &str = "LOKI_URL";
const ENV_LOKI_USER: &str = "GRAFANA_LOKI_USER";
const ENV_LOKI_TOKEN: &str = "GRAFANA_LOKI_API_TOKEN";
const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 4000;

/// Application configuration, entirely environment-supplied.
///
/// Missing upstream settings degrade the corresponding feature at request
/// time (503 from the proxy, empty webhook logs, unavailable analysis); they
/// never prevent startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Loki base URL, trailing slash trimmed. `None` when unset or empty.
    pub loki_url: Option<String>,
    pub loki_user: Option<String>,
    pub loki_token: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            loki_url: None,
            loki_user: None,
            loki_token: None,
            openai_api_key: None,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        let port = env::var(ENV_PORT)
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let host = env::var(ENV_HOST).unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let loki_url = non_empty(ENV_LOKI_URL).map(|u| u.trim_end_matches('/').to_string());

        Self {
            host,
            port,
            loki_url,
            loki_user: non_empty(ENV_LOKI_USER),
            loki_token: non_empty(ENV_LOKI_TOKEN),
            openai_api_key: non_empty(ENV_OPENAI_API_KEY),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
