use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub cloudflare: CloudflareConfig,
    pub firebase: FirebaseConfig,
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct CloudflareConfig {
    pub api_token: Option<String>,
    pub account_id: Option<String>,
    pub database_id: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub credentials_path: Option<String>,
    pub project_id: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub staleness_minutes: i64,
}

impl Config {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            },
            // The three Cloudflare values are required by every relay
            // endpoint, but their absence is a request-time error rather
            // than a startup failure.
            cloudflare: CloudflareConfig {
                api_token: env::var("CF_API_TOKEN").ok(),
                account_id: env::var("CF_ACCOUNT_ID").ok(),
                database_id: env::var("CF_D1_DATABASE_ID").ok(),
                api_base: env::var("CF_API_BASE")
                    .unwrap_or_else(|_| "https://api.cloudflare.com/client/v4".to_string()),
            },
            firebase: FirebaseConfig {
                credentials_path: env::var("GOOGLE_APPLICATION_CREDENTIALS").ok(),
                project_id: env::var("FCM_PROJECT_ID").ok(),
                api_base: env::var("FCM_API_BASE")
                    .unwrap_or_else(|_| "https://fcm.googleapis.com".to_string()),
            },
            notifier: NotifierConfig {
                staleness_minutes: env::var("NOTIFIER_STALENESS_MINUTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
            },
        }
    }
}
