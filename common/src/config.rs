use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::{env, fs};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub student_id: i64,
    pub queue_file: String,
    pub location_timeout_secs: u64,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

impl Config {
    pub fn init(env_path: &str) -> &'static Self {
        dotenvy::from_filename(env_path).ok();

        CONFIG.get_or_init(|| {
            let project_name =
                env::var("PROJECT_NAME").unwrap_or_else(|_| "attendance-checkin".into());
            let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".into());
            let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/checkin.log".into());
            let api_base_url = env::var("API_BASE_URL").expect("API_BASE_URL must be set");
            let api_token = env::var("API_TOKEN").ok();
            let student_id = env::var("STUDENT_ID")
                .expect("STUDENT_ID must be set")
                .parse()
                .expect("STUDENT_ID must be an integer");
            let queue_file =
                env::var("QUEUE_FILE").unwrap_or_else(|_| "data/pending_checkins.json".into());
            let location_timeout_secs = env::var("LOCATION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10);

            if let Some(parent) = std::path::Path::new(&log_file).parent() {
                fs::create_dir_all(parent).expect("Failed to create log directory");
            }

            Config {
                project_name,
                log_level,
                log_file,
                api_base_url,
                api_token,
                student_id,
                queue_file,
                location_timeout_secs,
            }
        })
    }

    pub fn get() -> &'static Self {
        CONFIG.get().expect("Config not initialized")
    }
}
