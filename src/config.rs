use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::schema::ProfileSchema;

#[derive(Deserialize, Debug)]
pub struct Config {
    /// Chromium user-data dir. Persists across runs, so a signed-in
    /// session established by hand survives into the next run.
    #[serde(default = "default_profile_dir")]
    pub profile_dir: String,

    /// Explicit Chromium binary; auto-detected when absent.
    #[serde(default)]
    pub chromium_path: Option<String>,

    #[serde(default = "default_result_dir")]
    pub result_dir: String,

    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_page_wait_secs")]
    pub page_wait_secs: u64,

    #[serde(default = "default_section_wait_secs")]
    pub section_wait_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_min_profile_pause_ms")]
    pub min_profile_pause_ms: u64,

    #[serde(default = "default_max_profile_pause_ms")]
    pub max_profile_pause_ms: u64,

    #[serde(default)]
    pub profile_urls: Vec<String>,

    #[serde(default)]
    pub schema: ProfileSchema,
}

fn default_profile_dir() -> String {
    "browser/profile".to_string()
}
fn default_result_dir() -> String {
    "result".to_string()
}
fn default_page_wait_secs() -> u64 {
    10
}
fn default_section_wait_secs() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    3
}
fn default_min_profile_pause_ms() -> u64 {
    3000
}
fn default_max_profile_pause_ms() -> u64 {
    7000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_dir: default_profile_dir(),
            chromium_path: None,
            result_dir: default_result_dir(),
            headless: false,
            page_wait_secs: default_page_wait_secs(),
            section_wait_secs: default_section_wait_secs(),
            max_retries: default_max_retries(),
            min_profile_pause_ms: default_min_profile_pause_ms(),
            max_profile_pause_ms: default_max_profile_pause_ms(),
            profile_urls: Vec::new(),
            schema: ProfileSchema::default(),
        }
    }
}

impl Config {
    /// Inclusive pause range between profiles. Reversed bounds in the
    /// config are reordered rather than panicking at sample time.
    pub fn profile_pause_range(&self) -> std::ops::RangeInclusive<u64> {
        let lo = self.min_profile_pause_ms.min(self.max_profile_pause_ms);
        let hi = self.min_profile_pause_ms.max(self.max_profile_pause_ms);
        lo..=hi
    }
}

pub fn load_config() -> Config {
    let config_path = get_base_path("Config.toml");
    if config_path.exists() {
        println!("Reading config: {:?}", config_path);
        if let Ok(content) = fs::read_to_string(&config_path) {
            match toml::from_str(&content) {
                Ok(cfg) => {
                    println!("Config loaded");
                    return cfg;
                }
                Err(e) => println!("Config parse error: {}", e),
            }
        }
    }
    println!("No usable Config.toml. Using defaults.");
    Config::default()
}

pub fn get_base_path(relative: &str) -> PathBuf {
    if cfg!(debug_assertions) {
        let current_dir = env::current_dir().expect("current dir unavailable");
        current_dir.join(relative)
    } else {
        let exe_path = env::current_exe().expect("exe path unavailable");
        exe_path.parent().unwrap().join(relative)
    }
}

pub fn init_profile_dir(config: &Config) -> Result<PathBuf> {
    let path = get_base_path(&config.profile_dir);
    fs::create_dir_all(&path)?;
    Ok(path)
}

/// Output file for this run: result_dir/profiles-<start>.json.
pub fn init_result_file(config: &Config, start_time: DateTime<Local>) -> Result<PathBuf> {
    let dir = get_base_path(&config.result_dir);
    fs::create_dir_all(&dir)?;
    let name = format!("profiles-{}.json", start_time.format("%Y-%m-%d-%H-%M-%S"));
    Ok(dir.join(name))
}
