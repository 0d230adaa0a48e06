use anyhow::Result;
use headless_chrome::{Browser, LaunchOptions, Tab};
use nanorand::{Rng, WyRand};
use scraper::Html;
use std::ffi::OsStr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::{Config, get_base_path, init_profile_dir};

// Show-more toggles across the layout variants we know about. Clicking
// is best-effort; a stale or covered button is skipped.
const EXPAND_SELECTORS: &[&str] = &[
    "button.inline-show-more-text__button",
    "button.pv-profile-section__see-more-inline",
    ".pv-profile-section__see-more-inline",
    ".inline-show-more-text__button",
    ".pv-top-card-section__summary-toggle-button",
    "button.pv-profile-section__card-action-bar",
    ".pv-skills-section__additional-skills",
];

pub struct BrowserManager<'a> {
    browser: Option<Browser>,
    config: &'a Config,
}

impl<'a> BrowserManager<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            browser: None,
            config,
        }
    }

    pub fn get_or_create(&mut self) -> Result<&Browser> {
        if self.browser.is_none() {
            self.browser = Some(launch_browser(self.config)?);
        }
        Ok(self.browser.as_ref().unwrap())
    }

    pub fn restart(&mut self) -> Result<&Browser> {
        println!("Restarting browser...");
        self.browser = None;
        thread::sleep(Duration::from_millis(2000));
        self.browser = Some(launch_browser(self.config)?);
        Ok(self.browser.as_ref().unwrap())
    }
}

fn launch_browser(config: &Config) -> Result<Browser> {
    let user_data_dir = init_profile_dir(config)?;
    println!("Browser profile: {:?}", user_data_dir);

    let chromium_path = config.chromium_path.as_deref().map(get_base_path);
    if let Some(path) = &chromium_path {
        println!("Chromium: {:?}", path);
    }

    let args: Vec<&OsStr> = vec![
        OsStr::new("--no-sandbox"),
        OsStr::new("--disable-dev-shm-usage"),
        OsStr::new("--window-size=1920,1080"),
        OsStr::new("--disable-notifications"),
        OsStr::new("--no-first-run"),
        OsStr::new("--no-default-browser-check"),
    ];

    let browser = Browser::new(LaunchOptions {
        headless: config.headless,
        window_size: Some((1920, 1080)),
        sandbox: false,
        user_data_dir: Some(user_data_dir),
        path: chromium_path,
        args,
        idle_browser_timeout: Duration::from_secs(600),
        ..Default::default()
    })?;

    Ok(browser)
}

/// One tab per run; stray tabs are closed.
pub fn get_active_tab(manager: &mut BrowserManager) -> Result<Arc<Tab>> {
    let browser = manager.get_or_create()?;
    thread::sleep(Duration::from_millis(500));

    let tab = {
        let tabs = browser.get_tabs().lock().unwrap();
        let first_tab = tabs.first().cloned();
        for tab in tabs.iter().skip(1) {
            let _ = tab.close(false);
        }
        first_tab
    };

    match tab {
        Some(t) => Ok(t),
        None => {
            let browser = manager.get_or_create()?;
            Ok(browser.new_tab()?)
        }
    }
}

fn page_height(tab: &Arc<Tab>) -> Result<f64> {
    let result = tab.evaluate("document.body.scrollHeight", false)?;
    Ok(result.value.and_then(|v| v.as_f64()).unwrap_or(0.0))
}

/// Scroll to the bottom in thirds, re-measuring until the page stops
/// growing, so lazily-loaded sections render before the snapshot.
pub fn scroll_to_bottom(tab: &Arc<Tab>) -> Result<()> {
    let mut rng = WyRand::new();
    let mut last_height = page_height(tab)?;

    loop {
        for step in 1..=3 {
            tab.evaluate(
                &format!("window.scrollTo(0, {});", last_height * step as f64 / 3.0),
                false,
            )?;
            thread::sleep(Duration::from_millis(rng.generate_range(800_u64..=1300)));
        }

        let new_height = page_height(tab)?;
        if (new_height - last_height).abs() < 1.0 {
            break;
        }
        last_height = new_height;
        thread::sleep(Duration::from_millis(rng.generate_range(1500_u64..=2500)));
    }

    Ok(())
}

/// Click every show-more toggle we can find. Misses and failed clicks
/// are skipped; this only ever widens what the snapshot will contain.
pub fn expand_sections(tab: &Arc<Tab>) -> Result<()> {
    let mut rng = WyRand::new();

    for selector in EXPAND_SELECTORS {
        let elements = match tab.find_elements(selector) {
            Ok(elements) => elements,
            Err(_) => continue,
        };
        for element in elements {
            if element.click().is_ok() {
                thread::sleep(Duration::from_millis(rng.generate_range(600_u64..=1200)));
            }
        }
    }

    Ok(())
}

/// Parse the rendered page into the snapshot the extraction core runs on.
pub fn snapshot(tab: &Arc<Tab>) -> Result<Html> {
    let html = tab.get_content()?;
    Ok(Html::parse_document(&html))
}
