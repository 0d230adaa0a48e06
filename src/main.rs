use anyhow::Result;
use chrono::{DateTime, Local};
use headless_chrome::Tab;
use nanorand::{Rng, WyRand};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use profile_scrape::browser::{self, BrowserManager};
use profile_scrape::config::{Config, init_result_file, load_config};
use profile_scrape::extract::assemble;
use profile_scrape::record::{ProfileRecord, save_records};
use profile_scrape::schema::FieldKind;

fn format_duration(start: DateTime<Local>, end: DateTime<Local>) -> String {
    let duration = end.signed_duration_since(start);
    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.num_milliseconds() % 1000;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, millis)
    }
}

fn main() -> Result<()> {
    let program_start = Local::now();
    println!("Started: {}", program_start.format("%Y-%m-%d %H:%M:%S"));

    let config = load_config();

    println!("\n--- Config ---");
    println!("  profile_dir: {}", config.profile_dir);
    println!("  chromium_path: {:?}", config.chromium_path);
    println!("  result_dir: {}", config.result_dir);
    println!("  headless: {}", config.headless);
    println!("  max_retries: {}", config.max_retries);
    println!("  profile_urls: {} url(s)", config.profile_urls.len());
    println!("  schema fields: {:?}", config.schema.field_names());
    println!("--------------\n");

    if config.profile_urls.is_empty() {
        println!("No profile_urls configured. Nothing to do.");
        return Ok(());
    }

    let result_file = init_result_file(&config, program_start)?;

    let mut manager = BrowserManager::new(&config);
    manager.get_or_create()?;

    let mut records: Vec<ProfileRecord> = Vec::new();
    if let Err(e) = run_all_profiles(&mut manager, &config, &mut records) {
        println!("Fatal error: {}", e);
    }

    if records.is_empty() {
        println!("\nNo profiles scraped; not writing a result file.");
    } else {
        save_records(&result_file, &records)?;
        println!("\nWrote {} record(s) to {:?}", records.len(), result_file);
    }

    let program_end = Local::now();
    println!("Finished: {}", program_end.format("%Y-%m-%d %H:%M:%S"));
    println!("Total time: {}", format_duration(program_start, program_end));

    Ok(())
}

// Strictly sequential: one record fully assembled before the next URL is
// visited. Failed navigation restarts the browser and retries, then skips.
fn run_all_profiles(
    manager: &mut BrowserManager,
    config: &Config,
    records: &mut Vec<ProfileRecord>,
) -> Result<()> {
    let mut rng = WyRand::new();
    let mut url_index = 0;
    let mut retry_count = 0;

    let urls = &config.profile_urls;

    while url_index < urls.len() {
        let url = &urls[url_index];
        let profile_start = Local::now();

        println!("\n========================================");
        println!("Profile {}/{}: {}", url_index + 1, urls.len(), url);
        println!("========================================");

        let tab = match browser::get_active_tab(manager) {
            Ok(t) => t,
            Err(e) => {
                println!("Tab error: {}. Restarting browser.", e);
                if let Err(restart_err) = manager.restart() {
                    println!("Restart failed: {}. Skipping.", restart_err);
                    url_index += 1;
                    retry_count = 0;
                    continue;
                }
                match browser::get_active_tab(manager) {
                    Ok(t) => t,
                    Err(e) => {
                        println!("Still no tab after restart: {}. Skipping.", e);
                        url_index += 1;
                        retry_count = 0;
                        continue;
                    }
                }
            }
        };

        match scrape_profile(&tab, url, config) {
            Ok(record) => {
                if record.is_empty() {
                    println!("Warning: every field came back empty for {}", url);
                }
                records.push(record);

                println!(
                    "Profile done in {}",
                    format_duration(profile_start, Local::now())
                );

                url_index += 1;
                retry_count = 0;

                if url_index < urls.len() {
                    let pause = rng.generate_range(config.profile_pause_range());
                    println!("Pausing {}ms before next profile...", pause);
                    thread::sleep(Duration::from_millis(pause));
                }
            }
            Err(e) => {
                retry_count += 1;
                println!(
                    "Scrape error: {}. Retry {}/{}",
                    e, retry_count, config.max_retries
                );

                if retry_count >= config.max_retries {
                    println!("Retry limit reached. Skipping this profile.");
                    url_index += 1;
                    retry_count = 0;
                } else {
                    let _ = manager.restart();
                }
                continue;
            }
        }
    }

    println!("\nAll profiles visited.");
    Ok(())
}

// Navigate, let the page settle, scroll and expand so collapsed content
// renders, then assemble from a single HTML snapshot.
fn scrape_profile(tab: &Arc<Tab>, url: &str, config: &Config) -> Result<ProfileRecord> {
    tab.navigate_to(url)?;
    tab.wait_until_navigated()?;
    let _ = tab
        .wait_for_element_with_custom_timeout("main", Duration::from_secs(config.page_wait_secs));
    thread::sleep(Duration::from_millis(1500));

    println!("Scrolling through profile...");
    browser::scroll_to_bottom(tab)?;

    println!("Expanding collapsed sections...");
    browser::expand_sections(tab)?;
    thread::sleep(Duration::from_millis(1000));

    // Bounded wait per list section; absence just means an empty section.
    for field in &config.schema.fields {
        if let FieldKind::Section(section) = &field.kind {
            let _ = tab.wait_for_element_with_custom_timeout(
                &section.container.as_selector_group(),
                Duration::from_secs(config.section_wait_secs),
            );
        }
    }

    let document = browser::snapshot(tab)?;
    let fields = assemble(&document.root_element(), &config.schema);

    Ok(ProfileRecord {
        url: url.to_string(),
        scraped_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        fields,
    })
}
