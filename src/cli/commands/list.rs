//! List stored watchfaces.

use console::style;

use crate::config::Settings;
use crate::repository::WatchfaceRepository;

use crate::cli::helpers::{format_millis, truncate};

/// Print stored watchfaces, newest scrape first.
pub async fn cmd_list(settings: &Settings, limit: usize, json: bool) -> anyhow::Result<()> {
    let db_path = settings.database_path();
    if !db_path.exists() {
        println!(
            "{} No database at {}. Run 'facescrape init' first.",
            style("!").yellow(),
            db_path.display()
        );
        return Ok(());
    }

    let repository = WatchfaceRepository::new(&db_path);
    let mut watchfaces = repository.get_all()?;
    if limit > 0 {
        watchfaces.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&watchfaces)?);
        return Ok(());
    }

    if watchfaces.is_empty() {
        println!("{} No watchfaces stored yet.", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Watchfaces").bold());
    println!("{}", "-".repeat(100));
    println!(
        "{:<16} {:<10} {:>7} {:>6}  Play Store URL",
        "Scraped", "Pricing", "Coupons", "Images"
    );
    println!("{}", "-".repeat(100));

    for face in &watchfaces {
        println!(
            "{:<16} {:<10} {:>7} {:>6}  {}",
            format_millis(face.scrape_time_millis),
            if face.is_free() { "free" } else { "coupons" },
            face.remaining_coupons(),
            face.image_urls.len(),
            truncate(&face.play_store_url, 60)
        );
    }

    let total = repository.count()?;
    println!("\n{} of {} watchfaces", watchfaces.len(), total);

    Ok(())
}
