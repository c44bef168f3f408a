//! Scrape command implementation.

use console::style;

use crate::config::Settings;
use crate::repository::WatchfaceRepository;
use crate::scrapers::{CatalogClient, ChromeHarvester, HttpClient};
use crate::services::{ScrapeOptions, ScrapeService, ScrapeSummary};

use crate::cli::helpers::truncate;

/// Run the full pipeline once.
pub async fn cmd_scrape(settings: &Settings, dry_run: bool) -> anyhow::Result<()> {
    if !dry_run {
        settings.ensure_directories()?;
    }

    let http = HttpClient::with_user_agent(
        settings.request_timeout(),
        settings.request_delay(),
        settings.user_agent.as_deref(),
    )?;
    let catalog = CatalogClient::new(http, settings.catalog_config());
    let harvester = ChromeHarvester::new(settings.browser.clone());
    let repository =
        WatchfaceRepository::new(&settings.database_path()).with_batch_size(settings.batch_size);

    println!(
        "{} Scraping {} page(s) of {} with {} workers",
        style("→").cyan(),
        settings.max_pages,
        settings.api_url,
        settings.workers.max(1)
    );

    let service = ScrapeService::new(catalog, harvester, repository, settings.workers)
        .with_options(ScrapeOptions { dry_run });
    let summary = service.run().await?;

    if dry_run {
        print_records(&summary);
    }
    print_summary(settings, &summary, dry_run);

    Ok(())
}

fn print_records(summary: &ScrapeSummary) {
    for record in &summary.records {
        let pricing = if record.is_free() {
            "free".to_string()
        } else {
            format!("{} coupons", record.remaining_coupons())
        };
        println!(
            "  {} {} ({}, {} images)",
            style("•").dim(),
            truncate(&record.play_store_url, 70),
            pricing,
            record.image_urls.len()
        );
    }
}

fn print_summary(settings: &Settings, summary: &ScrapeSummary, dry_run: bool) {
    println!("\n{}", style("Scrape summary").bold());
    println!("{}", "-".repeat(40));
    println!("{:<12} {}", "Listed", summary.listed);
    println!("{:<12} {}", "Eligible", summary.eligible);
    println!("{:<12} {}", "Extracted", style(summary.extracted).green());
    println!("{:<12} {}", "Skipped", summary.skipped);
    if summary.failed() > 0 {
        println!("{:<12} {}", "Failed", style(summary.failed()).red());
        for (id, error) in &summary.failures {
            println!("  {} {}: {}", style("✗").red(), id, truncate(error, 80));
        }
    } else {
        println!("{:<12} 0", "Failed");
    }

    if dry_run {
        println!("{} Dry run, nothing written", style("!").yellow());
    } else {
        println!(
            "{} Wrote {} watchfaces to {}",
            style("✓").green(),
            summary.written,
            settings.database_path().display()
        );
    }
}
