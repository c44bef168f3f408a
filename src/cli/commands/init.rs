//! Initialize command.

use console::style;

use crate::config::Settings;
use crate::repository::{ensure_database_file, WatchfaceRepository};

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let db_path = settings.database_path();
    let created = ensure_database_file(&db_path)?;
    WatchfaceRepository::new(&db_path).ensure_schema()?;

    if created {
        println!(
            "  {} Created database: {}",
            style("✓").green(),
            db_path.display()
        );
    }

    println!(
        "{} Initialized facescrape in {}",
        style("✓").green(),
        settings.data_dir.display()
    );

    Ok(())
}
