use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use visitlog::cli::{self, Command};
use visitlog::parsers::sqlite_db;
use visitlog::record::{AddVisitOptions, RemoveFilters, TopSitesOptions};
use visitlog::store::HistoryStore;
use visitlog::{config, logging};

fn main() -> Result<()> {
    logging::init_logging();

    let cli_opts = cli::parse();
    let loaded = config::load_config(cli_opts.config_path.as_deref())?;
    let settings = loaded.config.store_settings(cli_opts.data_dir.as_deref())?;
    info!(
        "visitlog {} log={} config_hash={}",
        env!("CARGO_PKG_VERSION"),
        settings.path.display(),
        loaded.config_hash
    );

    let store = HistoryStore::open(settings);
    match cli_opts.command {
        Command::Add(args) => {
            let record = store.add_visit(AddVisitOptions::from(args))?;
            print_json(&record)?;
        }
        Command::Query(args) => {
            let page = store.query(&args.filters(), args.cursor, args.limit)?;
            print_json(&page)?;
        }
        Command::TopSites(args) => {
            let sites = store.top_sites(TopSitesOptions::from(&args))?;
            print_json(&sites)?;
        }
        Command::SetTitle { id_or_url, title } => {
            let updated = store.update_title(&id_or_url, &title)?;
            print_json(&json!({ "updated": updated }))?;
        }
        Command::SetFavicon {
            id_or_url,
            favicon_id,
        } => {
            let updated = store.update_favicon(&id_or_url, &favicon_id)?;
            print_json(&json!({ "updated": updated }))?;
        }
        Command::Remove(args) => {
            let removed = store.remove(RemoveFilters::from(args))?;
            print_json(&json!({ "removed": removed }))?;
        }
        Command::Clear => {
            store.clear_all()?;
            print_json(&json!({ "cleared": true }))?;
        }
        Command::Import { path } => {
            let history = sqlite_db::extract_browser_history(&path)?;
            info!("read {} visits from {}", history.len(), path.display());
            let visits = history
                .into_iter()
                .map(|record| record.into_visit_options())
                .collect();
            let summary = store.import_visits(visits)?;
            print_json(&summary)?;
        }
        Command::List => {
            let records = store.load_all()?;
            let mut stdout = std::io::stdout().lock();
            for record in &records {
                serde_json::to_writer(&mut stdout, record)?;
                stdout.write_all(b"\n")?;
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("write json to stdout")?;
    stdout.write_all(b"\n")?;
    Ok(())
}
