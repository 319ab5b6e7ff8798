use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::record::{AddVisitOptions, QueryFilters, RemoveFilters, TopSitesOptions};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Directory holding the visit log (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Optional path to config file (YAML)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record one visit
    Add(AddArgs),
    /// Page through visits, resuming from a byte cursor
    Query(QueryArgs),
    /// Rank the most visited origins
    TopSites(TopSitesArgs),
    /// Set the title of visits matched by id or url
    SetTitle { id_or_url: String, title: String },
    /// Set the favicon of visits matched by id or url
    SetFavicon { id_or_url: String, favicon_id: String },
    /// Remove visits matching any of the given filters
    Remove(RemoveArgs),
    /// Remove every visit
    Clear,
    /// Import a Chromium `History` or Firefox `places.sqlite` database
    Import { path: PathBuf },
    /// Print every stored visit
    List,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub url: String,
    #[arg(long)]
    pub title: Option<String>,
    /// Visit time in epoch milliseconds (defaults to now)
    #[arg(long)]
    pub ts: Option<i64>,
    #[arg(long)]
    pub origin: Option<String>,
    #[arg(long)]
    pub transition: Option<String>,
    #[arg(long)]
    pub referrer: Option<String>,
    #[arg(long)]
    pub wc_id: Option<i64>,
    #[arg(long)]
    pub favicon_id: Option<String>,
}

impl From<AddArgs> for AddVisitOptions {
    fn from(args: AddArgs) -> Self {
        AddVisitOptions {
            url: args.url,
            ts: args.ts,
            title: args.title,
            origin: args.origin,
            transition: args.transition,
            referrer: args.referrer,
            wc_id: args.wc_id,
            favicon_id: args.favicon_id,
        }
    }
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Earliest visit time (epoch ms, inclusive)
    #[arg(long)]
    pub from: Option<i64>,
    /// Latest visit time (epoch ms, inclusive)
    #[arg(long)]
    pub to: Option<i64>,
    #[arg(long)]
    pub origin: Option<String>,
    /// Case-insensitive text matched against url and title
    #[arg(long)]
    pub q: Option<String>,
    /// Byte offset returned as `nextCursor` by a previous query
    #[arg(long)]
    pub cursor: Option<u64>,
    #[arg(long)]
    pub limit: Option<usize>,
}

impl QueryArgs {
    pub fn filters(&self) -> QueryFilters {
        QueryFilters {
            from_ts: self.from,
            to_ts: self.to,
            origin: self.origin.clone(),
            q: self.q.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct TopSitesArgs {
    #[arg(long)]
    pub days: Option<u32>,
    #[arg(long)]
    pub limit: Option<usize>,
}

impl From<&TopSitesArgs> for TopSitesOptions {
    fn from(args: &TopSitesArgs) -> Self {
        TopSitesOptions {
            days: args.days,
            limit: args.limit,
        }
    }
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub origin: Option<String>,
    /// Remove visits older than this time (epoch ms, exclusive)
    #[arg(long)]
    pub before: Option<i64>,
}

impl From<RemoveArgs> for RemoveFilters {
    fn from(args: RemoveArgs) -> Self {
        RemoveFilters {
            url: args.url,
            origin: args.origin,
            before_ts: args.before,
        }
    }
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_options() {
        let opts = CliOptions::try_parse_from([
            "visitlog",
            "add",
            "--url",
            "https://example.com/a",
            "--title",
            "Example",
            "--wc-id",
            "7",
        ])
        .expect("parse");
        let Command::Add(args) = opts.command else {
            panic!("expected add");
        };
        let visit = AddVisitOptions::from(args);
        assert_eq!(visit.url, "https://example.com/a");
        assert_eq!(visit.title.as_deref(), Some("Example"));
        assert_eq!(visit.wc_id, Some(7));
    }

    #[test]
    fn parses_query_cursor_and_global_data_dir() {
        let opts = CliOptions::try_parse_from([
            "visitlog",
            "query",
            "--q",
            "rust",
            "--cursor",
            "512",
            "--data-dir",
            "/tmp/visits",
        ])
        .expect("parse");
        assert_eq!(opts.data_dir, Some(PathBuf::from("/tmp/visits")));
        let Command::Query(args) = opts.command else {
            panic!("expected query");
        };
        assert_eq!(args.cursor, Some(512));
        assert_eq!(args.filters().q.as_deref(), Some("rust"));
    }

    #[test]
    fn parses_remove_filters() {
        let opts = CliOptions::try_parse_from([
            "visitlog",
            "remove",
            "--origin",
            "https://a.com",
            "--before",
            "1000",
        ])
        .expect("parse");
        let Command::Remove(args) = opts.command else {
            panic!("expected remove");
        };
        let filters = RemoveFilters::from(args);
        assert_eq!(filters.origin.as_deref(), Some("https://a.com"));
        assert_eq!(filters.before_ts, Some(1000));
        assert_eq!(filters.url, None);
    }

    #[test]
    fn parses_positional_set_title() {
        let opts = CliOptions::try_parse_from(["visitlog", "set-title", "abc", "New title"])
            .expect("parse");
        match opts.command {
            Command::SetTitle { id_or_url, title } => {
                assert_eq!(id_or_url, "abc");
                assert_eq!(title, "New title");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
