use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use catan_core::aggregate::ParticipationThreshold;
use catan_core::core_api::{CoreError, CoreErrorCode, Engine, EngineConfig, Session};
use catan_core::decode::{ExtraPointsAccumulation, parse_date};
use catan_core::filter::{DateRange, GameFilter, RequiredStats, Whitelist};
use catan_render::{
    JsonStyle, Report, ReportSections, TextRenderOptions, TextStyle, render_json_full,
    render_json_selected, render_text_selected, render_text_with_options,
};
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::debug;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Session export in CSV form, or `-` for stdin.
    #[arg(value_name = "EXPORT.csv")]
    path: PathBuf,
    /// JSON file with engine settings; flags below override it.
    #[arg(long, value_name = "FILE.json")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    from: Option<NaiveDate>,
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    to: Option<NaiveDate>,
    /// Only keep games where every participant is listed.
    #[arg(long, value_name = "NAME,NAME", value_delimiter = ',')]
    players: Vec<String>,
    #[arg(long = "require-order")]
    require_order: bool,
    #[arg(long = "require-point-details")]
    require_point_details: bool,
    #[arg(long = "min-games", value_name = "N")]
    min_games: Option<u32>,
    #[arg(long = "min-fraction", value_name = "SHARE", conflicts_with = "min_games")]
    min_fraction: Option<f64>,
    #[arg(long = "legacy-extra-points")]
    legacy_extra_points: bool,
    #[arg(long = "header-rows", value_name = "N")]
    header_rows: Option<usize>,
    #[arg(long = "no-auto-select")]
    no_auto_select: bool,
    /// Reference date for recency; defaults to the local date.
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    today: Option<NaiveDate>,
    /// Print the players available under the date filter and exit.
    #[arg(long = "list-players")]
    list_players: bool,
    #[arg(long)]
    summary: bool,
    #[arg(long = "show-filter")]
    show_filter: bool,
    #[arg(long)]
    standings: bool,
    #[arg(long)]
    trends: bool,
    #[arg(long = "order-matrix")]
    order_matrix: bool,
    #[arg(long = "missing-stats")]
    missing_stats: bool,
    #[arg(long)]
    mismatches: bool,
    #[arg(long)]
    profiles: bool,
    #[arg(long)]
    json: bool,
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn sections(&self) -> ReportSections {
        ReportSections {
            summary: self.summary,
            filter: self.show_filter,
            players: self.standings,
            series: self.trends,
            order_matrix: self.order_matrix,
            missing_stats: self.missing_stats,
            mismatches: self.mismatches,
            profiles: self.profiles,
        }
    }

    fn date_range(&self) -> Result<DateRange, String> {
        match (self.from, self.to) {
            (None, None) => Ok(DateRange::default()),
            (Some(start), Some(end)) if start <= end => Ok(DateRange::new(start, end)),
            (Some(start), Some(end)) => Err(format!("--from {start} is after --to {end}")),
            _ => Err("--from and --to must be given together".to_string()),
        }
    }

    fn filter(&self, date_range: DateRange) -> GameFilter {
        GameFilter {
            date_range,
            whitelist: Whitelist::new(
                self.players
                    .iter()
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty()),
            ),
            required: RequiredStats {
                order: self.require_order,
                point_details: self.require_point_details,
            },
        }
    }

    fn apply_overrides(&self, mut config: EngineConfig) -> EngineConfig {
        if let Some(rows) = self.header_rows {
            config.header_rows = rows;
        }
        if self.legacy_extra_points {
            config.extra_points = ExtraPointsAccumulation::Legacy;
        }
        if let Some(n) = self.min_games {
            config.participation = ParticipationThreshold::MinGames(n);
        }
        if let Some(fraction) = self.min_fraction {
            config.participation = ParticipationThreshold::FractionOfGames(fraction);
        }
        if self.no_auto_select {
            config.auto_select = false;
        }
        config
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let sections = cli.sections();

    let date_range = cli.date_range().unwrap_or_else(|msg| {
        eprintln!("{msg}");
        process::exit(2);
    });
    if cli.list_players && (sections.is_any_selected() || cli.json) {
        eprintln!("--list-players cannot be combined with report flags");
        process::exit(2);
    }

    let base_config = match &cli.config {
        Some(path) => load_config(path).unwrap_or_else(|msg| {
            eprintln!("{msg}");
            process::exit(1);
        }),
        None => EngineConfig::default(),
    };
    let config = cli.apply_overrides(base_config);
    debug!("engine config: {config:?}");

    let engine = Engine::with_config(config).unwrap_or_else(|e| {
        eprintln!("Error in settings: {}", e.message);
        process::exit(2);
    });

    let session = open_session(&engine, &cli.path).unwrap_or_else(|e| {
        match e.code {
            CoreErrorCode::Io => eprintln!("Error reading {}", describe_input(&cli.path)),
            _ => eprintln!("Error parsing export: {}", describe_input(&cli.path)),
        }
        eprintln!("  {}", e);
        process::exit(1);
    });

    if cli.list_players {
        for name in session.available_players(&date_range) {
            println!("{name}");
        }
        return;
    }

    let view = session.view(&cli.filter(date_range));
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let summary = session.summary(today);
    let report = Report {
        session: &session,
        view: &view,
        summary: Some(&summary),
    };

    if cli.json {
        let json = if sections.is_any_selected() {
            render_json_selected(&report, &sections, JsonStyle::CanonicalV1)
        } else {
            render_json_full(&report, JsonStyle::CanonicalV1)
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if sections.is_any_selected() {
        print!("{}", render_text_selected(&report, &sections));
        return;
    }

    print!(
        "{}",
        render_text_with_options(
            &report,
            TextStyle::Report,
            TextRenderOptions {
                verbose: cli.verbose,
            },
        )
    );
}

fn open_session(engine: &Engine, path: &Path) -> Result<Session, CoreError> {
    if path.as_os_str() == "-" {
        engine.open_reader(io::stdin().lock())
    } else {
        engine.open_path(path)
    }
}

fn load_config(path: &Path) -> Result<EngineConfig, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Error reading config {}: {e}", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("Error parsing config {}: {e}", path.display()))
}

fn describe_input(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| {
        format!("invalid date '{value}', expected YYYY-MM-DD, YYYY/MM/DD, DD.MM.YYYY or MM/DD/YYYY")
    })
}
