//! Trend Reports CLI
//!
//! Command-line front end for the trends endpoint:
//! - Generate a single report as an SVG chart
//! - Drive the report form interactively
//! - Print a default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trend_reports::config::{generate_default_config, Config, LoadedConfig, LoggingConfig};
use trend_reports::report::{
    format_datetime_local, DownloadOutcome, Granularity, ReportPage, SubmitOutcome, SvgSurface,
    TrendsClient,
};

#[derive(Parser)]
#[command(name = "trend-reports")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chart event counts over a date range")]
#[command(long_about = "Trend Reports posts a date range and bucket size to a /get_trends endpoint\nand draws the returned counts as a line chart.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Server hosting the trends endpoint (overrides config)
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one report
    Report {
        /// Start of the range (YYYY-MM-DDTHH:MM)
        #[arg(short, long)]
        start: String,
        /// End of the range (YYYY-MM-DDTHH:MM)
        #[arg(short, long)]
        end: String,
        /// Bucket size (hour, day, week, month)
        #[arg(short, long, default_value = "hour")]
        granularity: Granularity,
        /// SVG output path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fill in the report form line by line
    Interactive {
        /// SVG output path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        command,
        config: config_path,
        base_url,
    } = Cli::parse();

    match command {
        Commands::Report {
            start,
            end,
            granularity,
            output,
        } => {
            let config = load_config(config_path, base_url)?;
            let mut page = build_page(&config, output)?;
            page.form_mut().set_start_input(&start)?;
            page.form_mut().set_end_input(&end)?;
            page.form_mut().select(granularity);

            let outcome = page.submit().await;
            match page.detach_chart() {
                Some(chart) if outcome.is_rendered() => {
                    println!("{} points written to {}", chart.points(), chart.path().display());
                }
                _ => {
                    eprintln!("No report generated ({:?})", outcome);
                    std::process::exit(1);
                }
            }
        }

        Commands::Interactive { output } => {
            let config = load_config(config_path, base_url)?;
            let mut page = build_page(&config, output)?;
            run_interactive(&mut page, BufReader::new(tokio::io::stdin())).await;
            if let Some(chart) = page.detach_chart() {
                println!("Last chart kept at {}", chart.path().display());
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Load config, start logging and apply command-line overrides
fn load_config(
    path: Option<PathBuf>,
    base_url: Option<String>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let loaded = match path {
        Some(path) => LoadedConfig {
            config: Config::load_with_env(&path)?,
            source: Some(path),
            errors: Vec::new(),
        },
        None => Config::load_default(),
    };

    let mut config = loaded.config;
    if let Some(base_url) = base_url {
        config.client.base_url = base_url;
    }

    // Load problems are only reported once the subscriber exists
    init_tracing(&config.logging);
    tracing::debug!("Trend Reports v{}", env!("CARGO_PKG_VERSION"));
    for e in &loaded.errors {
        tracing::warn!("{}", e);
    }
    match &loaded.source {
        Some(source) => tracing::info!("Loaded config from {:?}", source),
        None => tracing::info!("Using default config with environment overrides"),
    }

    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("trend_reports={}", logging.level).into());

    // Logs go to stderr so stdout stays clean for command output
    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_page(
    config: &Config,
    output: Option<PathBuf>,
) -> Result<ReportPage<TrendsClient, SvgSurface>, Box<dyn std::error::Error>> {
    let client = TrendsClient::new(&config.client)?;
    tracing::info!("Trends endpoint: {}", client.url());

    let output = output.unwrap_or_else(|| config.chart.output.clone());
    let surface = SvgSurface::new(output, config.chart.width, config.chart.height);

    Ok(ReportPage::new(client, surface))
}

/// One line of interactive input
#[derive(Debug, Clone, PartialEq)]
enum PromptCommand {
    Start(String),
    End(String),
    Select(Granularity),
    Submit,
    Download,
    Status,
    Close,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<PromptCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "start" => PromptCommand::Start(rest.to_string()),
        "end" => PromptCommand::End(rest.to_string()),
        "submit" | "generate" => PromptCommand::Submit,
        "download" => PromptCommand::Download,
        "status" => PromptCommand::Status,
        "close" => PromptCommand::Close,
        "help" | "?" => PromptCommand::Help,
        "quit" | "exit" => PromptCommand::Quit,
        other => match other.parse::<Granularity>() {
            Ok(granularity) => PromptCommand::Select(granularity),
            Err(_) => return Err(format!("Unknown command: {}", word)),
        },
    };

    Ok(Some(command))
}

const HELP: &str = "Commands:
  start <YYYY-MM-DDTHH:MM>   set the start of the range (empty clears it)
  end <YYYY-MM-DDTHH:MM>     set the end of the range (empty clears it)
  hour | day | week | month  select the bucket size
  submit                     generate the report
  download                   press the download control
  status                     show the form and chart state
  close                      remove the current chart
  quit                       leave, keeping the last chart";

/// Run line commands from `input` until `quit`, end of input or a read error
///
/// A read error ends the session like `quit` does, leaving the chart to the
/// caller.
async fn run_interactive<R: AsyncBufRead + Unpin>(
    page: &mut ReportPage<TrendsClient, SvgSurface>,
    input: R,
) {
    println!("{}", HELP);
    print_status(page);

    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                eprintln!("Input error, leaving interactive mode: {}", e);
                break;
            }
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{} (try 'help')", e);
                continue;
            }
        };

        match command {
            PromptCommand::Start(value) => {
                if let Err(e) = page.form_mut().set_start_input(&value) {
                    eprintln!("{}", e);
                }
            }
            PromptCommand::End(value) => {
                if let Err(e) = page.form_mut().set_end_input(&value) {
                    eprintln!("{}", e);
                }
            }
            PromptCommand::Select(granularity) => {
                page.form_mut().select(granularity);
                print_buttons(page);
            }
            PromptCommand::Submit => match page.submit().await {
                SubmitOutcome::Rendered { points } => {
                    println!("Chart updated ({} points)", points);
                }
                SubmitOutcome::Incomplete => println!("Start and end dates are required"),
                SubmitOutcome::FetchFailed | SubmitOutcome::RenderFailed => {
                    println!("Report failed, see log");
                }
            },
            PromptCommand::Download => match page.download().await {
                DownloadOutcome::Inert => {}
                DownloadOutcome::Exported(location) => println!("Exported to {}", location),
                DownloadOutcome::Failed => println!("Download failed, see log"),
            },
            PromptCommand::Status => print_status(page),
            PromptCommand::Close => page.close(),
            PromptCommand::Help => println!("{}", HELP),
            PromptCommand::Quit => break,
        }
    }
}

fn print_buttons(page: &ReportPage<TrendsClient, SvgSurface>) {
    let buttons: Vec<String> = page
        .form()
        .buttons()
        .iter()
        .map(|b| format!("[{} .{}]", b.label, b.class))
        .collect();
    println!("{}", buttons.join(" "));
}

fn print_status(page: &ReportPage<TrendsClient, SvgSurface>) {
    let form = page.form();
    println!(
        "start: {}  end: {}  data_type: {}",
        display_input(form.start()),
        display_input(form.end()),
        form.granularity()
    );
    print_buttons(page);

    match page.renderer().current() {
        Some(chart) => println!("chart: {} ({} points)", chart.path().display(), chart.points()),
        None => println!("chart: none"),
    }
}

fn display_input(value: Option<chrono::NaiveDateTime>) -> String {
    value
        .map(|v| format_datetime_local(&v))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_commands() {
        assert_eq!(
            parse_command("start 2024-01-01T00:00").unwrap(),
            Some(PromptCommand::Start("2024-01-01T00:00".to_string()))
        );
        assert_eq!(
            parse_command("  END   2024-01-02T12:30 ").unwrap(),
            Some(PromptCommand::End("2024-01-02T12:30".to_string()))
        );
        assert_eq!(
            parse_command("start").unwrap(),
            Some(PromptCommand::Start(String::new()))
        );
    }

    #[test]
    fn test_parse_granularity_buttons() {
        for granularity in Granularity::ALL {
            assert_eq!(
                parse_command(granularity.as_str()).unwrap(),
                Some(PromptCommand::Select(granularity))
            );
        }
        assert_eq!(
            parse_command("Week").unwrap(),
            Some(PromptCommand::Select(Granularity::Week))
        );
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(parse_command("submit").unwrap(), Some(PromptCommand::Submit));
        assert_eq!(parse_command("generate").unwrap(), Some(PromptCommand::Submit));
        assert_eq!(parse_command("download").unwrap(), Some(PromptCommand::Download));
        assert_eq!(parse_command("close").unwrap(), Some(PromptCommand::Close));
        assert_eq!(parse_command("exit").unwrap(), Some(PromptCommand::Quit));
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert!(parse_command("year").is_err());
    }

    #[tokio::test]
    async fn test_unreadable_input_keeps_last_chart() {
        use axum::{routing::post, Router};

        let router = Router::new().route(
            "/get_trends",
            post(|| async { r#"{"date_list": ["a", "b"], "count_list": [1, 2]}"# }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("chart.svg");
        let mut config = Config::default();
        config.client.base_url = format!("http://{}", addr);
        let mut page = build_page(&config, Some(output.clone())).unwrap();

        // Invalid UTF-8 after a successful submit; the trailing close is never read
        let input: &[u8] = b"start 2024-01-01T00:00\nend 2024-01-02T00:00\n\
                             submit\n\xff\xfe\nclose\n";
        run_interactive(&mut page, input).await;

        assert!(page.has_chart());
        assert!(page.detach_chart().is_some());
        drop(page);
        assert!(output.exists());
    }

    #[test]
    fn test_cli_parses_report() {
        let cli = Cli::try_parse_from([
            "trend-reports",
            "--base-url",
            "http://reports:5000",
            "report",
            "--start",
            "2024-01-01T00:00",
            "--end",
            "2024-02-01T00:00",
            "--granularity",
            "month",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("http://reports:5000"));
        match cli.command {
            Commands::Report { granularity, output, .. } => {
                assert_eq!(granularity, Granularity::Month);
                assert!(output.is_none());
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_granularity() {
        assert!(Cli::try_parse_from([
            "trend-reports",
            "report",
            "-s",
            "2024-01-01T00:00",
            "-e",
            "2024-01-02T00:00",
            "-g",
            "year",
        ])
        .is_err());
    }
}
