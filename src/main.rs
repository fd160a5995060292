use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use miette::Result;
use tracing::Level;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

use pulse_core::{PulseConfig, PulseError};
use pulse_github::{GitHubClient, RepoRef};
use pulse_report::{render_detail, show_chart, PieChart, Theme};
use pulse_review::llm::LlmClient;
use pulse_review::pipeline::{IssuePipeline, Overview, RunMode};
use pulse_review::reviewer::Reviewer;

const DEFAULT_CONFIG_FILE: &str = ".issuepulse.toml";

#[derive(Parser)]
#[command(
    name = "issuepulse",
    version,
    about = "Sentiment analysis of GitHub issues and PRs with AI reviews",
    long_about = "Sentiment analysis of GitHub issues and PRs with AI reviews.\n\n\
                   Fetches every issue and pull request of a repository, scores the sentiment\n\
                   of each title and body, asks an LLM to react to each one as a human reviewer,\n\
                   and charts how happy, sad or neutral the tracker is.\n\n\
                   Examples:\n  \
                     issuepulse octocat/hello-world             Review every item, then chart\n  \
                     issuepulse octocat/hello-world --plot      Chart only, no AI reviews\n  \
                     issuepulse octocat/hello-world --review 42 Review a single issue or PR\n\n\
                   Requires GITHUB_TOKEN, plus OPENAI_API_KEY (or GEMINI_API_KEY with\n\
                   provider = \"gemini\") for the review modes. A .env file is loaded if present."
)]
struct Cli {
    /// GitHub repository in the format owner/repo
    #[arg(required_unless_present = "completions")]
    repo: Option<String>,

    /// Only chart the sentiment of all issues and PRs (no AI reviews)
    #[arg(long, conflicts_with = "review")]
    plot: bool,

    /// Review a single issue or PR by number
    #[arg(long, value_name = "ISSUE_NUMBER")]
    review: Option<u64>,

    /// Post each AI review back to its issue or PR as a comment
    #[arg(
        long,
        conflicts_with = "plot",
        long_help = "Post each AI review back to its issue or PR as a comment.\n\n\
                     Replies longer than review.max_reply_chars (default 65536) are truncated.\n\
                     A failed post is reported and the run continues."
    )]
    post_replies: bool,

    /// Path to configuration file (default: .issuepulse.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, short)]
    verbose: bool,

    /// When to use colors
    #[arg(long, default_value = "auto")]
    color: ColorChoice,

    /// Generate shell completion scripts
    #[arg(long, value_enum, hide = true)]
    completions: Option<clap_complete::Shell>,
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Crates whose debug output `--verbose` turns on.
const VERBOSE_TARGETS: [&str; 5] = [
    "issuepulse",
    "pulse_core",
    "pulse_github",
    "pulse_review",
    "pulse_report",
];

fn log_filter(base: EnvFilter, verbose: bool) -> EnvFilter {
    let mut filter = base.add_directive(Level::WARN.into());
    if verbose {
        for target in VERBOSE_TARGETS {
            if let Ok(directive) = format!("{target}=debug").parse::<Directive>() {
                filter = filter.add_directive(directive);
            }
        }
    }
    filter
}

fn init_tracing(verbose: bool) {
    let filter = log_filter(EnvFilter::from_default_env(), verbose);
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().without_time().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<PulseConfig> {
    let config = match path {
        Some(path) => PulseConfig::from_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                PulseConfig::from_file(default_path)?
            } else {
                PulseConfig::default()
            }
        }
    };
    Ok(config)
}

fn credential_report(err: PulseError, config_hint: &str) -> miette::Report {
    match err {
        PulseError::MissingCredential { name } => miette::miette!(
            help = "Set {name} in your environment or a .env file, or add {config_hint} in {DEFAULT_CONFIG_FILE}",
            "Please make sure {name} is set"
        ),
        other => other.into(),
    }
}

fn spinner(message: &str) -> Option<ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

fn report_halt(overview: &Overview, theme: Theme) {
    let Some(status) = overview.halted_by else {
        return;
    };
    let failure = theme.failure();
    eprintln!("{}", failure.apply_to(format!("Failed to fetch issues: {status}")));
    if overview.is_partial() {
        eprintln!(
            "warning: results are partial; {} items fetched over {} pages before the failure",
            overview.items_fetched,
            overview.pages_requested.saturating_sub(1),
        );
    } else {
        eprintln!("warning: no items could be fetched");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "issuepulse", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };
    let theme = Theme::new(use_color);

    let Some(repo_arg) = cli.repo.as_deref() else {
        miette::bail!("a repository in the format owner/repo is required");
    };
    let repo: RepoRef = repo_arg.parse()?;
    let mode = RunMode::from_flags(cli.plot, cli.review);
    tracing::debug!(%repo, ?mode, "starting run");

    // Every credential is checked before the first request goes out.
    let token = config
        .github
        .resolve_token()
        .map_err(|e| credential_report(e, "token under [github]"))?;
    let llm_key = if mode.needs_reviewer() {
        let key = config
            .llm
            .resolve_api_key()
            .map_err(|e| credential_report(e, "api_key under [llm]"))?;
        Some(key)
    } else {
        None
    };

    let github = GitHubClient::new(&token, &config.github.api_url)?;
    let mut pipeline = IssuePipeline::new(github);
    if let Some(key) = &llm_key {
        let llm = LlmClient::new(&config.llm, key)?;
        tracing::debug!(model = llm.model(), "reviews enabled");
        pipeline = pipeline.with_reviewer(Reviewer::new(llm));
        if cli.post_replies || config.review.post_replies {
            pipeline = pipeline.post_replies(config.review.max_reply_chars);
        }
    }

    match mode {
        RunMode::PlotOnly => {
            let pb = spinner(&format!("Fetching issues from {repo}..."));
            let overview = pipeline.sentiment_overview(&repo).await.inspect_err(|_e| {
                if let Some(pb) = &pb {
                    pb.finish_with_message("Failed");
                }
            })?;
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            report_halt(&overview, theme);
            show_chart(&PieChart::new(overview.tally), theme)?;
        }
        RunMode::Single(number) => {
            let pb = spinner(&format!("Reviewing {repo}#{number}..."));
            let analyzed = pipeline.review_one(&repo, number).await.inspect_err(|_e| {
                if let Some(pb) = &pb {
                    pb.finish_with_message("Failed");
                }
            })?;
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            print!("{}", render_detail(&analyzed, theme));
        }
        RunMode::Full => {
            let pb = spinner(&format!("Fetching issues and comments from {repo}..."));
            let overview = pipeline
                .review_all(&repo, |index, total, analyzed| {
                    let detail = render_detail(analyzed, theme);
                    match &pb {
                        Some(pb) => {
                            pb.suspend(|| println!("{detail}"));
                            pb.set_message(format!("Reviewed {}/{total}", index + 1));
                        }
                        None => println!("{detail}"),
                    }
                })
                .await
                .inspect_err(|_e| {
                    if let Some(pb) = &pb {
                        pb.finish_with_message("Failed");
                    }
                })?;
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            report_halt(&overview, theme);
            show_chart(&PieChart::new(overview.tally), theme)?;
        }
    }

    Ok(())
}
