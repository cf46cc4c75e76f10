#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use sortbench::benchmark::{
    render_attribute_report, render_numeric_report, run_attribute_benchmark, run_numeric_benchmark,
};
use sortbench::client::{default_model, SortingClient, DEFAULT_MAX_TOKENS};
use sortbench::config::{load_json, AttributeSortingConfig, NumericBenchmarkConfig};
use sortbench::gateway::{
    Attribution, ChatModel, ProviderGateway, TracingUsageSink, UsageSummary, UsageTotals,
};
use sortbench::numeric::{BaselineDataset, NumberSortingDataset};
use sortbench::shuffler::Shuffler;
use sortbench::AttributeSorting;

#[derive(Parser)]
#[command(name = "sortbench", version, about = "LLM sorting benchmark CLI")]
struct Cli {
    /// Only log warnings and skip the text report
    #[arg(long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the attribute-sorting benchmark against a model
    Attributes {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        attrs: AttributeArgs,
        /// Write the full result as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run the number-sorting benchmark against a model
    Numbers {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        numbers: NumberArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a dataset as JSON lines without calling a model
    #[command(subcommand)]
    Dataset(DatasetCommand),
    /// Reorder a comma-separated list
    Shuffle {
        /// Items, comma-separated
        items: String,
        /// random, reverse, almost_sorted or identity
        #[arg(long, default_value = "random")]
        strategy: String,
        #[arg(long)]
        seed: Option<u64>,
        /// Swap fraction for almost_sorted
        #[arg(long)]
        fraction: Option<f64>,
        /// Randomly shuffle everything except these positions (comma-separated)
        #[arg(long, value_delimiter = ',', conflicts_with_all = ["strategy", "fraction"])]
        fixed: Vec<usize>,
    },
}

#[derive(Subcommand)]
enum DatasetCommand {
    /// Attribute-sorting questions
    Attributes {
        #[command(flatten)]
        attrs: AttributeArgs,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Baseline number-sorting questions
    Numbers {
        #[command(flatten)]
        numbers: NumberArgs,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ModelArgs {
    #[arg(long, value_enum, default_value_t = Provider::Openrouter)]
    provider: Provider,
    /// Model id; defaults to the provider's default model
    #[arg(long)]
    model: Option<String>,
    /// Completion token cap per question
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,
}

#[derive(Args)]
struct AttributeArgs {
    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    size: Option<usize>,
    #[arg(long)]
    min_items: Option<usize>,
    #[arg(long)]
    max_items: Option<usize>,
    /// Category keys, comma-separated
    #[arg(long, value_delimiter = ',')]
    categories: Option<Vec<String>>,
}

#[derive(Args)]
struct NumberArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    size: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Provider {
    Openrouter,
    Openai,
}

impl Provider {
    fn key(self) -> &'static str {
        match self {
            Provider::Openrouter => "openrouter",
            Provider::Openai => "openai",
        }
    }
}

/// Everything written by `--out`.
#[derive(Serialize)]
struct RunRecord<C, R> {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    provider: &'static str,
    model: String,
    config: C,
    usage: UsageSummary,
    results: R,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match cli.command {
        Commands::Attributes { model, attrs, out } => {
            let config = attribute_config(&attrs)?;
            let session = ModelSession::connect(&model)?;
            let started_at = Utc::now();

            let results = run_attribute_benchmark(&session.client, &config).await?;

            let record = session.record(started_at, config, results);
            if !cli.quiet {
                print!("{}", render_attribute_report(&record.results));
            }
            finish(&record, out.as_ref())?;
        }
        Commands::Numbers {
            model,
            numbers,
            out,
        } => {
            let config = numeric_config(&numbers)?;
            let session = ModelSession::connect(&model)?;
            let started_at = Utc::now();

            let results = run_numeric_benchmark(&session.client, &config).await?;

            let record = session.record(started_at, config, results);
            if !cli.quiet {
                print!("{}", render_numeric_report(&record.results));
            }
            finish(&record, out.as_ref())?;
        }
        Commands::Dataset(DatasetCommand::Attributes { attrs, out }) => {
            let config = attribute_config(&attrs)?;
            let lines = AttributeSorting::generate(&config)?
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<Vec<_>, _>>()?;
            write_lines(&lines, out.as_ref())?;
        }
        Commands::Dataset(DatasetCommand::Numbers { numbers, out }) => {
            let config = numeric_config(&numbers)?;
            let lines = NumberSortingDataset::create(&config.sorting, config.size, config.seed)?
                .entries()
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<Vec<_>, _>>()?;
            write_lines(&lines, out.as_ref())?;
        }
        Commands::Shuffle {
            items,
            strategy,
            seed,
            fraction,
            fixed,
        } => {
            let items: Vec<&str> = items
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            let mut shuffler = Shuffler::new(seed);
            let shuffled = if fixed.is_empty() {
                shuffler.apply_named(&items, &strategy, fraction)?
            } else {
                shuffler.shuffle_with_fixed_positions(&items, &fixed)
            };
            println!("{}", shuffled.join(","));
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = fmt::layer().with_target(false).with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// A model client plus the bookkeeping shared by one benchmark run.
struct ModelSession {
    run_id: Uuid,
    provider: &'static str,
    model: ChatModel,
    usage: Arc<(TracingUsageSink, UsageTotals)>,
    client: SortingClient,
}

impl ModelSession {
    fn connect(args: &ModelArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let provider = args.provider.key();
        let model = match (&args.model, args.provider) {
            (Some(id), Provider::Openrouter) => ChatModel::openrouter(id.clone()),
            (Some(id), Provider::Openai) => ChatModel::openai(id.clone()),
            (None, _) => default_model(provider)
                .ok_or_else(|| format!("no default model for provider {provider}"))?,
        };

        let run_id = Uuid::new_v4();
        let usage = Arc::new((TracingUsageSink, UsageTotals::new()));
        let gateway = ProviderGateway::from_env(&model, Arc::clone(&usage))?;
        let client = SortingClient::new(Arc::new(gateway), model.clone())
            .with_max_tokens(args.max_tokens)
            .with_attribution(Attribution::new("sortbench::cli").with_run(run_id));

        info!(%run_id, provider, model = model.model_id(), max_tokens = args.max_tokens, "starting run");
        Ok(Self {
            run_id,
            provider,
            model,
            usage,
            client,
        })
    }

    fn record<C, R>(&self, started_at: DateTime<Utc>, config: C, results: R) -> RunRecord<C, R> {
        let usage = self.usage.1.summary();
        info!(
            run_id = %self.run_id,
            calls = usage.calls,
            failed_calls = usage.failed_calls,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "run finished"
        );
        RunRecord {
            run_id: self.run_id,
            started_at,
            finished_at: Utc::now(),
            provider: self.provider,
            model: self.model.model_id().to_string(),
            config,
            usage,
            results,
        }
    }
}

fn attribute_config(args: &AttributeArgs) -> Result<AttributeSortingConfig, Box<dyn std::error::Error>> {
    let mut config: AttributeSortingConfig = match &args.config {
        Some(path) => load_json(path)?,
        None => AttributeSortingConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(size) = args.size {
        config.size = size;
    }
    if let Some(min) = args.min_items {
        config.items_per_question.0 = min;
    }
    if let Some(max) = args.max_items {
        config.items_per_question.1 = max;
    }
    if let Some(categories) = &args.categories {
        config.categories = Some(categories.clone());
    }
    config.validate()?;
    Ok(config)
}

fn numeric_config(args: &NumberArgs) -> Result<NumericBenchmarkConfig, Box<dyn std::error::Error>> {
    let mut config: NumericBenchmarkConfig = match &args.config {
        Some(path) => load_json(path)?,
        None => NumericBenchmarkConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(size) = args.size {
        config.size = size;
    }
    config.sorting.validate()?;
    Ok(config)
}

fn finish<T: Serialize>(record: &T, out: Option<&PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = out {
        write_json(path, record)?;
        info!(path = %path.display(), "results written");
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &PathBuf, value: &T) -> Result<(), io::Error> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    std::fs::write(path, json)
}

fn write_lines(lines: &[String], out: Option<&PathBuf>) -> Result<(), io::Error> {
    match out {
        Some(path) => {
            let mut body = lines.join("\n");
            body.push('\n');
            std::fs::write(path, body)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for line in lines {
                writeln!(handle, "{line}")?;
            }
            Ok(())
        }
    }
}
