use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ledgerflow_core::Source;
use ledgerflow_finance::{
    read_batches, report::summary_path, CategoryRules, CsvReportSink, Pipeline, PipelineConfig,
    ReportSink, RulePrecedence,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod output;

use config::{load_config, Config, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "ledgerflow", version, about = "Merge and categorize Alipay, WeChat Pay and JD exports")]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest all exports, classify, print summaries and write the CSV report
    Analyze {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Directory of Alipay CSV exports
        #[arg(long)]
        alipay: Option<PathBuf>,

        /// Directory of WeChat Pay CSV exports
        #[arg(long)]
        wechat: Option<PathBuf>,

        /// Directory of JD CSV exports
        #[arg(long)]
        jd: Option<PathBuf>,

        /// Category rules file (`category:pattern` per line)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Family accounts file (one counterparty per line)
        #[arg(long)]
        family: Option<PathBuf>,

        /// Report output directory
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the summary as JSON instead of tables
        #[arg(long)]
        json: bool,

        /// Number of counterparties to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Write a default config file
    InitConfig {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Validate a rules file and optionally show which category a text gets
    CheckRules {
        #[arg(long, default_value = "categories.txt")]
        rules: PathBuf,

        /// `counterparty_description` text to classify
        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        first_match: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    match cli.command {
        Command::Analyze {
            config,
            alipay,
            wechat,
            jd,
            rules,
            family,
            out,
            json,
            top,
        } => {
            let mut cfg = load_config(&config)?;
            if let Some(d) = alipay {
                cfg.inputs.alipay_dir = d;
            }
            if let Some(d) = wechat {
                cfg.inputs.wechat_dir = d;
            }
            if let Some(d) = jd {
                cfg.inputs.jd_dir = d;
            }
            if let Some(p) = rules {
                cfg.rules.categories = p;
            }
            if let Some(p) = family {
                cfg.rules.family_accounts = p;
            }
            if let Some(d) = out {
                cfg.output.dir = d;
            }
            analyze(&cfg, json, top)?;
        }

        Command::InitConfig { config } => {
            config::init_config(&config)?;
        }

        Command::CheckRules {
            rules,
            text,
            first_match,
        } => {
            let parsed = CategoryRules::load(&rules)?;
            println!("{} rules OK in {}", parsed.len(), rules.display());
            for rule in parsed.rules() {
                println!("  {:<12} {}", rule.category, rule.pattern.as_str());
            }
            if let Some(text) = text {
                let precedence = if first_match {
                    RulePrecedence::FirstMatch
                } else {
                    RulePrecedence::LastMatch
                };
                match parsed.categorize(&text, precedence) {
                    Some(cat) => println!("\n'{}' -> {}", text, cat),
                    None => println!("\n'{}' -> (no rule, stays {})", text, ledgerflow_core::DEFAULT_CATEGORY),
                }
            }
        }
    }

    Ok(())
}

fn analyze(cfg: &Config, json: bool, top: usize) -> Result<()> {
    // config problems abort before any export is read
    let pipeline = Pipeline::load(&PipelineConfig {
        rules_path: cfg.rules.categories.clone(),
        family_path: cfg.rules.family_accounts.clone(),
        precedence: cfg.rules.precedence,
        aggregate: cfg.aggregate,
    })?;

    let dirs = vec![
        (Source::Alipay, cfg.inputs.alipay_dir.clone()),
        (Source::WeChat, cfg.inputs.wechat_dir.clone()),
        (Source::Jd, cfg.inputs.jd_dir.clone()),
    ];
    let batches = read_batches(&dirs, &cfg.ingest)?;
    if batches.total() == 0 {
        bail!(
            "no transactions found (looked in {}, {}, {})",
            cfg.inputs.alipay_dir.display(),
            cfg.inputs.wechat_dir.display(),
            cfg.inputs.jd_dir.display()
        );
    }

    let analysis = pipeline.run(batches);

    if json {
        let s = serde_json::to_string_pretty(&analysis.summary).context("serialize summary")?;
        println!("{s}");
    } else {
        output::print_summary(&analysis.summary, top);
    }

    let mut sink = CsvReportSink::new(cfg.output.dir.clone());
    sink.write(&analysis.records, &analysis.summary)?;
    info!(summary = %summary_path(&cfg.output.dir).display(), "report saved");
    Ok(())
}
