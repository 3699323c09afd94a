//! credit-fis - loan eligibility scoring
//!
//! Command-line interface for the cooperative's fuzzy assessor.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{debug, info};

use credit_fis::{
    assess, assess_batch, build_engine, Assessment, Collateral, EmploymentStatus, FisConfig,
    FisError, InferenceEngine, LoanApplication, LogLevel, OutputFormat, Tenor, VariableRole,
};

#[derive(Parser)]
#[command(name = "credit-fis")]
#[command(author = "credit-fis authors")]
#[command(version = env!("CREDIT_FIS_VERSION"))]
#[command(long_version = concat!(env!("CREDIT_FIS_VERSION"), " (", env!("CREDIT_FIS_TARGET"), ")"))]
#[command(about = "Mamdani fuzzy scoring of cooperative loan applications", long_about = None)]
struct Cli {
    /// Configuration file (overrides the search path)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    format: Option<FormatArg>,

    /// More log output (repeat for debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Human-readable report
    Text,
    /// JSON document
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Assess a single application
    Assess(AssessArgs),
    /// Assess a JSON array of applications (`-` reads stdin)
    Batch {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Include rule activations for every application
        #[arg(long)]
        explain: bool,
    },
    /// Print the variables and the rule base
    Explain,
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct AssessArgs {
    /// Employment status: part-time, kontrak/contract, tetap/permanent
    #[arg(long)]
    status: EmploymentStatus,
    /// Years of service
    #[arg(long)]
    tenure: f64,
    /// Monthly income, millions
    #[arg(long)]
    income: f64,
    /// Collateral, e.g. tidak-ada, potong-gaji-otomatis, bpkb-motor, shm-rumah
    #[arg(long)]
    collateral: Collateral,
    /// Requested loan, millions
    #[arg(long)]
    loan: f64,
    /// Repayment period in months: 6, 12, 24 or 36
    #[arg(long)]
    tenor: u32,
    /// Other monthly installments, millions
    #[arg(long, default_value = "0")]
    other: f64,
    /// Show fuzzified inputs and rule activations
    #[arg(long)]
    explain: bool,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a commented default configuration file
    Init {
        /// Destination (defaults to ./credit-fis.toml)
        #[arg(long, value_name = "PATH")]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
    /// List the configuration search path
    Paths,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let cli_format = cli.format.map(OutputFormat::from);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return report_failure(&err, cli_format.unwrap_or_default()),
    };
    let format = cli_format.unwrap_or(config.general.format);

    init_logging(&cli, config.general.log_level);

    match run(cli.command, &config, format) {
        Ok(code) => code,
        Err(err) => report_failure(&err, format),
    }
}

fn load_config(path: Option<&Path>) -> Result<FisConfig> {
    let config = match path {
        Some(path) => FisConfig::load_explicit(path),
        None => FisConfig::load(),
    };
    Ok(config.map_err(FisError::from)?)
}

fn init_logging(cli: &Cli, configured: LogLevel) {
    let mut level = if cli.quiet { LogLevel::Quiet } else { configured };
    for _ in 0..cli.verbose {
        level = level.louder();
    }

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_max_level(level.tracing_level())
        .init();
}

fn report_failure(err: &anyhow::Error, format: OutputFormat) -> ExitCode {
    match err.downcast_ref::<FisError>() {
        Some(fis) => {
            match format {
                OutputFormat::Json => println!("{}", fis.to_json_pretty()),
                OutputFormat::Text => eprintln!("Error: {}", fis),
            }
            exit_code(fis.exit_code())
        }
        None => {
            match format {
                OutputFormat::Json => println!("{}", json!({ "message": format!("{:#}", err) })),
                OutputFormat::Text => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn run(command: Command, config: &FisConfig, format: OutputFormat) -> Result<ExitCode> {
    match command {
        Command::Assess(args) => run_assess(args, config, format),
        Command::Batch { file, explain } => run_batch(&file, explain, config, format),
        Command::Explain => {
            let engine = engine(config)?;
            print_model(&engine, format)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { action } => run_config(action, config, format),
    }
}

fn engine(config: &FisConfig) -> Result<InferenceEngine> {
    let engine = build_engine(config.engine.output_step)?;
    debug!(
        rules = engine.rules().len(),
        output_step = config.engine.output_step,
        "engine ready"
    );
    Ok(engine)
}

// ============================================================================
// assess / batch
// ============================================================================

fn run_assess(args: AssessArgs, config: &FisConfig, format: OutputFormat) -> Result<ExitCode> {
    let application = LoanApplication {
        status: args.status,
        tenure_years: args.tenure,
        monthly_income: args.income,
        collateral: args.collateral,
        loan_amount: args.loan,
        tenor: Tenor::new(args.tenor).map_err(FisError::from)?,
        other_installments: args.other,
    };

    let engine = engine(config)?;
    let assessment = assess(&engine, &application, &config.assessment)?;
    let assessment = if args.explain {
        assessment
    } else {
        assessment.without_report()
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&assessment)?),
        OutputFormat::Text => print!("{}", render_assessment(&assessment, &engine, config)),
    }
    Ok(ExitCode::SUCCESS)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        Ok(content)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }
}

fn run_batch(path: &Path, explain: bool, config: &FisConfig, format: OutputFormat) -> Result<ExitCode> {
    let content = read_input(path)?;
    let records: Vec<serde_json::Value> = serde_json::from_str(&content)
        .map_err(FisError::from)
        .with_context(|| format!("{} is not a JSON array of applications", path.display()))?;
    info!(records = records.len(), "batch loaded");

    // records that fail to deserialize are reported in place
    let parsed: Vec<Result<LoanApplication, FisError>> = records
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(FisError::from))
        .collect();
    let valid: Vec<LoanApplication> = parsed
        .iter()
        .filter_map(|r| r.as_ref().ok().cloned())
        .collect();

    let engine = engine(config)?;
    let mut assessed = assess_batch(&engine, &valid, &config.assessment).into_iter();
    let results: Vec<Result<Assessment, FisError>> = parsed
        .into_iter()
        .map(|r| match r {
            Ok(_) => assessed
                .next()
                .unwrap_or_else(|| Err(FisError::internal("batch result missing"))),
            Err(err) => Err(err),
        })
        .map(|r| r.map(|a| if explain { a } else { a.without_report() }))
        .collect();

    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = results
                .iter()
                .enumerate()
                .map(|(index, r)| match r {
                    Ok(a) => json!({ "index": index, "ok": true, "assessment": a }),
                    Err(e) => json!({ "index": index, "ok": false, "error": e }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            for (index, r) in results.iter().enumerate() {
                println!("== Application #{} ==", index + 1);
                match r {
                    Ok(a) => print!("{}", render_assessment(a, &engine, config)),
                    Err(e) => println!("Error: {}", e),
                }
                println!();
            }
        }
    }

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(total = results.len(), failed, "batch finished");
    Ok(match results.iter().find_map(|r| r.as_ref().err()) {
        Some(first) => exit_code(first.exit_code()),
        None => ExitCode::SUCCESS,
    })
}

fn render_assessment(a: &Assessment, engine: &InferenceEngine, config: &FisConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!("Installment:        {:.2} jt/month\n", a.installment));
    out.push_str(&format!(
        "Other installments: {:.2} jt/month\n",
        a.application.other_installments
    ));
    out.push_str(&format!("Total installment:  {:.2} jt/month\n", a.total_installment));
    out.push_str(&format!("Debt-burden ratio:  {:.1}%\n", a.dbr));
    if a.dbr_warning {
        out.push_str(&format!(
            "Warning: DBR exceeds {:.0}%, high risk\n",
            config.assessment.dbr_warning_threshold
        ));
    }
    match a.score {
        Some(score) => out.push_str(&format!("Eligibility score:  {:.1}/100\n", score)),
        None => out.push_str("Eligibility score:  none (no rule activated)\n"),
    }
    out.push_str(&format!(
        "Verdict:            {}\n  {}\n",
        a.verdict.as_str().to_uppercase(),
        a.verdict.advice()
    ));

    if let Some(report) = &a.report {
        out.push_str("\nFuzzified inputs:\n");
        for (variable, degrees) in &report.fuzzified {
            let terms: Vec<String> = degrees
                .iter()
                .filter(|(_, mu)| !mu.is_zero())
                .map(|(term, mu)| format!("{} {:.3}", term, mu.value()))
                .collect();
            let value = report.inputs.get(variable).unwrap_or(f64::NAN);
            let dominant = engine
                .antecedent(variable)
                .and_then(|var| var.dominant_term(value))
                .map(|(term, _)| term)
                .unwrap_or("-");
            out.push_str(&format!(
                "  {:<9} {:>7.2}  {:<7} {}\n",
                variable,
                value,
                dominant,
                terms.join(", ")
            ));
        }
        out.push_str("Fired rules:\n");
        for activation in report.fired_rules() {
            out.push_str(&format!(
                "  {:.3}  {}\n",
                activation.strength.value(),
                activation.label
            ));
        }
    }
    out
}

// ============================================================================
// explain
// ============================================================================

fn print_model(engine: &InferenceEngine, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let variables: Vec<_> = engine.antecedents().chain(engine.consequents()).collect();
        let doc = json!({ "variables": variables, "rules": engine.rules() });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("Variables:");
    for var in engine.antecedents().chain(engine.consequents()) {
        let u = var.universe();
        let role = match var.role() {
            VariableRole::Antecedent => "input",
            VariableRole::Consequent => "output",
        };
        println!(
            "  {} ({}) [{}, {}] step {}",
            var.name(),
            role,
            u.min(),
            u.max(),
            u.step()
        );
        for (term, mf) in var.terms() {
            let (a, b, c) = mf.params();
            println!("    {:<16} trimf[{}, {}, {}]", term, a, b, c);
        }
    }

    println!("Rules:");
    for (i, rule) in engine.rules().iter().enumerate() {
        println!("  {:>2}. {}", i + 1, rule);
    }
    Ok(())
}

// ============================================================================
// config
// ============================================================================

fn run_config(action: ConfigAction, config: &FisConfig, format: OutputFormat) -> Result<ExitCode> {
    match action {
        ConfigAction::Init { path, force } => {
            let path = path.unwrap_or_else(|| PathBuf::from("./credit-fis.toml"));
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            fs::write(&path, FisConfig::default_config_content())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "configuration written");
            println!("Wrote {}", path.display());
        }
        ConfigAction::Show => match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            OutputFormat::Text => print!("{}", config.to_toml().map_err(FisError::from)?),
        },
        ConfigAction::Paths => {
            for path in FisConfig::config_paths() {
                let marker = if path.exists() { "*" } else { " " };
                println!("{} {}", marker, path.display());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
