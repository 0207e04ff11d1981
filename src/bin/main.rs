//! Phenoql CLI - build phenotype tables and extract raw field values
//!
//! Usage:
//!   phenoql table <input|-> <output>
//!   phenoql extract [--phenotype <key>] [--cohort <key>] [--dataset <id>] [--sql-only] --output <path>
//!   phenoql process <input> <output>
//!
//! Examples:
//!   phenoql table phenotypes/pilot.csv outputs/pilot_clean.csv
//!   phenoql table - outputs/pilot_clean.csv
//!   phenoql extract --phenotype pilot --cohort test --output outputs/raw/pilot_raw_values.csv
//!   phenoql extract --phenotype pilot --dataset record-0009 --sql-only --output outputs/pilot.sql
//!   phenoql process outputs/raw/pilot_raw_values.csv outputs/pilot_processed.csv

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use phenoql::compile::{compile, CohortSelector, CompileOptions};
use phenoql::config::{CommandSpec, Settings};
use phenoql::extract::{extract, ExtractOutput};
use phenoql::metadata::{CommandSource, CommandTemplate, LocalStore, MetadataStore, RawTable};
use phenoql::model::{read_field_list, CodingTable, Dictionary};
use phenoql::process::process;
use phenoql::resolver::resolve;
use phenoql::sql::Dialect;
use phenoql::table::PhenotypeTable;

#[derive(Parser)]
#[command(name = "phenoql")]
#[command(about = "Phenoql - compile curated phenotype lists into cleaned tables and dataset SQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the cleaned phenotype table from a raw list
    Table {
        /// Input phenotype CSV, or '-' to use the configured default
        input: String,

        /// Output CSV path
        output: PathBuf,
    },

    /// Compile and run a raw-values extraction
    Extract {
        /// Named phenotype list from the config, or '-' for the default
        #[arg(short, long, default_value = "-")]
        phenotype: String,

        /// Cohort key resolved through the config
        #[arg(short, long, default_value = "test")]
        cohort: String,

        /// Explicit dataset ID (overrides --cohort)
        #[arg(short, long)]
        dataset: Option<String>,

        /// Write the generated SQL instead of executing it
        #[arg(long)]
        sql_only: bool,

        /// SQL dialect to generate
        #[arg(long, default_value = "spark")]
        dialect: DialectArg,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Clean a raw-values extract (derive age, apply exclusions)
    Process {
        /// Input raw-values CSV
        input: PathBuf,

        /// Output CSV path
        output: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Spark,
    Duckdb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Spark => Dialect::Spark,
            DialectArg::Duckdb => Dialect::DuckDb,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Table { input, output } => cmd_table(&settings, &input, &output),
        Commands::Extract {
            phenotype,
            cohort,
            dataset,
            sql_only,
            dialect,
            output,
        } => cmd_extract(
            &settings,
            &phenotype,
            &cohort,
            dataset.as_deref(),
            sql_only,
            dialect,
            &output,
        ),
        Commands::Process { input, output } => cmd_process(&input, &output),
    }
}

fn command_template(spec: &CommandSpec) -> CommandTemplate {
    CommandTemplate {
        program: spec.program.clone(),
        args: spec.args.clone(),
    }
}

/// A store rooted at the project directory, with whatever external
/// commands the config wires in.
fn build_store(settings: &Settings) -> LocalStore {
    let mut store = LocalStore::new(&settings.project_dir);
    if let Some(spec) = &settings.commands.download {
        store = store.with_remote(Box::new(CommandSource::new(command_template(spec))));
    }
    if let Some(spec) = &settings.commands.extract {
        store = store.with_extract_command(command_template(spec));
    }
    store
}

/// Resolve a named phenotype list through the config and store; '-'
/// means the configured default.
fn named_phenotype_list_path(
    settings: &Settings,
    store: &LocalStore,
    key: &str,
) -> Result<PathBuf, String> {
    let key = if key == "-" {
        settings.default_phenotype.as_deref().ok_or_else(|| {
            "no default phenotype list configured (set default_phenotype)".to_string()
        })?
    } else {
        key
    };
    let artifact = settings.phenotype_list(key).map_err(|e| e.to_string())?;
    store.fetch(artifact).map_err(|e| e.to_string())
}

/// The table subcommand takes a file path directly; '-' falls back to
/// the configured default list.
fn phenotype_list_path(
    settings: &Settings,
    store: &LocalStore,
    input: &str,
) -> Result<PathBuf, String> {
    if input == "-" {
        named_phenotype_list_path(settings, store, "-")
    } else {
        Ok(PathBuf::from(input))
    }
}

fn write_output(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)
}

fn cmd_table(settings: &Settings, input: &str, output: &Path) -> ExitCode {
    let store = build_store(settings);

    let list_path = match phenotype_list_path(settings, &store, input) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error resolving phenotype list: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let dictionary_path = match settings.artifacts.data_dictionary.as_ref() {
        Some(artifact) => match store.fetch(artifact) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("Error fetching data dictionary: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            eprintln!("No data dictionary configured (set [artifacts.data_dictionary])");
            return ExitCode::FAILURE;
        }
    };

    let codings_path = match settings.artifacts.codings.as_ref() {
        Some(artifact) => match store.fetch(artifact) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("Error fetching coding table: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            eprintln!("No coding table configured (set [artifacts.codings])");
            return ExitCode::FAILURE;
        }
    };

    let result = (|| {
        let list_file = fs::File::open(&list_path)?;
        let fields = read_field_list(std::io::BufReader::new(list_file))
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let dictionary = Dictionary::from_path(&dictionary_path)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let codings = CodingTable::from_path(&codings_path)
            .map_err(|e| std::io::Error::other(e.to_string()))?;

        let table = PhenotypeTable::build(resolve(&fields, &dictionary, &codings));

        if let Some(report) = table.report() {
            eprintln!("{}", report);
        }

        let csv = table
            .to_csv_string()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        write_output(output, csv.as_bytes())?;
        Ok::<_, std::io::Error>(())
    })();

    match result {
        Ok(()) => {
            println!("Output saved to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error building phenotype table: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_extract(
    settings: &Settings,
    phenotype: &str,
    cohort: &str,
    dataset: Option<&str>,
    sql_only: bool,
    dialect: DialectArg,
    output: &Path,
) -> ExitCode {
    if sql_only && output.extension().map(|e| e != "sql").unwrap_or(true) {
        tracing::warn!(
            output = %output.display(),
            "SQL mode is enabled but the output path does not end in .sql"
        );
    }

    let store = build_store(settings);

    let list_path = match named_phenotype_list_path(settings, &store, phenotype) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error resolving phenotype list: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let fields = match fs::File::open(&list_path)
        .map_err(|e| e.to_string())
        .and_then(|f| read_field_list(std::io::BufReader::new(f)).map_err(|e| e.to_string()))
    {
        Ok(fields) => fields,
        Err(e) => {
            eprintln!("Error reading phenotype list: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let selector = CohortSelector::from_options(cohort, dataset);
    let dataset_id = match selector.resolve(settings) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Error resolving cohort: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let schema = match store.schema(&dataset_id) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("Error loading dataset schema: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = CompileOptions::default().with_dialect(dialect.into());
    let compiled = match compile(&fields, &schema, &selector, settings, options) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match extract(&compiled, &store, sql_only) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Extraction error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let write_result = match result {
        ExtractOutput::Sql(sql) => write_output(output, sql.as_bytes()),
        ExtractOutput::Table(table) => {
            let mut buf = Vec::new();
            match table.write_csv(&mut buf) {
                Ok(()) => write_output(output, &buf),
                Err(e) => {
                    eprintln!("Error serializing extract: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    match write_result {
        Ok(()) => {
            println!("Output saved to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_process(input: &Path, output: &Path) -> ExitCode {
    let result = (|| {
        let file = fs::File::open(input)?;
        let mut table = RawTable::from_csv_reader(std::io::BufReader::new(file))
            .map_err(|e| std::io::Error::other(e.to_string()))?;

        process(&mut table);

        let mut buf = Vec::new();
        table
            .write_csv(&mut buf)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        write_output(output, &buf)?;
        Ok::<_, std::io::Error>(())
    })();

    match result {
        Ok(()) => {
            println!("Output saved to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error processing extract: {}", e);
            ExitCode::FAILURE
        }
    }
}
