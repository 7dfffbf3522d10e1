use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;

use stmtfmt::mode::Mode;
use stmtfmt::report::Report;

/// stmtfmt - Formats SQL embedded in spanner.Statement literals in Go code.
#[derive(Parser, Debug)]
#[command(name = "stmtfmt", version, about)]
struct Cli {
    /// Files or directories to format. Use "-" to read from stdin.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Remove the trailing semicolon after formatting.
    #[arg(long)]
    no_trailing_semicolon: bool,

    /// SQL dialect: generic, bigquery, postgres, mysql, ansi, ...
    #[arg(short = 'd', long)]
    dialect: Option<String>,

    /// Check formatting without writing changes.
    #[arg(long)]
    check: bool,

    /// Show formatting diff.
    #[arg(long)]
    diff: bool,

    /// Do not run gofmt over rewritten files.
    #[arg(long)]
    no_gofmt: bool,

    /// Path to the gofmt executable.
    #[arg(long)]
    gofmt_path: Option<PathBuf>,

    /// Glob patterns of file and directory names to exclude.
    #[arg(long)]
    exclude: Vec<String>,

    /// Fully-qualified statement type, e.g. cloud.google.com/go/spanner.Statement.
    #[arg(long)]
    target_type: Option<String>,

    /// Field of the statement type holding the SQL text.
    #[arg(long)]
    query_field: Option<String>,

    /// Fully-qualified printf-style function, e.g. fmt.Sprintf.
    #[arg(long)]
    template_function: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only).
    #[arg(short, long)]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progressbar: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Disable multi-threaded processing.
    #[arg(long)]
    single_process: bool,

    /// Path to config file (stmtfmt.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let is_stdin = cli.files.len() == 1 && cli.files[0].to_string_lossy() == "-";

    let base_mode = match stmtfmt::load_config(&cli.files, cli.config.as_deref()) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let mode = Mode {
        target_type: cli.target_type.unwrap_or(base_mode.target_type),
        query_field: cli.query_field.unwrap_or(base_mode.query_field),
        template_function: cli.template_function.unwrap_or(base_mode.template_function),
        no_trailing_semicolon: cli.no_trailing_semicolon || base_mode.no_trailing_semicolon,
        dialect_name: cli.dialect.unwrap_or(base_mode.dialect_name),
        gofmt: !cli.no_gofmt && base_mode.gofmt,
        gofmt_path: cli.gofmt_path.unwrap_or(base_mode.gofmt_path),
        check: cli.check,
        diff: cli.diff,
        exclude: if cli.exclude.is_empty() {
            base_mode.exclude
        } else {
            cli.exclude
        },
        generated_suffixes: base_mode.generated_suffixes,
        verbose: cli.verbose,
        quiet: cli.quiet,
        no_progressbar: cli.no_progressbar,
        threads: cli.threads.unwrap_or(base_mode.threads),
        single_process: cli.single_process,
    };

    if let Err(e) = mode.sql_formatter() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(2);
    }

    if is_stdin {
        std::process::exit(format_stdin(&mode));
    }

    let report = stmtfmt::run(&cli.files, &mode);

    if !mode.quiet {
        print_verbose_results(&report, &mode);
        eprintln!("{}", report.summary());
    }

    report.print_errors();

    if report.has_errors() {
        std::process::exit(2);
    } else if mode.check && report.has_changes() {
        std::process::exit(1);
    }
}

/// Format Go source from stdin and print it to stdout. Returns the exit code.
fn format_stdin(mode: &Mode) -> i32 {
    let mut source = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut source) {
        eprintln!("Error reading stdin: {}", e);
        return 2;
    }

    match stmtfmt::format_source(Path::new("<stdin>"), &source, mode) {
        Ok(result) => {
            print!("{}", result.output.as_deref().unwrap_or(&source));
            for error in &result.errors {
                eprintln!("{}", error);
            }
            if !result.errors.is_empty() {
                2
            } else if mode.check && result.changed {
                1
            } else {
                0
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print!("{}", source);
            2
        }
    }
}

fn print_verbose_results(report: &Report, mode: &Mode) {
    if !mode.verbose {
        return;
    }
    for result in &report.results {
        if result.changed {
            eprintln!("reformatted {}", result.path.display());
        }
    }
}
