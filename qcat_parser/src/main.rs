use qcat_parser::config::runtime::LoggingPreferences;
use qcat_parser::config::RuntimeConfig;
use qcat_parser::logging::{self, LogLevel};
use qcat_parser::pipeline::{self, PipelineError, PipelineOutput, PipelineResult};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_DIAGNOSTICS: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    File(String),
    Query(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    input: Input,
    tokens: bool,
    hidden: bool,
    json: bool,
    quiet: bool,
    verbose: bool,
    config_path: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Version,
    Run(CliOptions),
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let options = match parse_args(&args) {
        Ok(Command::Help) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("qcat_parser {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Ok(Command::Run(options)) => options,
        Err(message) => {
            eprintln!("error: {}", message);
            eprintln!("Run with --help for usage");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match run(&options) {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code(), error);
            print_collected_summary(&options);
            ExitCode::from(EXIT_DIAGNOSTICS)
        }
    }
}

fn run(options: &CliOptions) -> Result<u8, PipelineError> {
    let config = match &options.config_path {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    init_logging(options, &config.logging)?;

    let result = match &options.input {
        Input::File(path) => pipeline::process_file(path, &config)?,
        Input::Query(text) => pipeline::process_source(text, &config)?,
    };

    if options.tokens {
        print_tokens(&result, options)?;
    } else {
        print_program(&result, options)?;
    }

    if !options.json && !result.diagnostics().is_empty() {
        eprint!("{}", result.render_diagnostics());
    }
    if logging::config::use_cargo_style_output() {
        print_collected_summary(options);
    }

    let failed = if options.tokens {
        result.output.lexical_diagnostics().next().is_some()
    } else {
        !result.is_success()
    };
    Ok(if failed { EXIT_DIAGNOSTICS } else { 0 })
}

fn init_logging(options: &CliOptions, configured: &LoggingPreferences) -> Result<(), PipelineError> {
    let mut preferences = if options.verbose {
        logging::config::get_development_preferences()
    } else {
        configured.clone()
    };
    if options.quiet {
        preferences.min_log_level = LogLevel::Error;
    }

    logging::config::init_runtime_preferences(preferences)
        .and_then(|_| logging::init_global_logging())
        .and_then(|_| pipeline::validate_pipeline())
        .map_err(|message| PipelineError::pipeline_error(&message))
}

fn print_tokens(result: &PipelineResult, options: &CliOptions) -> Result<(), PipelineError> {
    let listing = pipeline::token_listing(&result.tokens, options.hidden);

    if options.json {
        let json = serde_json::to_string_pretty(&listing)
            .map_err(|e| PipelineError::pipeline_error(&e.to_string()))?;
        println!("{}", json);
    } else {
        for token in &listing {
            println!(
                "{}:{}\t{}\t{:?}",
                token.line, token.column, token.kind, token.text
            );
        }
    }
    Ok(())
}

fn print_program(result: &PipelineResult, options: &CliOptions) -> Result<(), PipelineError> {
    if options.json {
        let json = PipelineOutput::new(result)
            .to_json()
            .map_err(|e| PipelineError::pipeline_error(&e.to_string()))?;
        println!("{}", json);
    } else {
        print!("{}", result.output.program);
    }
    Ok(())
}

fn print_collected_summary(options: &CliOptions) {
    if options.quiet {
        return;
    }
    if let Some(summary) = logging::cargo_style_summary() {
        if !summary.is_empty() {
            eprint!("{}", summary);
        }
    }
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut input = None;
    let mut tokens = false;
    let mut hidden = false;
    let mut json = false;
    let mut quiet = false;
    let mut verbose = false;
    let mut config_path = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--tokens" => tokens = true,
            "--hidden" => hidden = true,
            "--json" => json = true,
            "--quiet" => quiet = true,
            "--verbose" => verbose = true,
            "--config" => {
                let path = iter.next().ok_or("--config requires a file path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--query" => {
                let text = iter.next().ok_or("--query requires the query text")?;
                set_input(&mut input, Input::Query(text.clone()))?;
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(format!("unknown option '{}'", other));
            }
            path => set_input(&mut input, Input::File(path.to_string()))?,
        }
    }

    if hidden && !tokens {
        return Err("--hidden only applies with --tokens".to_string());
    }
    if quiet && verbose {
        return Err("--quiet and --verbose are mutually exclusive".to_string());
    }

    let input = input.ok_or("no input: pass a script file or --query '<TEXT>'")?;
    Ok(Command::Run(CliOptions {
        input,
        tokens,
        hidden,
        json,
        quiet,
        verbose,
        config_path,
    }))
}

fn set_input(slot: &mut Option<Input>, input: Input) -> Result<(), String> {
    if slot.is_some() {
        return Err("only one input may be given".to_string());
    }
    *slot = Some(input);
    Ok(())
}

fn print_help() {
    println!("qcat_parser {}", env!("CARGO_PKG_VERSION"));
    println!("Tokenize and parse QueryCat scripts");
    println!();
    println!("USAGE:");
    println!("    qcat_parser [OPTIONS] <FILE>");
    println!("    qcat_parser [OPTIONS] --query '<TEXT>'");
    println!();
    println!("OPTIONS:");
    println!("    --tokens          Print the token list instead of the AST");
    println!("    --hidden          Include whitespace and comments in --tokens output");
    println!("    --json            Emit JSON (tokens, or program and diagnostics)");
    println!("    --config <FILE>   Load runtime preferences from a TOML file");
    println!("    --quiet           Only log errors");
    println!("    --verbose         Log everything, including recovery decisions");
    println!("    -h, --help        Print help");
    println!("    -V, --version     Print version");
    println!();
    println!("EXIT STATUS:");
    println!("    0  no diagnostics");
    println!("    1  diagnostics reported, parse incomplete, or input could not be read");
    println!("    2  usage error");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run_options(list: &[&str]) -> CliOptions {
        match parse_args(&args(list)) {
            Ok(Command::Run(options)) => options,
            other => panic!("expected run command, got {:?}", other),
        }
    }

    #[test]
    fn test_file_input() {
        let options = run_options(&["report.qcat", "--json"]);
        assert_eq!(options.input, Input::File("report.qcat".to_string()));
        assert!(options.json);
        assert!(!options.tokens);
    }

    #[test]
    fn test_query_input_with_tokens() {
        let options = run_options(&["--tokens", "--hidden", "--query", "ECHO 1"]);
        assert_eq!(options.input, Input::Query("ECHO 1".to_string()));
        assert!(options.tokens && options.hidden);
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse_args(&args(&["-h"])), Ok(Command::Help));
        assert_eq!(parse_args(&args(&["x.qcat", "--version"])), Ok(Command::Version));
    }

    #[test]
    fn test_usage_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["--bogus", "x.qcat"])).is_err());
        assert!(parse_args(&args(&["a.qcat", "b.qcat"])).is_err());
        assert!(parse_args(&args(&["a.qcat", "--query", "1"])).is_err());
        assert!(parse_args(&args(&["--query"])).is_err());
        assert!(parse_args(&args(&["a.qcat", "--hidden"])).is_err());
        assert!(parse_args(&args(&["a.qcat", "--quiet", "--verbose"])).is_err());
    }

    #[test]
    fn test_config_path() {
        let options = run_options(&["--config", "prefs.toml", "a.qcat"]);
        assert_eq!(options.config_path, Some(PathBuf::from("prefs.toml")));
    }
}
