use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use lodash_resolver_rs::config::{ResolverConfig, TraceMode};
use lodash_resolver_rs::core::core_table;
use lodash_resolver_rs::resolver::{ResolutionRequest, Resolver};
use lodash_resolver_rs::value::Value;

#[derive(Parser, Debug)]
#[command(name = "lodash-resolve")]
#[command(about = "Resolve a single lodash variable request against the bundled helper table")]
struct CliOptions {
    /// Request document with `address` and `params` (YAML/JSON, use '-' for stdin)
    #[arg(long = "request", short = 'r', conflicts_with = "address")]
    request: Option<String>,

    /// Operation name, e.g. `toUpper`, `ifelse` or `params`
    #[arg(long = "address", short = 'a')]
    address: Option<String>,

    /// Positional argument as JSON (bare words are taken as strings); repeatable
    #[arg(long = "param", short = 'p', requires = "address")]
    params: Vec<String>,

    /// Trace output: off, stdout or stderr
    #[arg(long = "trace")]
    trace: Option<TraceMode>,

    /// Function-reference prefix (default `_`, as in `_.toUpper`)
    #[arg(long = "prefix")]
    prefix: Option<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let opts = CliOptions::parse();

    let mut config = ResolverConfig::from_env()?;
    if let Some(mode) = opts.trace {
        config.trace = mode;
    }
    if let Some(prefix) = opts.prefix.clone() {
        config.reference_prefix = prefix;
    }

    let request = load_request(&opts, io::stdin().lock())?;
    let resolver = Resolver::with_config(core_table(), &config)?;
    let result = resolver
        .resolve(request)
        .with_context(|| "Resolution failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Builds the request from `--request` (a file, or `-` for `stdin`) or from
/// `--address` plus `--param` values.
fn load_request<R: Read>(opts: &CliOptions, mut stdin: R) -> Result<ResolutionRequest> {
    match (&opts.request, &opts.address) {
        (Some(path), _) if path == "-" => {
            let mut buffer = String::new();
            stdin
                .read_to_string(&mut buffer)
                .context("Failed to read request from stdin")?;
            ResolutionRequest::from_yaml_str(&buffer).context("Invalid request read from stdin")
        }
        (Some(path), _) => ResolutionRequest::from_file(&PathBuf::from(path)),
        (None, Some(address)) => {
            let params = opts.params.iter().map(|raw| parse_param(raw)).collect();
            Ok(ResolutionRequest::new(address.clone(), params))
        }
        (None, None) => Err(anyhow!("either --request or --address must be provided")),
    }
}

fn parse_param(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}
