use std::env;
use std::path::PathBuf;

/// Ticks between printed rows unless `--report-every` says otherwise.
pub const DEFAULT_REPORT_EVERY: usize = 600;

pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub telemetry_out: Option<PathBuf>,
    pub report_every: usize,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut scenario = None;
    let mut preset = None;
    let mut seed = None;
    let mut telemetry_out = None;
    let mut report_every = None;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let value = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                if seed.replace(value).is_some() {
                    return Err("--seed provided more than once".to_string());
                }
            }
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --telemetry-out (expected a file path)",
                )?;
                if telemetry_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--telemetry-out provided more than once".to_string());
                }
            }
            "--report-every" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --report-every (expected a tick count)",
                )?;
                let value = raw
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| {
                        format!("--report-every value \"{raw}\" must be a positive integer")
                    })?;
                if report_every.replace(value).is_some() {
                    return Err("--report-every provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if scenario.is_some() && preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if scenario.is_none() && preset.is_none() {
        preset = Some("load_step".to_string());
    }

    Ok(CliOptions {
        scenario,
        preset,
        seed,
        telemetry_out,
        report_every: report_every.unwrap_or(DEFAULT_REPORT_EVERY),
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("dynamic-demand-sim: dishwasher dynamic demand on a droop-governed grid");
    eprintln!();
    eprintln!("Usage: dynamic-demand-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (load_step, spinning_reserve, steady_state)");
    eprintln!("  --seed <u64>             Override the master seed");
    eprintln!("  --telemetry-out <path>   Export every tick to CSV");
    eprintln!("  --report-every <ticks>   Print every n-th tick (default: {DEFAULT_REPORT_EVERY})");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the load_step preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}
