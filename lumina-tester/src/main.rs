mod reports;
mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use scenario::{ScenarioResult, list_scenarios, run_scenario};

#[derive(Debug, Parser)]
#[command(name = "lumina-tester", version = "0.1.0")]
#[command(about = "Automated QA for the Lumina presentation's interaction core")]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let names = expand_scenarios(&args.scenarios);
    let results = run_scenarios(&names, args.verbose);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:15} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎂 Lumina Story Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut names: Vec<String> = scenarios_arg
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if names.contains(&"all".to_string()) {
        names = list_scenarios()
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect();
    }
    names
}

fn run_scenarios(names: &[String], verbose: bool) -> Vec<ScenarioResult> {
    let mut results = Vec::new();
    for name in names {
        let Some(result) = run_scenario(name, verbose) else {
            eprintln!("⚠️  Unknown scenario: {}", name.yellow());
            continue;
        };
        if result.passed {
            println!("✅ {name}");
        } else {
            eprintln!("❌ {name} ({} failures)", result.failures.len());
        }
        results.push(result);
    }
    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                reports::generate_json_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn base_args() -> Args {
        Args {
            scenarios: "all".to_string(),
            list_scenarios: false,
            report: "console".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lumina-tester-{name}-{}", std::process::id()))
    }

    #[test]
    fn expands_the_all_keyword() {
        let names = expand_scenarios("all");
        assert_eq!(names.len(), list_scenarios().len());
        assert!(names.contains(&"full-story".to_string()));
    }

    #[test]
    fn keeps_explicit_scenario_lists() {
        let names = expand_scenarios("intro, siege");
        assert_eq!(names, vec!["intro".to_string(), "siege".to_string()]);
    }

    #[test]
    fn listing_writes_every_scenario() {
        let path = temp_path("list");
        let mut args = base_args();
        args.list_scenarios = true;
        args.output = Some(path.clone());

        assert!(maybe_list_scenarios(&args).unwrap());
        let text = fs::read_to_string(&path).unwrap();
        for (key, _) in list_scenarios() {
            assert!(text.contains(key), "missing {key}");
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn listing_is_skipped_without_the_flag() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn json_report_lands_in_the_output_file() {
        let path = temp_path("json");
        let mut args = base_args();
        args.report = "json".to_string();
        args.output = Some(path.clone());

        let results = run_scenarios(&["achievements".to_string()], false);
        write_reports(&args, &results, Instant::now()).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed[0]["scenario_name"], "achievements");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn empty_json_report_is_an_empty_array() {
        let path = temp_path("empty");
        let mut args = base_args();
        args.report = "json".to_string();
        args.output = Some(path.clone());

        write_reports(&args, &[], Instant::now()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unknown_scenarios_are_skipped() {
        let results = run_scenarios(&["nope".to_string()], false);
        assert!(results.is_empty());
    }
}
