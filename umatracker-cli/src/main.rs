mod reports;
mod scenarios;
mod storage;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use reports::PlanReport;
use scenarios::{ScenarioResult, all_scenarios, get_scenario, list_scenarios, run_scenario};
use storage::{CatalogSource, FileSlotStorage};
use umatracker_core::{RULES, SlotNumber, Snapshot, Tracker, TrackerSession};
use util::{parse_slot, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "umatracker-cli", version)]
#[command(about = "Evaluate Uma Musume race plans against the hidden-factor catalog")]
struct Args {
    /// Race catalog JSON (defaults to the bundled catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Snapshot JSON to evaluate
    #[arg(long, conflicts_with = "load_slot")]
    snapshot: Option<PathBuf>,

    /// Directory holding save slot files
    #[arg(long)]
    slots_dir: Option<PathBuf>,

    /// Load the plan from a save slot (1-6)
    #[arg(long, value_parser = parse_slot)]
    load_slot: Option<SlotNumber>,

    /// Save the evaluated plan into a save slot (1-6)
    #[arg(long, value_parser = parse_slot)]
    save_slot: Option<SlotNumber>,

    /// Name to give the saved slot
    #[arg(long, requires = "save_slot")]
    slot_name: Option<String>,

    /// Hidden factor id to track, e.g. `perfect_crown`
    #[arg(long)]
    track: Option<String>,

    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long)]
    scenarios: Option<String>,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// List every hidden factor and exit
    #[arg(long)]
    list_rules: bool,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if maybe_list(&args)? {
        return Ok(());
    }

    if args.report == ReportFormat::Console && args.output.is_none() {
        announce_banner();
    }

    let start_time = Instant::now();
    let catalog = CatalogSource::new(args.catalog.clone());
    let source = catalog.label();
    let tracker = Tracker::new(catalog, FileSlotStorage::new(slots_dir(&args)));

    let mut session = open_session(&args, &tracker)?;
    if let Some(id) = &args.track {
        session.track_rule_by_id(id)?;
    }
    if let Some(slot) = args.save_slot {
        tracker.save_slot(slot, &session)?;
        if let Some(name) = &args.slot_name {
            tracker.rename_slot(slot, name)?;
        }
    }

    let results = run_scenarios(&args, &session);

    let mut plan = PlanReport::from_session(source, &session);
    if args.slots_dir.is_some() || args.load_slot.is_some() || args.save_slot.is_some() {
        plan.slots = tracker.list_slots()?;
    }

    write_reports(&args, &plan, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn slots_dir(args: &Args) -> PathBuf {
    args.slots_dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

fn open_session(
    args: &Args,
    tracker: &Tracker<CatalogSource, FileSlotStorage>,
) -> Result<TrackerSession> {
    if let Some(slot) = args.load_slot {
        return tracker
            .load_slot(slot)?
            .with_context(|| format!("save slot {slot} is empty"));
    }

    let session = tracker.open_session()?;
    let Some(path) = &args.snapshot else {
        return Ok(session);
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot = Snapshot::from_json(&json)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    TrackerSession::from_snapshot(session.shared_catalog(), &snapshot)
        .with_context(|| format!("snapshot {} does not fit the catalog", path.display()))
}

fn maybe_list(args: &Args) -> Result<bool> {
    if !args.list_scenarios && !args.list_rules {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    if args.list_scenarios {
        writeln!(output_target.writer(), "Available scenarios:")?;
        for (key, description) in list_scenarios() {
            writeln!(output_target.writer(), "  {key:20} - {description}")?;
        }
    }
    if args.list_rules {
        writeln!(output_target.writer(), "Hidden factors:")?;
        for info in &RULES {
            let marker = if info.trackable { " [trackable]" } else { "" };
            writeln!(
                output_target.writer(),
                "  {:22} {} ({}){marker} - {}",
                info.id,
                info.name,
                info.name_jp,
                info.condition
            )?;
        }
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🏇 Uma Musume Hidden Factor Tracker".bright_cyan().bold());
    println!("{}", "===================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for scenario in all_scenarios() {
            if !scenarios.iter().any(|s| s == scenario.key) {
                scenarios.push(scenario.key.to_string());
            }
        }
    }
    scenarios
}

fn run_scenarios(args: &Args, session: &TrackerSession) -> Vec<ScenarioResult> {
    let Some(arg) = &args.scenarios else {
        return Vec::new();
    };
    let mut results = Vec::new();
    for name in expand_scenarios(arg) {
        match get_scenario(&name) {
            Some(scenario) => results.push(run_scenario(scenario, session.shared_catalog())),
            None => eprintln!("⚠️  Unknown scenario: {}", name.yellow()),
        }
    }
    results
}

fn write_reports(
    args: &Args,
    plan: &PlanReport,
    results: &[ScenarioResult],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, plan, results)?,
        ReportFormat::Markdown => {
            reports::generate_markdown_report(&mut output_target, plan, results)?;
        }
        ReportFormat::Console => {
            reports::generate_console_report(
                &mut output_target,
                plan,
                results,
                start_time.elapsed(),
            )?;
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

    fn base_args() -> Args {
        Args {
            catalog: None,
            snapshot: None,
            slots_dir: None,
            load_slot: None,
            save_slot: None,
            slot_name: None,
            track: None,
            scenarios: None,
            list_scenarios: false,
            list_rules: false,
            report: ReportFormat::Json,
            output: None,
            verbose: false,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "umatracker-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("jewelry,all");
        assert_eq!(expanded[0], "jewelry");
        assert_eq!(expanded.len(), all_scenarios().len());
        assert!(expanded.contains(&"perfect-crown".to_string()));
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("never-give-up, jewelry");
        assert_eq!(expanded, vec!["never-give-up".to_string(), "jewelry".to_string()]);
    }

    #[test]
    fn run_scenarios_skips_when_not_requested() {
        let session = TrackerSession::with_builtin_catalog();
        assert!(run_scenarios(&base_args(), &session).is_empty());
        let args = Args {
            scenarios: Some("jewelry,unknown".to_string()),
            ..base_args()
        };
        let results = run_scenarios(&args, &session);
        assert_eq!(results.len(), 1);
        assert!(results[0].passed);
    }

    #[test]
    fn maybe_list_writes_rules_and_scenarios() {
        let temp = temp_path("list");
        let args = Args {
            list_scenarios: true,
            list_rules: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("perfect_crown"));
        assert!(content.contains("[trackable]"));
        assert!(!maybe_list(&base_args()).unwrap());
    }

    #[test]
    fn open_session_reads_snapshot_files() {
        let mut session = TrackerSession::with_builtin_catalog();
        let derby = session.catalog().ids_for_name("Japan Derby")[0];
        session.toggle_participation(derby).unwrap();
        let path = temp_path("snapshot.json");
        std::fs::write(&path, session.serialize().to_json().unwrap()).unwrap();

        let args = Args {
            snapshot: Some(path),
            ..base_args()
        };
        let tracker = Tracker::new(CatalogSource::default(), FileSlotStorage::new(temp_path("slots")));
        let loaded = open_session(&args, &tracker).unwrap();
        assert_eq!(loaded.state(), session.state());
    }

    #[test]
    fn open_session_reports_empty_slots() {
        let args = Args {
            load_slot: SlotNumber::new(4),
            ..base_args()
        };
        let tracker = Tracker::new(CatalogSource::default(), FileSlotStorage::new(temp_path("empty")));
        let err = open_session(&args, &tracker).unwrap_err();
        assert!(err.to_string().contains("save slot 4 is empty"));
    }

    #[test]
    fn write_reports_emits_markdown() {
        let temp = temp_path("report.md");
        let args = Args {
            report: ReportFormat::Markdown,
            output: Some(temp.clone()),
            ..base_args()
        };
        let session = TrackerSession::with_builtin_catalog();
        let plan = PlanReport::from_session("test".to_string(), &session);
        write_reports(&args, &plan, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("## Hidden Factors"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
