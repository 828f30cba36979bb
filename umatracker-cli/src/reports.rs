use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use umatracker_core::{RuleId, RuleResult, SlotSummary, TrackerSession, Year};

use crate::scenarios::ScenarioResult;

/// Evaluated state of the loaded plan.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub source: String,
    pub active_year: Year,
    pub tracked_rule: Option<RuleId>,
    pub participated: usize,
    pub won: usize,
    pub lost: usize,
    pub planned: usize,
    pub unplanned: usize,
    pub tracked_races: Vec<String>,
    pub rules: Vec<RuleResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<SlotSummary>,
}

impl PlanReport {
    pub fn from_session(source: String, session: &TrackerSession) -> Self {
        let state = session.state();
        let selection = state.selection();
        let mut tracked_races: Vec<String> = session
            .tracked_race_ids()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| session.catalog().get(id))
            .map(|race| race.name.clone())
            .collect();
        tracked_races.sort();
        tracked_races.dedup();
        Self {
            source,
            active_year: state.active_year(),
            tracked_rule: state.tracked_rule(),
            participated: selection.len(),
            won: selection.won().count(),
            lost: selection.lost().count(),
            planned: state.planner().len(),
            unplanned: state.unplanned().len(),
            tracked_races,
            rules: session.evaluate_all_rules(),
            slots: Vec::new(),
        }
    }

    pub fn completed(&self) -> usize {
        self.rules.iter().filter(|r| r.completed).count()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    plan: &'a PlanReport,
    scenarios: &'a [ScenarioResult],
}

fn rule_name(rule: RuleId) -> &'static str {
    rule.info().name
}

pub fn generate_console_report(
    out: &mut dyn Write,
    plan: &PlanReport,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "🐎 Hidden Factor Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "========================".cyan())?;
    writeln!(out, "Source: {}", plan.source)?;
    writeln!(out, "Active year: {}", plan.active_year)?;
    writeln!(
        out,
        "Races: {} entered ({} won, {} lost), {} planned",
        plan.participated,
        plan.won.to_string().green(),
        plan.lost.to_string().red(),
        plan.planned
    )?;
    writeln!(
        out,
        "Completed: {}/{}",
        plan.completed().to_string().green(),
        plan.rules.len()
    )?;
    writeln!(out)?;

    for result in &plan.rules {
        let status = if result.completed {
            "✅".green()
        } else {
            "⬜".normal()
        };
        let tracked = if plan.tracked_rule == Some(result.rule) {
            " 📌"
        } else {
            ""
        };
        writeln!(
            out,
            "{status} {:28} {:>3}/{:<3} {:>5.1}%{tracked}",
            rule_name(result.rule).bold(),
            result.current,
            result.required,
            result.progress_percent
        )?;
        writeln!(out, "     {}", result.detail.dimmed())?;
    }

    if let Some(rule) = plan.tracked_rule {
        writeln!(out)?;
        writeln!(out, "{} {}", "📌 Tracking".bright_yellow().bold(), rule_name(rule))?;
        if plan.tracked_races.is_empty() {
            writeln!(out, "   (no race projection)")?;
        } else {
            writeln!(out, "   {}", plan.tracked_races.join(", "))?;
        }
    }

    if !plan.slots.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "💾 Save Slots".bright_blue().bold())?;
        for slot in &plan.slots {
            let contents = if slot.occupied {
                format!("{} races", slot.races)
            } else {
                "empty".to_string()
            };
            writeln!(out, "   {}: {} ({contents})", slot.slot, slot.label())?;
        }
    }

    if !results.is_empty() {
        write_console_scenarios(out, results)?;
    }

    writeln!(out, "Total time: {total_duration:?}")?;
    Ok(())
}

fn write_console_scenarios(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Scenario Results".bright_cyan().bold())?;
    writeln!(out, "{}", "==================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total scenarios: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{status} {} ({:?})", result.scenario_name.bold(), result.duration)?;
        for failure in &result.failures {
            writeln!(out, "     • {}", failure.red())?;
        }
    }
    writeln!(out)?;
    Ok(())
}

pub fn generate_json_report(
    out: &mut dyn Write,
    plan: &PlanReport,
    results: &[ScenarioResult],
) -> Result<()> {
    let report = JsonReport {
        plan,
        scenarios: results,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    plan: &PlanReport,
    results: &[ScenarioResult],
) -> Result<()> {
    writeln!(out, "# Uma Musume Hidden Factor Report\n")?;
    writeln!(out, "- **Source**: {}", plan.source)?;
    writeln!(out, "- **Active year**: {}", plan.active_year)?;
    writeln!(
        out,
        "- **Races**: {} entered, {} won, {} lost, {} planned",
        plan.participated, plan.won, plan.lost, plan.planned
    )?;
    if let Some(rule) = plan.tracked_rule {
        writeln!(out, "- **Tracking**: {}", rule_name(rule))?;
    }
    writeln!(out, "- **Completed**: {}/{}\n", plan.completed(), plan.rules.len())?;

    writeln!(out, "## Hidden Factors\n")?;
    writeln!(out, "| | Factor | Progress | Detail |")?;
    writeln!(out, "|---|---|---|---|")?;
    for result in &plan.rules {
        let status = if result.completed { "✅" } else { "⬜" };
        writeln!(
            out,
            "| {status} | {} | {}/{} | {} |",
            rule_name(result.rule),
            result.current,
            result.required,
            result.detail.replace('|', "\\|")
        )?;
    }
    writeln!(out)?;

    if results.is_empty() {
        return Ok(());
    }
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "## Scenarios\n")?;
    writeln!(out, "- **Passed**: {passed}/{}\n", results.len())?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {status} {}\n", result.scenario_name)?;
        for failure in &result.failures {
            writeln!(out, "- {failure}")?;
        }
        if !result.failures.is_empty() {
            writeln!(out)?;
        }
    }
    Ok(())
}
