//! Human-readable rendering of reports and profiles

use colored::Colorize;
use std::fmt::Write;
use std::time::Duration;
use triage_core::{LoadShape, RunReport, TaskStats};

const NAME_WIDTH: usize = 32;

/// Final statistics table, one row per task plus the aggregated row
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!(
            "{:<NAME_WIDTH$} {:>8} {:>8} {:>7} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "Task", "Reqs", "Fails", "Fail%", "Avg ms", "Min ms", "Max ms", "p50", "p95", "p99"
        )
        .bold()
    );
    let _ = writeln!(out, "{}", "-".repeat(NAME_WIDTH + 82));

    for task in &report.tasks {
        let _ = writeln!(out, "{}", task_row(task));
    }
    let _ = writeln!(out, "{}", "-".repeat(NAME_WIDTH + 82));
    let _ = writeln!(out, "{}", task_row(&report.total).bold());

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Stopped: {}  Duration: {:.1}s  Peak users: {}  Throughput: {:.2} req/s",
        report.stop_reason, report.duration_secs, report.peak_users, report.requests_per_second
    );

    if !report.failure_samples.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Failures".red().bold());
        for sample in &report.failure_samples {
            let _ = writeln!(
                out,
                "  {:>6}x  {:<NAME_WIDTH$} {}",
                sample.occurrences, sample.task, sample.reason
            );
        }
        if report.unsampled_failures > 0 {
            let _ = writeln!(
                out,
                "  ... {} more failures with other reasons",
                report.unsampled_failures
            );
        }
    }

    out
}

fn task_row(stats: &TaskStats) -> String {
    let row = format!(
        "{:<NAME_WIDTH$} {:>8} {:>8} {:>6.1}% {:>8.0} {:>8} {:>8} {:>8} {:>8} {:>8}",
        stats.name,
        stats.requests,
        stats.failures,
        stats.failure_ratio * 100.0,
        stats.latency.avg_ms,
        stats.latency.min_ms,
        stats.latency.max_ms,
        stats.latency.p50_ms,
        stats.latency.p95_ms,
        stats.latency.p99_ms,
    );
    if stats.failures > 0 {
        row.red().to_string()
    } else {
        row
    }
}

/// Timeline of the profile sampled every `step`, ending with the terminal tick
pub fn render_timeline(shape: &LoadShape, step: Duration) -> String {
    let step = step.max(Duration::from_secs(1));
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!("{:>8} {:>8} {:>10}", "t (s)", "users", "rate/s").bold()
    );

    let mut t = Duration::ZERO;
    loop {
        match shape.tick(t) {
            Some(target) => {
                let _ = writeln!(
                    out,
                    "{:>8} {:>8} {:>10}",
                    t.as_secs(),
                    target.users,
                    target.spawn_rate
                );
            }
            None => {
                let _ = writeln!(out, "{:>8} {:>8}", t.as_secs(), "stop");
                break;
            }
        }
        t = if t + step >= shape.total_duration() && t < shape.total_duration() {
            shape.total_duration()
        } else {
            t + step
        };
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} stages, peak {} users, ends after {}s",
        shape.stages().len(),
        shape.peak_users(),
        shape.total_duration().as_secs()
    );
    out
}
