//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::corpus;
use crate::index::{SimilarityMetric, VectorIndex};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    message: String,
    hint: Option<String>,
}

#[derive(Debug, PartialEq)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Daun Doctor");
    println!();
    println!("Checking configuration and data...\n");

    let checks = vec![
        check_api_key(),
        check_corpus(settings),
        check_snapshot(settings),
    ];

    for check in &checks {
        check.print();
    }
    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!("{} check(s) failed", errors));
    } else if warnings > 0 {
        Output::warning(&format!("{} warning(s)", warnings));
    } else {
        Output::success("Everything looks good!");
    }

    Ok(())
}

fn check_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => CheckResult::ok("OPENAI_API_KEY", "configured"),
        _ => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "export OPENAI_API_KEY='sk-...' (required for embeddings and generation)",
        ),
    }
}

fn check_corpus(settings: &Settings) -> CheckResult {
    let dir = settings.corpus_dir();
    if !dir.is_dir() {
        return CheckResult::warning(
            "Corpus directory",
            &format!("{} does not exist", dir.display()),
            "Create it and add PDF journals before running 'daun index'",
        );
    }

    let supported = std::fs::read_dir(&dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && corpus::is_supported(p))
                .count()
        })
        .unwrap_or(0);

    if supported == 0 {
        CheckResult::warning(
            "Corpus directory",
            &format!("{} contains no supported documents", dir.display()),
            "Add .pdf, .txt, or .md files before running 'daun index'",
        )
    } else {
        CheckResult::ok(
            "Corpus directory",
            &format!("{} ({} documents)", dir.display(), supported),
        )
    }
}

fn check_snapshot(settings: &Settings) -> CheckResult {
    let path = settings.snapshot_path();
    if !path.is_file() {
        return CheckResult::warning(
            "Index snapshot",
            &format!("{} not found", path.display()),
            "Run 'daun index' to build it",
        );
    }

    let metric: SimilarityMetric = match settings.index.metric.parse() {
        Ok(m) => m,
        Err(e) => {
            return CheckResult::error("Index snapshot", &e, "Fix [index] metric in the config")
        }
    };

    match VectorIndex::load(&path, settings.embedding.dimensions as usize, metric) {
        Ok(index) => CheckResult::ok(
            "Index snapshot",
            &format!("{} ({} passages)", path.display(), index.len()),
        ),
        Err(e) => CheckResult::error(
            "Index snapshot",
            &format!("{}", e),
            "Rebuild it with 'daun index'",
        ),
    }
}
