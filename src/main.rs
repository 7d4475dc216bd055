// src/main.rs
// =============================================================================
// Entry point of the CLI.
//
// What happens here:
// 1. Set up logging (RUST_LOG, default `link_liveness=info`, on stderr)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the subcommand handler
// 4. Print results and exit (0 = all good, 1 = findings, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{CheckOptions, Cli, Commands};
use link_liveness::{
    extract_markdown_links, Diagnostic, DiagnosticKind, Document, ProbeResult, ProfileRegistry,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "link_liveness=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { files, json, options } => handle_check(&files, json, &options).await,
        Commands::Probe { uri, json, options } => handle_probe(&uri, json, &options).await,
    }
}

async fn handle_check(files: &[PathBuf], json: bool, options: &CheckOptions) -> Result<i32> {
    let config = options.to_config().context("invalid options")?;

    // One registry for the whole run: every file shares the profile, so a
    // link repeated across files is probed once
    let registry = ProfileRegistry::new();
    let profile = registry
        .get_or_create(&config)
        .context("failed to set up link checking")?;

    let mut findings: Vec<(String, Diagnostic)> = Vec::new();

    for file in files {
        let text = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("failed to read {}", file.display()))?;

        let items = extract_markdown_links(&text);
        tracing::info!(file = %file.display(), links = items.len(), "checking");

        let document = Document::new(Some(document_location(file)), items);
        let mut diagnostics = profile.check_document(document).await;
        diagnostics.sort_by_key(|d| d.span);

        let name = file.display().to_string();
        findings.extend(diagnostics.into_iter().map(|d| (name.clone(), d)));
    }

    print_findings(&findings, json)?;

    Ok(if findings.is_empty() { 0 } else { 1 })
}

async fn handle_probe(uri: &str, json: bool, options: &CheckOptions) -> Result<i32> {
    let config = options.to_config().context("invalid options")?;
    let registry = ProfileRegistry::new();
    let profile = registry
        .get_or_create(&config)
        .context("failed to set up link checking")?;

    let result = profile.probe_remote(uri).await;
    print_probe(uri, &result, json)?;

    Ok(if result.ok && !result.redirected { 0 } else { 1 })
}

// Absolute where possible so relative links resolve the same from any cwd
fn document_location(file: &Path) -> String {
    std::fs::canonicalize(file)
        .unwrap_or_else(|_| file.to_path_buf())
        .display()
        .to_string()
}

fn print_findings(findings: &[(String, Diagnostic)], json: bool) -> Result<()> {
    if json {
        let entries: Vec<_> = findings
            .iter()
            .map(|(file, diagnostic)| serde_json::json!({ "file": file, "diagnostic": diagnostic }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if findings.is_empty() {
        println!("✅ No dead or moved links found");
        return Ok(());
    }

    println!("{:<40} {:<11} {}", "LOCATION", "KIND", "MESSAGE");
    println!("{}", "=".repeat(105));

    for (file, diagnostic) in findings {
        let location = format!("{}:{}:{}", file, diagnostic.span.line, diagnostic.span.column);
        println!(
            "{:<40} {:<11} {}",
            truncate(&location, 40),
            format_kind(diagnostic.kind),
            diagnostic.message
        );
        if let Some(fix) = &diagnostic.fix {
            println!("{:<40} {:<11} ↳ replace with {}", "", "", fix.replacement);
        }
    }

    println!();

    let count = |kind: DiagnosticKind| findings.iter().filter(|(_, d)| d.kind == kind).count();
    println!("📊 Summary:");
    println!("   ❌ Dead: {}", count(DiagnosticKind::DeadLink));
    println!("   🔀 Moved: {}", count(DiagnosticKind::ObsoleteLink));
    println!("   ❓ Unresolvable: {}", count(DiagnosticKind::UnresolvableRelative));

    Ok(())
}

fn print_probe(uri: &str, result: &ProbeResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let status = match (result.ok, result.redirected) {
        (true, false) => "✅ OK",
        (true, true) => "🔀 REDIRECT",
        (false, _) => "❌ DEAD",
    };
    println!("{} {} ({})", status, uri, result.message);
    if let Some(to) = &result.redirect_to {
        println!("   → {}", to);
    }
    Ok(())
}

fn format_kind(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::DeadLink => "DEAD",
        DiagnosticKind::ObsoleteLink => "MOVED",
        DiagnosticKind::UnresolvableRelative => "UNRESOLVED",
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
