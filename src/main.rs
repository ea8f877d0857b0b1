//! stylecull - template-aware CSS selector analysis

use std::fs;
use std::process::ExitCode;

use clap::Parser;

use stylecull::css::Stylesheet;
use stylecull::{Config, Element, Result, StyleMapping, rule_matches};

#[derive(Parser)]
#[command(name = "stylecull")]
#[command(version, about = "Template-aware CSS selector analysis", long_about = None)]
#[command(after_help = "EXAMPLES:
    stylecull styles.css analysis.json           Report which rules can match
    stylecull styles.css analysis.json --plan    Emit per-element rewrite plans")]
struct Cli {
    /// CSS stylesheet to analyze
    #[arg(value_name = "STYLESHEET")]
    stylesheet: String,

    /// JSON array of analyzed elements
    #[arg(value_name = "ANALYSIS")]
    analysis: String,

    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Emit per-element rewrite plans instead of a match report
    #[arg(long)]
    plan: bool,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config: Config = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };

    let css = fs::read_to_string(&cli.stylesheet)?;
    let stylesheet = Stylesheet::parse(&css);
    let elements: Vec<Element> = serde_json::from_str(&fs::read_to_string(&cli.analysis)?)?;

    if !cli.quiet {
        eprintln!(
            "{} rules against {} elements",
            stylesheet.rules.len(),
            elements.len()
        );
    }

    if cli.plan {
        let mapping = StyleMapping::new(config);
        let plans: Vec<_> = elements
            .iter()
            .map(|e| mapping.rewrite_mapping(e))
            .collect();
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    let mut report = Vec::with_capacity(stylesheet.rules.len());
    for rule in &stylesheet.rules {
        let selectors: Vec<String> = rule.selectors.iter().map(|s| s.to_string()).collect();
        let mut matches = Vec::with_capacity(elements.len());
        for element in &elements {
            let result = rule_matches(&rule.selectors, element)?;
            matches.push(format!("{result:?}").to_lowercase());
        }
        let removable = matches.iter().all(|m| m == "no");
        report.push(serde_json::json!({
            "selectors": selectors,
            "matches": matches,
            "removable": removable,
        }));
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
