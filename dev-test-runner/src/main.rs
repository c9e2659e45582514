//! Fixture-driven expression tests.
//!
//! Every `test.json` under the fixture root holds an expression, a list of
//! feature-property inputs and the expected compile result, outputs and
//! canonical serialization.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use style_expr::{EvaluationContext, parse_expression, path_de};

// Fixtures always run against the bundled engine with its default locale.
static BASE_CONTEXT: Lazy<EvaluationContext> = Lazy::new(EvaluationContext::default);

#[derive(Parser, Debug)]
struct Args {
    /// directory searched recursively for test.json files
    #[arg(long, default_value = "fixtures")]
    root: PathBuf,

    /// only run fixtures whose id (path relative to the root) matches this regex
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Fixture {
    expression: JsonValue,
    #[serde(default)]
    inputs: Vec<JsonValue>,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Expected {
    compiled: Compiled,
    #[serde(default)]
    outputs: Option<Vec<JsonValue>>,
    #[serde(default)]
    serialized: Option<JsonValue>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "lowercase")]
enum Compiled {
    Success {
        #[serde(rename = "type")]
        ty: String,
    },
    Error {
        errors: Vec<ExpectedError>,
    },
}

#[derive(Debug, Deserialize, PartialEq)]
struct ExpectedError {
    key: String,
    error: String,
}

fn collect_fixtures(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_fixtures(&path, out)?;
        } else if path.file_name().is_some_and(|n| n == "test.json") {
            out.push(path);
        }
    }
    Ok(())
}

fn fixture_id(root: &Path, file: &Path) -> String {
    let dir = file.parent().unwrap_or(file);
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Returns one message per mismatch; empty means the fixture passed.
fn run_fixture(fixture: &Fixture) -> Vec<String> {
    let mut failures = Vec::new();

    let compiled = parse_expression(&fixture.expression, None);
    let actual = match &compiled {
        Ok(expr) => Compiled::Success { ty: expr.ty().to_string() },
        Err(errors) => Compiled::Error {
            errors: errors
                .iter()
                .map(|e| ExpectedError { key: e.key.clone(), error: e.message.clone() })
                .collect(),
        },
    };
    if actual != fixture.expected.compiled {
        failures.push(format!("compiled: expected {:?}, got {actual:?}", fixture.expected.compiled));
    }
    let Ok(expr) = compiled else {
        return failures;
    };

    if let Some(expected) = &fixture.expected.outputs {
        let outputs: Vec<JsonValue> = fixture
            .inputs
            .iter()
            .map(|properties| {
                let ctx = BASE_CONTEXT.clone().with_json_properties(properties);
                match expr.evaluate(&ctx) {
                    Ok(value) => value.to_json(),
                    Err(error) => json!({ "error": error.to_string() }),
                }
            })
            .collect();
        if &outputs != expected {
            failures.push(format!("outputs: expected {}, got {}", json!(expected), json!(outputs)));
        }
    }

    if let Some(expected) = &fixture.expected.serialized {
        let serialized = expr.serialize();
        if &serialized != expected {
            failures.push(format!("serialized: expected {expected}, got {serialized}"));
        }
        match parse_expression(&serialized, None) {
            Ok(again) if again == expr => {}
            Ok(_) => failures.push("round trip produced a different tree".to_string()),
            Err(errors) => failures.push(format!("serialized form does not parse: {errors}")),
        }
    }

    failures
}

/// Runs every matching fixture, printing a line per fixture. Returns (passed, failed).
fn run_all(root: &Path, filter: Option<&Regex>) -> Result<(usize, usize)> {
    let mut files = Vec::new();
    collect_fixtures(root, &mut files)?;
    files.sort();

    let (mut passed, mut failed) = (0, 0);
    for file in files {
        let id = fixture_id(root, &file);
        if filter.is_some_and(|rx| !rx.is_match(&id)) {
            continue;
        }
        let source = std::fs::read_to_string(&file).with_context(|| format!("failed to read {}", file.display()))?;
        let fixture: Fixture = path_de::from_str_with_path(&source).with_context(|| format!("malformed fixture {id}"))?;

        let failures = run_fixture(&fixture);
        if failures.is_empty() {
            passed += 1;
            println!("{} {id}", "✓".green());
        } else {
            failed += 1;
            println!("{} {id}", "✗".red());
            for failure in failures {
                println!("    {failure}");
            }
        }
    }
    Ok((passed, failed))
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let filter = args.filter.as_deref().map(Regex::new).transpose().context("invalid --filter")?;

    let (passed, failed) = run_all(&args.root, filter.as_ref())?;
    println!("\n{passed} passed, {failed} failed");
    Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
