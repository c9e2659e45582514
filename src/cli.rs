//! Minimal CLI: check | eval
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::{Value as JsonValue, json};

use style_expr::locale::{BasicFormatterConfig, BasicNumberFormat};
use style_expr::{EvaluationContext, Expression, Type, parse_expression, path_de};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// parse and evaluate styling expressions such as ["number-format", ...]
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// parse an expression and print its type and canonical serialization
    Check(CheckOut),
    /// evaluate an expression once per feature-properties document
    Eval(EvalOut),
}

#[derive(Args, Debug, Clone)]
struct ExpressionSettings {
    /// expression as JSON text, e.g. '["number-format", 5, {}]'
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    expr: Option<String>,

    /// read the expression from a JSON file instead
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// required result type
    #[arg(long, value_enum)]
    expect: Option<ExpectedType>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ExpectedType {
    String,
    Number,
    Boolean,
    Value,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select the properties object in each document (e.g. /properties)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct FormatterSettings {
    /// locale used when an expression gives none (overrides --formatter-config)
    #[arg(long, env = "STYLE_EXPR_DEFAULT_LOCALE")]
    default_locale: Option<String>,

    /// JSON file holding the formatter configuration, e.g. {"default_locale": "de-DE"}
    #[arg(long)]
    formatter_config: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    expression: ExpressionSettings,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct EvalOut {
    #[command(flatten)]
    expression: ExpressionSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    formatter: FormatterSettings,

    /// output file, one JSON result per line (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl From<ExpectedType> for Type {
    fn from(t: ExpectedType) -> Self {
        match t {
            ExpectedType::String => Type::String,
            ExpectedType::Number => Type::Number,
            ExpectedType::Boolean => Type::Boolean,
            ExpectedType::Value => Type::Value,
        }
    }
}

impl ExpressionSettings {
    fn load(&self) -> Result<Expression> {
        let syntax: JsonValue = match (&self.expr, &self.file) {
            (Some(text), _) => path_de::from_str_with_path(text).context("failed to read expression")?,
            (None, Some(path)) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("failed to read expression file {}", path.display()))?;
                path_de::from_slice_with_path(&bytes)
                    .with_context(|| format!("failed to parse expression file {}", path.display()))?
            }
            (None, None) => bail!("no expression given"),
        };

        parse_expression(&syntax, self.expect.map(Type::from)).map_err(|errors| {
            for error in errors.iter() {
                let key = if error.key.is_empty() { "<root>" } else { error.key.as_str() };
                eprintln!("{} {} {}", "✗".red(), key.yellow(), error.message);
            }
            anyhow!("expression has {} error(s)", errors.len())
        })
    }
}

/// One evaluation input, or the reason the document produced none.
type Document = std::result::Result<JsonValue, String>;

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .map_err(|error| anyhow!("failed to resolve input file paths: {error}"))?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {}", source_path.display()))?;
            if self.ndjson {
                for (line_no, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let value = serde_json::from_str::<JsonValue>(line).with_context(|| {
                        format!("failed to parse {}:{}", source_path.display(), line_no + 1)
                    })?;
                    self.select(value, &source_path, &mut documents);
                }
            } else {
                let value = serde_json::from_str::<JsonValue>(&source)
                    .with_context(|| format!("failed to parse JSON source file {}", source_path.display()))?;
                self.select(value, &source_path, &mut documents);
            }
        }
        Ok(documents)
    }

    // A missing pointer target still yields a row, so output lines stay aligned with inputs.
    fn select(&self, value: JsonValue, source_path: &Path, out: &mut Vec<Document>) {
        match self.json_pointer.as_deref() {
            None => out.push(Ok(value)),
            Some(pointer) => match value.pointer(pointer) {
                Some(selected) => out.push(Ok(selected.clone())),
                None => {
                    log::warn!("{}: no value at JSON pointer {pointer}", source_path.display());
                    out.push(Err(format!("{}: no value at JSON pointer {pointer}", source_path.display())));
                }
            },
        }
    }
}

impl FormatterSettings {
    fn load(&self) -> Result<BasicFormatterConfig> {
        let mut config = match &self.formatter_config {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("failed to read formatter config {}", path.display()))?;
                path_de::from_slice_with_path::<BasicFormatterConfig>(&bytes)
                    .with_context(|| format!("invalid formatter config {}", path.display()))?
            }
            None => BasicFormatterConfig::default(),
        };
        if let Some(locale) = &self.default_locale {
            config.default_locale = locale.clone();
        }
        Ok(config)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Check(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let expression = target.expression.load()?;
                println!("{} {}", "type:".bold(), expression.ty());
                println!("{}", serde_json::to_string_pretty(&expression.serialize())?);
                Ok(())
            }
            Command::Eval(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let expression = target.expression.load()?;
                let config = target.formatter.load()?;
                log::info!("default locale {}", config.default_locale);
                let base = EvaluationContext::new(Arc::new(BasicNumberFormat::new(config)));

                let documents = target.input_settings.load_documents()?;
                log::info!("evaluating against {} document(s)", documents.len());

                let results: Vec<JsonValue> = documents
                    .par_iter()
                    .map(|document| match document {
                        Ok(properties) => {
                            let ctx = base.clone().with_json_properties(properties);
                            match expression.evaluate(&ctx) {
                                Ok(value) => value.to_json(),
                                Err(error) => json!({ "error": error.to_string() }),
                            }
                        }
                        Err(message) => json!({ "error": message }),
                    })
                    .collect();

                let mut out = String::new();
                for result in &results {
                    out.push_str(&serde_json::to_string(result)?);
                    out.push('\n');
                }

                if let Some(path) = target.out.as_ref() {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(path, &out)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                } else {
                    print!("{out}");
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                match entry {
                    Ok(p) => {
                        matched_any = true;
                        out.push(p);
                    }
                    Err(e) => return Err(Box::new(e)),
                }
            }
            if !matched_any {
                return Err(format!("glob pattern matched no files: {pattern}").into());
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
