#![deny(missing_docs)]

//! Command-line front end for the prediction dashboard backend.

use std::path::PathBuf;

use depdash::api::{ApiError, PredictionClient, PredictionService};
use depdash::config::{self, DashboardConfig};
use depdash::features::{FeatureCatalog, FeatureKind, RawFormValue, form_from_json};
use depdash::logging;
use depdash::report::{MatrixLayout, format_percent, ranked_importance};
use depdash::session::{PredictionSession, SessionError};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

enum Command {
    Models,
    Model {
        id: String,
        layout: Option<MatrixLayout>,
    },
    Features {
        id: String,
    },
    Predict {
        id: String,
        fields: Vec<(String, RawFormValue)>,
        form_path: Option<PathBuf>,
        strict: bool,
    },
}

fn run() -> Result<(), String> {
    let cmd = parse_args(std::env::args().skip(1).collect())?;
    let config = config::load_or_default().map_err(|err| err.to_string())?;
    if let Err(err) = logging::init(&config.logging) {
        eprintln!("Logging disabled: {err}");
    }
    match cmd {
        Command::Models => list_models(&config),
        Command::Model { id, layout } => show_model(&config, &id, layout),
        Command::Features { id } => show_features(&id),
        Command::Predict {
            id,
            fields,
            form_path,
            strict,
        } => predict(&config, &id, fields, form_path, strict),
    }
}

fn connect(config: &DashboardConfig) -> Result<PredictionClient, String> {
    PredictionClient::new(&config.api).map_err(|err| err.to_string())
}

fn list_models(config: &DashboardConfig) -> Result<(), String> {
    let client = connect(config)?;
    let models = client.list_models().map_err(describe_api_error)?;
    println!("Backend: {}", client.base_url());
    if models.is_empty() {
        println!("No models available.");
        return Ok(());
    }
    for model in models {
        println!(
            "- {} | {} | {} accuracy",
            model.id,
            model.name,
            format_percent(model.accuracy)
        );
    }
    Ok(())
}

fn show_model(
    config: &DashboardConfig,
    id: &str,
    layout: Option<MatrixLayout>,
) -> Result<(), String> {
    let client = connect(config)?;
    let details = client.model_details(id).map_err(describe_api_error)?;
    let layout = layout.unwrap_or(config.report.confusion_layout);
    println!("Model: {id}");
    println!("Accuracy:  {:.2}", details.accuracy);
    println!("Precision: {:.2}", details.precision);
    println!("Recall:    {:.2}", details.recall);
    println!("F1 Score:  {:.2}", details.f1);

    let matrix = details.confusion(layout);
    println!();
    println!("Confusion matrix ({} samples):", matrix.total());
    for (caption, count) in matrix.cells() {
        println!("  {caption:<15} {count:>6} ({:.1}%)", matrix.share(count));
    }

    println!();
    match &details.feature_importance {
        Some(values) if !values.is_empty() => {
            let catalog = FeatureCatalog::load_or_builtin().map_err(|err| err.to_string())?;
            let names: Vec<&str> = catalog
                .get(id)
                .map(|specs| specs.iter().map(|spec| spec.display_label()).collect())
                .unwrap_or_default();
            println!("Feature importance:");
            for entry in ranked_importance(values, &names) {
                println!("  {:<40} {:+.4}", entry.label, entry.weight);
            }
        }
        _ => println!("Feature importance: not reported"),
    }
    Ok(())
}

fn show_features(id: &str) -> Result<(), String> {
    let catalog = FeatureCatalog::load_or_builtin().map_err(|err| err.to_string())?;
    let specs = catalog
        .get(id)
        .ok_or_else(|| unknown_model_message(id, &catalog))?;
    println!("Features for {id}:");
    for spec in specs {
        match &spec.kind {
            FeatureKind::NumericRange { min, max } => {
                println!("- {} ({}): number in [{min}, {max}]", spec.name, spec.display_label());
            }
            FeatureKind::Categorical { options } => {
                let choices = options
                    .iter()
                    .map(|option| format!("{}={}", option.label, option.code))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("- {} ({}): one of {choices}", spec.name, spec.display_label());
            }
        }
    }
    Ok(())
}

fn predict(
    config: &DashboardConfig,
    id: &str,
    fields: Vec<(String, RawFormValue)>,
    form_path: Option<PathBuf>,
    strict: bool,
) -> Result<(), String> {
    let catalog = FeatureCatalog::load_or_builtin().map_err(|err| err.to_string())?;
    let specs = catalog
        .get(id)
        .ok_or_else(|| unknown_model_message(id, &catalog))?;

    let mut session = PredictionSession::new(id)
        .with_strict(strict || config.normalization.reject_invalid_input);
    if let Some(path) = form_path {
        let text = std::fs::read_to_string(&path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        let document: serde_json::Value = serde_json::from_str(&text)
            .map_err(|err| format!("Invalid form JSON in {}: {err}", path.display()))?;
        let form = form_from_json(&document)
            .ok_or_else(|| format!("Form file {} must hold a JSON object", path.display()))?;
        for (name, value) in form {
            session.set_field(name, value);
        }
    }
    for (name, value) in fields {
        session.set_field(name, value);
    }
    let missing = session.missing_fields(specs);
    if !missing.is_empty() {
        tracing::warn!("Using defaults for unset fields: {}", missing.join(", "));
    }

    let client = connect(config)?;
    let result = session.run(&client, specs).map_err(|err| match err {
        SessionError::Api(api) => describe_api_error(api),
        other => other.to_string(),
    })?;
    println!("Depression probability: {}", format_percent(result.probability));
    println!("Risk band: {}", result.risk_band());
    println!("Prediction: {}", result.prediction);
    Ok(())
}

fn describe_api_error(error: ApiError) -> String {
    match error {
        ApiError::NotFound { resource } => format!("Not found: {resource}"),
        ApiError::InvalidNumericInput { .. } => {
            "Type error in model prediction: please ensure all inputs are valid numbers."
                .to_string()
        }
        other => format!("Request failed: {other}"),
    }
}

fn unknown_model_message(id: &str, catalog: &FeatureCatalog) -> String {
    let known = catalog.model_ids().collect::<Vec<_>>().join(", ");
    format!("No feature definitions for model {id} (known: {known})")
}

fn parse_args(args: Vec<String>) -> Result<Command, String> {
    let mut idx = 0usize;
    let command = args.get(idx).map(|s| s.as_str()).unwrap_or("");
    idx += 1;

    match command {
        "models" => Ok(Command::Models),
        "model" => {
            let id = required_id(&args, &mut idx)?;
            let mut layout = None;
            while idx < args.len() {
                match args[idx].as_str() {
                    "--layout" => {
                        idx += 1;
                        let value = args
                            .get(idx)
                            .ok_or_else(|| "--layout requires a value".to_string())?;
                        layout = Some(value.parse::<MatrixLayout>()?);
                    }
                    unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
                }
                idx += 1;
            }
            Ok(Command::Model { id, layout })
        }
        "features" => {
            let id = required_id(&args, &mut idx)?;
            Ok(Command::Features { id })
        }
        "predict" => {
            let id = required_id(&args, &mut idx)?;
            let mut fields = Vec::new();
            let mut form_path = None;
            let mut strict = false;
            while idx < args.len() {
                match args[idx].as_str() {
                    "--set" => {
                        idx += 1;
                        let value = args
                            .get(idx)
                            .ok_or_else(|| "--set requires <name>=<value>".to_string())?;
                        let (name, raw) = value
                            .split_once('=')
                            .ok_or_else(|| format!("Invalid --set value (expected name=value): {value}"))?;
                        fields.push((name.trim().to_string(), RawFormValue::parse_cli(raw)));
                    }
                    "--form" => {
                        idx += 1;
                        let value = args
                            .get(idx)
                            .ok_or_else(|| "--form requires a value".to_string())?;
                        form_path = Some(PathBuf::from(value));
                    }
                    "--strict" => strict = true,
                    unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
                }
                idx += 1;
            }
            Ok(Command::Predict {
                id,
                fields,
                form_path,
                strict,
            })
        }
        _ => Err(help_text()),
    }
}

fn required_id(args: &[String], idx: &mut usize) -> Result<String, String> {
    let id = args
        .get(*idx)
        .filter(|value| !value.starts_with("--") && !value.trim().is_empty())
        .ok_or_else(|| format!("Missing model id\n\n{}", help_text()))?;
    *idx += 1;
    Ok(id.clone())
}

fn help_text() -> String {
    [
        "depdash",
        "",
        "Usage:",
        "  depdash models",
        "  depdash model <id> [--layout tpfpfntn|sklearn]",
        "  depdash features <id>",
        "  depdash predict <id> [--set <name>=<value>]... [--form <file.json>] [--strict]",
        "",
        "Environment:",
        "  DEPDASH_API_BASE_URL  backend base URL (overrides config.toml)",
        "  DEPDASH_CONFIG_HOME   base directory for .depdash",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_predict_with_fields() {
        let cmd = parse_args(args(&[
            "predict",
            "RandomForest",
            "--set",
            "Gender=Female",
            "--set",
            "CGPA = 3.5",
            "--strict",
        ]))
        .unwrap();
        let Command::Predict {
            id, fields, strict, ..
        } = cmd
        else {
            panic!("expected predict command");
        };
        assert_eq!(id, "RandomForest");
        assert!(strict);
        assert_eq!(fields[0], ("Gender".to_string(), RawFormValue::Text("Female".into())));
        assert_eq!(fields[1], ("CGPA".to_string(), RawFormValue::Text(" 3.5".into())));
    }

    #[test]
    fn model_requires_id_and_known_layout() {
        assert!(parse_args(args(&["model"])).is_err());
        assert!(parse_args(args(&["model", "1", "--layout", "diagonal"])).is_err());
        let Command::Model { layout, .. } =
            parse_args(args(&["model", "1", "--layout", "sklearn"])).unwrap()
        else {
            panic!("expected model command");
        };
        assert_eq!(layout, Some(MatrixLayout::Sklearn));
    }

    #[test]
    fn unknown_command_prints_help() {
        let err = parse_args(args(&["train"])).err().unwrap();
        assert!(err.starts_with("depdash"));
    }
}
