use async_trait::async_trait;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::cli::OutputFormat;
use crate::error::ClientError;
use crate::gate::{AutoAnswer, BatchOutcome, Prompt, Prompter};
use crate::mutation::failure_message;
use crate::resource::{ResourceRecord, ResourceSpec};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(response), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                response.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Records as a table (text) or array (JSON). Relation names are resolved
/// against `auxiliary`.
pub fn output_records(
    output_format: &OutputFormat,
    spec: &ResourceSpec,
    records: &[&ResourceRecord],
    auxiliary: &[ResourceRecord],
) -> anyhow::Result<()> {
    if records.is_empty() {
        return output_empty_collection(output_format, spec.name, &format!("No {} found", spec.name));
    }

    match output_format {
        OutputFormat::Json => {
            let items: Vec<Value> = records
                .iter()
                .map(|record| {
                    let mut value = (*record).clone().into_value();
                    if let (Some(name), Some(obj)) = (spec.relation_name(record, auxiliary), value.as_object_mut()) {
                        obj.insert("display_relation".to_string(), json!(name));
                    }
                    value
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json!({ spec.name: items }))?);
        }
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = records
                .iter()
                .map(|record| {
                    spec.columns
                        .iter()
                        .map(|column| spec.cell(column, record, auxiliary))
                        .collect()
                })
                .collect();
            let headers: Vec<String> = spec.columns.iter().map(|c| c.header().to_string()).collect();
            print!("{}", render_table(&headers, &rows));
        }
    }
    Ok(())
}

/// One record, every field on its own line in text mode
pub fn output_record(output_format: &OutputFormat, record: &ResourceRecord) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        OutputFormat::Text => {
            let width = record.fields().keys().map(|k| k.len()).max().unwrap_or(0);
            for (key, value) in record.fields() {
                let text = match value {
                    Value::Object(_) | Value::Array(_) => value.to_string(),
                    _ => record.text(key),
                };
                println!("{:width$}  {}", key, text, width = width);
            }
        }
    }
    Ok(())
}

pub fn output_batch(output_format: &OutputFormat, outcome: &BatchOutcome) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let failed: Vec<Value> = outcome
                .failed
                .iter()
                .map(|f| json!({"id": f.id.to_value(), "message": f.message}))
                .collect();
            let succeeded: Vec<Value> = outcome.succeeded.iter().map(|id| id.to_value()).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": outcome.failed.is_empty(),
                    "message": outcome.summary(),
                    "succeeded": succeeded,
                    "failed": failed
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", outcome.summary());
            for failure in &outcome.failed {
                println!("  {}: {}", failure.id, failure.message);
            }
        }
    }
    Ok(())
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers));
    out.push('\n');
    for row in rows {
        out.push_str(&line(&row[..]));
        out.push('\n');
    }
    out
}

/// Parse `field=value` pairs from repeated `--set` flags
pub fn parse_assignments(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((field, value)) if !field.trim().is_empty() => {
                Ok((field.trim().to_string(), value.to_string()))
            }
            _ => Err(anyhow::anyhow!("Invalid assignment '{}', expected FIELD=VALUE", pair)),
        })
        .collect()
}

/// Report a library error, then hand it back as an `anyhow::Error` carrying
/// the user-facing message.
pub fn report(output_format: &OutputFormat, spec: &ResourceSpec, err: ClientError) -> anyhow::Error {
    let message = failure_message(&err, spec.error_style);
    if *output_format == OutputFormat::Json {
        if let Err(e) = output_error(output_format, &message, Some(err.error_code())) {
            tracing::warn!(error = %e, "Failed to write JSON error");
        }
    }
    anyhow::anyhow!(message)
}

/// Asks on the terminal; anything but an explicit yes is a no.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn confirm(&self, prompt: &Prompt) -> bool {
        let prompt = prompt.clone();
        tokio::task::spawn_blocking(move || ask(&prompt))
            .await
            .unwrap_or(false)
    }
}

fn ask(prompt: &Prompt) -> bool {
    eprintln!("{}", prompt.title);
    eprintln!("{}", prompt.consequence);
    eprint!("{}? [y/N]: ", prompt.confirm_label);
    let _ = io::stderr().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    is_yes(&answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
}

/// `--yes` answers every prompt; otherwise ask on the terminal
pub fn prompter(yes: bool) -> Box<dyn Prompter> {
    if yes {
        Box::new(AutoAnswer(true))
    } else {
        Box::new(TerminalPrompter)
    }
}

/// Read one line from stdin (password entry)
pub async fn read_line(label: &str) -> anyhow::Result<String> {
    let label = label.to_string();
    tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
        eprint!("{}: ", label);
        io::stderr().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_split_on_first_equals() {
        let parsed = parse_assignments(&["precio=19.99".into(), "descripcion=a=b".into(), "stock=".into()]).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("precio".to_string(), "19.99".to_string()),
                ("descripcion".to_string(), "a=b".to_string()),
                ("stock".to_string(), String::new()),
            ]
        );
        assert!(parse_assignments(&["precio".into()]).is_err());
        assert!(parse_assignments(&["=5".into()]).is_err());
    }

    #[test]
    fn table_pads_columns() {
        let headers = vec!["ID".to_string(), "NAME".to_string()];
        let rows = vec![
            vec!["1".to_string(), "Silla".to_string()],
            vec!["10".to_string(), "Mesa".to_string()],
        ];
        assert_eq!(render_table(&headers, &rows), "ID  NAME\n1   Silla\n10  Mesa\n");
    }

    #[test]
    fn report_carries_the_extracted_message() {
        use crate::resource::catalog::EMPLOYEES;

        let err = ClientError::Rejected {
            status: 400,
            body: json!({"username": ["Ya existe un usuario con este nombre."]}),
        };
        let reported = report(&OutputFormat::Json, &EMPLOYEES, err);
        assert_eq!(reported.to_string(), "Ya existe un usuario con este nombre.");
    }

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" Sí "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }
}
