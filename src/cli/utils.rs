use serde::Serialize;
use serde_json::{json, Value};
use std::io::{BufRead, Write};

use crate::cli::OutputFormat;
use crate::forms::FieldErrors;
use crate::notify::{Toast, ToastVariant};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
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
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
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

/// Output a collection, one line per item in text mode
pub fn output_list<T: Serialize>(
    output_format: &OutputFormat,
    collection_name: &str,
    items: &[T],
    empty_message: &str,
    line: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: items }))?);
        }
        OutputFormat::Text if items.is_empty() => {
            println!("{}", empty_message);
        }
        OutputFormat::Text => {
            for item in items {
                println!("{}", line(item));
            }
        }
    }
    Ok(())
}

/// Output a single record as key/value lines or JSON
pub fn output_record(output_format: &OutputFormat, name: &str, record: &impl Serialize) -> anyhow::Result<()> {
    let value = serde_json::to_value(record)?;
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ name: value }))?);
        }
        OutputFormat::Text => {
            if let Value::Object(fields) = value {
                for (key, field) in fields {
                    match field {
                        Value::Null => {}
                        Value::String(s) => println!("{:<24}{}", key, s),
                        other => println!("{:<24}{}", key, other),
                    }
                }
            } else {
                println!("{}", value);
            }
        }
    }
    Ok(())
}

/// Output inline validation errors
pub fn output_field_errors(output_format: &OutputFormat, errors: &FieldErrors) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": "Validation failed",
                    "field_errors": errors
                }))?
            );
        }
        OutputFormat::Text => {
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field, message);
            }
        }
    }
    Ok(())
}

/// Render queued notifications
pub fn output_toasts(output_format: &OutputFormat, toasts: &[Toast]) -> anyhow::Result<()> {
    if toasts.is_empty() {
        return Ok(());
    }
    match output_format {
        OutputFormat::Json => {
            eprintln!("{}", serde_json::to_string(&json!({ "notifications": toasts }))?);
        }
        OutputFormat::Text => {
            for toast in toasts {
                let marker = match toast.variant {
                    ToastVariant::Success => "✓",
                    ToastVariant::Info => "i",
                    ToastVariant::Destructive => "!",
                };
                match &toast.description {
                    Some(description) => eprintln!("[{}] {}: {}", marker, toast.title, description),
                    None => eprintln!("[{}] {}", marker, toast.title),
                }
            }
        }
    }
    Ok(())
}

/// Read one line from stdin after printing `label`
pub fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Split a shell line into arguments, honouring single and double quotes
pub fn split_args(line: &str) -> anyhow::Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                in_arg = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if quote.is_some() {
        return Err(anyhow::anyhow!("Unterminated quote"));
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}
