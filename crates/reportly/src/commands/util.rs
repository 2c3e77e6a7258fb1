//! Shared helpers for command handlers.

use std::io::IsTerminal;

use serde_json::Value;

use crate::cli::PayloadArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Read the JSON object given by `--data` or `--from-file`.
pub fn read_payload(payload: &PayloadArgs) -> Result<Value, CliError> {
    let raw = match (&payload.data, &payload.from_file) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => {
            return Err(CliError::Validation {
                field: "data".into(),
                reason: "pass --data or --from-file".into(),
            });
        }
    };
    let value: Value = serde_json::from_str(&raw)?;
    if !value.is_object() {
        return Err(CliError::Validation {
            field: "data".into(),
            reason: "expected a JSON object".into(),
        });
    }
    Ok(value)
}

/// Shallow-merge `patch` over `base`; both must be JSON objects.
pub fn merge_object(base: &mut Value, patch: Value) -> Result<(), CliError> {
    let (Some(base), Value::Object(patch)) = (base.as_object_mut(), patch) else {
        return Err(CliError::Validation {
            field: "data".into(),
            reason: "expected a JSON object".into(),
        });
    };
    for (key, value) in patch {
        base.insert(key, value);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;

    #[test]
    fn merge_overrides_and_adds_keys() {
        let mut base = json!({"id": 1, "name": "Area", "version": 3});
        merge_object(&mut base, json!({"name": "Surface"})).unwrap();
        assert_eq!(base, json!({"id": 1, "name": "Surface", "version": 3}));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let args = PayloadArgs {
            data: Some("[1, 2]".into()),
            from_file: None,
        };
        assert!(matches!(
            read_payload(&args),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn payload_reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("unit.json");
        std::fs::write(&path, r#"{"name": "Mass"}"#).unwrap();
        let args = PayloadArgs {
            data: None,
            from_file: Some(path),
        };
        assert_eq!(read_payload(&args).unwrap(), json!({"name": "Mass"}));
    }

    #[test]
    fn yes_flag_skips_prompt() {
        assert!(confirm("Delete?", "delete", true).unwrap());
    }
}
