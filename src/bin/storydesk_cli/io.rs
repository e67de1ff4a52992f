#![deny(clippy::all, clippy::pedantic)]

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::args::{PasswordArgs, PayloadArgs};
use crate::client::CliError;

pub fn read_value(val: Option<String>, file: Option<PathBuf>) -> Result<String, CliError> {
    if let Some(path) = file {
        let data = fs::read_to_string(&path).map_err(|source| CliError::InputFile {
            path: path.display().to_string(),
            source,
        })?;
        Ok(data)
    } else if let Some(v) = val {
        Ok(v)
    } else {
        Err(CliError::InvalidInput("value required".into()))
    }
}

/// Read a JSON record from `--data-file` or `--data`.
pub fn read_json<T: DeserializeOwned>(payload: PayloadArgs) -> Result<T, CliError> {
    let raw = read_value(payload.data, payload.data_file)?;
    serde_json::from_str(&raw).map_err(|e| CliError::InvalidInput(format!("invalid JSON: {e}")))
}

pub fn read_password(args: PasswordArgs) -> Result<String, CliError> {
    let password = match args.password_file {
        Some(path) => fs::read_to_string(&path)
            .map_err(|source| CliError::InputFile {
                path: path.display().to_string(),
                source,
            })?
            .trim_end_matches(['\r', '\n'])
            .to_string(),
        None => args.password_env.ok_or(CliError::MissingPassword)?,
    };
    if password.is_empty() {
        return Err(CliError::MissingPassword);
    }
    Ok(password)
}

/// Overlay the top-level fields of `patch` onto `current`.
pub fn merge_fields<T: Serialize + DeserializeOwned>(
    current: &T,
    patch: Value,
) -> Result<T, CliError> {
    let Value::Object(patch) = patch else {
        return Err(CliError::InvalidInput("update payload must be a JSON object".into()));
    };
    let mut merged = to_value(current)?;
    if let Value::Object(fields) = &mut merged {
        fields.extend(patch);
    }
    serde_json::from_value(merged).map_err(|e| CliError::InvalidInput(e.to_string()))
}

pub fn to_value<T: Serialize>(value: T) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(|e| CliError::InvalidInput(e.to_string()))
}
