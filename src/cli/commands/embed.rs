// Embed draft commands. These run entirely offline.

use anyhow::{bail, Context as _};
use serde::de::DeserializeOwned;
use std::path::Path;

use super::Error;
use crate::core::embed::{EmbedDraft, EmbedValidator, ValidationErrors};

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Load and validate a draft. Local image paths are taken relative to the
/// draft file.
pub async fn load_draft(path: &Path) -> Result<EmbedDraft, Error> {
    let value: serde_json::Value = read_json(path).await?;
    let mut draft = EmbedValidator::validate_json(&value)?;
    if let Some(dir) = path.parent() {
        draft.rebase_local_files(dir);
    }
    Ok(draft)
}

pub fn print_errors(errors: &ValidationErrors) {
    for error in errors.errors() {
        println!("  {}: {}", error.path, error.message);
    }
}

pub async fn validate(path: &Path) -> Result<(), Error> {
    let value: serde_json::Value = read_json(path).await?;
    match EmbedValidator::validate_json(&value) {
        Ok(draft) => {
            let pending = draft.pending_uploads().len();
            println!("✅ {} is valid", path.display());
            if pending > 0 {
                println!("   {} image(s) still need uploading", pending);
            }
            Ok(())
        }
        Err(errors) => {
            println!("❌ {} has {} problem(s):", path.display(), errors.errors().len());
            print_errors(&errors);
            bail!("validation failed");
        }
    }
}

pub async fn preview(path: &Path) -> Result<(), Error> {
    let draft = load_draft(path).await?;
    let embed = draft.into_embed()?;
    println!("{}", serde_json::to_string_pretty(&embed)?);
    Ok(())
}
