// CLI commands for the welcome module.
//
// Same pattern as every command file:
// 1. Read the operator's input (files, flags)
// 2. Call the core service
// 3. Print the result

use anyhow::{bail, Context as _};
use std::path::Path;

use super::embed::{load_draft, print_errors, read_json};
use super::{Data, Error};
use crate::core::welcome::{
    ImageUpload, JoinMessageDraft, WelcomeApi, WelcomeError, WelcomeUpdate,
};

/// Print the module exactly as the backend sent it, pretty-printed when it
/// is JSON.
pub async fn fetch(data: &Data) -> Result<(), Error> {
    let response = data.welcome.api().fetch_module_data().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        bail!("Welcome API returned {}: {}", status, body);
    }

    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", body),
    }
    Ok(())
}

pub async fn save(data: &Data, path: &Path) -> Result<(), Error> {
    let update: WelcomeUpdate = read_json(path).await?;
    data.welcome.api().save_module(&update).await?;
    println!("✅ Saved welcome module for guild {}", data.guild.get());
    Ok(())
}

pub async fn set_enabled(data: &Data, enabled: bool) -> Result<(), Error> {
    data.welcome.set_enabled(enabled).await?;
    println!(
        "✅ Welcome module {} for guild {}",
        if enabled { "enabled" } else { "disabled" },
        data.guild.get()
    );
    Ok(())
}

pub async fn upload(data: &Data, images: &[ImageUpload]) -> Result<(), Error> {
    let uploaded = data.welcome.api().upload_images(images).await?;
    println!("{}", serde_json::to_string_pretty(&uploaded)?);
    Ok(())
}

pub async fn export_join(data: &Data) -> Result<(), Error> {
    let module = data.welcome.load().await?;
    let draft = match &module.join {
        Some(join) => join
            .embed_draft()
            .context("Stored join embed has an unexpected shape")?,
        None => None,
    };
    match draft {
        Some(draft) => println!("{}", serde_json::to_string_pretty(&draft)?),
        None => println!("No join embed is configured for guild {}", module.guild_id),
    }
    Ok(())
}

pub async fn publish_join(
    data: &Data,
    path: &Path,
    channel_id: Option<String>,
    content: Option<String>,
    enabled: Option<bool>,
) -> Result<(), Error> {
    let embed = load_draft(path).await?;
    let draft = JoinMessageDraft {
        enabled,
        channel_id,
        content,
        embed,
    };

    match data.welcome.publish_join_message(draft).await {
        Ok(update) => {
            let channel = update
                .join
                .and_then(|join| join.channel_id)
                .unwrap_or_else(|| "(unset)".to_string());
            println!(
                "✅ Join message saved for guild {} (channel {})",
                data.guild.get(),
                channel
            );
            Ok(())
        }
        Err(WelcomeError::Validation(errors)) => {
            println!("❌ Embed has {} problem(s):", errors.errors().len());
            print_errors(&errors);
            Err(WelcomeError::Validation(errors).into())
        }
        Err(e) => Err(e.into()),
    }
}
