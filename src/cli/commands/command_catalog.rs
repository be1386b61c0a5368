// CLI commands module.
// Each feature gets its own command file; this one holds the argument
// definitions and dispatch.

pub mod embed;

pub mod navigation;

pub mod welcome;

use crate::core::guild::ActiveGuild;
use crate::core::welcome::{ImageUpload, WelcomeService};
use crate::infra::welcome::WelcomeApiClient;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub type Error = anyhow::Error;

/// Everything a command can reach.
pub struct Data {
    pub guild: ActiveGuild,
    pub welcome: WelcomeService<WelcomeApiClient>,
}

/// Administer the welcome module of a guild.
#[derive(Debug, Parser)]
#[command(name = "welcome_admin", version)]
pub struct Cli {
    /// Guild to operate on (defaults to DEFAULT_GUILD_ID)
    #[arg(long, global = true)]
    pub guild: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the active guild id
    Guild,
    /// Print the welcome module configuration
    Fetch,
    /// Post a welcome update from a JSON file
    Save { file: PathBuf },
    /// Switch the welcome module on
    Enable,
    /// Switch the welcome module off
    Disable,
    /// Upload images, e.g. --image join.image=banner.png
    Upload {
        #[arg(long = "image", value_parser = parse_image_arg, required = true)]
        images: Vec<ImageUpload>,
    },
    /// Check an embed draft file for errors
    Validate { file: PathBuf },
    /// Show the wire embed a fully resolved draft turns into
    Preview { file: PathBuf },
    /// Print the stored join embed as an editable draft
    ExportJoin,
    /// Validate, upload and save a join message embed
    PublishJoin {
        file: PathBuf,
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Save the join message switched off
        #[arg(long)]
        disabled: bool,
    },
    /// Show the dashboard menu with the links active for a path
    Nav { path: String },
}

fn parse_image_arg(arg: &str) -> Result<ImageUpload, String> {
    let (slot, path) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected <slot>=<path>, got '{}'", arg))?;
    Ok(ImageUpload {
        slot: slot.parse()?,
        file: crate::core::embed::LocalFile::new(path),
    })
}

pub async fn run(command: Command, data: &Data) -> Result<(), Error> {
    match command {
        Command::Guild => {
            if data.guild.is_empty() {
                println!("(none)");
            } else {
                println!("{}", data.guild.get());
            }
            Ok(())
        }
        Command::Fetch => welcome::fetch(data).await,
        Command::Save { file } => welcome::save(data, &file).await,
        Command::Enable => welcome::set_enabled(data, true).await,
        Command::Disable => welcome::set_enabled(data, false).await,
        Command::Upload { images } => welcome::upload(data, &images).await,
        Command::Validate { file } => embed::validate(&file).await,
        Command::Preview { file } => embed::preview(&file).await,
        Command::ExportJoin => welcome::export_join(data).await,
        Command::PublishJoin {
            file,
            channel,
            content,
            disabled,
        } => welcome::publish_join(data, &file, channel, content, disabled.then_some(false)).await,
        Command::Nav { path } => {
            navigation::nav(&path);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::embed::ImageSlot;

    #[test]
    fn image_args_split_slot_and_path() {
        let upload = parse_image_arg("join.footer.image=assets/foot.png").unwrap();
        assert_eq!(upload.slot, ImageSlot::FooterImage);
        assert_eq!(upload.file.path, PathBuf::from("assets/foot.png"));

        assert!(parse_image_arg("banner.png").is_err());
        assert!(parse_image_arg("join.banner=banner.png").is_err());
    }

    #[test]
    fn guild_flag_works_after_the_subcommand() {
        let cli = Cli::try_parse_from(["welcome_admin", "fetch", "--guild", "123"]).unwrap();
        assert_eq!(cli.guild.as_deref(), Some("123"));
        assert!(matches!(cli.command, Command::Fetch));
    }

    #[test]
    fn upload_requires_at_least_one_image() {
        assert!(Cli::try_parse_from(["welcome_admin", "upload"]).is_err());

        let cli = Cli::try_parse_from([
            "welcome_admin",
            "upload",
            "--image",
            "join.image=a.png",
            "--image",
            "thumbnail=b.png",
        ])
        .unwrap();
        match cli.command {
            Command::Upload { images } => assert_eq!(images.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn publish_join_is_not_disabled_by_default() {
        let cli = Cli::try_parse_from([
            "welcome_admin",
            "publish-join",
            "join.json",
            "--channel",
            "555",
        ])
        .unwrap();
        match cli.command {
            Command::PublishJoin {
                channel, disabled, ..
            } => {
                assert_eq!(channel.as_deref(), Some("555"));
                assert!(!disabled);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
