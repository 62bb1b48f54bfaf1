use std::{fs::File, io::Write, path::Path, process, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info};
use reelchain_common::{
    crypto::KeyPair,
    logger::{setup_logger, LoggerConfig},
};
use reelchain_client::{
    config::{Command, Config, KEY_ENV},
    context::ClientContext,
    error::ClientError,
    manifest::IdentityResolver,
    node_api::NodeAPI,
    operations::{self, ProfileDetails},
};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine, KEY may come from the environment
    dotenvy::dotenv().ok();

    let mut config: Config = Config::parse();
    if let Some(path) = config.config_file.as_ref() {
        if config.generate_config_template {
            if Path::new(path).exists() {
                eprintln!("Config file already exists at {}", path);
                return Ok(());
            }

            let mut file = File::create(path).context("Error while creating config file")?;
            let json = serde_json::to_string_pretty(&config)
                .context("Error while serializing config file")?;
            file.write_all(json.as_bytes())
                .context("Error while writing config file")?;
            println!("Config file template generated at {}", path);
            return Ok(());
        }

        let file = File::open(path).context("Error while opening config file")?;
        let loaded: Config =
            serde_json::from_reader(file).context("Error while reading config file")?;
        // Secrets and the command always come from the invocation
        config = Config {
            key: config.key.take(),
            command: config.command.take(),
            ..loaded
        };
    } else if config.generate_config_template {
        eprintln!("Provided config file path is required to generate the template with --config-file");
        process::exit(2);
    }

    let log_config = &config.log;
    setup_logger(LoggerConfig {
        level: log_config.log_level,
        file_level: log_config.file_log_level,
        dir_path: &log_config.logs_path,
        filename_log: &log_config.filename_log,
        disable_file_logging: log_config.disable_file_logging,
        disable_colors: log_config.disable_log_color,
        module_logs: &log_config.logs_modules,
        datetime_format: &log_config.datetime_format,
    })?;

    let Some(command) = config.command.take() else {
        error!("No command specified, use --help to list the available commands");
        process::exit(2);
    };

    if let Err(e) = run(config, command).await {
        error!("{:#}", e);
        process::exit(1);
    }

    Ok(())
}

fn build_context(config: Config) -> Result<ClientContext> {
    let key = config
        .key
        .as_deref()
        .ok_or_else(|| anyhow!("No signing key, set the {} environment variable", KEY_ENV))?;
    let keypair = KeyPair::from_base64(key).map_err(ClientError::InvalidKey)?;

    let rpc_address = config.network.rpc_address();
    info!("Using {} node at {}", config.network.network, rpc_address);
    let node = NodeAPI::with(rpc_address, config.network.rpc_client_config())
        .map_err(ClientError::remote)?;

    Ok(ClientContext::new(
        Arc::new(node),
        keypair,
        IdentityResolver::new(&config.network.manifest),
        config.settings(),
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Error while serializing result")?;
    println!("{}", json);
    Ok(())
}

async fn run(config: Config, command: Command) -> Result<()> {
    let ctx = build_context(config)?;

    match command {
        Command::CreateProfile { username, bio, pfp } => {
            let details = ProfileDetails { username, bio, pfp };
            print_json(&operations::create_profile(&ctx, &details).await?)
        }
        Command::CreateVideo { url, length } => {
            print_json(&operations::create_video(&ctx, &url, length).await?)
        }
        Command::Follow { profile } => print_json(&operations::follow(&ctx, profile).await?),
        Command::Unfollow { profile } => print_json(&operations::unfollow(&ctx, profile).await?),
        Command::LikeVideo { video_stats } => {
            print_json(&operations::like_video(&ctx, video_stats).await?)
        }
        Command::Tip { profile, amount } => {
            print_json(&operations::tip(&ctx, profile, &amount).await?)
        }
        Command::WithdrawTips => print_json(&operations::withdraw_tips(&ctx).await?),
        Command::ListProfiles => print_json(&operations::list_profiles(&ctx).await?),
        Command::ListVideos => print_json(&operations::list_videos(&ctx).await?),
        Command::Whoami => {
            println!("{}", ctx.address());
            Ok(())
        }
        Command::LocateProfile => print_json(&ctx.profile_capability().await?),
    }
}
