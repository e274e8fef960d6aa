// ABOUTME: Server binary for the calorie API
// ABOUTME: Loads .env and environment configuration, sets up logging and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Calorie API Server Binary

use anyhow::Result;
use clap::Parser;
use calorie_api::{config::ServerConfig, logging, server};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "calorie-api-server")]
#[command(about = "Calorie API - dish calorie and macronutrient estimates from USDA FoodData Central")]
pub struct Args {
    /// Override bind address
    #[arg(long)]
    host: Option<String>,

    /// Override HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Missing .env is normal outside local development
    let dotenv = dotenvy::dotenv();

    logging::init_from_env()?;
    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => error!("Failed to read .env file: {}", e),
    }

    let mut config = ServerConfig::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.http_port = port;
    }

    info!("{}", config.summary());

    if let Err(e) = server::serve(config).await {
        error!("Server error: {:#}", e);
        return Err(e);
    }
    Ok(())
}
