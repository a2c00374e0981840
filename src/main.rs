#![allow(non_snake_case)]

mod cli;
mod clients;
mod config;
mod events;
mod handlers;
mod models;
mod runtime;
mod service;
mod tasks;

use std::env;

use crate::config::{AppConfig, Settings};

const DEFAULT_RUN_MODE: &str = "cli";

#[tokio::main]
async fn main() {
    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    };

    let settings = match Settings::from_config(&config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let run_mode = config.get_or("RUN_MODE", DEFAULT_RUN_MODE);
    if run_mode == "api" {
        if let Err(e) = runtime::run_api(settings).await {
            eprintln!("Bot error: {}", e);
            std::process::exit(1);
        }
    } else if run_mode == "cli" {
        cli::cli(settings).await;
    } else {
        println!("Invalid run mode {}", run_mode);
    }
}
