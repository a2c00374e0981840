use clap::{Parser, Subcommand};
use inquire::Text;
use std::fs;

use crate::config::Settings;
use crate::runtime;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One agent turn for a single prompt
    Ask { prompt: String },
    /// Interactive chat loop; type "exit" to quit
    Chat {},
    /// Generate Minutes of Meeting from a transcript file
    Mom {
        transcript_file: String,
        /// Comma-separated participant names; when set, the MoM is emailed
        #[arg(long)]
        send_to: Option<String>,
    },
}

pub async fn cli(settings: Settings) {
    // Fine to panic here
    let cli = Cli::parse();
    let services = match runtime::build_services(&settings) {
        Ok(services) => services,
        Err(e) => {
            println!("Failed to initialize services: {}", e);
            return;
        }
    };

    match &cli.command {
        Commands::Ask { prompt } => {
            let reply = services.agent.handle_user_message(prompt).await;
            println!("{}", reply);
        }
        Commands::Chat {} => {
            println!("Meeting Scheduler ready. Type 'exit' to quit.");
            loop {
                let input = match Text::new("You:").prompt() {
                    Ok(input) => input,
                    Err(_) => break,
                };
                if input.trim().eq_ignore_ascii_case("exit") {
                    break;
                }
                if input.trim().is_empty() {
                    continue;
                }
                let reply = services.agent.handle_user_message(&input).await;
                println!("Agent: {}\n", reply);
            }
        }
        Commands::Mom {
            transcript_file,
            send_to,
        } => {
            let transcript = match fs::read_to_string(transcript_file) {
                Ok(transcript) => transcript,
                Err(e) => {
                    println!("Failed to read {}: {}", transcript_file, e);
                    return;
                }
            };
            let result = match send_to {
                Some(names) => services
                    .mom
                    .send_mom(names, &transcript)
                    .await
                    .map(|delivery| {
                        format!(
                            "{}\n\nSent to: {}",
                            delivery.mom,
                            delivery.receipt.to.join(", ")
                        )
                    }),
                None => services.mom.generate_mom(&transcript).await,
            };
            match result {
                Ok(output) => println!("{}", output),
                Err(e) => println!("Failed to generate MoM: {}", e),
            }
        }
    }
}
