use airtable_debug::utils::error::{AirtableError, ErrorSeverity};
use airtable_debug::utils::logger;
use airtable_debug::{AirtableClient, AirtableSettings, CliConfig, DebugSession, TomlConfig};
use clap::Parser;

#[tokio::main]
async fn main() {
    // .env 需在解析參數前載入，讓 AIRTABLE_PAT 等環境變數生效
    dotenvy::dotenv().ok();
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting airtable-debug");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(&cli).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // Same shapes as probe output: API failures carry the raw body.
            match &e {
                AirtableError::ApiError { status, body } => println!("Error ({}): {}", status, body),
                other => println!("Exception: {}", other.user_friendly_message()),
            }
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: &CliConfig) -> airtable_debug::Result<String> {
    let file = match &cli.config {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            Some(TomlConfig::from_file(path)?)
        }
        None => None,
    };

    let settings = AirtableSettings::resolve(file, cli.overrides())?;
    tracing::debug!(
        "Using base {} at {} (token {})",
        settings.base_id,
        settings.api_url,
        settings.token
    );

    let command = cli.to_command(&settings)?;
    let client = AirtableClient::from_config(&settings)?;
    let session = DebugSession::new(client, settings.tables.clone());

    session.run(&command).await
}
