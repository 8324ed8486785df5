use clap::Parser;
use fcai_gpa::utils::error::{ErrorSeverity, GpaError};
use fcai_gpa::utils::{logger, validation::Validate};
use fcai_gpa::{
    load_policy, write_default_bylaw, AppConfig, CliConfig, FcaiClient, GpaEngine, GpaPipeline,
    LocalStorage, RunSummary,
};
use std::path::Path;

fn exit_code(e: &GpaError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(context: &str, e: GpaError) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(&e));
}

fn print_summary(summary: &RunSummary) {
    let gpa = &summary.gpa;
    println!("\nGPA Calculation Results:");
    println!("Total Points: {}", gpa.total_points);
    println!("Total Hours: {}", gpa.total_hours);
    println!("GPA: {:.2}", gpa.gpa);
    println!("General Grade: {}", gpa.standing);
    println!("Number of Courses Counted: {}", gpa.counted_courses);
    if summary.skipped_records > 0 {
        println!(
            "Skipped Records: {} of {}",
            summary.skipped_records, summary.fetched_records
        );
    }
    for path in &summary.saved_files {
        println!("📁 Courses saved to: {}", path);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting fcai-gpa");
    tracing::debug!("CLI config: {:?}", cli);

    let mut config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => fail(&format!("Failed to load config file '{}'", cli.config), e),
    };
    cli.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        fail("Configuration validation failed", e);
    }

    let bylaw_path = Path::new(&config.bylaw.path);
    if config.bylaw.create_default {
        if let Err(e) = write_default_bylaw(bylaw_path) {
            tracing::warn!("⚠️ Error creating default bylaw: {}", e);
        }
    }
    let policy = load_policy(Some(bylaw_path));

    let credentials = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        match cli.resolve_credentials(&mut input, &mut output) {
            Ok(credentials) => credentials,
            Err(e) => fail("Could not read credentials", e),
        }
    };

    let client = match FcaiClient::new(config.source.clone()) {
        Ok(client) => client,
        Err(e) => fail("Could not create portal client", e),
    };
    let storage = LocalStorage::new(config.output.path.clone());
    let pipeline = GpaPipeline::new(client, storage, config, credentials, policy);
    let engine = GpaEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!(
                "✅ GPA calculation completed at {}",
                summary.finished_at.to_rfc3339()
            );
            print_summary(&summary);
        }
        Err(e) => fail("GPA calculation failed", e),
    }

    Ok(())
}
