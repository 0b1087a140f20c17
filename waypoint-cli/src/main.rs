use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use waypoint_core::differ::create_plan;
use waypoint_core::effect::Effect;
use waypoint_core::provider::{Provider, ProviderFactory};
use waypoint_provider::WaypointProviderFactory;
use waypoint_state::{LocalBackend, StateBackend, StateFile};

mod apply;
mod config;
mod display;

use apply::{apply_effect, refresh};
use config::{Configuration, Schemas};
use display::{attribute_lines, format_effect, print_plan};

#[derive(Parser)]
#[command(name = "waypoint-tf")]
#[command(about = "Manage Waypoint projects, runner profiles and OIDC auth methods")]
struct Cli {
    /// Path to the state file
    #[arg(long, global = true, default_value = LocalBackend::DEFAULT_STATE_FILE)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file
    Validate {
        /// Path to the JSON configuration file
        #[arg(default_value = "main.tf.json")]
        file: PathBuf,
    },
    /// Show execution plan without applying changes
    Plan {
        /// Path to the JSON configuration file
        #[arg(default_value = "main.tf.json")]
        file: PathBuf,
    },
    /// Apply changes to reach the desired state
    Apply {
        /// Path to the JSON configuration file
        #[arg(default_value = "main.tf.json")]
        file: PathBuf,
    },
    /// Update the state file from the Waypoint server
    Refresh {
        /// Path to the JSON configuration file
        #[arg(default_value = "main.tf.json")]
        file: PathBuf,
    },
    /// Destroy all resources recorded in the state file
    Destroy {
        /// Path to the JSON configuration file
        #[arg(default_value = "main.tf.json")]
        file: PathBuf,

        /// Skip confirmation prompt (auto-approve)
        #[arg(long)]
        auto_approve: bool,
    },
    /// Print the provider schema as JSON
    Schema,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("TF_LOG", "warn")).init();

    let cli = Cli::parse();
    let backend = LocalBackend::with_path(cli.state);

    let result = match cli.command {
        Commands::Validate { file } => run_validate(&file),
        Commands::Plan { file } => run_plan(&file, &backend).await,
        Commands::Apply { file } => run_apply(&file, &backend).await,
        Commands::Refresh { file } => run_refresh(&file, &backend).await,
        Commands::Destroy { file, auto_approve } => {
            run_destroy(&file, &backend, auto_approve).await
        }
        Commands::Schema => run_schema(),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_configuration(file: &Path, schemas: &Schemas) -> Result<Configuration, String> {
    let mut config = Configuration::load(file)?;
    config.prepare(schemas)?;
    Ok(config)
}

fn configure_provider(
    factory: &dyn ProviderFactory,
    config: &Configuration,
) -> Result<Box<dyn Provider>, String> {
    let provider_config = config.provider_config(factory)?;
    factory
        .configure(&provider_config)
        .map_err(|e| format!("Failed to configure provider: {}", e))
}

async fn load_state(backend: &dyn StateBackend) -> Result<StateFile, String> {
    let state = backend
        .read_state()
        .await
        .map_err(|e| format!("Failed to load state: {}", e))?;
    Ok(state.unwrap_or_default())
}

async fn save_state(backend: &dyn StateBackend, state: &mut StateFile) -> Result<(), String> {
    state.increment_serial();
    backend
        .write_state(state)
        .await
        .map_err(|e| format!("Failed to save state: {}", e))
}

fn run_validate(file: &Path) -> Result<(), String> {
    let factory = WaypointProviderFactory;
    let schemas = Schemas::from_factory(&factory);
    let config = load_configuration(file, &schemas)?;
    config.provider_config(&factory)?;

    println!(
        "{}",
        format!(
            "Configuration is valid ({} resources).",
            config.resources.len()
        )
        .green()
    );
    Ok(())
}

async fn run_plan(file: &Path, backend: &dyn StateBackend) -> Result<(), String> {
    let factory = WaypointProviderFactory;
    let schemas = Schemas::from_factory(&factory);
    let config = load_configuration(file, &schemas)?;
    let provider = configure_provider(&factory, &config)?;

    // Refreshed in memory only; plan never writes the state file
    let mut state = load_state(backend).await?;
    refresh(provider.as_ref(), &mut state).await?;

    let plan = create_plan(&config.resources, &state.current_states(), schemas.resources());
    print_plan(&plan, &schemas);
    Ok(())
}

async fn run_apply(file: &Path, backend: &dyn StateBackend) -> Result<(), String> {
    let factory = WaypointProviderFactory;
    let schemas = Schemas::from_factory(&factory);
    let config = load_configuration(file, &schemas)?;
    let provider = configure_provider(&factory, &config)?;

    let mut state = load_state(backend).await?;
    let dropped = refresh(provider.as_ref(), &mut state).await?;

    let plan = create_plan(&config.resources, &state.current_states(), schemas.resources());
    print_plan(&plan, &schemas);
    if !plan.has_changes() {
        if dropped > 0 {
            save_state(backend, &mut state).await?;
        }
        return Ok(());
    }

    println!();
    println!("{}", "Applying changes...".cyan().bold());
    println!();

    let mut success_count = 0;
    let mut failure_count = 0;

    for effect in plan.effects() {
        match apply_effect(provider.as_ref(), effect, &mut state).await {
            Ok(result) => {
                println!("  {} {}", "✓".green(), format_effect(effect));
                if let (Effect::Read(resource), Some(read)) = (effect, &result) {
                    for line in attribute_lines(
                        &schemas,
                        &resource.id.resource_type,
                        true,
                        &read.attributes,
                    ) {
                        println!("      {}", line);
                    }
                }
                if effect.is_mutating() {
                    success_count += 1;
                }
            }
            Err(e) => {
                println!("  {} {} - {}", "✗".red(), format_effect(effect), e);
                failure_count += 1;
            }
        }
    }

    // Successful operations are recorded even when others failed
    save_state(backend, &mut state).await?;

    println!();
    if failure_count > 0 {
        return Err(format!(
            "Apply failed. {} succeeded, {} failed.",
            success_count, failure_count
        ));
    }
    println!(
        "{}",
        format!("Apply complete! {} changes applied.", success_count)
            .green()
            .bold()
    );
    Ok(())
}

async fn run_refresh(file: &Path, backend: &dyn StateBackend) -> Result<(), String> {
    let factory = WaypointProviderFactory;
    let schemas = Schemas::from_factory(&factory);
    let config = load_configuration(file, &schemas)?;
    let provider = configure_provider(&factory, &config)?;

    let mut state = load_state(backend).await?;
    let dropped = refresh(provider.as_ref(), &mut state).await?;
    save_state(backend, &mut state).await?;

    println!(
        "{}",
        format!(
            "Refresh complete! {} resources in state, {} removed.",
            state.resources.len(),
            dropped
        )
        .green()
    );
    Ok(())
}

async fn run_destroy(
    file: &Path,
    backend: &dyn StateBackend,
    auto_approve: bool,
) -> Result<(), String> {
    let factory = WaypointProviderFactory;
    let schemas = Schemas::from_factory(&factory);
    let config = load_configuration(file, &schemas)?;
    let provider = configure_provider(&factory, &config)?;

    // Refresh first so objects already gone remotely are not deleted twice
    let mut state = load_state(backend).await?;
    let dropped = refresh(provider.as_ref(), &mut state).await?;

    let plan = create_plan(&[], &state.current_states(), schemas.resources());
    if plan.is_empty() {
        if dropped > 0 {
            save_state(backend, &mut state).await?;
        }
        println!("{}", "No resources recorded in state.".yellow());
        return Ok(());
    }

    println!("{}", "Destroy Plan:".red().bold());
    println!();
    for effect in plan.effects() {
        println!("  {}", format_effect(effect));
    }
    println!();
    println!(
        "Plan: {} to destroy.",
        plan.change_count().to_string().red()
    );
    println!();

    if !auto_approve && !confirm_destroy()? {
        println!();
        println!("{}", "Destroy cancelled.".yellow());
        return Ok(());
    }

    println!("{}", "Destroying resources...".red().bold());
    println!();

    let mut success_count = 0;
    let mut failure_count = 0;

    for effect in plan.effects() {
        match apply_effect(provider.as_ref(), effect, &mut state).await {
            Ok(_) => {
                println!("  {} {}", "✓".green(), format_effect(effect));
                success_count += 1;
            }
            Err(e) => {
                println!("  {} {} - {}", "✗".red(), format_effect(effect), e);
                failure_count += 1;
            }
        }
    }

    save_state(backend, &mut state).await?;

    println!();
    if failure_count > 0 {
        return Err(format!(
            "Destroy failed. {} succeeded, {} failed.",
            success_count, failure_count
        ));
    }
    println!(
        "{}",
        format!("Destroy complete! {} resources destroyed.", success_count)
            .green()
            .bold()
    );
    Ok(())
}

fn confirm_destroy() -> Result<bool, String> {
    println!(
        "{}",
        "Do you really want to destroy all resources?"
            .yellow()
            .bold()
    );
    println!(
        "  {}",
        "This action cannot be undone. Type 'yes' to confirm.".yellow()
    );
    print!("\n  Enter a value: ");
    std::io::Write::flush(&mut std::io::stdout()).map_err(|e| e.to_string())?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .map_err(|e| e.to_string())?;
    Ok(input.trim() == "yes")
}

fn run_schema() -> Result<(), String> {
    let schema = WaypointProviderFactory.schema_json();
    let rendered = serde_json::to_string_pretty(&schema)
        .map_err(|e| format!("Failed to render schema: {}", e))?;
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_state_flag_after_subcommand() {
        let args = ["waypoint-tf", "plan", "infra.tf.json", "--state", "s.json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.state, PathBuf::from("s.json"));
        match cli.command {
            Commands::Plan { file } => assert_eq!(file, PathBuf::from("infra.tf.json")),
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn parse_defaults() {
        let cli = Cli::try_parse_from(["waypoint-tf", "destroy", "--auto-approve"]).unwrap();
        assert_eq!(cli.state, PathBuf::from("waypoint.tfstate.json"));
        match cli.command {
            Commands::Destroy { file, auto_approve } => {
                assert_eq!(file, PathBuf::from("main.tf.json"));
                assert!(auto_approve);
            }
            _ => panic!("expected destroy"),
        }
    }

    #[test]
    fn validate_reports_schema_errors() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("main.tf.json");
        std::fs::write(
            &file,
            r#"{"resource": {"waypoint_runner_profile": {"odr": {"oci_url": "x"}}}}"#,
        )
        .unwrap();

        let err = run_validate(&file).unwrap_err();
        assert!(err.contains("waypoint_runner_profile.odr: Required attribute"));
    }

    #[test]
    fn validate_missing_file() {
        let err = run_validate(Path::new("/nonexistent/main.tf.json")).unwrap_err();
        assert!(err.starts_with("Failed to read /nonexistent/main.tf.json"));
    }

    #[tokio::test]
    async fn state_round_trip_bumps_serial() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("state.json"));

        let mut state = load_state(&backend).await.unwrap();
        assert_eq!(state.serial, 0);
        save_state(&backend, &mut state).await.unwrap();

        let reloaded = load_state(&backend).await.unwrap();
        assert_eq!(reloaded.serial, 1);
        assert_eq!(reloaded.lineage, state.lineage);
    }
}
