use clap::Parser;
use locator_codegen::cli::commands::{GenerateArgs, GlobalOverrides, cmd_generate, cmd_locators};
use locator_codegen::cli::config::{Cli, Commands, load_config};
use locator_codegen::cli::logging::init_logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref());

    let overrides = GlobalOverrides {
        endpoint: cli.endpoint,
        model: cli.model,
    };

    match cli.command {
        Commands::Generate {
            source,
            language,
            tool,
            test_case,
            test_data,
            test_steps,
            engine,
            backend,
            output,
        } => {
            let args = GenerateArgs {
                source,
                language,
                tool,
                test_case,
                test_data,
                test_steps,
                engine,
                backend,
                output,
            };
            cmd_generate(args, &config, &overrides)?;
        }
        Commands::Locators {
            source,
            format,
            engine,
        } => {
            cmd_locators(&source, format, engine, &config)?;
        }
    }

    Ok(())
}
