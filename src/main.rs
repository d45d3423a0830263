use clap::Parser;
use clusterview::cli::{
    build_context, handle_completions, handle_config_init, ping, trace, watch, workload, Cli,
    Commands, ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Watch(args) => match build_context(&args.common) {
            Ok(ctx) => watch::run_watch(ctx, &args).await,
            Err(e) => Err(e),
        },
        Commands::Ping(args) => match build_context(&args.common) {
            Ok(ctx) => match ping::handle_ping(ctx, &args).await {
                Ok(output) => {
                    println!("{}", output);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        },
        Commands::Trace(args) => match trace::handle_trace(&args) {
            Ok(output) => {
                println!("{}", output);
                Ok(())
            }
            Err(e) => Err(e),
        },
        Commands::Workload(cmd) => match build_context(cmd.common()) {
            Ok(ctx) => match workload::handle_workload(ctx, &cmd).await {
                Ok(msg) => {
                    println!("{}", msg);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        },
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
