//! `belongings` command line: runs the HTTP server or applies one store
//! operation against the local database.

mod args;

use anyhow::{anyhow, Context, Result};
use args::{Cli, Command, ServeArgs};
use belongings_core::db::db_path_in;
use belongings_core::{
    default_log_level, init_logging, init_stderr_logging, open_service, render_inventory,
    ContainerInfoUpdate, SqliteBelongingsService, StoreOutcome,
};
use belongings_server::ServerConfig;
use clap::Parser;
use log::info;
use std::process::ExitCode;

const LOCAL_POOL_SIZE: usize = 1;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    let logging = match &cli.log_dir {
        Some(dir) if dir.is_absolute() => init_logging(&level, &dir.to_string_lossy()),
        Some(dir) => {
            let absolute = std::env::current_dir()
                .context("failed to resolve current dir")?
                .join(dir);
            init_logging(&level, &absolute.to_string_lossy())
        }
        None => init_stderr_logging(&level),
    };
    logging
        .map_err(|err| anyhow!(err))
        .context("failed to initialize logging")?;

    std::fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("failed to create data dir {}", cli.data_dir.display()))?;
    let db_path = db_path_in(&cli.data_dir);

    let pool_size = match &cli.cmd {
        Command::Serve(args) => args.pool_size,
        _ => LOCAL_POOL_SIZE,
    };
    let service = open_service(&db_path, pool_size)
        .with_context(|| format!("failed to open store {}", db_path.display()))?;
    info!(
        "event=cli_start module=cli status=ok command={}",
        command_name(&cli.cmd)
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")?;
    match cli.cmd {
        Command::Serve(args) => runtime.block_on(serve(args, service)),
        command => runtime.block_on(run_local(command, &service)),
    }
}

async fn serve(args: ServeArgs, service: SqliteBelongingsService) -> Result<ExitCode> {
    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };
    belongings_server::serve(config, service).await?;
    Ok(ExitCode::SUCCESS)
}

async fn run_local(command: Command, service: &SqliteBelongingsService) -> Result<ExitCode> {
    match command {
        Command::Serve(_) => Err(anyhow!("serve is not a local command")),
        Command::Add { container, item } => report(service.add_item(&container, &item).await?),
        Command::Remove { container, item } => {
            report(service.remove_item(&container, &item).await?)
        }
        Command::Move { from, to, item } => report(service.move_item(&from, &to, &item).await?),
        Command::Search { item } => {
            let search = service.search_item(&item).await?;
            println!("{search}");
            Ok(ExitCode::SUCCESS)
        }
        Command::List => {
            let containers = service.list_all_containers().await?;
            if containers.is_empty() {
                println!("{}", belongings_server::tools::EMPTY_INVENTORY_TEXT);
            } else {
                println!("{}", render_inventory(&containers));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Update {
            container,
            location,
            name,
        } => {
            let update = ContainerInfoUpdate { location, name };
            report(service.update_container_info(&container, &update).await?)
        }
        Command::Show { container } => match service.get_container(&container).await? {
            Some(found) => {
                println!("{}", found.describe());
                Ok(ExitCode::SUCCESS)
            }
            None => report(StoreOutcome::ContainerNotFound {
                container_id: container,
            }),
        },
    }
}

/// Prints an outcome; not-found outcomes exit with status 1.
fn report(outcome: StoreOutcome) -> Result<ExitCode> {
    if outcome.is_failure() {
        eprintln!("{outcome}");
        return Ok(ExitCode::FAILURE);
    }
    println!("{outcome}");
    Ok(ExitCode::SUCCESS)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Serve(_) => "serve",
        Command::Add { .. } => "add",
        Command::Remove { .. } => "remove",
        Command::Move { .. } => "move",
        Command::Search { .. } => "search",
        Command::List => "list",
        Command::Update { .. } => "update",
        Command::Show { .. } => "show",
    }
}
