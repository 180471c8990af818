use anyhow::Result;

use apex_customs::cli::Command;
use apex_customs::{
    handle_export, handle_ingest, handle_init, handle_record, handle_serve, handle_standings, handle_watch, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Init { reset } => handle_init(*reset),
        Command::Record { custom, file, match_id } => handle_record(*custom, file, match_id.as_deref()),
        Command::Ingest { custom, match_id } => handle_ingest(*custom, match_id),
        Command::Standings { name, latest } => handle_standings(name, *latest),
        Command::Export { custom } => handle_export(*custom),
        Command::Watch {
            url,
            name,
            latest,
            max_polls,
        } => handle_watch(url, name, *latest, *max_polls),
    }
}
