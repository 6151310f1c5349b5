use clap::Parser;

use habita::cli::commands::Cli;
use habita::cli::{handlers, menu};

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        None => {
            let data_dir = handlers::resolve_data_dir(cli.data_dir.as_deref());
            menu::run(&data_dir)
        }
        Some(_) => handlers::dispatch(cli),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
