use clap::Parser;
use sidenotes::cli::{
    handle_delete, handle_edit, handle_list, handle_new, handle_rename, handle_show,
    handle_switch, handle_theme, Cli, Commands,
};

#[tokio::main]
async fn main() {
    sidenotes::logging::init();

    let cli = Cli::parse();
    let dir = cli.dir.as_path();

    let result = match cli.command {
        Commands::List { json } => handle_list(dir, json).await,
        Commands::Show { id, json } => handle_show(dir, id, json).await,
        Commands::New { title, json } => handle_new(dir, title, json).await,
        Commands::Rename { id, title } => handle_rename(dir, id, title).await,
        Commands::Edit { content, id, stdin } => handle_edit(dir, content, id, stdin).await,
        Commands::Delete { id } => handle_delete(dir, id).await,
        Commands::Switch { id } => handle_switch(dir, id).await,
        Commands::Theme { value } => handle_theme(dir, value).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
