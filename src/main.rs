mod api;
mod config;
mod form;
mod logging;
mod model;
mod state;
mod ui;
mod validate;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing::{info, warn};

use api::ContactApi;
use config::{Config, Overrides};

#[derive(Parser, Debug)]
#[command(name = "contactr", version, about = "Terminal client for a REST contacts service")]
struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL (e.g. http://localhost:8080/api)
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of contacts as tab-separated lines
    List(ListArgs),
    /// Print every field of one contact
    Show(IdArgs),
    /// Delete a contact after confirmation
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,

    /// Search by name or email instead of listing everything
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args, Debug)]
struct IdArgs {
    id: i64,
}

#[derive(Args, Debug)]
struct DeleteArgs {
    id: i64,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    yes: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(&Overrides::from_env(cli.config, cli.base_url))?;

    let Some(command) = cli.command else {
        logging::init_file(&config.log_file)?;
        report_config(&config);
        let mut app = ui::app::App::new(&config)?;
        return app.run();
    };

    logging::init_stderr()?;
    report_config(&config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let api = ContactApi::new(&config.api_base_url, config.request_timeout)
        .context("failed to build HTTP client")?;

    match command {
        Command::List(args) => handle_list(&runtime, &api, &config, args),
        Command::Show(args) => handle_show(&runtime, &api, args),
        Command::Delete(args) => handle_delete(&runtime, &api, args),
    }
}

fn report_config(config: &Config) {
    match &config.config_path {
        Some(path) => info!(path = %path.display(), "loaded configuration"),
        None => info!("no configuration file, using defaults"),
    }
    for warning in &config.warnings {
        warn!("{}", warning);
    }
}

fn handle_list(runtime: &Runtime, api: &ContactApi, config: &Config, args: ListArgs) -> Result<()> {
    let page = args.page - 1;
    let term = args.search.as_deref().map(str::trim).unwrap_or_default();
    let result = if term.is_empty() {
        runtime.block_on(api.list(page, config.page_size))
    } else {
        runtime.block_on(api.search(term, page, config.page_size))
    };
    let contacts = result.context("failed to load contacts")?;

    println!(
        "Page {} of {} ({} contacts)",
        page + 1,
        contacts.total_pages.max(1),
        contacts.total_elements
    );

    // Results: id<TAB>name<TAB>email<TAB>phone<TAB>company
    for contact in &contacts.content {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            contact
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            contact.full_name(),
            contact.email,
            model::or_dash(&contact.phone),
            model::or_dash(&contact.company)
        );
    }

    Ok(())
}

fn handle_show(runtime: &Runtime, api: &ContactApi, args: IdArgs) -> Result<()> {
    let contact = runtime
        .block_on(api.get(args.id))
        .with_context(|| format!("failed to load contact {}", args.id))?;

    println!("Name: {}", contact.full_name());
    for (label, value) in contact.detail_fields() {
        println!("{}: {}", label, value);
    }
    Ok(())
}

fn handle_delete(runtime: &Runtime, api: &ContactApi, args: DeleteArgs) -> Result<()> {
    if !args.yes {
        let stdin = io::stdin();
        if !confirm(&mut stdin.lock(), &mut io::stdout(), args.id)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    runtime
        .block_on(api.delete(args.id))
        .with_context(|| format!("failed to delete contact {}", args.id))?;
    println!("Deleted contact {}", args.id);
    Ok(())
}

fn confirm(input: &mut impl BufRead, output: &mut impl Write, id: i64) -> Result<bool> {
    write!(output, "Delete contact {}? [y/N] ", id)?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_accepts_only_yes() {
        for (answer, expected) in [
            ("y\n", true),
            ("YES\n", true),
            (" yes \n", true),
            ("n\n", false),
            ("\n", false),
            ("", false),
            ("yep\n", false),
        ] {
            let mut output = Vec::new();
            let result = confirm(&mut answer.as_bytes(), &mut output, 7).unwrap();
            assert_eq!(result, expected, "answer {answer:?}");
            assert_eq!(String::from_utf8(output).unwrap(), "Delete contact 7? [y/N] ");
        }
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["contactr", "--base-url", "http://x/api", "list", "--page", "2"])
            .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://x/api"));
        assert!(matches!(cli.command, Some(Command::List(ListArgs { page: 2, .. }))));

        assert!(Cli::try_parse_from(["contactr", "list", "--page", "0"]).is_err());

        let cli = Cli::try_parse_from(["contactr", "delete", "5", "--yes"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Delete(DeleteArgs { id: 5, yes: true }))));

        let cli = Cli::try_parse_from(["contactr"]).unwrap();
        assert!(cli.command.is_none());
    }
}
