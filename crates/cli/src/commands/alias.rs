//! Alias management commands
//!
//! Aliases are named references to record storage endpoints, including the
//! URL and the API token.

use clap::Subcommand;
use serde::Serialize;

use crate::commands::CliContext;
use crate::exit_code::ExitCode;
use crate::output::Formatter;
use rstore_core::{Alias, Result};

/// Alias subcommands for managing storage service connections
#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// Add a new alias
    Add(AddArgs),

    /// List all configured aliases
    List,

    /// Show one alias with its URL
    Show(NameArg),

    /// Remove an alias
    Rm(NameArg),
}

/// Arguments for the `alias add` command
#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Alias name (e.g., "local", "storage")
    pub name: String,

    /// Service URL (e.g., `http://127.0.0.1:8383`)
    pub url: String,

    /// API token
    #[arg(short, long, default_value = "")]
    pub token: String,
}

#[derive(clap::Args, Debug)]
pub struct NameArg {
    /// Name of the alias
    pub name: String,
}

/// JSON output for alias list/show (never includes the token)
#[derive(Serialize)]
struct AliasInfo {
    name: String,
    url: String,
}

impl From<&Alias> for AliasInfo {
    fn from(alias: &Alias) -> Self {
        Self {
            name: alias.name.clone(),
            url: alias.url.clone(),
        }
    }
}

/// Execute an alias subcommand
pub async fn execute(cmd: AliasCommands, ctx: &CliContext) -> ExitCode {
    let formatter = Formatter::new(ctx.output);

    let result = match cmd {
        AliasCommands::Add(args) => execute_add(args, ctx, &formatter),
        AliasCommands::List => execute_list(ctx, &formatter),
        AliasCommands::Show(args) => execute_show(args, ctx, &formatter),
        AliasCommands::Rm(args) => execute_rm(args, ctx, &formatter),
    };

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.abort(&e);
            ExitCode::Failure
        }
    }
}

fn execute_add(args: AddArgs, ctx: &CliContext, formatter: &Formatter) -> Result<()> {
    let manager = ctx.alias_manager()?;
    manager.add(Alias::new(&args.name, &args.url, &args.token))?;

    let styled_name = formatter.style_name(&args.name);
    formatter.success(&format!("Alias '{styled_name}' added"));
    Ok(())
}

fn execute_list(ctx: &CliContext, formatter: &Formatter) -> Result<()> {
    let aliases = ctx.alias_manager()?.list()?;

    if formatter.is_json() {
        let output: Vec<AliasInfo> = aliases.iter().map(AliasInfo::from).collect();
        formatter.json(&output);
    } else if aliases.is_empty() {
        formatter.println("No aliases configured.");
    } else {
        for alias in &aliases {
            formatter.println(&formatter.style_name(&alias.name));
        }
    }
    Ok(())
}

fn execute_show(args: NameArg, ctx: &CliContext, formatter: &Formatter) -> Result<()> {
    let alias = ctx.alias(&args.name)?;

    if formatter.is_json() {
        formatter.json(&AliasInfo::from(&alias));
    } else {
        let styled_name = formatter.style_name(&format!("{:<12}", alias.name));
        let styled_url = formatter.style_url(&alias.url);
        formatter.println(&format!("{styled_name} {styled_url}"));
    }
    Ok(())
}

fn execute_rm(args: NameArg, ctx: &CliContext, formatter: &Formatter) -> Result<()> {
    ctx.alias_manager()?.remove(&args.name)?;

    let styled_name = formatter.style_name(&args.name);
    formatter.success(&format!("Alias '{styled_name}' removed"));
    Ok(())
}
