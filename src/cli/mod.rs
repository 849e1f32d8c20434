pub mod args;
pub mod commands;

pub use args::{ApplyArgs, ExtractArgs, ListArgs, PromoteArgs, ValidateArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
TEMPLATE COMMANDS:\n{subcommands}\n";

#[derive(Parser, Debug)]
#[command(name = "visual-templates")]
#[command(version = crate::VERSION)]
#[command(about = "Extract, validate, and apply report visual formatting templates")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: extract a golden report, promote the visuals you want to standardize, validate the template set, then apply templates to target reports."
)]
pub struct Args {
    /// Tool configuration file (default: ./visual-templates.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Write every visual config of a report to its own file",
        long_about = "Extract reads an archive or document folder and writes one JSON file per visual under <OUTPUT>/<document>/<page>/. Undecodable visuals are skipped and counted.",
        after_help = "Example:\n    visual-templates extract ./Golden.pbix --output ./extracted"
    )]
    Extract(ExtractArgs),
    #[command(
        about = "Apply a template to matching visuals of target reports",
        long_about = "Apply replaces the formatting of every visual whose title contains the match token, or whose visual type equals it, while keeping its position, size, filters, and data roles. Documents with no match are not rewritten.",
        after_help = "Example:\n    visual-templates apply ./Sales ./Finance --template templates/card/KPI.json --match card"
    )]
    Apply(ApplyArgs),
    #[command(
        about = "Check templates against the schema",
        long_about = "Validate checks one template file or every template below a directory and reports all violations. Exits non-zero when any template is invalid.",
        after_help = "Example:\n    visual-templates validate templates --schema templates/template.schema.json"
    )]
    Validate(ValidateArgs),
    #[command(
        about = "Turn an extracted visual into a trusted template",
        long_about = "Promote strips document-specific fields from an extracted config, validates it, and stores it as <templates-root>/<category>/<name>.json.",
        after_help = "Example:\n    visual-templates promote extracted/Golden/p1/card_Sales_KPI_0.json --name KPI"
    )]
    Promote(PromoteArgs),
    #[command(
        about = "List the trusted templates",
        after_help = "Example:\n    visual-templates list --templates-root ./templates"
    )]
    List(ListArgs),
}

pub fn run(args: Args) -> crate::Result<()> {
    let base_dir = std::env::current_dir()?;
    let config = commands::load_tool_config(args.config.as_deref(), &base_dir)?;

    match args.command {
        Command::Extract(extract_args) => commands::extract(extract_args, &config),
        Command::Apply(apply_args) => commands::apply(apply_args, &config),
        Command::Validate(validate_args) => commands::validate(validate_args, &config),
        Command::Promote(promote_args) => commands::promote(promote_args, &config),
        Command::List(list_args) => commands::list(list_args, &config),
    }
}
