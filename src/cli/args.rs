use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Report archive or document folder to read
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Output root (default: <source parent>/extracted_visual_templates)
    #[arg(long, short, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Document folders to update
    #[arg(value_name = "TARGET", required = true, num_args = 1..)]
    pub targets: Vec<PathBuf>,

    /// Template file to apply
    #[arg(long, short, value_name = "FILE")]
    pub template: PathBuf,

    /// Title substring or exact visual type selecting the visuals to update
    #[arg(long = "match", short = 'm', value_name = "TOKEN")]
    pub token: String,

    /// Validate the template against this schema before applying it
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Template file or directory (default: the configured templates root)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Schema to check against (default: the configured schema)
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PromoteArgs {
    /// Extracted visual config to promote
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Category folder (default: the visual type)
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Template name (default: the sanitized title)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Template set root (default: the configured templates root)
    #[arg(long, value_name = "DIR")]
    pub templates_root: Option<PathBuf>,

    /// Schema to check against (default: the configured schema)
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Template set root (default: the configured templates root)
    #[arg(long, value_name = "DIR")]
    pub templates_root: Option<PathBuf>,
}
