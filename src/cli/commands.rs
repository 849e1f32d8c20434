use crate::{
    cli::args::{ApplyArgs, ExtractArgs, ListArgs, PromoteArgs, ValidateArgs},
    core::{
        config::ToolConfig, AppError, ConfigExtractor, ConfigLoader, ConfigValidator,
        ErrorCategory, LayoutReader, MatchToken, SchemaValidator, TemplateMerger, TemplateSchema,
        TemplateStore,
    },
    Result,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Resolve and validate the tool configuration for this invocation.
pub fn load_tool_config(explicit: Option<&Path>, base_dir: &Path) -> Result<ToolConfig> {
    let config = ConfigLoader::load(explicit, base_dir)?;
    ConfigValidator::validate(&config)?;
    Ok(config)
}

fn schema_validator(explicit: Option<&Path>, config: &ToolConfig) -> Result<SchemaValidator> {
    let schema_path = explicit.or(config.templates.schema.as_deref());
    let schema = match schema_path {
        Some(path) => {
            tracing::info!(schema = %path.display(), "loading template schema");
            Some(TemplateSchema::load(path)?)
        }
        None => None,
    };
    Ok(SchemaValidator::new(schema))
}

pub fn extract(args: ExtractArgs, config: &ToolConfig) -> Result<()> {
    tracing::info!("Extracting visual configs from {}", args.source.display());

    let reader = LayoutReader::new(config.layout.clone());
    let loaded = reader.read(&args.source)?;
    println!(
        "Reading {} ({})",
        loaded.source.path.display(),
        loaded.source.kind
    );

    let output_root = args.output.clone().unwrap_or_else(|| {
        args.source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join(&config.extract.output_dir_name)
    });

    let summary = ConfigExtractor::new().extract(
        &loaded.document,
        &loaded.source.document_stem(),
        &output_root,
    )?;

    for path in &summary.written {
        println!("  saved {}", path.display());
    }
    println!(
        "Extracted {} visual config(s) from {} page(s) into {}",
        summary.extracted,
        summary.pages,
        summary.output_dir.display()
    );
    if summary.skipped > 0 {
        println!("Skipped {} undecodable visual(s)", summary.skipped);
    }
    Ok(())
}

pub fn apply(args: ApplyArgs, config: &ToolConfig) -> Result<()> {
    let token = MatchToken::new(args.token.clone())?;
    let template = TemplateStore::load(&args.template)?;

    if args.schema.is_some() || config.templates.schema.is_some() {
        let validator = schema_validator(args.schema.as_deref(), config)?;
        let report = validator.validate(&Value::Object(template.as_map().clone()));
        if !report.passed() {
            for violation in &report.violations {
                println!("  {}", violation);
            }
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "Template {} failed validation; nothing was applied",
                    args.template.display()
                ),
            )
            .into());
        }
    }

    println!(
        "Applying {} to visuals matching '{}'",
        args.template.display(),
        token.as_str()
    );

    let reader = LayoutReader::new(config.layout.clone());
    let merger = TemplateMerger::new(template, token);
    let batch = merger.apply_batch(&reader, &args.targets);

    for (target, result) in &batch.results {
        match result {
            Ok(summary) if summary.written => {
                println!(
                    "{}: fixed {} visual(s): {}",
                    target.display(),
                    summary.fixed,
                    summary.matched.join(", ")
                );
            }
            Ok(_) => {
                println!(
                    "{}: no visuals matched '{}'; file left unchanged",
                    target.display(),
                    merger.token().as_str()
                );
            }
            Err(error) => {
                println!("{}: FAILED: {}", target.display(), error.message);
            }
        }
    }
    println!(
        "Applied template to {} visual(s) across {} document(s)",
        batch.total_fixed(),
        batch.results.len()
    );

    if !batch.succeeded() {
        let category = batch
            .failure_category()
            .unwrap_or(ErrorCategory::InternalError);
        let mut error = AppError::new(
            category,
            format!(
                "{} of {} document(s) could not be updated",
                batch.failures(),
                batch.results.len()
            ),
        )
        .with_code("APPLY_PARTIAL_FAILURE");
        for (target, result) in &batch.results {
            if let Err(failure) = result {
                error.add_context(&target.display().to_string(), &failure.to_string());
            }
        }
        return Err(error.into());
    }
    Ok(())
}

pub fn validate(args: ValidateArgs, config: &ToolConfig) -> Result<()> {
    let root = args
        .path
        .clone()
        .unwrap_or_else(|| config.templates.root.clone());
    let validator = schema_validator(args.schema.as_deref(), config)?;
    if !validator.has_schema() {
        tracing::warn!("no schema configured; only structural template rules are checked");
    }

    let batch = validator.validate_tree(&root)?;
    for file in &batch.files {
        if file.report.passed() {
            println!("ok      {}", file.path.display());
        } else {
            println!("INVALID {}", file.path.display());
            for violation in &file.report.violations {
                println!("        {}", violation);
            }
        }
    }

    let failed = batch.failures().count();
    println!(
        "Checked {} template(s): {} valid, {} invalid",
        batch.checked(),
        batch.checked() - failed,
        failed
    );

    if failed > 0 {
        return Err(AppError::new(
            ErrorCategory::ValidationError,
            format!("{} template(s) failed validation", failed),
        )
        .with_entry("path", root.display().to_string())
        .into());
    }
    Ok(())
}

pub fn promote(args: PromoteArgs, config: &ToolConfig) -> Result<()> {
    let root = templates_root(args.templates_root.as_ref(), config);
    let extracted = TemplateStore::load(&args.file)?;
    let validator = schema_validator(args.schema.as_deref(), config)?;

    let stripped = extracted.preserved_keys();
    let info = TemplateStore::new(root).promote(
        &extracted,
        args.category.as_deref(),
        args.name.as_deref(),
        &validator,
    )?;

    if !stripped.is_empty() {
        println!("Removed document-specific fields: {}", stripped.join(", "));
    }
    println!(
        "Promoted {} to {} ({}/{})",
        args.file.display(),
        info.path.display(),
        info.category,
        info.name
    );
    Ok(())
}

pub fn list(args: ListArgs, config: &ToolConfig) -> Result<()> {
    let root = templates_root(args.templates_root.as_ref(), config);
    let templates = TemplateStore::new(&root).list()?;

    if templates.is_empty() {
        println!("No templates found under {}", root.display());
        return Ok(());
    }
    for info in &templates {
        println!("{}/{}\t{}", info.category, info.name, info.path.display());
    }
    println!("{} template(s)", templates.len());
    Ok(())
}

fn templates_root(explicit: Option<&PathBuf>, config: &ToolConfig) -> PathBuf {
    explicit
        .cloned()
        .unwrap_or_else(|| config.templates.root.clone())
}
