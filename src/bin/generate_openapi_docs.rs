//! Generate MDX reference pages from OpenAPI documents.
//!
//! Usage:
//!   cargo run --bin generate-openapi-docs
//!   cargo run --bin generate-openapi-docs -- --input openapi.yaml --output content/docs/en/api
//!   cargo run --bin generate-openapi-docs -- --per tag --group-by none
//!
//! Running it twice on an unchanged document produces byte-identical files.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use dvoice_docs::openapi::generator::{self, GenerateOptions, GroupBy, Per};

#[derive(Debug, Parser)]
#[command(name = "generate-openapi-docs", about = "Generate API reference pages from OpenAPI documents")]
struct Args {
    /// OpenAPI document(s) to read (YAML or JSON)
    #[arg(short, long = "input", default_value = "openapi.yaml", num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Directory the pages are written to
    #[arg(short, long, default_value = "content/docs/en/api")]
    output: PathBuf,

    /// One page per operation, per tag or per document
    #[arg(long, value_enum, default_value_t = Per::Operation)]
    per: Per,

    /// Directory layout of per-operation pages
    #[arg(long, value_enum, default_value_t = GroupBy::Route)]
    group_by: GroupBy,

    /// Omit the "generated file" comment
    #[arg(long)]
    no_generated_comment: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dvoice_docs=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let options = GenerateOptions {
        inputs: args.inputs,
        output: args.output,
        per: args.per,
        group_by: args.group_by,
        add_generated_comment: !args.no_generated_comment,
    };

    generator::generate(&options)?;
    Ok(())
}
