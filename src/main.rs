// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.
//! Galene CLI entrypoint.
//!
//! Loads a serialized diagram, optionally enters relation mode against the HTTP backend, and
//! prints the resulting diagram as JSON. `--schema` prints the JSON schema of the format instead.

use std::error::Error;

use galene::backend::HttpBackend;
use galene::config::EditorConfig;
use galene::store::{diagram_schema, SerializedDiagram};
use galene::DiagramHandler;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <diagram.json> [--config <file>] [--backend <url>] [--relation-mode]\n  {program} --schema\n\n--config reads editor settings from a JSON file (missing keys keep their defaults).\n--backend overrides the backend base url from the config.\n--relation-mode fetches backend relations for every node before printing.\n\nLog output goes to stderr; set RUST_LOG to change the level (default galene=info)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    diagram: Option<String>,
    config: Option<String>,
    backend: Option<String>,
    relation_mode: bool,
    schema: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(args.next().ok_or(())?);
            }
            "--backend" => {
                if options.backend.is_some() {
                    return Err(());
                }
                options.backend = Some(args.next().ok_or(())?);
            }
            "--relation-mode" => {
                if options.relation_mode {
                    return Err(());
                }
                options.relation_mode = true;
            }
            "--schema" => {
                if options.schema {
                    return Err(());
                }
                options.schema = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.diagram.is_some() {
                    return Err(());
                }
                options.diagram = Some(arg);
            }
        }
    }

    if options.schema {
        let other = options.diagram.is_some()
            || options.config.is_some()
            || options.backend.is_some()
            || options.relation_mode;
        return if other { Err(()) } else { Ok(options) };
    }
    if options.diagram.is_none() {
        return Err(());
    }
    Ok(options)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("galene=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(options: CliOptions) -> Result<(), Box<dyn Error>> {
    if options.schema {
        println!("{}", serde_json::to_string_pretty(&diagram_schema()?)?);
        return Ok(());
    }

    let mut config = match &options.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    if let Some(base_url) = options.backend {
        config.backend.base_url = base_url;
    }
    let backend_config = config.backend.clone();

    let path = options.diagram.ok_or("missing diagram path")?;
    let diagram = SerializedDiagram::read_file(&path)?;
    let mut handler = DiagramHandler::new(config);
    let report = handler.from_json(&diagram);
    info!(
        path = %path,
        nodes = report.nodes,
        relations = report.relations,
        dropped_nodes = report.dropped_nodes,
        dropped_relations = report.dropped_relations,
        "diagram loaded"
    );

    if options.relation_mode {
        let backend = HttpBackend::new(&backend_config)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(handler.enable_relation_mode(&backend))?;
    }

    println!("{}", handler.to_json().to_json_string_pretty()?);
    Ok(())
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "galene".to_owned());

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };

    init_tracing();
    if let Err(err) = run(options) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
