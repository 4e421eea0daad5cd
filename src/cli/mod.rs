//! `tola-content` subcommands.

mod args;

pub use args::{Cli, Commands};

use anyhow::{Result, bail};
use serde::Serialize;
use std::io::{self, Write};

use crate::config::{SiteConfig, find_config_file};
use crate::core::{DateTimeUtc, JsonMap, NodeKind};
use crate::site::Site;
use crate::tree::ContentNode;
use crate::{debug, log};

/// Load the config named by `-C` (searching upward from the current
/// directory), falling back to defaults rooted at the current directory.
pub fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let cwd = std::env::current_dir()?;
    let mut config = match find_config_file(&cwd, &cli.config) {
        Some(path) => {
            debug!("config"; "using {}", path.display());
            SiteConfig::load(&path)?
        }
        None => {
            debug!("config"; "{} not found, using defaults", cli.config.display());
            SiteConfig {
                root: cwd,
                ..SiteConfig::default()
            }
        }
    };
    if let Some(content) = &cli.content {
        config.build.content.clone_from(content);
    }
    Ok(config)
}

pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let site = Site::load_dir(config)?;

    match &cli.command {
        Commands::Tree { json } => print_tree(&site, *json),
        Commands::Ref { reference, from } => print_ref(&site, reference, from.as_deref()),
        Commands::Publish => publish(&site),
    }
}

#[derive(Serialize)]
struct NodeSummary<'a> {
    kind: NodeKind,
    path: &'a str,
    title: &'a str,
    weight: i64,
    date: DateTimeUtc,
    #[serde(skip_serializing_if = "JsonMap::is_empty")]
    params: &'a JsonMap,
}

impl<'a> NodeSummary<'a> {
    fn new(node: &'a ContentNode, empty: &'a JsonMap) -> Self {
        Self {
            kind: node.kind(),
            path: node.key().as_str(),
            title: node.title(),
            weight: node.weight(),
            date: node.date(),
            params: node.meta().map_or(empty, |m| &m.params),
        }
    }
}

fn print_tree(site: &Site, json: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        let empty = JsonMap::new();
        let nodes: Vec<_> = site
            .tree()
            .pages()
            .map(|node| NodeSummary::new(node, &empty))
            .collect();
        serde_json::to_writer_pretty(&mut out, &nodes)?;
        writeln!(out)?;
        return Ok(());
    }

    for node in site.tree().pages() {
        writeln!(out, "{}", format_node(node))?;
    }
    Ok(())
}

/// One listing line, indented by path depth.
fn format_node(node: &ContentNode) -> String {
    let indent = "  ".repeat(node.key().depth());
    let mut line = format!(
        "{indent}{:<12} {} {:?}",
        node.kind().as_str(),
        node.key(),
        node.title()
    );
    if node.weight() != 0 {
        line.push_str(&format!(" weight={}", node.weight()));
    }
    if !node.date().is_zero() {
        line.push_str(&format!(" date={}", node.date()));
    }
    line
}

fn print_ref(site: &Site, reference: &str, from: Option<&str>) -> Result<()> {
    match site.resolve(from, reference)? {
        Some(node) => {
            println!("{}", format_node(node).trim_start());
            Ok(())
        }
        None => bail!("page reference {reference:?} not found"),
    }
}

fn publish(site: &Site) -> Result<()> {
    let report = site.publish_all();
    debug!("publish"; "{}", site.spec().cache_stats());
    if report.failed.is_empty() {
        log!("publish"; "{} resources", report.published);
        return Ok(());
    }
    bail!(
        "{} of {} resources failed to publish",
        report.failed.len(),
        report.published + report.failed.len()
    )
}
