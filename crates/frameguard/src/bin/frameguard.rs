//! frameguard - inspect an HTML file the way the guard sees it
//!
//! Usage: frameguard <page.html> [config.json]
//!
//! Prints the frame-bearing elements of the page (light tree and each shadow
//! root) and the verdict each interception point would return for the file's
//! markup.

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use frameguard::{Classifier, FrameGuard, GuardConfig, discover, discover_in_shadows, vault};
use frameguard_dom::{DomTree, NodeId};
use frameguard_html::HtmlParser;
use frameguard_realm::{Realm, Value};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: frameguard <page.html> [config.json]");
    };
    let config = match args.next() {
        Some(config_path) => {
            let json = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading config {config_path}"))?;
            GuardConfig::from_json(&json).with_context(|| format!("loading config {config_path}"))?
        }
        None => GuardConfig::default(),
    };

    let html = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let document = HtmlParser::new().parse_with_url(&html, &format!("file://{path}"));
    let mut realm = Realm::top(document);
    let vault = vault::global().capture(&realm).context("capturing the vault")?;
    let classifier = Classifier::new(Some(vault));

    tracing::info!(file = %path, nodes = realm.tree().len(), "page loaded");

    let root = realm.tree().root();
    let light = discover(&classifier, &mut realm, &Value::from(root), false);
    println!("light tree: {} frame(s)", light.len());
    for frame in &light {
        println!("  {}", describe(realm.tree(), *frame));
    }
    for (shadow, frames) in discover_in_shadows(&classifier, &mut realm, root) {
        println!("shadow root {:?}: {} frame(s)", shadow, frames.len());
        for frame in &frames {
            println!("  {}", describe(realm.tree(), *frame));
        }
    }

    let guard = FrameGuard::new(vault, config);
    println!("verdicts:");
    for (sink, verdict) in guard.verdicts_for(&html) {
        println!("  {sink:?}: {verdict:?}");
    }
    Ok(())
}

fn describe(tree: &DomTree, id: NodeId) -> String {
    let name = tree.local_name(id).unwrap_or("?");
    let attrs: Vec<String> = ["id", "name", "src", "data"]
        .iter()
        .filter_map(|attr| tree.get_attribute(id, attr).map(|v| format!("{attr}={v:?}")))
        .collect();
    if attrs.is_empty() {
        format!("<{name}>")
    } else {
        format!("<{name} {}>", attrs.join(" "))
    }
}
