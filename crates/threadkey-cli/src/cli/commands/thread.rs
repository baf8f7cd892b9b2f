//! Thread command handlers.

use std::{fs, io};

use anyhow::{Context, Result};
use threadkey_core::{Item, SortOptions, assign_keys, format_thread_with, sort_thread};
use tracing::info;

/// Reads a JSON array of records from a file, or stdin for `-`.
fn read_items(input: &str) -> Result<Vec<Item>> {
    let contents = if input == "-" {
        io::read_to_string(io::stdin()).context("read items from stdin")?
    } else {
        fs::read_to_string(input).with_context(|| format!("read items from '{input}'"))?
    };

    let items: Vec<Item> =
        serde_json::from_str(&contents).with_context(|| format!("parse items from '{input}'"))?;
    info!(count = items.len(), input, "loaded items");
    Ok(items)
}

pub fn sort(input: &str, options: &SortOptions, keys_only: bool) -> Result<()> {
    let mut items = read_items(input)?;

    if keys_only {
        let written = assign_keys(&mut items, options).context("assign thread keys")?;
        info!(written, "keys assigned, input order kept");
    } else {
        sort_thread(&mut items, options).context("sort thread")?;
    }

    let json = serde_json::to_string_pretty(&items).context("serialize items")?;
    println!("{json}");
    Ok(())
}

pub fn format(input: &str, options: &SortOptions) -> Result<()> {
    let mut items = read_items(input)?;
    sort_thread(&mut items, options).context("sort thread")?;

    let text = format_thread_with(&items, options);
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(())
}
