use core::fmt::{self, Display, Formatter};
use std::error::Error;

use affinity::AffinityMask;
use clap::ValueEnum;
use colored::Colorize;
use ptree::TreeBuilder;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};
use tmc::domains::DomainList;

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Tree structure
    Tree,
}

/// Single rendered mask.
#[derive(Debug, Serialize)]
pub struct MaskEntry {
    pub name: String,
    pub mask: String,
    pub domains: String,
    pub count: usize,
}

impl MaskEntry {
    pub fn new(name: impl Into<String>, mask: &AffinityMask) -> Self {
        Self {
            name: name.into(),
            mask: mask.to_string(),
            domains: DomainList::from(mask).to_string(),
            count: mask.count(),
        }
    }
}

#[derive(Tabled)]
struct MaskRow<'a> {
    #[tabled(rename = "Name")]
    name: &'a str,
    #[tabled(rename = "Mask")]
    mask: Bits<'a>,
    #[tabled(rename = "Domains")]
    domains: &'a str,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Canonical mask string with set bits highlighted.
struct Bits<'a>(&'a str);

impl Display for Bits<'_> {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        for ch in self.0.chars() {
            match ch {
                '1' => write!(f, "{}", "1".bright_green().bold())?,
                ch => write!(f, "{}", ch.to_string().truecolor(127, 127, 127))?,
            }
        }

        Ok(())
    }
}

pub fn print(title: &str, entries: &[MaskEntry], format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Table => print_table(entries),
        OutputFormat::Json => print_json(entries),
        OutputFormat::Tree => print_tree(title, entries),
    }
}

fn print_table(entries: &[MaskEntry]) -> Result<(), Box<dyn Error>> {
    let rows = entries.iter().map(|entry| MaskRow {
        name: &entry.name,
        mask: Bits(&entry.mask),
        domains: &entry.domains,
        count: entry.count,
    });

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{table}");

    Ok(())
}

fn print_json(entries: &[MaskEntry]) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string(entries)?);
    Ok(())
}

fn print_tree(title: &str, entries: &[MaskEntry]) -> Result<(), Box<dyn Error>> {
    let mut tree = TreeBuilder::new(title.to_string());

    for entry in entries {
        tree.begin_child(entry.name.clone());
        tree.add_empty_child(format!("Mask: {}", Bits(&entry.mask)));
        tree.add_empty_child(format!("Domains: {}", entry.domains));
        tree.add_empty_child(format!("Count: {}", entry.count));
        tree.end_child();
    }

    let tree = tree.build();
    ptree::print_tree(&tree)?;

    Ok(())
}
