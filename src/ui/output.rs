//! Line helpers for the `pypi-recom` commands

use crate::ui::{theme, Icons, Theme};
use owo_colors::OwoColorize;

/// Opening line of a command, e.g. the search context being processed
pub fn banner(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().title.clone()));
}

pub fn field(icon: &str, label: &str, value: &str) {
    println!("{}", field_line(theme(), icon, label, value));
}

fn field_line(theme: &Theme, icon: &str, label: &str, value: &str) -> String {
    format!("{} {}: {}", icon, label.style(theme.label.clone()), value)
}

/// One package of a listing
pub fn package(name: &str) {
    println!("  {} {}", Icons::PACKAGE, name.style(theme().package.clone()));
}

pub fn done(message: &str) {
    println!("{} {}", Icons::CHECK, message.style(theme().ok.clone()));
}

pub fn failed(message: &str) {
    eprintln!("{} {}", Icons::CROSS, message.style(theme().failure.clone()));
}

pub fn caution(message: &str) {
    eprintln!("{} {}", Icons::WARN, message.style(theme().caution.clone()));
}

pub fn section(title: &str) {
    println!();
    println!("{} {}", Icons::GRAPH, title.style(theme().title.clone()));
}

/// Counts of a graph load, e.g. `12 vertices, 40 edges (9 replaced)`
pub fn graph_counts(vertices: usize, edges: usize, replaced: usize) -> String {
    counts_line(theme(), vertices, edges, replaced)
}

fn counts_line(theme: &Theme, vertices: usize, edges: usize, replaced: usize) -> String {
    let count = &theme.count;
    format!(
        "{} vertices, {} edges ({} replaced)",
        vertices.style(count.clone()),
        edges.style(count.clone()),
        replaced.style(count.clone())
    )
}

pub fn muted(text: &str) -> String {
    text.style(theme().label.clone()).to_string()
}
