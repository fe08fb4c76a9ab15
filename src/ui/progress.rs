use crate::ui::progress_message::{ProgressMessage, ProgressPhase};
use crate::ui::{theme, Icons};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::cell::RefCell;
use std::time::{Duration, Instant};

/// Renders pipeline progress messages on the terminal.
///
/// One spinner for listing and loading, one bar for the per-package fetch.
/// Everything is hidden when stdout is not a terminal.
pub struct ProgressManager {
    started: Instant,
    current: RefCell<Option<ProgressBar>>,
    skipped: RefCell<usize>,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            current: RefCell::new(None),
            skipped: RefCell::new(0),
        }
    }

    pub fn handle(&self, msg: &ProgressMessage) {
        match msg {
            ProgressMessage::Started { phase: ProgressPhase::Fetching, total } => {
                let bar = new_bar(Some(*total as u64));
                bar.set_message(ProgressPhase::Fetching.label());
                self.replace(bar);
            }
            ProgressMessage::Started { phase, .. } => {
                let spinner = new_bar(None);
                spinner.set_message(phase.label());
                self.replace(spinner);
            }
            ProgressMessage::Progress { current, item, .. } => {
                if let Some(bar) = self.current.borrow().as_ref() {
                    bar.set_position(*current as u64);
                    if let Some(item) = item {
                        bar.set_message(format!("Fetched: {}", item));
                    }
                }
            }
            ProgressMessage::Skipped { item, reason } => {
                *self.skipped.borrow_mut() += 1;
                let line = format!("{} {} skipped: {}", Icons::WARN, item, reason);
                match self.current.borrow().as_ref() {
                    Some(bar) => bar.println(line.style(theme().caution.clone()).to_string()),
                    None => eprintln!("{}", line.style(theme().caution.clone())),
                }
            }
            ProgressMessage::Finished { .. } => {
                if let Some(bar) = self.current.borrow_mut().take() {
                    bar.finish_and_clear();
                }
            }
        }
    }

    fn replace(&self, bar: ProgressBar) {
        if let Some(old) = self.current.borrow_mut().replace(bar) {
            old.finish_and_clear();
        }
    }

    pub fn skipped(&self) -> usize {
        *self.skipped.borrow()
    }

    pub fn finish_with_summary(&self, packages: usize, edges: usize) {
        if let Some(bar) = self.current.borrow_mut().take() {
            bar.finish_and_clear();
        }
        println!();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().ok.clone()),
            format!("Complete in {}", HumanDuration(self.started.elapsed())).style(theme().ok.clone())
        );
        println!(
            "  {} {}  {} {}",
            Icons::PACKAGE.style(theme().count.clone()),
            packages,
            Icons::LINK.style(theme().count.clone()),
            edges
        );
        if self.skipped() > 0 {
            println!(
                "  {} {} skipped",
                Icons::WARN.style(theme().caution.clone()),
                self.skipped()
            );
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

fn new_bar(total: Option<u64>) -> ProgressBar {
    if !console::Term::stdout().is_term() {
        return ProgressBar::hidden();
    }
    match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}") {
                bar.set_style(style);
            }
            bar
        }
        None => {
            let spinner = ProgressBar::new_spinner();
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        }
    }
}
