/// Pipeline stage a progress message refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressPhase {
    Listing,
    Fetching,
    Loading,
}

impl ProgressPhase {
    pub fn label(&self) -> &'static str {
        match self {
            ProgressPhase::Listing => "Scraping search pages",
            ProgressPhase::Fetching => "Fetching package metadata",
            ProgressPhase::Loading => "Loading graph",
        }
    }
}

#[derive(Clone, Debug)]
pub enum ProgressMessage {
    Started {
        phase: ProgressPhase,
        total: usize,
    },
    Progress {
        phase: ProgressPhase,
        current: usize,
        item: Option<String>,
    },
    Finished {
        phase: ProgressPhase,
    },
    Skipped {
        item: String,
        reason: String,
    },
}
