pub mod composer;
pub mod registry;
pub mod render;
pub mod scanner;
pub mod writeback;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::output;
use composer::CompositeItem;
use registry::Registry;
use render::Template;
use scanner::ScanState;
use writeback::FileWriteback;

/// State for one run: compiled patterns plus everything scanned so far.
pub struct Pipeline {
    config: Config,
    registry: Registry,
    state: ScanState,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let registry = Registry::build(&config.input)?;
        if registry.is_empty() {
            warn!("No input patterns configured, nothing will be extracted");
        } else {
            info!("Found {} regex patterns to scan", registry.len());
        }
        let state = ScanState::new(registry.len());
        Ok(Self {
            config,
            registry,
            state,
        })
    }

    pub fn scan_path(&mut self, path: &Path) -> Result<()> {
        scanner::scan_path(&self.registry, &mut self.state, path)?;
        Ok(())
    }

    /// Per-pattern record counts, in registry order.
    pub fn record_counts(&self) -> Vec<usize> {
        self.state.lists.iter().map(Vec::len).collect()
    }

    pub fn compose(&self) -> Vec<CompositeItem> {
        for (pattern, count) in self.registry.iter().zip(self.record_counts()) {
            info!("Found {} items matching regex {}", count, pattern.regex);
        }
        let items = composer::compose(&self.state.lists);
        let leftover: usize = self.state.lists.iter().map(|l| l.len() - items.len()).sum();
        info!("Composing {} output items ({} records left uncomposed)", items.len(), leftover);
        items
    }

    pub fn render(&self, items: &[CompositeItem]) -> String {
        self.template().render_all(items)
    }

    pub fn writeback_plan(&self) -> Vec<FileWriteback> {
        writeback::collect(&self.state.scanned, &self.state.lists)
    }

    fn template(&self) -> Template<'_> {
        Template {
            directives: &self.config.output,
            defaults: &self.config.defaults,
            replace: &self.config.replace,
        }
    }
}

pub struct RunOptions {
    pub out_dir: PathBuf,
    pub writeback: bool,
}

pub struct RunReport {
    pub result_path: PathBuf,
    pub items: usize,
    pub files_rewritten: usize,
}

/// Scan → compose → render → write result → rewrite inputs.
pub fn run(config: Config, files: &[PathBuf], opts: &RunOptions) -> Result<RunReport> {
    let mut pipeline = Pipeline::new(config)?;
    for path in files {
        pipeline.scan_path(path)?;
    }
    info!("Parsing complete");

    let items = pipeline.compose();
    let text = pipeline.render(&items);
    let result_path = output::write_result(&opts.out_dir, &text)?;
    info!("Wrote {} items to {}", items.len(), result_path.display());

    let plan = pipeline.writeback_plan();
    let files_rewritten = if opts.writeback {
        let stats = writeback::write_all(&plan);
        if stats.failed > 0 {
            warn!("{} input files could not be rewritten", stats.failed);
        }
        stats.written
    } else {
        info!("Writeback disabled, leaving {} input files untouched", plan.len());
        0
    };

    Ok(RunReport {
        result_path,
        items: items.len(),
        files_rewritten,
    })
}
