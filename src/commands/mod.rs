//! Subcommand implementations
//!
//! Every command loads settings the same way, then hands off to a use case.

pub mod compile;
pub mod deploy;
pub mod drop;
pub mod status;
pub mod test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use microzoo::application::{CompileOptions, CompileResult, CompileUseCase, StoredStack};
use microzoo::config::{self, Settings};
use microzoo::domain::ports::StdioMode;
use microzoo::MicrozooError;

use crate::cli::GlobalArgs;
use crate::ui::output::print_config_warnings;

/// Resolved settings plus the global flags
pub struct Context {
    pub args: GlobalArgs,
    pub settings: Settings,
}

impl Context {
    pub fn load(args: GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let (settings, warnings) = config::load_or_default(args.config.as_deref(), &cwd)
            .map_err(MicrozooError::from)?;
        print_config_warnings(&warnings, args.json);
        Ok(Self { args, settings })
    }

    /// Tools write straight to the terminal only when asked to be chatty
    pub fn stdio(&self) -> StdioMode {
        if self.args.verbose > 0 && !self.args.json {
            StdioMode::Inherit
        } else {
            StdioMode::Capture
        }
    }

    pub fn compile(&self, source: &str) -> Result<CompileResult> {
        let options = CompileOptions::new(source)
            .with_source_dir(&self.args.source_dir)
            .with_components(&self.args.components)
            .with_out(&self.args.out)
            .with_target(self.args.target)
            .with_namespace(self.settings.namespace.clone());
        Ok(CompileUseCase::new().execute(&options)?)
    }

    pub fn stored(&self, source: &str) -> StoredStack {
        StoredStack::new(&self.args.out, source, self.args.target)
            .with_source_dir(&self.args.source_dir)
    }
}

/// Flag cleared by Ctrl-C
pub fn interrupt_flag() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))?;
    Ok(running)
}
