//! Stand-in for osmconvert, osmfilter and ogr2ogr.

use osmprep_core::tool::{ToolCommand, ToolError, ToolRunner};
use std::cell::RefCell;
use std::path::PathBuf;

/// Records every command and writes the artifact each real tool would write:
/// the `-o=` argument for osmconvert/osmfilter, the third argument for ogr2ogr.
/// Programs listed in `failing_programs` and ogr2ogr layers listed in
/// `failing_layers` exit with status 1 instead.
#[derive(Default)]
pub struct FakeTools {
    pub calls: RefCell<Vec<ToolCommand>>,
    pub failing_programs: Vec<&'static str>,
    pub failing_layers: Vec<&'static str>,
}

impl FakeTools {
    pub fn programs_called(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| c.program().display().to_string())
            .collect()
    }
}

impl ToolRunner for FakeTools {
    fn run(&self, cmd: &ToolCommand) -> Result<(), ToolError> {
        self.calls.borrow_mut().push(cmd.clone());
        let program = cmd.program().display().to_string();
        let args = cmd.args_lossy();
        let layer_fails = program == "ogr2ogr"
            && args
                .last()
                .is_some_and(|l| self.failing_layers.contains(&l.as_str()));
        if self.failing_programs.contains(&program.as_str()) || layer_fails {
            return Err(ToolError::Failed {
                program,
                code: Some(1),
            });
        }
        let output = if program == "ogr2ogr" {
            args.get(2).cloned()
        } else {
            args.iter()
                .find_map(|a| a.strip_prefix("-o=").map(str::to_string))
        };
        if let Some(out) = output {
            std::fs::write(PathBuf::from(out), b"artifact").expect("write fake artifact");
        }
        Ok(())
    }
}
