//! Recording tool runner shared by the stage tests.

use std::cell::RefCell;
use std::path::PathBuf;

use crate::tool::{ToolCommand, ToolError, ToolRunner};

type Predicate = Box<dyn Fn(&ToolCommand) -> bool>;

/// Records every command; fails the ones matching `fail_when`, and on success
/// creates the file named by the argument at `output_arg` (stripping a `-o=`
/// prefix) so tests can observe artifacts.
pub(crate) struct RecordingRunner {
    pub calls: RefCell<Vec<ToolCommand>>,
    fail_when: Predicate,
    output_arg: Option<usize>,
}

impl RecordingRunner {
    pub fn succeeding() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_when: Box::new(|_| false),
            output_arg: None,
        }
    }

    pub fn failing_when(pred: impl Fn(&ToolCommand) -> bool + 'static) -> Self {
        Self {
            fail_when: Box::new(pred),
            ..Self::succeeding()
        }
    }

    pub fn writing_output_arg(mut self, index: usize) -> Self {
        self.output_arg = Some(index);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, cmd: &ToolCommand) -> Result<(), ToolError> {
        self.calls.borrow_mut().push(cmd.clone());
        if (self.fail_when)(cmd) {
            return Err(ToolError::Failed {
                program: cmd.program().display().to_string(),
                code: Some(1),
            });
        }
        if let Some(arg) = self.output_arg.and_then(|i| cmd.args_lossy().get(i).cloned()) {
            let path = PathBuf::from(arg.trim_start_matches("-o="));
            std::fs::write(&path, b"output").map_err(ToolError::io(&path))?;
        }
        Ok(())
    }
}
