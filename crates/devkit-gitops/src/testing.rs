//! Scripted executor shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use devkit_core::Result;

use crate::executor::{ExecOutput, VcsExecutor};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

/// Replays canned outputs in order and records every call it receives.
/// Once the script is exhausted it answers with an empty success.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    replies: RefCell<VecDeque<ExecOutput>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedExecutor {
    pub fn new(replies: impl IntoIterator<Item = ExecOutput>) -> Self {
        Self {
            replies: RefCell::new(replies.into_iter().collect()),
            calls: RefCell::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Argument vectors joined with spaces, for compact assertions.
    pub fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.args.join(" ")).collect()
    }
}

impl VcsExecutor for ScriptedExecutor {
    fn execute(&self, args: &[&str], stdin: Option<&str>) -> Result<ExecOutput> {
        self.calls.borrow_mut().push(Call {
            args: args.iter().map(|a| a.to_string()).collect(),
            stdin: stdin.map(str::to_string),
        });
        Ok(self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| ExecOutput::ok("")))
    }
}
