use super::{Command, CommandError, CommandResult};
use crate::store::ElementStore;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Manages the history of executed commands for undo/redo functionality.
///
/// Both stacks hold *reverting* commands: undo runs the top of the undo stack
/// and pushes whatever reverts that onto the redo stack, and vice versa.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    /// Commands that revert the most recent changes
    undo_stack: Vec<Command>,
    /// Commands that reapply undone changes
    redo_stack: Vec<Command>,
    limit: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    /// Creates a new empty command history
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Execute a command and record it if it changed the store.
    pub fn execute(&mut self, command: Command, store: &mut ElementStore) -> bool {
        let Some(inverse) = command.execute(store) else {
            log::debug!("Command had no effect: {}", command.label());
            return false;
        };

        self.undo_stack.push(inverse);
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear(); // Clear redo stack when new command is executed
        true
    }

    /// Undo the last executed command
    pub fn undo(&mut self, store: &mut ElementStore) -> CommandResult {
        let inverse = self.undo_stack.pop().ok_or(CommandError::NothingToUndo)?;
        let redo = inverse
            .execute(store)
            .ok_or_else(|| CommandError::NoLongerApplies(inverse.label()))?;
        self.redo_stack.push(redo);
        Ok(())
    }

    /// Redo the last undone command
    pub fn redo(&mut self, store: &mut ElementStore) -> CommandResult {
        let command = self.redo_stack.pop().ok_or(CommandError::NothingToRedo)?;
        let inverse = command
            .execute(store)
            .ok_or_else(|| CommandError::NoLongerApplies(command.label()))?;
        self.undo_stack.push(inverse);
        Ok(())
    }

    /// Returns true if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_stack(&self) -> &[Command] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[Command] {
        &self.redo_stack
    }

    /// Clear the command history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
