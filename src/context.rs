//! Search-driver context
//!
//! The generational loop that owns the population is external to this crate.
//! It shares its counters with the operators through a [`SearchContext`]
//! passed by reference into every call. Generation counts and population
//! sizes are read-only for operators; the success counter is the one field
//! operators write, and only to reset it after consuming it.

use std::path::{Path, PathBuf};

use crate::config::RunConfiguration;

/// Counters and run settings shared between the driver and the operators
#[derive(Clone, Debug)]
pub struct SearchContext {
    current_generation: usize,
    generation_limit: usize,
    offspring_pop_size: usize,
    success_counter: usize,
    home_folder: PathBuf,
    configuration: RunConfiguration,
}

impl SearchContext {
    /// Create a context for a run starting at generation 0
    pub fn new(generation_limit: usize, offspring_pop_size: usize) -> Self {
        Self {
            current_generation: 0,
            generation_limit,
            offspring_pop_size,
            success_counter: 0,
            home_folder: PathBuf::from("."),
            configuration: RunConfiguration::default(),
        }
    }

    /// Set the folder that relative file parameters resolve against
    pub fn with_home_folder(mut self, home_folder: impl Into<PathBuf>) -> Self {
        self.home_folder = home_folder.into();
        self
    }

    /// Attach the run-level configuration
    pub fn with_configuration(mut self, configuration: RunConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Start from a later generation, as when continuing an earlier run
    pub fn starting_at(mut self, generation: usize) -> Self {
        self.current_generation = generation;
        self
    }

    /// Generation currently being produced (0-based)
    pub fn current_generation(&self) -> usize {
        self.current_generation
    }

    /// Total number of generations in the run
    pub fn generation_limit(&self) -> usize {
        self.generation_limit
    }

    /// Offspring produced per generation
    pub fn offspring_pop_size(&self) -> usize {
        self.offspring_pop_size
    }

    /// Successful offspring counted since the last reset
    pub fn success_counter(&self) -> usize {
        self.success_counter
    }

    /// Run-level configuration
    pub fn configuration(&self) -> &RunConfiguration {
        &self.configuration
    }

    /// Folder relative paths are resolved against
    pub fn home_folder(&self) -> &Path {
        &self.home_folder
    }

    /// Resolve a file parameter against the home folder
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.home_folder.join(path)
        }
    }

    /// Driver: move on to the next generation
    pub fn advance_generation(&mut self) {
        self.current_generation += 1;
    }

    /// Driver: count one offspring that improved on its parent
    pub fn record_success(&mut self) {
        self.success_counter += 1;
    }

    /// Driver: count several successful offspring at once
    pub fn record_successes(&mut self, count: usize) {
        self.success_counter += count;
    }

    /// Read the success counter and reset it to zero
    pub fn take_success_counter(&mut self) -> usize {
        std::mem::take(&mut self.success_counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut ctx = SearchContext::new(100, 10);
        assert_eq!(ctx.current_generation(), 0);
        ctx.advance_generation();
        ctx.record_success();
        ctx.record_successes(3);
        assert_eq!(ctx.current_generation(), 1);
        assert_eq!(ctx.success_counter(), 4);
        assert_eq!(ctx.take_success_counter(), 4);
        assert_eq!(ctx.success_counter(), 0);
    }

    #[test]
    fn test_resolve_path() {
        let ctx = SearchContext::new(10, 1).with_home_folder("/runs/exp1");
        assert_eq!(
            ctx.resolve_path("tables/corr.csv"),
            PathBuf::from("/runs/exp1/tables/corr.csv")
        );
        assert_eq!(ctx.resolve_path("/abs/corr.csv"), PathBuf::from("/abs/corr.csv"));
    }

    #[test]
    fn test_starting_at() {
        let ctx = SearchContext::new(10, 1).starting_at(4);
        assert_eq!(ctx.current_generation(), 4);
    }
}
