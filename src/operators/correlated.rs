//! Correlation-guided feature moves
//!
//! Both operators make one deterministic move per call using a prebuilt
//! [`CorrelationTable`]: add the clear slot least correlated with the current
//! selection, or drop the selected slot most correlated with the rest.

use std::sync::Arc;

use rand::Rng;

use crate::config::{CorrelationTableConfig, OperatorParameter};
use crate::context::SearchContext;
use crate::correlation::io::load_correlation_table;
use crate::correlation::table::CorrelationTable;
use crate::error::{EvoResult, GenomeError};
use crate::genome::prelude::*;
use crate::operators::traits::{ConfigurableOperator, MutationOperator};

fn load_shared_table(params: &[OperatorParameter], context: &SearchContext) -> EvoResult<Arc<CorrelationTable>> {
    let config = CorrelationTableConfig::from_parameters(params, context)?;
    Ok(Arc::new(load_correlation_table(&config)?))
}

fn check_table(table: &CorrelationTable, mask: &FeatureMask) -> Result<(), GenomeError> {
    if mask.len() == table.size() {
        Ok(())
    } else {
        Err(GenomeError::DimensionMismatch {
            expected: table.size(),
            actual: mask.len(),
        })
    }
}

/// Selects the clear slot with the lowest mean correlation to the selection
#[derive(Clone, Debug)]
pub struct AddLeastCorrelatedFeature {
    table: Arc<CorrelationTable>,
}

impl AddLeastCorrelatedFeature {
    /// Use an already built table
    pub fn with_table(table: Arc<CorrelationTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<CorrelationTable> {
        &self.table
    }

    /// Slot the next call would set, if any slot is clear
    ///
    /// Ties go to the lowest index.
    pub fn candidate(&self, mask: &FeatureMask) -> Option<usize> {
        let selected = mask.selected_indices();
        let mut best: Option<(usize, f64)> = None;
        for i in mask.unselected_indices() {
            let mean = self.table.mean_correlation(i, &selected).unwrap_or(0.0);
            if best.map_or(true, |(_, lowest)| mean < lowest) {
                best = Some((i, mean));
            }
        }
        best.map(|(i, _)| i)
    }
}

impl ConfigurableOperator for AddLeastCorrelatedFeature {
    fn configure(params: &[OperatorParameter], context: &SearchContext) -> EvoResult<Self> {
        Ok(Self::with_table(load_shared_table(params, context)?))
    }
}

impl MutationOperator for AddLeastCorrelatedFeature {
    fn name(&self) -> &'static str {
        "AddLeastCorrelatedFeature"
    }

    fn mutate<R: Rng>(
        &mut self,
        representation: &mut Representation,
        _context: &mut SearchContext,
        _rng: &mut R,
    ) -> EvoResult<()> {
        let mask = FeatureMask::extract(representation)?;
        check_table(&self.table, mask)?;
        log::debug!("Adding least correlated feature, current value: {}", mask);

        match self.candidate(mask) {
            Some(index) => {
                mask.set(index, true);
                log::debug!("Added feature {}, mutated value: {}", index, mask);
            }
            None => log::debug!("Mutation not possible: all features are already selected"),
        }
        Ok(())
    }
}

/// Clears the selected slot with the highest mean correlation to the others
#[derive(Clone, Debug)]
pub struct RemoveMostCorrelatedFeature {
    table: Arc<CorrelationTable>,
}

impl RemoveMostCorrelatedFeature {
    /// Use an already built table
    pub fn with_table(table: Arc<CorrelationTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<CorrelationTable> {
        &self.table
    }

    /// Slot the next call would clear, if at least two are selected
    ///
    /// Ties go to the lowest index.
    pub fn candidate(&self, mask: &FeatureMask) -> Option<usize> {
        let selected = mask.selected_indices();
        if selected.len() < 2 {
            return None;
        }
        let mut best: Option<(usize, f64)> = None;
        for &i in &selected {
            let mean = self.table.mean_correlation(i, &selected).unwrap_or(0.0);
            if best.map_or(true, |(_, highest)| mean > highest) {
                best = Some((i, mean));
            }
        }
        best.map(|(i, _)| i)
    }
}

impl ConfigurableOperator for RemoveMostCorrelatedFeature {
    fn configure(params: &[OperatorParameter], context: &SearchContext) -> EvoResult<Self> {
        Ok(Self::with_table(load_shared_table(params, context)?))
    }
}

impl MutationOperator for RemoveMostCorrelatedFeature {
    fn name(&self) -> &'static str {
        "RemoveMostCorrelatedFeature"
    }

    fn mutate<R: Rng>(
        &mut self,
        representation: &mut Representation,
        _context: &mut SearchContext,
        _rng: &mut R,
    ) -> EvoResult<()> {
        let mask = FeatureMask::extract(representation)?;
        check_table(&self.table, mask)?;
        log::debug!("Removing most correlated feature, current value: {}", mask);

        match self.candidate(mask) {
            Some(index) => {
                mask.set(index, false);
                log::debug!("Removed feature {}, mutated value: {}", index, mask);
            }
            None => log::debug!("Mutation not possible: only one feature is selected"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::table::{CoefficientRecord, FeatureTable};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table() -> Arc<CorrelationTable> {
        let features = FeatureTable::from_pairs([(1, 1), (2, 1), (3, 1)]).unwrap();
        let records = vec![
            CoefficientRecord::new((1, 1), (2, 1), 0.8),
            CoefficientRecord::new((1, 1), (3, 1), 0.1),
            CoefficientRecord::new((2, 1), (3, 1), 0.3),
        ];
        Arc::new(CorrelationTable::build(&features, &records, 1).unwrap())
    }

    fn run<O: MutationOperator>(op: &mut O, bits: &[bool]) -> EvoResult<Vec<bool>> {
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = SearchContext::new(10, 1);
        let mut repr = Representation::from(FeatureMask::new(bits.to_vec()).unwrap());
        op.mutate(&mut repr, &mut ctx, &mut rng)?;
        Ok(repr.as_mask().unwrap().bits().to_vec())
    }

    #[test]
    fn test_add_picks_least_correlated() {
        let mut op = AddLeastCorrelatedFeature::with_table(table());
        assert_eq!(run(&mut op, &[true, true, false]).unwrap(), vec![true, true, true]);
        // mean to {1}: slot 0 -> 0.8, slot 2 -> 0.3
        assert_eq!(run(&mut op, &[false, true, false]).unwrap(), vec![false, true, true]);
    }

    #[test]
    fn test_add_on_full_mask_is_noop() {
        let mut op = AddLeastCorrelatedFeature::with_table(table());
        assert_eq!(run(&mut op, &[true, true, true]).unwrap(), vec![true, true, true]);
    }

    #[test]
    fn test_add_tie_takes_first_index() {
        let mut op = AddLeastCorrelatedFeature::with_table(Arc::new(CorrelationTable::zeros(4)));
        assert_eq!(
            run(&mut op, &[false, true, false, false]).unwrap(),
            vec![true, true, false, false]
        );
    }

    #[test]
    fn test_remove_picks_most_correlated() {
        let mut op = RemoveMostCorrelatedFeature::with_table(table());
        assert_eq!(run(&mut op, &[true, true, true]).unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_remove_single_feature_is_noop() {
        let mut op = RemoveMostCorrelatedFeature::with_table(table());
        assert_eq!(run(&mut op, &[false, false, true]).unwrap(), vec![false, false, true]);
    }

    #[test]
    fn test_operators_share_table() {
        let shared = table();
        let add = AddLeastCorrelatedFeature::with_table(Arc::clone(&shared));
        let remove = RemoveMostCorrelatedFeature::with_table(Arc::clone(&shared));
        assert!(Arc::ptr_eq(add.table(), remove.table()));
        assert_eq!(Arc::strong_count(&shared), 3);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let mut op = RemoveMostCorrelatedFeature::with_table(table());
        let result = run(&mut op, &[true, true]);
        assert!(result.is_err());
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = SearchContext::new(10, 1);
        let mut op = AddLeastCorrelatedFeature::with_table(table());
        let mut repr = Representation::from(BoundedInteger::new(3, 0, 5).unwrap());
        assert!(op.mutate(&mut repr, &mut ctx, &mut rng).is_err());
    }
}
