use anyhow::Result;
use log::debug;

use super::binder::{ChartGroup, ChartKind, ChartSeriesBundle};
use crate::render::Renderer;

/// Owns the data behind every chart of a session.
///
/// Charts are created once, empty, and afterwards only ever replaced as a
/// whole bundle, so a reader never sees series from two different runs.
#[derive(Debug)]
pub struct ChartRegistry {
    bundle: ChartSeriesBundle,
    /// Sequence number of the run currently displayed, if any
    seq: Option<u64>,
    revision: u64,
}

impl ChartRegistry {
    pub fn create() -> Self {
        Self {
            bundle: ChartSeriesBundle::empty(),
            seq: None,
            revision: 0,
        }
    }

    /// Replaces all series with `bundle` and pushes them to the renderer
    pub fn update(
        &mut self,
        seq: u64,
        bundle: ChartSeriesBundle,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        self.bundle = bundle;
        self.seq = Some(seq);
        self.revision += 1;

        debug!(
            "Chart registry at revision {} (run {seq}, {} samples)",
            self.revision,
            self.bundle.position.len()
        );

        renderer.update_series(seq, &self.bundle)
    }

    pub fn bundle(&self) -> &ChartSeriesBundle {
        &self.bundle
    }

    pub fn chart(&self, kind: ChartKind) -> &ChartGroup {
        self.bundle.get(kind)
    }

    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    /// Number of updates applied since creation
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for ChartRegistry {
    fn default() -> Self {
        Self::create()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{charts::bind, render::testing::RecordingRenderer, results::testing};

    #[test]
    fn test_create_empty() {
        let registry = ChartRegistry::create();

        assert_eq!(registry.revision(), 0);
        assert_eq!(registry.seq(), None);
        assert!(registry.bundle().is_empty());
    }

    #[test]
    fn test_update_replaces_everything() {
        let mut renderer = RecordingRenderer::default();
        let mut registry = ChartRegistry::create();

        registry
            .update(1, bind(&testing::result(20)), &mut renderer)
            .unwrap();
        assert_eq!(registry.chart(ChartKind::Control).len(), 20);

        // A shorter run must not leave any samples of the previous one behind
        let short = bind(&testing::result(3));
        registry.update(2, short.clone(), &mut renderer).unwrap();

        assert_eq!(registry.revision(), 2);
        assert_eq!(registry.seq(), Some(2));
        assert_eq!(registry.bundle(), &short);
        for group in registry.bundle().groups() {
            assert_eq!(group.len(), 3);
            assert!(group.series.iter().all(|s| s.values.len() == 3));
        }

        assert_eq!(renderer.series_updates, vec![(1, 20), (2, 3)]);
    }
}
