//! Inspection service: resolves a pattern library and runs the selector

use super::{InspectionOutcome, PatternRequest};
use crate::config::InspectionConfig;
use crate::matching::{PatternSelector, SelectionReport};
use crate::store::PatternStore;
use crate::Result;
use anyhow::{bail, Context};
use patcheck_core::{
    Detection, MatchError, MatchResult, PatternCatalog, PatternLibrary, PatternLoader, Slot,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Entry point for pattern checks against the shared catalog
pub struct InspectionService {
    config: InspectionConfig,
    selector: PatternSelector,
    store: Arc<PatternStore>,
}

impl InspectionService {
    /// Create a service around an already loaded catalog
    pub fn new(config: InspectionConfig, catalog: PatternCatalog) -> Result<Self> {
        validate_default_key(&config, &catalog)?;

        Ok(Self {
            selector: PatternSelector::new(config.matching.box_format),
            store: Arc::new(PatternStore::new(catalog)),
            config,
        })
    }

    /// Load the catalog named by the configuration. Without a configured
    /// path the catalog is empty and only inline patterns can be checked.
    pub fn from_config(config: InspectionConfig) -> Result<Self> {
        let catalog = match &config.patterns.path {
            Some(path) => PatternLoader::new()
                .load_catalog(path)
                .with_context(|| format!("Failed to load patterns from {:?}", path))?,
            None => {
                warn!("No pattern path configured, only inline patterns can be checked");
                PatternCatalog::new()
            }
        };

        Self::new(config, catalog)
    }

    pub fn config(&self) -> &InspectionConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<PatternStore> {
        &self.store
    }

    /// Reload the catalog from the configured path and swap it in whole
    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.config.patterns.path else {
            bail!("No pattern path configured to reload from");
        };

        let catalog = PatternLoader::new()
            .load_catalog(path)
            .with_context(|| format!("Failed to reload patterns from {:?}", path))?;
        validate_default_key(&self.config, &catalog)?;

        self.store.replace(catalog);
        info!("Patterns reloaded from {:?}", path);
        Ok(())
    }

    /// Select the best pattern of the library stored under `pattern_key`,
    /// or of the default library.
    pub fn select(&self, detections: &[Detection], pattern_key: Option<&str>) -> Result<SelectionReport> {
        let catalog = self.store.snapshot();
        let library = self.resolve_library(&catalog, pattern_key)?;
        Ok(self.selector.select(detections, library))
    }

    /// Select the best pattern of an explicitly given library
    pub fn select_in(&self, detections: &[Detection], library: &PatternLibrary) -> SelectionReport {
        self.selector.select(detections, library)
    }

    /// Handle a pattern check request
    pub fn inspect(&self, request: PatternRequest) -> Result<InspectionOutcome> {
        let detections = Detection::from_parts(&request.coordinates, &request.class_ids)?;

        let report = match request.pattern {
            Some(inline) => {
                let library = inline.into_library()?;
                self.select_in(&detections, &library)
            }
            None => self.select(&detections, request.pattern_key.as_deref())?,
        };

        let outcome = self.outcome(report.result);
        if outcome.decision {
            info!("All objects found for pattern '{}'", outcome.pattern_name);
        } else if !outcome.pattern_name.is_empty() {
            let found = outcome.slot_results.iter().filter(|&&found| found).count();
            warn!(
                "Not all objects found, best pattern '{}' with {}/{} slots",
                outcome.pattern_name,
                found,
                outcome.slot_results.len()
            );
        } else {
            info!("No pattern matched the {} detection(s)", detections.len());
        }

        Ok(outcome)
    }

    /// Check many detection sets against one snapshot of the same library
    pub fn inspect_batch(
        &self,
        batches: &[Vec<Detection>],
        pattern_key: Option<&str>,
    ) -> Result<Vec<MatchResult>> {
        let catalog = self.store.snapshot();
        let library = self.resolve_library(&catalog, pattern_key)?;

        #[cfg(feature = "parallel")]
        let results = {
            use rayon::prelude::*;
            batches
                .par_iter()
                .map(|detections| self.selector.select(detections, library).result)
                .collect::<Vec<_>>()
        };

        #[cfg(not(feature = "parallel"))]
        let results = batches
            .iter()
            .map(|detections| self.selector.select(detections, library).result)
            .collect::<Vec<_>>();

        debug!("inspect_batch(): {} detection set(s) checked", results.len());
        Ok(results)
    }

    /// Unsatisfied slots of an outcome produced from the catalog
    pub fn failed_slots(&self, outcome: &InspectionOutcome, pattern_key: Option<&str>) -> Result<Vec<Slot>> {
        let catalog = self.store.snapshot();
        let library = self.resolve_library(&catalog, pattern_key)?;
        Ok(outcome.failed_slots(library))
    }

    pub fn outcome(&self, result: MatchResult) -> InspectionOutcome {
        InspectionOutcome::from_result(result, self.config.matching.min_slots_for_decision)
    }

    fn resolve_library<'a>(
        &self,
        catalog: &'a PatternCatalog,
        pattern_key: Option<&str>,
    ) -> std::result::Result<&'a PatternLibrary, MatchError> {
        match pattern_key.or(self.config.patterns.default_key.as_deref()) {
            Some(key) => catalog.get(key),
            None => {
                let key = catalog.keys().next().ok_or(MatchError::NoDefaultPattern)?;
                catalog.get(key)
            }
        }
    }
}

fn validate_default_key(config: &InspectionConfig, catalog: &PatternCatalog) -> Result<()> {
    let configured = config.patterns.default_key.as_deref();
    if catalog.is_empty() && configured.is_none() {
        return Ok(());
    }

    let key = catalog.resolve_default_key(configured)?;
    debug!("Default pattern key '{}' of {} librar(ies)", key, catalog.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use patcheck_core::{Pattern, Slot};
    use std::fs;

    const TOL: [f64; 4] = [0.05; 4];

    fn rotor_catalog() -> PatternCatalog {
        let rotor = PatternLibrary::from_patterns(vec![
            Pattern::new(
                "two_magnets",
                vec![
                    Slot::point(0, [0.25, 0.5, 0.1, 0.1], TOL),
                    Slot::point(0, [0.75, 0.5, 0.1, 0.1], TOL),
                ],
            ),
            Pattern::new("marker", vec![Slot::point(2, [0.5, 0.2, 0.1, 0.1], TOL)]),
        ])
        .unwrap();

        let spacer = PatternLibrary::from_patterns(vec![Pattern::new(
            "spacer",
            vec![Slot::point(1, [0.5, 0.5, 0.2, 0.2], TOL)],
        )])
        .unwrap();

        let mut catalog = PatternCatalog::new();
        catalog.insert("rotor", rotor);
        catalog.insert("spacer", spacer);
        catalog
    }

    fn request(coordinates: Vec<Vec<f64>>, class_ids: Vec<u32>) -> PatternRequest {
        PatternRequest {
            coordinates,
            class_ids,
            pattern_key: None,
            pattern: None,
        }
    }

    #[test]
    fn test_inspect_with_default_key() -> Result<()> {
        let service = InspectionService::new(InspectionConfig::default(), rotor_catalog())?;
        let outcome = service.inspect(request(
            vec![vec![0.25, 0.5, 0.1, 0.1], vec![0.75, 0.5, 0.1, 0.1]],
            vec![0, 0],
        ))?;

        assert!(outcome.decision);
        assert_eq!(outcome.pattern_name, "two_magnets");
        assert_eq!(outcome.slot_results, vec![true, true]);
        Ok(())
    }

    #[test]
    fn test_inspect_with_explicit_key() -> Result<()> {
        let service = InspectionService::new(InspectionConfig::default(), rotor_catalog())?;
        let mut req = request(vec![vec![0.5, 0.5, 0.2, 0.2]], vec![1]);
        req.pattern_key = Some("spacer".to_string());

        let outcome = service.inspect(req)?;
        assert_eq!(outcome.pattern_name, "spacer");
        assert_eq!(outcome.slot_results, vec![true]);
        assert!(!outcome.decision);
        Ok(())
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let service = InspectionService::new(InspectionConfig::default(), rotor_catalog()).unwrap();
        let mut req = request(vec![], vec![]);
        req.pattern_key = Some("stator".to_string());

        let err = service.inspect(req).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MatchError>(),
            Some(MatchError::UnknownPatternKey { key, .. }) if key == "stator"
        ));
    }

    #[test]
    fn test_mismatched_lists_are_an_error() {
        let service = InspectionService::new(InspectionConfig::default(), rotor_catalog()).unwrap();
        let err = service
            .inspect(request(vec![vec![0.1, 0.1, 0.2, 0.2]], vec![]))
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<MatchError>(),
            Some(&MatchError::LengthMismatch { boxes: 1, class_ids: 0 })
        );
    }

    #[test]
    fn test_missing_default_key_fails_fast() {
        let mut config = InspectionConfig::default();
        config.patterns.default_key = Some("stator".to_string());

        let err = InspectionService::new(config, rotor_catalog()).err().unwrap();
        assert_eq!(
            err.downcast_ref::<MatchError>(),
            Some(&MatchError::DefaultPatternMissing { key: "stator".to_string() })
        );
    }

    #[test]
    fn test_inline_pattern_without_catalog() -> Result<()> {
        let service = InspectionService::new(InspectionConfig::default(), PatternCatalog::new())?;
        let mut req = request(vec![vec![0.35, 0.35, 0.65, 0.65]], vec![1]);
        req.pattern = Some(serde_json::from_str(
            r#"[{"class_id": 1, "inner": [0.4, 0.4, 0.6, 0.6], "outer": [0.3, 0.3, 0.7, 0.7]}]"#,
        )?);

        let outcome = service.inspect(req)?;
        assert_eq!(outcome.pattern_name, "inline");
        assert_eq!(outcome.slot_results, vec![true]);
        Ok(())
    }

    #[test]
    fn test_empty_catalog_without_inline_pattern() {
        let service = InspectionService::new(InspectionConfig::default(), PatternCatalog::new()).unwrap();
        let err = service.inspect(request(vec![], vec![])).unwrap_err();
        assert_eq!(err.downcast_ref::<MatchError>(), Some(&MatchError::NoDefaultPattern));
    }

    #[test]
    fn test_min_slots_for_decision() -> Result<()> {
        let mut config = InspectionConfig::default();
        config.matching.min_slots_for_decision = 1;
        let service = InspectionService::new(config, rotor_catalog())?;

        let mut req = request(vec![vec![0.5, 0.5, 0.2, 0.2]], vec![1]);
        req.pattern_key = Some("spacer".to_string());
        assert!(service.inspect(req)?.decision);
        Ok(())
    }

    #[test]
    fn test_failed_slots() -> Result<()> {
        let service = InspectionService::new(InspectionConfig::default(), rotor_catalog())?;
        let outcome = service.inspect(request(vec![vec![0.25, 0.5, 0.1, 0.1]], vec![0]))?;

        assert_eq!(outcome.slot_results, vec![true, false]);
        assert_eq!(
            service.failed_slots(&outcome, None)?,
            vec![Slot::point(0, [0.75, 0.5, 0.1, 0.1], TOL)]
        );
        Ok(())
    }

    #[test]
    fn test_inspect_batch() -> Result<()> {
        let service = InspectionService::new(InspectionConfig::default(), rotor_catalog())?;
        let batches = vec![
            vec![Detection::new(0, [0.25, 0.5, 0.1, 0.1])],
            vec![Detection::new(2, [0.5, 0.2, 0.1, 0.1])],
            vec![],
        ];

        let results = service.inspect_batch(&batches, Some("rotor"))?;
        assert_eq!(results[0], MatchResult::new("two_magnets", vec![true, false]));
        assert_eq!(results[1], MatchResult::new("marker", vec![true]));
        assert_eq!(results[2], MatchResult::empty());
        Ok(())
    }

    #[test]
    fn test_reload_swaps_catalog() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("rotor.json"),
            r#"{"old": [{"class_id": 0, "position": [0.5, 0.5, 0.1, 0.1], "tolerance": [0.05, 0.05, 0.05, 0.05]}]}"#,
        )?;

        let mut config = InspectionConfig::default();
        config.patterns.path = Some(dir.path().to_path_buf());
        let service = InspectionService::from_config(config)?;

        let detections = vec![Detection::new(0, [0.5, 0.5, 0.1, 0.1])];
        assert_eq!(service.select(&detections, None)?.result.pattern_name, "old");

        let before = service.store().snapshot();
        fs::write(
            dir.path().join("rotor.json"),
            r#"{"new": [{"class_id": 0, "position": [0.5, 0.5, 0.1, 0.1], "tolerance": [0.05, 0.05, 0.05, 0.05]}]}"#,
        )?;
        service.reload()?;

        assert_eq!(service.select(&detections, None)?.result.pattern_name, "new");
        assert!(before.get("rotor")?.get("old").is_some());
        Ok(())
    }
}
