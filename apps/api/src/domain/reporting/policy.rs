use std::collections::HashMap;
use std::fmt;

use crate::domain::catalog::{Framework, UnitFamily};
use crate::domain::esg_metric::{EsgCategory, EsgMetric};
use crate::domain::report::ReportType;

type Predicate = Box<dyn Fn(&EsgMetric) -> bool + Send + Sync>;

/// Decides which metrics feed a generated report
///
/// A metric is selected when the predicate registered for the report type
/// accepts it and, if a framework is given, the framework scope accepts it
/// too. Report types or frameworks without a registered predicate accept
/// every metric.
pub struct SelectionPolicy {
    selectors: HashMap<ReportType, Predicate>,
    framework_scopes: HashMap<Framework, Predicate>,
}

impl SelectionPolicy {
    /// A policy that selects every metric
    pub fn permissive() -> Self {
        Self {
            selectors: HashMap::new(),
            framework_scopes: HashMap::new(),
        }
    }

    pub fn with_selector<F>(mut self, report_type: ReportType, predicate: F) -> Self
    where
        F: Fn(&EsgMetric) -> bool + Send + Sync + 'static,
    {
        self.selectors.insert(report_type, Box::new(predicate));
        self
    }

    pub fn with_framework_scope<F>(mut self, framework: Framework, predicate: F) -> Self
    where
        F: Fn(&EsgMetric) -> bool + Send + Sync + 'static,
    {
        self.framework_scopes.insert(framework, Box::new(predicate));
        self
    }

    pub fn selects(&self, report_type: ReportType, framework: Option<Framework>, metric: &EsgMetric) -> bool {
        let by_type = self
            .selectors
            .get(&report_type)
            .map_or(true, |predicate| predicate(metric));
        let by_framework = framework
            .and_then(|framework| self.framework_scopes.get(&framework))
            .map_or(true, |predicate| predicate(metric));
        by_type && by_framework
    }

    pub fn select<'a>(
        &self,
        report_type: ReportType,
        framework: Option<Framework>,
        metrics: impl IntoIterator<Item = &'a EsgMetric>,
    ) -> Vec<&'a EsgMetric> {
        metrics
            .into_iter()
            .filter(|metric| self.selects(report_type, framework, metric))
            .collect()
    }
}

impl Default for SelectionPolicy {
    /// Carbon footprints take carbon-unit metrics, diversity reports take
    /// SOCIAL and governance reports take GOVERNANCE. TCFD and CDP are
    /// climate frameworks and only see ENVIRONMENTAL metrics.
    fn default() -> Self {
        Self::permissive()
            .with_selector(ReportType::CarbonFootprint, |m| {
                m.unit_families().contains(&UnitFamily::Carbon)
            })
            .with_selector(ReportType::DiversityInclusion, |m| {
                m.category() == EsgCategory::Social
            })
            .with_selector(ReportType::Governance, |m| m.category() == EsgCategory::Governance)
            .with_framework_scope(Framework::Tcfd, |m| m.category() == EsgCategory::Environmental)
            .with_framework_scope(Framework::Cdp, |m| m.category() == EsgCategory::Environmental)
    }
}

impl fmt::Debug for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionPolicy")
            .field("selectors", &self.selectors.keys().collect::<Vec<_>>())
            .field("framework_scopes", &self.framework_scopes.keys().collect::<Vec<_>>())
            .finish()
    }
}
