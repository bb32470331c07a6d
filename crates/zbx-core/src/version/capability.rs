//! Version-gated feature flags

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::tables::CAPABILITY_TABLE;
use super::VersionInfo;

/// A named feature a server generation may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    HostManagement,
    ItemManagement,
    TriggerManagement,
    TemplateManagement,
    EventAcknowledgment,
    ProblemView,
    TagSupport,
    ImprovedApi,
    AdvancedDashboard,
    SlaSupport,
    EnhancedSecurity,
    AdvancedAnalytics,
}

impl Capability {
    /// Snake-case name, as used in reports
    pub fn name(&self) -> &'static str {
        match self {
            Capability::HostManagement => "host_management",
            Capability::ItemManagement => "item_management",
            Capability::TriggerManagement => "trigger_management",
            Capability::TemplateManagement => "template_management",
            Capability::EventAcknowledgment => "event_acknowledgment",
            Capability::ProblemView => "problem_view",
            Capability::TagSupport => "tag_support",
            Capability::ImprovedApi => "improved_api",
            Capability::AdvancedDashboard => "advanced_dashboard",
            Capability::SlaSupport => "sla_support",
            Capability::EnhancedSecurity => "enhanced_security",
            Capability::AdvancedAnalytics => "advanced_analytics",
        }
    }

    /// Minimum `(major, minor)` supporting this capability
    pub fn minimum(&self) -> (u32, u32) {
        CAPABILITY_TABLE
            .iter()
            .find(|(capability, _)| capability == self)
            .map(|(_, since)| *since)
            .unwrap_or((0, 0))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of capabilities supported by one server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities(BTreeSet<Capability>);

impl Capabilities {
    /// Capabilities of `version` according to the capability table
    pub fn for_version(version: &VersionInfo) -> Self {
        Self(
            CAPABILITY_TABLE
                .iter()
                .filter(|(_, (major, minor))| version.at_least(*major, *minor))
                .map(|(capability, _)| *capability)
                .collect(),
        )
    }

    /// Capabilities every server has, used when the version is unknown
    pub fn baseline() -> Self {
        Self(
            CAPABILITY_TABLE
                .iter()
                .filter(|(_, since)| *since == (0, 0))
                .map(|(capability, _)| *capability)
                .collect(),
        )
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline() {
        let caps = Capabilities::baseline();
        assert_eq!(caps.len(), 5);
        assert!(caps.contains(Capability::EventAcknowledgment));
        assert!(!caps.contains(Capability::ProblemView));
    }

    #[test]
    fn test_version_thresholds() {
        let caps = VersionInfo::new(3, 4, 0).capabilities();
        assert_eq!(caps, Capabilities::baseline());

        let caps = VersionInfo::new(4, 0, 0).capabilities();
        assert!(caps.contains(Capability::ProblemView));
        assert!(caps.contains(Capability::TagSupport));
        assert!(!caps.contains(Capability::ImprovedApi));

        let caps = VersionInfo::new(4, 2, 0).capabilities();
        assert!(caps.contains(Capability::ImprovedApi));
        assert!(!caps.contains(Capability::SlaSupport));

        let caps = VersionInfo::new(5, 2, 0).capabilities();
        assert!(caps.contains(Capability::SlaSupport));
        assert!(caps.contains(Capability::EnhancedSecurity));
        assert!(!caps.contains(Capability::AdvancedAnalytics));

        let caps = VersionInfo::new(7, 0, 0).capabilities();
        assert!(caps.contains(Capability::AdvancedAnalytics));
        assert!(caps.contains(Capability::ImprovedApi));
    }

    #[test]
    fn test_minimum_lookup() {
        assert_eq!(Capability::SlaSupport.minimum(), (5, 0));
        assert_eq!(Capability::HostManagement.minimum(), (0, 0));
        assert_eq!(Capability::EnhancedSecurity.to_string(), "enhanced_security");
    }
}
