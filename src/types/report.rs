//! Bug report input record

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BugCategory {
    Ui,
    Functionality,
    Performance,
    Data,
    #[default]
    Other,
}

impl std::fmt::Display for BugCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BugCategory::Ui => write!(f, "ui"),
            BugCategory::Functionality => write!(f, "functionality"),
            BugCategory::Performance => write!(f, "performance"),
            BugCategory::Data => write!(f, "data"),
            BugCategory::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for BugCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ui" => Ok(BugCategory::Ui),
            "functionality" => Ok(BugCategory::Functionality),
            "performance" => Ok(BugCategory::Performance),
            "data" => Ok(BugCategory::Data),
            "other" => Ok(BugCategory::Other),
            _ => Err(format!(
                "Unknown bug category: {}. Valid values: ui, functionality, performance, data, other",
                s
            )),
        }
    }
}

/// User-filed bug report. Owned by the caller; the pipeline only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugReport {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub category: BugCategory,
    #[serde(default)]
    pub page_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_report() {
        let report: BugReport = serde_json::from_str(
            r#"{
                "id": "bug-42",
                "title": "Check-in button does nothing",
                "description": "Tapping check-in on the dashboard has no effect",
                "severity": "high",
                "category": "functionality",
                "pageUrl": "https://app.example.com/dashboard",
                "screenshotRef": "/api/media/bugs/42.png"
            }"#,
        )
        .unwrap();

        assert_eq!(report.severity, Severity::High);
        assert_eq!(report.category, BugCategory::Functionality);
        assert_eq!(report.page_url, "https://app.example.com/dashboard");
        assert_eq!(
            report.screenshot_ref.as_deref(),
            Some("/api/media/bugs/42.png")
        );
        assert!(report.video_ref.is_none());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("UI".parse::<BugCategory>().unwrap(), BugCategory::Ui);
        assert_eq!("data".parse::<BugCategory>().unwrap(), BugCategory::Data);
        assert!("network".parse::<BugCategory>().is_err());
    }
}
