use std::path::PathBuf;

use clap::Parser;
use esim_dashboard::{DerivationPolicy, PageId, UnknownViewError};

/// Startup configuration, from the command line or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "esim-dashboard", version, about = "eSIM market analysis dashboard")]
pub struct DashboardConfig {
    /// Plan dataset (.csv, .json or .parquet)
    #[arg(env = "ESIM_DATASET", default_value = "eSimDB_Sep23.csv")]
    pub dataset: PathBuf,

    /// Fail the load if any plan has zero or missing capacity_MB
    #[arg(long)]
    pub reject_invalid_capacity: bool,

    /// Page shown at startup, e.g. "Provider Analysis"
    #[arg(long, default_value = "Country Analysis", value_parser = parse_page)]
    pub page: PageId,
}

fn parse_page(label: &str) -> Result<PageId, UnknownViewError> {
    label.parse()
}

impl DashboardConfig {
    pub fn derivation_policy(&self) -> DerivationPolicy {
        if self.reject_invalid_capacity {
            DerivationPolicy::Reject
        } else {
            DerivationPolicy::Exclude
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let config = DashboardConfig::try_parse_from([
            "esim-dashboard",
            "plans.parquet",
            "--reject-invalid-capacity",
            "--page",
            "All Plans",
        ])
        .unwrap();
        assert_eq!(config.dataset, PathBuf::from("plans.parquet"));
        assert_eq!(config.derivation_policy(), DerivationPolicy::Reject);
        assert_eq!(config.page, PageId::AllPlans);
    }

    #[test]
    fn test_unknown_page_rejected() {
        let err = DashboardConfig::try_parse_from(["esim-dashboard", "--page", "Trend Analysis"])
            .unwrap_err();
        assert!(err.to_string().contains("Trend Analysis"));
    }
}
