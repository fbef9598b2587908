use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Monitoring source a metric is collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricType {
    CloudWatch,
    Datadog,
    Mackerel,
    Pingdom,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetricType::CloudWatch => "CloudWatch",
            MetricType::Datadog => "Datadog",
            MetricType::Mackerel => "Mackerel",
            MetricType::Pingdom => "Pingdom",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cloudwatch" => Ok(MetricType::CloudWatch),
            "datadog" => Ok(MetricType::Datadog),
            "mackerel" => Ok(MetricType::Mackerel),
            "pingdom" => Ok(MetricType::Pingdom),
            _ => Err(format!("Unknown metric type: {}", s)),
        }
    }
}

/// Visibility of a metric on the public status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Visible,
    Hidden,
}

impl fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricStatus::Visible => write!(f, "visible"),
            MetricStatus::Hidden => write!(f, "hidden"),
        }
    }
}

impl FromStr for MetricStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visible" => Ok(MetricStatus::Visible),
            "hidden" => Ok(MetricStatus::Hidden),
            _ => Err(format!("Unknown metric status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_type_to_string() {
        assert_eq!(MetricType::CloudWatch.to_string(), "CloudWatch");
        assert_eq!(MetricType::Datadog.to_string(), "Datadog");
        assert_eq!(MetricType::Mackerel.to_string(), "Mackerel");
        assert_eq!(MetricType::Pingdom.to_string(), "Pingdom");
    }

    #[test]
    fn test_metric_type_from_str() {
        assert_eq!("cloudwatch".parse(), Ok(MetricType::CloudWatch));
        assert_eq!("Datadog".parse(), Ok(MetricType::Datadog));
        assert!("Nagios".parse::<MetricType>().is_err());
    }

    #[test]
    fn test_metric_status_is_case_sensitive() {
        assert_eq!("visible".parse(), Ok(MetricStatus::Visible));
        assert_eq!("hidden".parse(), Ok(MetricStatus::Hidden));
        assert!("Visible".parse::<MetricStatus>().is_err());
        assert!("deleted".parse::<MetricStatus>().is_err());
    }

    #[test]
    fn test_metric_status_serde() {
        let json = serde_json::to_string(&MetricStatus::Hidden).unwrap();
        assert_eq!(json, r#""hidden""#);
    }
}
