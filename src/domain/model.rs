use crate::utils::error::{AdapterError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Access-key / secret-key pair used to build client handles.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Rejects empty or whitespace-only keys.
    pub fn check(&self) -> Result<()> {
        if self.access_key_id.trim().is_empty() {
            return Err(AdapterError::InvalidCredentials {
                reason: "access key id is empty".to_string(),
            });
        }
        if self.secret_access_key.trim().is_empty() {
            return Err(AdapterError::InvalidCredentials {
                reason: "secret access key is empty".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Identifies one stored object. No versioning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Start is inclusive, end is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimePeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(AdapterError::ValidationError {
                message: format!("time period start {} must be before end {}", start, end),
            });
        }
        Ok(Self { start, end })
    }

    /// Parses two `YYYY-MM-DD` dates.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse = |field: &str, value: &str| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
                AdapterError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: format!("expected YYYY-MM-DD: {}", e),
                }
            })
        };
        Self::new(parse("start", start)?, parse("end", end)?)
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    /// Bounds as the billing provider expects them: plain dates, or
    /// midnight UTC timestamps for hourly queries.
    pub fn bounds(&self, granularity: Granularity) -> (String, String) {
        match granularity {
            Granularity::Hourly => (
                format!("{}T00:00:00Z", self.start_str()),
                format!("{}T00:00:00Z", self.end_str()),
            ),
            Granularity::Daily | Granularity::Monthly => (self.start_str(), self.end_str()),
        }
    }
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($screaming:literal, $wire:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name used on the wire by the billing provider.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $screaming,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AdapterError;

            fn from_str(s: &str) -> Result<Self> {
                $(
                    if s.eq_ignore_ascii_case($screaming) || s == $wire {
                        return Ok($name::$variant);
                    }
                )+
                Err(AdapterError::ValidationError {
                    message: format!("unknown {} '{}'", stringify!($name), s),
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

wire_enum! {
    /// Bucket size of returned cost rows.
    Granularity {
        Monthly => ("MONTHLY", "MONTHLY"),
        Daily => ("DAILY", "DAILY"),
        Hourly => ("HOURLY", "HOURLY"),
    }
}

wire_enum! {
    Metric {
        AmortizedCost => ("AMORTIZED_COST", "AmortizedCost"),
        BlendedCost => ("BLENDED_COST", "BlendedCost"),
        NetAmortizedCost => ("NET_AMORTIZED_COST", "NetAmortizedCost"),
        NetUnblendedCost => ("NET_UNBLENDED_COST", "NetUnblendedCost"),
        NormalizedUsageAmount => ("NORMALIZED_USAGE_AMOUNT", "NormalizedUsageAmount"),
        UnblendedCost => ("UNBLENDED_COST", "UnblendedCost"),
        UsageQuantity => ("USAGE_QUANTITY", "UsageQuantity"),
    }
}

wire_enum! {
    /// Billing attributes usable for grouping and filtering.
    Dimension {
        Az => ("AZ", "AZ"),
        BillingEntity => ("BILLING_ENTITY", "BILLING_ENTITY"),
        CacheEngine => ("CACHE_ENGINE", "CACHE_ENGINE"),
        DatabaseEngine => ("DATABASE_ENGINE", "DATABASE_ENGINE"),
        DeploymentOption => ("DEPLOYMENT_OPTION", "DEPLOYMENT_OPTION"),
        InstanceType => ("INSTANCE_TYPE", "INSTANCE_TYPE"),
        InstanceTypeFamily => ("INSTANCE_TYPE_FAMILY", "INSTANCE_TYPE_FAMILY"),
        LegalEntityName => ("LEGAL_ENTITY_NAME", "LEGAL_ENTITY_NAME"),
        LinkedAccount => ("LINKED_ACCOUNT", "LINKED_ACCOUNT"),
        OperatingSystem => ("OPERATING_SYSTEM", "OPERATING_SYSTEM"),
        Operation => ("OPERATION", "OPERATION"),
        Platform => ("PLATFORM", "PLATFORM"),
        PurchaseType => ("PURCHASE_TYPE", "PURCHASE_TYPE"),
        RecordType => ("RECORD_TYPE", "RECORD_TYPE"),
        Region => ("REGION", "REGION"),
        ResourceId => ("RESOURCE_ID", "RESOURCE_ID"),
        SavingsPlansType => ("SAVINGS_PLANS_TYPE", "SAVINGS_PLANS_TYPE"),
        Service => ("SERVICE", "SERVICE"),
        Tenancy => ("TENANCY", "TENANCY"),
        UsageType => ("USAGE_TYPE", "USAGE_TYPE"),
        UsageTypeGroup => ("USAGE_TYPE_GROUP", "USAGE_TYPE_GROUP"),
    }
}

wire_enum! {
    GroupDefinitionType {
        Dimension => ("DIMENSION", "DIMENSION"),
        Tag => ("TAG", "TAG"),
        CostCategory => ("COST_CATEGORY", "COST_CATEGORY"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupDefinition {
    #[serde(rename = "Type")]
    pub kind: GroupDefinitionType,
    pub key: String,
}

impl GroupDefinition {
    pub fn dimension(dimension: Dimension) -> Self {
        Self {
            kind: GroupDefinitionType::Dimension,
            key: dimension.as_str().to_string(),
        }
    }

    pub fn tag(key: impl Into<String>) -> Self {
        Self {
            kind: GroupDefinitionType::Tag,
            key: key.into(),
        }
    }

    pub fn cost_category(key: impl Into<String>) -> Self {
        Self {
            kind: GroupDefinitionType::CostCategory,
            key: key.into(),
        }
    }
}

/// Accepts `TYPE:KEY`, e.g. `DIMENSION:SERVICE` or `TAG:team`.
impl FromStr for GroupDefinition {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, key) = s.split_once(':').ok_or_else(|| AdapterError::ValidationError {
            message: format!("group-by '{}' must look like TYPE:KEY", s),
        })?;
        let kind: GroupDefinitionType = kind.parse()?;
        match kind {
            GroupDefinitionType::Dimension => Ok(Self::dimension(key.parse()?)),
            GroupDefinitionType::Tag => Ok(Self::tag(key)),
            GroupDefinitionType::CostCategory => Ok(Self::cost_category(key)),
        }
    }
}

/// Filter expression forwarded to the billing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Expression {
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Not(Box<Expression>),
    Dimensions { key: Dimension, values: Vec<String> },
    Tags { key: String, values: Vec<String> },
    CostCategories { key: String, values: Vec<String> },
}

/// A single cost-and-usage query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostQuery {
    pub time_period: TimePeriod,
    pub granularity: Granularity,
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub group_by: Vec<GroupDefinition>,
    #[serde(default)]
    pub filter: Option<Expression>,
    /// Forwarded as-is; only one page is fetched per call.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl CostQuery {
    pub fn new(time_period: TimePeriod, granularity: Granularity, metrics: Vec<Metric>) -> Self {
        Self {
            time_period,
            granularity,
            metrics,
            group_by: Vec::new(),
            filter: None,
            next_page_token: None,
        }
    }

    pub fn group_by(mut self, group: GroupDefinition) -> Self {
        self.group_by.push(group);
        self
    }

    pub fn filter(mut self, filter: Expression) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn next_page_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(AdapterError::ValidationError {
                message: "at least one metric is required".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MetricValue {
    pub amount: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CostGroup {
    pub keys: Vec<String>,
    pub metrics: HashMap<String, MetricValue>,
}

/// Interval as reported by the provider; kept as text so nothing is reshaped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DateInterval {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResultByTime {
    pub time_period: Option<DateInterval>,
    pub total: HashMap<String, MetricValue>,
    pub groups: Vec<CostGroup>,
    pub estimated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DimensionValueAttributes {
    pub value: Option<String>,
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReturnedGroupDefinition {
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub key: Option<String>,
}

/// One page of cost-and-usage results in the provider's shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CostAndUsage {
    pub results_by_time: Vec<ResultByTime>,
    pub group_definitions: Vec<ReturnedGroupDefinition>,
    pub dimension_value_attributes: Vec<DimensionValueAttributes>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    DataUnavailable,
    UnclassifiedQueryFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostQueryFailure {
    pub error: String,
    pub message: String,
}

impl CostQueryFailure {
    pub fn kind(&self) -> FailureKind {
        if self.error == crate::core::cost_query::DATA_UNAVAILABLE {
            FailureKind::DataUnavailable
        } else {
            FailureKind::UnclassifiedQueryFailure
        }
    }
}

/// Either the raw success payload or a `{error, message}` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostQueryOutcome {
    Failure(CostQueryFailure),
    Success(CostAndUsage),
}

impl CostQueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CostQueryOutcome::Success(_))
    }

    pub fn failure(&self) -> Option<&CostQueryFailure> {
        match self {
            CostQueryOutcome::Failure(f) => Some(f),
            CostQueryOutcome::Success(_) => None,
        }
    }

    pub fn success(&self) -> Option<&CostAndUsage> {
        match self {
            CostQueryOutcome::Success(page) => Some(page),
            CostQueryOutcome::Failure(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI").with_session_token("tok123");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("AKIDEXAMPLE"));
        assert!(!rendered.contains("wJalrXUtnFEMI"));
        assert!(!rendered.contains("tok123"));
    }

    #[test]
    fn test_credentials_check() {
        assert!(Credentials::new("a", "b").check().is_ok());
        assert!(Credentials::new("", "b").check().is_err());
        assert!(Credentials::new("a", "   ").check().is_err());
    }

    #[test]
    fn test_time_period_parse() {
        let period = TimePeriod::parse("2024-01-01", "2024-01-02").unwrap();
        assert_eq!(period.start_str(), "2024-01-01");
        assert_eq!(period.end_str(), "2024-01-02");

        assert!(TimePeriod::parse("2024-01-02", "2024-01-02").is_err());
        assert!(TimePeriod::parse("2024-13-01", "2024-01-02").is_err());
    }

    #[test]
    fn test_hourly_bounds_are_timestamps() {
        let period = TimePeriod::parse("2024-01-01", "2024-01-02").unwrap();
        assert_eq!(
            period.bounds(Granularity::Hourly),
            ("2024-01-01T00:00:00Z".to_string(), "2024-01-02T00:00:00Z".to_string())
        );
        assert_eq!(
            period.bounds(Granularity::Daily),
            ("2024-01-01".to_string(), "2024-01-02".to_string())
        );
    }

    #[test]
    fn test_metric_accepts_both_spellings() {
        assert_eq!("UNBLENDED_COST".parse::<Metric>().unwrap(), Metric::UnblendedCost);
        assert_eq!("UnblendedCost".parse::<Metric>().unwrap(), Metric::UnblendedCost);
        assert_eq!(Metric::UnblendedCost.as_str(), "UnblendedCost");
        assert!("COST".parse::<Metric>().is_err());

        let parsed: Vec<Metric> = serde_json::from_str(r#"["UNBLENDED_COST", "BlendedCost"]"#).unwrap();
        assert_eq!(parsed, vec![Metric::UnblendedCost, Metric::BlendedCost]);
    }

    #[test]
    fn test_granularity_parse() {
        assert_eq!("daily".parse::<Granularity>().unwrap(), Granularity::Daily);
        assert_eq!(Granularity::Monthly.to_string(), "MONTHLY");
    }

    #[test]
    fn test_group_definition_parse() {
        let group: GroupDefinition = "DIMENSION:SERVICE".parse().unwrap();
        assert_eq!(group, GroupDefinition::dimension(Dimension::Service));

        let group: GroupDefinition = "TAG:team".parse().unwrap();
        assert_eq!(group.kind, GroupDefinitionType::Tag);
        assert_eq!(group.key, "team");

        assert!("DIMENSION:NOPE".parse::<GroupDefinition>().is_err());
        assert!("SERVICE".parse::<GroupDefinition>().is_err());
    }

    #[test]
    fn test_outcome_serializes_untagged() {
        let failure = CostQueryOutcome::Failure(CostQueryFailure {
            error: "boom".to_string(),
            message: "Cost data could not be fetched.".to_string(),
        });
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": "boom", "message": "Cost data could not be fetched."})
        );

        let success = CostQueryOutcome::Success(CostAndUsage::default());
        let json = serde_json::to_value(&success).unwrap();
        assert!(json.get("ResultsByTime").is_some());
    }

    #[test]
    fn test_failure_kind() {
        let unavailable = CostQueryFailure {
            error: "DataUnavailableException".to_string(),
            message: "No cost data available for the specified date range.".to_string(),
        };
        assert_eq!(unavailable.kind(), FailureKind::DataUnavailable);

        let other = CostQueryFailure {
            error: "dispatch failure".to_string(),
            message: "Cost data could not be fetched.".to_string(),
        };
        assert_eq!(other.kind(), FailureKind::UnclassifiedQueryFailure);
    }

    #[test]
    fn test_empty_metrics_fail_validation() {
        let period = TimePeriod::parse("2024-01-01", "2024-02-01").unwrap();
        let query = CostQuery::new(period, Granularity::Monthly, vec![]);
        assert!(query.validate().is_err());
    }
}
