use crate::domain::model::{
    CostAndUsage, CostGroup, CostQuery, DateInterval, DimensionValueAttributes, Expression,
    MetricValue, ResultByTime, ReturnedGroupDefinition,
};
use crate::domain::ports::{BillingClient, BillingError};
use async_trait::async_trait;
use aws_sdk_costexplorer::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_costexplorer::types as ce;
use aws_sdk_costexplorer::Client as CostExplorerClient;
use std::collections::HashMap;

/// [`BillingClient`] backed by the Cost Explorer `GetCostAndUsage` API.
#[derive(Debug, Clone)]
pub struct CostExplorerBilling {
    client: CostExplorerClient,
}

impl CostExplorerBilling {
    pub fn new(client: CostExplorerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BillingClient for CostExplorerBilling {
    async fn get_cost_and_usage(
        &self,
        query: &CostQuery,
    ) -> Result<CostAndUsage, BillingError> {
        let (start, end) = query.time_period.bounds(query.granularity);
        let time_period = ce::DateInterval::builder()
            .start(start)
            .end(end)
            .build()
            .map_err(|e| BillingError::new(None, e.to_string()).with_source(Box::new(e)))?;

        let metrics = query.metrics.iter().map(|m| m.as_str().to_string()).collect();
        let group_by = query
            .group_by
            .iter()
            .map(|g| {
                ce::GroupDefinition::builder()
                    .r#type(ce::GroupDefinitionType::from(g.kind.as_str()))
                    .key(g.key.clone())
                    .build()
            })
            .collect::<Vec<_>>();

        let output = self
            .client
            .get_cost_and_usage()
            .time_period(time_period)
            .granularity(ce::Granularity::from(query.granularity.as_str()))
            .set_metrics(Some(metrics))
            .set_group_by((!group_by.is_empty()).then_some(group_by))
            .set_filter(query.filter.as_ref().map(to_sdk_expression))
            .set_next_page_token(query.next_page_token.clone())
            .send()
            .await
            .map_err(|e| {
                let code = e.code().map(str::to_string);
                let message = DisplayErrorContext(&e).to_string();
                BillingError::new(code, message).with_source(Box::new(e))
            })?;

        Ok(CostAndUsage {
            results_by_time: output
                .results_by_time
                .unwrap_or_default()
                .into_iter()
                .map(from_sdk_result)
                .collect(),
            group_definitions: output
                .group_definitions
                .unwrap_or_default()
                .into_iter()
                .map(|g| ReturnedGroupDefinition {
                    kind: g.r#type.map(|t| t.as_str().to_string()),
                    key: g.key,
                })
                .collect(),
            dimension_value_attributes: output
                .dimension_value_attributes
                .unwrap_or_default()
                .into_iter()
                .map(|d| DimensionValueAttributes {
                    value: d.value,
                    attributes: d.attributes.unwrap_or_default(),
                })
                .collect(),
            next_page_token: output.next_page_token,
        })
    }
}

fn to_sdk_expression(expr: &Expression) -> ce::Expression {
    let builder = ce::Expression::builder();
    match expr {
        Expression::And(items) => builder
            .set_and(Some(items.iter().map(to_sdk_expression).collect()))
            .build(),
        Expression::Or(items) => builder
            .set_or(Some(items.iter().map(to_sdk_expression).collect()))
            .build(),
        Expression::Not(inner) => builder.not(to_sdk_expression(inner)).build(),
        Expression::Dimensions { key, values } => builder
            .dimensions(
                ce::DimensionValues::builder()
                    .key(ce::Dimension::from(key.as_str()))
                    .set_values(Some(values.clone()))
                    .build(),
            )
            .build(),
        Expression::Tags { key, values } => builder
            .tags(
                ce::TagValues::builder()
                    .key(key.clone())
                    .set_values(Some(values.clone()))
                    .build(),
            )
            .build(),
        Expression::CostCategories { key, values } => builder
            .cost_categories(
                ce::CostCategoryValues::builder()
                    .key(key.clone())
                    .set_values(Some(values.clone()))
                    .build(),
            )
            .build(),
    }
}

fn from_sdk_metrics(metrics: Option<HashMap<String, ce::MetricValue>>) -> HashMap<String, MetricValue> {
    metrics
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| {
            (
                name,
                MetricValue {
                    amount: value.amount,
                    unit: value.unit,
                },
            )
        })
        .collect()
}

fn from_sdk_result(result: ce::ResultByTime) -> ResultByTime {
    ResultByTime {
        time_period: result.time_period.map(|p| DateInterval {
            start: p.start,
            end: p.end,
        }),
        total: from_sdk_metrics(result.total),
        groups: result
            .groups
            .unwrap_or_default()
            .into_iter()
            .map(|g| CostGroup {
                keys: g.keys.unwrap_or_default(),
                metrics: from_sdk_metrics(g.metrics),
            })
            .collect(),
        estimated: result.estimated,
    }
}
