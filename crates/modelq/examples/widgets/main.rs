//! Example demonstrating the model query builder against an in-memory backend,
//! with dispatch monitoring and tracing output.
//!
//! Run with:
//!   RUST_LOG=modelq=debug cargo run --example widgets -p modelq

use modelq::monitor::{InstrumentedBackend, MonitorConfig, StatsMonitor, TracingQueryHook};
use modelq::{
    Backend, Entity, ModelRegistry, OrmResult, QueryDescriptor, Row, RowExt, WhereExpr,
    async_trait, qb,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Widget {
    id: i64,
    name: String,
    price: i64,
}

impl Entity for Widget {
    fn entity_name() -> &'static str {
        "Widget"
    }
}

/// Answers every query from a fixed table. Only pagination and `COUNT` are
/// honoured; this is enough to show what the builder sends.
struct FixedTable(Vec<Row>);

#[async_trait]
impl Backend for FixedTable {
    async fn execute_query(&self, descriptor: &QueryDescriptor) -> OrmResult<Vec<Row>> {
        if let Some(alias) = descriptor.aggregate_alias() {
            let mut row = Row::new();
            row.insert(alias.to_string(), json!(self.0.len()));
            return Ok(vec![row]);
        }
        let offset = descriptor.offset.unwrap_or(0) as usize;
        let limit = descriptor.limit.map_or(usize::MAX, |l| l as usize);
        Ok(self.0.iter().skip(offset).take(limit).cloned().collect())
    }
}

fn widget_rows() -> Vec<Row> {
    [
        json!({"id": 1, "name": "gear", "price": 10}),
        json!({"id": 2, "name": "sprocket", "price": 25}),
        json!({"id": 3, "name": "flange", "price": 7}),
    ]
    .into_iter()
    .filter_map(|v| match v {
        Value::Object(map) => Some(map),
        _ => None,
    })
    .collect()
}

#[tokio::main]
async fn main() -> OrmResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("modelq=debug")),
        )
        .init();

    let stats = Arc::new(StatsMonitor::new());
    let backend = InstrumentedBackend::new(FixedTable(widget_rows()))
        .with_tag("widget")
        .with_config(
            MonitorConfig::new()
                .with_slow_query_threshold(Duration::from_millis(50))
                .enable_monitoring(),
        )
        .with_monitor_arc(stats.clone())
        .with_hook(TracingQueryHook::new());

    let mut registry = ModelRegistry::new();
    registry.register_entity::<Widget>(backend);

    let widgets: Vec<Widget> = qb::model::<Widget>(&registry)
        .where_eq("status", "active")
        .paginate(1, 2)
        .find_all()
        .await?;
    for w in &widgets {
        println!("page 1: #{} {} @ {}", w.id, w.name, w.price);
    }

    let rows = qb::model::<Widget>(&registry)
        .column("name")
        .column_as("price", "cost")
        .where_(WhereExpr::new().gte("price", 5).lt("price", 20))
        .find()
        .await?;
    for row in &rows {
        println!("projected: {:?} / {:?}", row.value("name"), row.value("cost"));
    }

    let total = qb::model::<Widget>(&registry).count().await?;
    println!("total widgets: {total:?}");

    // Precondition failures never reach the backend.
    if let Err(e) = qb::model::<Widget>(&registry).find().await {
        println!("expected error: {e}");
    }

    println!("{:#?}", stats.stats());
    Ok(())
}
