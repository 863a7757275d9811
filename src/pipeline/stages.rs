//! The three resolution stages. Each stage spawns one task per child item and joins them
//! all before returning.

use super::{
    join_children, PipelineContext, ResolveStage, DEVELOPER_NAME_HEADER,
    QUALIFIED_API_NAME_HEADER,
};
use crate::query::QueryTemplate;
use crate::record::{DeleteCountRecord, DeletedFieldRow, DeveloperName, QualifiedApiName};
use crate::table::{Row, Table};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

/// Stage A: resolve the developer names behind one deleted field.
///
/// Enumeration-style tables need a lookup; any other table id means the raw name already
/// is the developer name, so a one-row table is synthesized in the lookup's shape.
pub(super) async fn resolve_deleted_field(ctx: Arc<PipelineContext>, field: DeletedFieldRow) {
    debug!(
        developer_name = %field.developer_name_raw,
        table_enum_or_id = %field.table_enum_or_id,
        enum_table = field.uses_enum_table(),
        "Processing deleted field"
    );

    let developer_names = if field.uses_enum_table() {
        let query = ctx.executor.execute(
            QueryTemplate::EnumToDeveloperName,
            Some(&field.table_enum_or_id),
            true,
        );
        match ctx.guarded(query).await {
            None => return,
            Some(Ok(csv)) => Table::decode(&csv),
            Some(Err(e)) => {
                ctx.fail(ResolveStage::DeveloperNames, &field.table_enum_or_id, e);
                return;
            }
        }
    } else {
        self_named_table(&field.developer_name_raw)
    };

    let field = Arc::new(field);
    let mut tasks = JoinSet::new();
    for row in developer_names {
        let name = match row.field(1) {
            Ok(name) => name,
            Err(e) => {
                ctx.fail(ResolveStage::DeveloperNames, &field.table_enum_or_id, e);
                continue;
            }
        };
        if name == DEVELOPER_NAME_HEADER {
            continue;
        }
        tasks.spawn(resolve_developer_name(
            Arc::clone(&ctx),
            Arc::clone(&field),
            DeveloperName(name.to_string()),
        ));
    }
    join_children(&mut tasks).await;
}

/// Stage B: resolve the qualified API names sharing one developer name.
async fn resolve_developer_name(
    ctx: Arc<PipelineContext>,
    field: Arc<DeletedFieldRow>,
    developer_name: DeveloperName,
) {
    debug!(
        developer_name = %field.developer_name_raw,
        api_name = %developer_name.0,
        "Processing developer name"
    );

    let query = ctx.executor.execute(
        QueryTemplate::DeveloperNameToApiName,
        Some(&developer_name.0),
        false,
    );
    let qualified_names = match ctx.guarded(query).await {
        None => return,
        Some(Ok(csv)) => Table::decode(&csv),
        Some(Err(e)) => {
            ctx.fail(ResolveStage::QualifiedNames, &developer_name.0, e);
            return;
        }
    };

    let mut tasks = JoinSet::new();
    for row in qualified_names {
        let names = row
            .field(1)
            .and_then(|api_name| row.field(2).map(|qualified| (api_name, qualified)));
        let (api_name, qualified) = match names {
            Ok(pair) => pair,
            Err(e) => {
                ctx.fail(ResolveStage::QualifiedNames, &developer_name.0, e);
                continue;
            }
        };
        if qualified == QUALIFIED_API_NAME_HEADER {
            continue;
        }
        tasks.spawn(count_records(
            Arc::clone(&ctx),
            Arc::clone(&field),
            api_name.to_string(),
            QualifiedApiName(qualified.to_string()),
        ));
    }
    join_children(&mut tasks).await;
}

/// Stage C: count the remaining records of one qualified name and hand the record over.
async fn count_records(
    ctx: Arc<PipelineContext>,
    field: Arc<DeletedFieldRow>,
    api_name: String,
    qualified: QualifiedApiName,
) {
    debug!(qualified_api_name = %qualified.0, "Processing API name");

    let count = match ctx.guarded(ctx.executor.execute_count(&qualified.0)).await {
        None => return,
        Some(Ok(count)) => count,
        Some(Err(e)) => {
            ctx.fail(ResolveStage::RecordCount, &qualified.0, e);
            return;
        }
    };

    let record = DeleteCountRecord {
        developer_name: field.developer_name_raw.clone(),
        table_enum_or_id: field.table_enum_or_id.clone(),
        qualified_api_name: qualified.0,
        api_name,
        count,
        timestamp: chrono::Utc::now().timestamp(),
    };
    debug!(record = ?record, "Appending delete count record");
    ctx.accumulator.append(record);
}

/// Header plus a single row mapping the name to itself.
fn self_named_table(developer_name: &str) -> Table {
    Table::from_rows(vec![
        Row::new([developer_name, DEVELOPER_NAME_HEADER]),
        Row::new([developer_name, developer_name]),
    ])
}
