//! `entity.*` commands. Every input names its collection:
//! `{ "entity": "Project", ... }`.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::microsvc::{Context, HandlerError};
use crate::query::Filters;
use crate::record::Record;
use crate::storage::Storage;

#[derive(Debug, Deserialize)]
struct QueryInput {
    entity: String,
    #[serde(default)]
    filters: Map<String, Value>,
    order_by: Option<String>,
    limit: Option<i64>,
}

impl QueryInput {
    fn filters(&self) -> Filters {
        Filters::from_map(&self.filters)
    }

    fn limit(&self) -> Option<usize> {
        self.limit.filter(|n| *n > 0).map(|n| n as usize)
    }
}

#[derive(Debug, Deserialize)]
struct IdInput {
    entity: String,
    id: String,
}

#[derive(Debug, Deserialize)]
struct DataInput {
    entity: String,
    #[serde(default)]
    id: Option<String>,
    data: Map<String, Value>,
}

fn names_entity<S: Storage>(ctx: &Context<S>) -> bool {
    ctx.has_str("entity")
}

fn records(records: Vec<Record>) -> Value {
    let count = records.len();
    json!({ "records": records, "count": count })
}

pub mod list {
    use super::*;

    pub const COMMAND: &str = "entity.list";

    pub fn guard<S: Storage>(ctx: &Context<S>) -> bool {
        names_entity(ctx)
    }

    pub fn handle<S: Storage>(ctx: &Context<S>) -> Result<Value, HandlerError> {
        let input = ctx.input::<QueryInput>()?;
        let store = ctx.store(&input.entity)?;
        Ok(records(store.list(input.order_by.as_deref(), input.limit())?))
    }
}

pub mod filter {
    use super::*;

    pub const COMMAND: &str = "entity.filter";

    pub fn guard<S: Storage>(ctx: &Context<S>) -> bool {
        names_entity(ctx)
    }

    pub fn handle<S: Storage>(ctx: &Context<S>) -> Result<Value, HandlerError> {
        let input = ctx.input::<QueryInput>()?;
        let store = ctx.store(&input.entity)?;
        Ok(records(store.query(
            &input.filters(),
            input.order_by.as_deref(),
            input.limit(),
        )?))
    }
}

pub mod find {
    use super::*;

    pub const COMMAND: &str = "entity.find";

    pub fn guard<S: Storage>(ctx: &Context<S>) -> bool {
        names_entity(ctx)
    }

    pub fn handle<S: Storage>(ctx: &Context<S>) -> Result<Value, HandlerError> {
        let input = ctx.input::<QueryInput>()?;
        let store = ctx.store(&input.entity)?;
        Ok(records(store.find(&input.filters())?))
    }
}

pub mod get {
    use super::*;

    pub const COMMAND: &str = "entity.get";

    pub fn guard<S: Storage>(ctx: &Context<S>) -> bool {
        names_entity(ctx) && ctx.has_str("id")
    }

    pub fn handle<S: Storage>(ctx: &Context<S>) -> Result<Value, HandlerError> {
        let input = ctx.input::<IdInput>()?;
        let record = ctx.store(&input.entity)?
            .get(&input.id)?
            .ok_or_else(|| HandlerError::NotFound(format!("{} {}", input.entity, input.id)))?;
        Ok(record.to_value())
    }
}

pub mod create {
    use super::*;

    pub const COMMAND: &str = "entity.create";

    pub fn guard<S: Storage>(ctx: &Context<S>) -> bool {
        names_entity(ctx) && ctx.has_object("data")
    }

    pub fn handle<S: Storage>(ctx: &Context<S>) -> Result<Value, HandlerError> {
        ctx.user_id()?;
        let input = ctx.input::<DataInput>()?;
        let record = ctx.store(&input.entity)?.create(input.data)?;
        Ok(record.to_value())
    }
}

pub mod update {
    use super::*;

    pub const COMMAND: &str = "entity.update";

    pub fn guard<S: Storage>(ctx: &Context<S>) -> bool {
        names_entity(ctx)
            && ctx.has_str("id")
            && ctx.has_object("data")
    }

    pub fn handle<S: Storage>(ctx: &Context<S>) -> Result<Value, HandlerError> {
        ctx.user_id()?;
        let input = ctx.input::<DataInput>()?;
        let id = input.id.unwrap_or_default();
        let record = ctx.store(&input.entity)?
            .update(&id, input.data)?
            .ok_or_else(|| HandlerError::NotFound(format!("{} {}", input.entity, id)))?;
        Ok(record.to_value())
    }
}

pub mod delete {
    use super::*;

    pub const COMMAND: &str = "entity.delete";

    pub fn guard<S: Storage>(ctx: &Context<S>) -> bool {
        names_entity(ctx) && ctx.has_str("id")
    }

    pub fn handle<S: Storage>(ctx: &Context<S>) -> Result<Value, HandlerError> {
        ctx.user_id()?;
        let input = ctx.input::<IdInput>()?;
        let deleted = ctx.store(&input.entity)?.delete(&input.id)?;
        Ok(json!({ "id": input.id, "deleted": deleted }))
    }
}
