//! Demo JSON API served by the `rawroute` binary.
//!
//! Handlers are stateless: they echo what they were given so the routing
//! and framing layers can be exercised end to end.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::http::{HandlerError, HandlerResult, Request, Response};
use crate::routing::{RouteError, RouteTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}

/// Build the demo route table.
pub fn build_routes() -> Result<RouteTable, RouteError> {
    let mut table = RouteTable::new();
    table
        .get("/health", health)?
        .get("/items/{id}", get_item)?
        .post("/items", create_item)?
        .put("/items/{id}", update_item)?
        .delete("/items/{id}", delete_item)?
        .get("/items/{id}/tags/{tag}", get_item_tag)?;
    Ok(table)
}

fn health(_: &Request) -> HandlerResult {
    Ok(Response::ok(json!({ "status": "ok" })))
}

fn get_item(req: &Request) -> HandlerResult {
    let id = item_id(req, 0)?;
    Ok(Response::ok(json!({ "id": id, "name": format!("item-{id}") })))
}

fn create_item(req: &Request) -> HandlerResult {
    let item: Item = req.json()?;
    if item.name.trim().is_empty() {
        return Err(HandlerError::unprocessable("Item name must not be empty"));
    }
    Ok(Response::json(StatusCode::CREATED, json!(item)))
}

fn update_item(req: &Request) -> HandlerResult {
    let id = item_id(req, 0)?;
    let mut item: Item = req.json()?;
    item.id = Some(id);
    Ok(Response::ok(json!(item)))
}

fn delete_item(req: &Request) -> HandlerResult {
    let id = item_id(req, 0)?;
    Ok(Response::ok(json!({ "deleted": id })))
}

fn get_item_tag(req: &Request) -> HandlerResult {
    let id = item_id(req, 0)?;
    let tag = req
        .param(1)
        .ok_or_else(|| HandlerError::bad_request("Missing tag"))?;
    Ok(Response::ok(json!({ "item": id, "tag": tag })))
}

fn item_id(req: &Request, index: usize) -> Result<i64, HandlerError> {
    let id = req
        .param(index)
        .ok_or_else(|| HandlerError::bad_request("Missing item id"))?;
    if id < 0 {
        return Err(HandlerError::unprocessable("Item id must not be negative"));
    }
    Ok(id)
}
