//! Dispatch module
//!
//! The core of the service: a pure function from (request context, route
//! table, gateways) to a response envelope. Every branch that reaches a
//! gateway performs exactly one call, except update which is a
//! find-then-update pair. Not-found, bad-request, and unresolved-path
//! outcomes are resolved here into status codes; store errors are mapped
//! to 500 and never conflated with 404.

use hyper::Method;
use serde_json::{json, Value};

use super::types::{Envelope, RequestContext};
use crate::logger;
use crate::routing::{path, Collection, Resolved, RouteTable};
use crate::store::{Gateway, StoreError};

/// The per-collection gateways injected into each dispatch.
pub struct Gateways<'a> {
    pub counties: &'a dyn Gateway,
    pub cities: &'a dyn Gateway,
}

impl<'a> Gateways<'a> {
    const fn for_collection(&self, collection: Collection) -> &'a dyn Gateway {
        match collection {
            Collection::Counties => self.counties,
            Collection::Cities => self.cities,
        }
    }
}

/// Resolve a request to a gateway operation and produce its envelope.
pub fn dispatch(ctx: &RequestContext, table: &RouteTable, gateways: &Gateways) -> Envelope {
    let Some(route) = table.match_route(&ctx.method, &ctx.path) else {
        return classify_miss(ctx);
    };

    let gateway = gateways.for_collection(route.collection);
    let outcome = match route.resolved {
        Resolved::List => list(gateway),
        Resolved::Find { id } => find(gateway, id),
        Resolved::ListByParent { county_id } => list_by_parent(gateway, county_id),
        Resolved::Create => create(gateway, route.collection, ctx.body.as_ref()),
        Resolved::Update { id } => update(gateway, id, ctx.body.as_ref()),
        Resolved::Delete { id } => delete(gateway, id),
    };

    outcome.unwrap_or_else(|err| {
        logger::log_error(&format!("{} {}: {err}", ctx.method, ctx.path));
        Envelope::upstream_failure()
    })
}

/// Classify a request that matched no route.
///
/// An unknown collection token answers with the original path in the
/// message; a mutating method on a known collection without a trailing id
/// is a bad request; anything outside the four supported methods is 405.
fn classify_miss(ctx: &RequestContext) -> Envelope {
    match ctx.method {
        Method::GET | Method::POST | Method::PUT | Method::DELETE => {}
        _ => return Envelope::method_not_allowed(),
    }

    let segments = path::split_segments(&ctx.path);
    let id_absent = path::resolve_entity_id(&segments).is_none();
    match path::resolve_collection(&segments) {
        Some(_) if (ctx.method == Method::PUT || ctx.method == Method::DELETE) && id_absent => {
            Envelope::bad_request()
        }
        _ => Envelope::unresolved(&ctx.path),
    }
}

fn find(gateway: &dyn Gateway, id: u64) -> Result<Envelope, StoreError> {
    // Singular lookup on an absent id is a 404, same rule for both collections
    Ok(match gateway.find(id)? {
        Some(entity) => Envelope::ok(entity),
        None => Envelope::not_found(),
    })
}

fn list(gateway: &dyn Gateway) -> Result<Envelope, StoreError> {
    let entities = gateway.list_all()?;
    Ok(if entities.is_empty() {
        Envelope::not_found()
    } else {
        Envelope::ok(Value::Array(entities))
    })
}

fn list_by_parent(gateway: &dyn Gateway, county_id: u64) -> Result<Envelope, StoreError> {
    let entities = gateway.list_by_parent(county_id)?;
    Ok(if entities.is_empty() {
        Envelope::not_found()
    } else {
        Envelope::ok(Value::Array(entities))
    })
}

fn create(
    gateway: &dyn Gateway,
    collection: Collection,
    body: Option<&Value>,
) -> Result<Envelope, StoreError> {
    let Some(fields) = body else {
        return Ok(Envelope::create_rejected());
    };
    let required_present = fields
        .get(collection.required_field())
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty());
    if !required_present {
        return Ok(Envelope::create_rejected());
    }
    Ok(match gateway.create(fields)? {
        Some(id) if id > 0 => Envelope::created(id),
        _ => Envelope::create_rejected(),
    })
}

fn update(gateway: &dyn Gateway, id: u64, body: Option<&Value>) -> Result<Envelope, StoreError> {
    let name = body
        .and_then(|b| b.get("name"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    let Some(name) = name else {
        return Ok(Envelope::bad_request());
    };
    if gateway.find(id)?.is_none() {
        return Ok(Envelope::not_found());
    }
    Ok(if gateway.update(id, &json!({ "name": name }))? {
        Envelope::updated()
    } else {
        Envelope::not_found()
    })
}

fn delete(gateway: &dyn Gateway, id: u64) -> Result<Envelope, StoreError> {
    Ok(if gateway.delete(id)? {
        Envelope::deleted()
    } else {
        Envelope::not_found()
    })
}
