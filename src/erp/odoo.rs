use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use serde_json::{json, Value};

use super::session::OdooSession;
use super::ErpError;
use crate::models::{Customer, RawCatalogRow};

/// Upper bound on products pulled into one catalog snapshot.
const CATALOG_LIMIT: u32 = 5000;

/// Upper bound on customers returned by a directory search.
const CUSTOMER_SEARCH_LIMIT: u32 = 50;

/// Connection settings for an Odoo instance.
#[derive(Clone)]
pub struct OdooConfig {
    pub url: String,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for OdooConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdooConfig")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Blocking client for Odoo's JSON-RPC endpoint.
pub struct OdooClient {
    config: OdooConfig,
    endpoint: String,
    client: reqwest::blocking::Client,
    session: OdooSession,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<RpcErrorData>,
}

#[derive(Deserialize)]
struct RpcErrorData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

impl OdooClient {
    pub fn new(config: OdooConfig, session: OdooSession, timeout_secs: u64) -> Result<Self, ErpError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ErpError::HttpClient(e.to_string()))?;

        let endpoint = format!("{}/jsonrpc", config.url.trim_end_matches('/'));
        Ok(Self {
            config,
            endpoint,
            client,
            session,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn session(&self) -> &OdooSession {
        &self.session
    }

    /// Active products that carry an internal code, ordered by code.
    pub fn fetch_catalog(&self) -> Result<Vec<RawCatalogRow>, ErpError> {
        let records = self.execute_kw(
            "product.product",
            "search_read",
            json!([[["active", "=", true], ["default_code", "!=", false]]]),
            json!({
                "fields": ["default_code", "name"],
                "limit": CATALOG_LIMIT,
                "order": "default_code asc",
            }),
        )?;

        let rows: Vec<RawCatalogRow> = as_records(records)?
            .iter()
            .map(|r| RawCatalogRow {
                code: odoo_string(&r["default_code"]),
                name: odoo_string(&r["name"]).unwrap_or_default(),
            })
            .collect();

        tracing::info!(count = rows.len(), "Fetched catalog from ERP");
        Ok(rows)
    }

    /// Customers whose name contains `query` (all customers when empty).
    pub fn search_customers(&self, query: &str) -> Result<Vec<Customer>, ErpError> {
        let mut domain = vec![json!(["customer_rank", ">", 0])];
        if !query.is_empty() {
            domain.push(json!(["name", "ilike", query]));
        }

        let records = self.execute_kw(
            "res.partner",
            "search_read",
            json!([domain]),
            json!({
                "fields": ["id", "name", "ref"],
                "limit": CUSTOMER_SEARCH_LIMIT,
                "order": "name asc",
            }),
        )?;

        as_records(records)?
            .iter()
            .map(|r| {
                let id = r["id"]
                    .as_i64()
                    .ok_or_else(|| ErpError::MalformedResponse("partner without id".into()))?;
                Ok(Customer {
                    id,
                    name: odoo_string(&r["name"]).unwrap_or_default(),
                    reference: odoo_string(&r["ref"]),
                })
            })
            .collect()
    }

    fn authenticate(&self) -> Result<i64, ErpError> {
        let result = self.call(
            "common",
            "authenticate",
            json!([self.config.database, self.config.user, self.config.password, {}]),
        )?;

        match result.as_i64() {
            Some(uid) if uid > 0 => {
                tracing::info!(uid, "Authenticated with ERP");
                Ok(uid)
            }
            _ => Err(ErpError::AuthenticationFailed),
        }
    }

    fn execute_kw(&self, model: &str, method: &str, args: Value, kwargs: Value) -> Result<Value, ErpError> {
        let uid = self.session.uid_or_authenticate(|| self.authenticate())?;
        let result = self.call(
            "object",
            "execute_kw",
            json!([self.config.database, uid, self.config.password, model, method, args, kwargs]),
        );

        if matches!(result, Err(ErpError::AuthenticationFailed)) {
            self.session.invalidate();
        }
        result
    }

    fn call(&self, service: &str, method: &str, args: Value) -> Result<Value, ErpError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": {"service": service, "method": method, "args": args},
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ErpError::Connection(self.config.url.clone())
                } else {
                    ErpError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ErpError::Http {
                status: status.as_u16(),
            });
        }

        let parsed: RpcResponse = response
            .json()
            .map_err(|e| ErpError::MalformedResponse(e.to_string()))?;
        rpc_result(parsed)
    }
}

fn rpc_result(response: RpcResponse) -> Result<Value, ErpError> {
    if let Some(err) = response.error {
        let data = err.data.unwrap_or(RpcErrorData {
            name: String::new(),
            message: String::new(),
        });
        if data.name.ends_with("AccessDenied") {
            return Err(ErpError::AuthenticationFailed);
        }
        let message = if data.message.is_empty() { err.message } else { data.message };
        return Err(ErpError::Remote(message));
    }
    response
        .result
        .ok_or_else(|| ErpError::MalformedResponse("response has neither result nor error".into()))
}

fn as_records(value: Value) -> Result<Vec<Value>, ErpError> {
    match value {
        Value::Array(records) => Ok(records),
        other => Err(ErpError::MalformedResponse(format!(
            "expected a record list, got {other}"
        ))),
    }
}

/// Odoo encodes unset char fields as `false`.
fn odoo_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RpcResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn result_is_returned() {
        let value = rpc_result(parse(r#"{"jsonrpc":"2.0","id":1,"result":[1,2]}"#)).unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn access_denied_maps_to_auth_failure() {
        let response = parse(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":200,"message":"Odoo Server Error",
                "data":{"name":"odoo.exceptions.AccessDenied","message":"Access Denied"}}}"#,
        );
        assert!(matches!(rpc_result(response), Err(ErpError::AuthenticationFailed)));
    }

    #[test]
    fn other_faults_carry_server_message() {
        let response = parse(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":200,"message":"Odoo Server Error",
                "data":{"name":"builtins.ValueError","message":"Invalid field 'foo'"}}}"#,
        );
        match rpc_result(response) {
            Err(ErpError::Remote(msg)) => assert_eq!(msg, "Invalid field 'foo'"),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_envelope_is_malformed() {
        assert!(matches!(
            rpc_result(parse(r#"{"jsonrpc":"2.0","id":1}"#)),
            Err(ErpError::MalformedResponse(_))
        ));
    }

    #[test]
    fn false_fields_become_none() {
        assert_eq!(odoo_string(&json!(false)), None);
        assert_eq!(odoo_string(&json!("CS-1")), Some("CS-1".into()));
    }

    #[test]
    fn non_list_result_is_malformed() {
        assert!(matches!(as_records(json!(3)), Err(ErpError::MalformedResponse(_))));
    }

    #[test]
    fn debug_output_hides_password() {
        let config = OdooConfig {
            url: "https://erp.example.com".into(),
            database: "db".into(),
            user: "u".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = OdooClient::new(
            OdooConfig {
                url: "https://erp.example.com/".into(),
                database: "db".into(),
                user: "u".into(),
                password: "p".into(),
            },
            OdooSession::default(),
            5,
        )
        .unwrap();
        assert_eq!(client.endpoint, "https://erp.example.com/jsonrpc");
    }
}
