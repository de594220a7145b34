use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::error::{Result, TallyError};
use crate::filter::ReportFilter;
use crate::models::{
    Expense, ExpenseId, ExpenseUpdate, Insight, LoginRequest, LoginResponse, NewExpense,
    SignupRequest,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The expense backend. Success messages come back as the text to show the
/// user (the backend's own message when it sent one).
pub trait ExpenseApi {
    fn signup(&self, request: &SignupRequest<'_>) -> Result<String>;
    fn login(&self, request: &LoginRequest<'_>) -> Result<LoginResponse>;
    fn add_expense(&self, expense: &NewExpense) -> Result<String>;
    fn list_expenses(&self, user_id: &str) -> Result<Vec<Expense>>;
    fn update_expense(&self, id: &ExpenseId, update: &ExpenseUpdate) -> Result<String>;
    fn delete_expense(&self, id: &ExpenseId) -> Result<String>;
    fn insights(&self, user_id: &str, filter: &ReportFilter) -> Result<Insight>;
}

/// How a call reports success and failure to the user.
struct Call {
    /// Shown when the request never got a response.
    network: &'static str,
    /// Shown when the backend failed without a message.
    fallback: &'static str,
    /// Prefix the backend's message with `fallback`.
    prefixed: bool,
    /// Only 201 counts as success (create-style endpoints).
    created: bool,
}

const SIGNUP: Call = Call {
    network: "Network error while signing up",
    fallback: "Signup failed",
    prefixed: true,
    created: true,
};
const LOGIN: Call = Call {
    network: "Network error while logging in",
    fallback: "Login failed",
    prefixed: true,
    created: true,
};
const ADD: Call = Call {
    network: "Network error while adding expense",
    fallback: "Expense addition failed",
    prefixed: true,
    created: true,
};
const LIST: Call = Call {
    network: "Network error while loading expenses",
    fallback: "Unable to load expenses",
    prefixed: false,
    created: false,
};
const UPDATE: Call = Call {
    network: "Network error while updating expense",
    fallback: "Unable to update expense",
    prefixed: false,
    created: false,
};
const DELETE: Call = Call {
    network: "Network error while deleting expense",
    fallback: "Unable to delete expense",
    prefixed: false,
    created: false,
};
const INSIGHTS: Call = Call {
    network: "Network error while generating insights",
    fallback: "Unable to generate insights",
    prefixed: false,
    created: false,
};

pub struct HttpApi {
    base_url: String,
    client: Client,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TallyError::Other(format!("Could not create HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    fn send(&self, request: RequestBuilder, call: &Call) -> Result<Value> {
        let network = |source: reqwest::Error| {
            log::debug!("{}: {source}", call.network);
            TallyError::Network {
                context: call.network.to_string(),
                source,
            }
        };
        let response = request.send().map_err(network)?;
        let status = response.status();
        let text = response.text().map_err(network)?;
        log::debug!("{} {}", status.as_u16(), text);
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        check(status, body, call)
    }
}

/// Turn a status and decoded body into the body or an `Api` error.
fn check(status: StatusCode, body: Value, call: &Call) -> Result<Value> {
    let ok = if call.created {
        status == StatusCode::CREATED
    } else {
        status.is_success()
    };
    if ok {
        return Ok(body);
    }
    let message = match message_of(&body) {
        Some(m) if call.prefixed => format!("{}: {m}", call.fallback),
        Some(m) => m,
        None => call.fallback.to_string(),
    };
    Err(TallyError::Api {
        status: status.as_u16(),
        message,
    })
}

fn message_of(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

fn message_or(body: &Value, default: &str) -> String {
    message_of(body).unwrap_or_else(|| default.to_string())
}

/// Accept either a bare array or `{"expenses": [...]}`. Anything else is
/// logged and treated as an empty list.
pub fn parse_expense_list(body: Value) -> Vec<Expense> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("expenses") {
            Some(Value::Array(items)) => items,
            other => {
                log::warn!("expense list response has no `expenses` array (got {other:?}); showing no expenses");
                Vec::new()
            }
        },
        other => {
            log::warn!("unexpected expense list response {other}; showing no expenses");
            Vec::new()
        }
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Expense>(item) {
            Ok(expense) => Some(expense),
            Err(e) => {
                log::warn!("skipping malformed expense record: {e}");
                None
            }
        })
        .collect()
}

impl ExpenseApi for HttpApi {
    fn signup(&self, request: &SignupRequest<'_>) -> Result<String> {
        let body = self.send(self.client.post(self.url("signup/")).json(request), &SIGNUP)?;
        Ok(message_or(&body, "Signup successful! Please log in."))
    }

    fn login(&self, request: &LoginRequest<'_>) -> Result<LoginResponse> {
        let body = self.send(self.client.post(self.url("login/")).json(request), &LOGIN)?;
        serde_json::from_value(body).map_err(|e| TallyError::Api {
            status: StatusCode::CREATED.as_u16(),
            message: format!("Login failed: unexpected response ({e})"),
        })
    }

    fn add_expense(&self, expense: &NewExpense) -> Result<String> {
        let body = self.send(self.client.post(self.url("add-expense/")).json(expense), &ADD)?;
        Ok(message_or(&body, "Expense added successfully"))
    }

    fn list_expenses(&self, user_id: &str) -> Result<Vec<Expense>> {
        let url = self.url(&format!("manage-expense/{user_id}/"));
        let body = self.send(self.client.get(url), &LIST)?;
        Ok(parse_expense_list(body))
    }

    fn update_expense(&self, id: &ExpenseId, update: &ExpenseUpdate) -> Result<String> {
        let url = self.url(&format!("expenses/{id}/"));
        let body = self.send(self.client.put(url).json(update), &UPDATE)?;
        Ok(message_or(&body, "Expense updated"))
    }

    fn delete_expense(&self, id: &ExpenseId) -> Result<String> {
        let url = self.url(&format!("expenses/{id}/"));
        let body = self.send(self.client.delete(url), &DELETE)?;
        Ok(message_or(&body, "Expense deleted"))
    }

    fn insights(&self, user_id: &str, filter: &ReportFilter) -> Result<Insight> {
        let url = self.url(&format!("ai/insights/{user_id}/"));
        let payload = json!({ "filters": filter.to_payload() });
        let body = self.send(self.client.post(url).json(&payload), &INSIGHTS)?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }
}


#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;
    use crate::filter::parse_day;

    /// Answer one request with a canned status and body. The handle yields
    /// the request line and the request body.
    fn serve_once(status: &'static str, body: &'static str) -> (HttpApi, JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut length = 0usize;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header.trim().is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0u8; length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
            (
                request_line.trim_end().to_string(),
                String::from_utf8(request_body).unwrap(),
            )
        });
        (HttpApi::new(&base).unwrap(), handle)
    }

    fn sent_json(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_http_signup() {
        let (api, server) = serve_once("201 Created", r#"{"message": "User registered successfully"}"#);
        let message = api
            .signup(&SignupRequest {
                full_name: "Ann Lee",
                email: "ann@example.com",
                password: "pw",
            })
            .unwrap();
        assert_eq!(message, "User registered successfully");
        let (line, body) = server.join().unwrap();
        assert_eq!(line, "POST /api/signup/ HTTP/1.1");
        assert_eq!(
            sent_json(&body),
            json!({"Fullname": "Ann Lee", "Email": "ann@example.com", "Password": "pw"})
        );
    }

    #[test]
    fn test_http_signup_rejects_plain_ok() {
        let (api, server) = serve_once("200 OK", "{}");
        let err = api
            .signup(&SignupRequest {
                full_name: "Ann",
                email: "ann@example.com",
                password: "pw",
            })
            .unwrap_err();
        assert!(matches!(err, TallyError::Api { status: 200, .. }));
        assert_eq!(err.to_string(), "Signup failed");
        server.join().unwrap();
    }

    #[test]
    fn test_http_login_decodes_identity() {
        let (api, server) = serve_once(
            "201 Created",
            r#"{"message": "Login successful", "userId": 7, "userName": "Ann", "userEmail": "ann@example.com"}"#,
        );
        let response = api
            .login(&LoginRequest {
                email: "ann@example.com",
                password: "pw",
            })
            .unwrap();
        assert_eq!(response.user_id, "7");
        assert_eq!(response.user_name.as_deref(), Some("Ann"));
        let (line, body) = server.join().unwrap();
        assert_eq!(line, "POST /api/login/ HTTP/1.1");
        assert_eq!(sent_json(&body), json!({"Email": "ann@example.com", "Password": "pw"}));
    }

    #[test]
    fn test_http_login_failure_prefixes_message() {
        let (api, server) = serve_once("400 Bad Request", r#"{"message": "Invalid email or password"}"#);
        let err = api
            .login(&LoginRequest {
                email: "ann@example.com",
                password: "wrong",
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Login failed: Invalid email or password");
        server.join().unwrap();
    }

    #[test]
    fn test_http_add_expense() {
        let (api, server) = serve_once("201 Created", "{}");
        let message = api
            .add_expense(&NewExpense {
                date: "2024-01-05".into(),
                item: "Tea".into(),
                cost: 2.5,
                user_id: 7,
            })
            .unwrap();
        assert_eq!(message, "Expense added successfully");
        let (line, body) = server.join().unwrap();
        assert_eq!(line, "POST /api/add-expense/ HTTP/1.1");
        assert_eq!(
            sent_json(&body),
            json!({"ExpenseDate": "2024-01-05", "ExpenseItem": "Tea", "ExpenseCost": 2.5, "UserId": 7})
        );
    }

    #[test]
    fn test_http_list_wrapped() {
        let (api, server) = serve_once(
            "200 OK",
            r#"{"expenses": [{"id": 3, "ExpenseDate": "2024-01-05", "ExpenseItem": "Tea", "ExpenseCost": "2"}]}"#,
        );
        let list = api.list_expenses("7").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id.as_str(), "3");
        assert_eq!(list[0].amount(), 2.0);
        let (line, body) = server.join().unwrap();
        assert_eq!(line, "GET /api/manage-expense/7/ HTTP/1.1");
        assert!(body.is_empty());
    }

    #[test]
    fn test_http_update_shows_backend_message() {
        let (api, server) = serve_once("404 Not Found", r#"{"message": "Expense not found"}"#);
        let update = ExpenseUpdate {
            item: "Tea".into(),
            cost: 3.0,
        };
        let err = api.update_expense(&ExpenseId::from("12"), &update).unwrap_err();
        assert!(matches!(err, TallyError::Api { status: 404, .. }));
        assert_eq!(err.to_string(), "Expense not found");
        let (line, body) = server.join().unwrap();
        assert_eq!(line, "PUT /api/expenses/12/ HTTP/1.1");
        assert_eq!(sent_json(&body), json!({"ExpenseItem": "Tea", "ExpenseCost": 3.0}));
    }

    #[test]
    fn test_http_delete() {
        let (api, server) = serve_once("200 OK", r#"{"message": "Expense deleted successfully"}"#);
        let message = api.delete_expense(&ExpenseId::from("12")).unwrap();
        assert_eq!(message, "Expense deleted successfully");
        let (line, _) = server.join().unwrap();
        assert_eq!(line, "DELETE /api/expenses/12/ HTTP/1.1");
    }

    #[test]
    fn test_http_insights_sends_filters() {
        let (api, server) = serve_once("200 OK", r#"{"insight": "Less tea.", "provider": "gemini"}"#);
        let filter = ReportFilter::new(Some(parse_day("2024-01-01").unwrap()), None, Some("tea".into()));
        let insight = api.insights("7", &filter).unwrap();
        assert_eq!(insight.insight, "Less tea.");
        assert_eq!(insight.provider.as_deref(), Some("gemini"));
        let (line, body) = server.join().unwrap();
        assert_eq!(line, "POST /api/ai/insights/7/ HTTP/1.1");
        assert_eq!(
            sent_json(&body),
            json!({"filters": {"startDate": "2024-01-01", "endDate": "", "search": "tea"}})
        );
    }

    #[test]
    fn test_list_accepts_bare_array() {
        let list = parse_expense_list(json!([{"id": 1, "ExpenseItem": "Tea", "ExpenseCost": 2}]));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].label(), "Tea");
    }

    #[test]
    fn test_list_accepts_wrapped_array() {
        let list = parse_expense_list(json!({"expenses": [{"id": 1}, {"id": 2}]}));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_list_unexpected_shapes_are_empty() {
        assert!(parse_expense_list(json!({"data": []})).is_empty());
        assert!(parse_expense_list(json!({"expenses": "nope"})).is_empty());
        assert!(parse_expense_list(json!("hello")).is_empty());
        assert!(parse_expense_list(Value::Null).is_empty());
    }

    #[test]
    fn test_list_skips_non_object_records() {
        let list = parse_expense_list(json!([{"id": 1}, 42, "x"]));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_created_endpoints_need_201() {
        let err = check(StatusCode::OK, json!({}), &SIGNUP).unwrap_err();
        assert!(matches!(err, TallyError::Api { status: 200, .. }));
        assert!(check(StatusCode::CREATED, json!({}), &SIGNUP).is_ok());
    }

    #[test]
    fn test_backend_message_shown_verbatim() {
        let err = check(StatusCode::NOT_FOUND, json!({"message": "Expense not found"}), &UPDATE).unwrap_err();
        assert_eq!(err.to_string(), "Expense not found");
    }

    #[test]
    fn test_prefixed_and_fallback_messages() {
        let err = check(StatusCode::BAD_REQUEST, json!({"message": "Invalid email or password"}), &LOGIN).unwrap_err();
        assert_eq!(err.to_string(), "Login failed: Invalid email or password");
        let err = check(StatusCode::INTERNAL_SERVER_ERROR, Value::Null, &LIST).unwrap_err();
        assert_eq!(err.to_string(), "Unable to load expenses");
    }

    #[test]
    fn test_network_failure_is_generic() {
        let api = HttpApi::new("http://127.0.0.1:9").unwrap();
        let err = api.list_expenses("1").unwrap_err();
        assert!(matches!(err, TallyError::Network { .. }));
        assert_eq!(err.to_string(), "Network error while loading expenses");
    }
}
