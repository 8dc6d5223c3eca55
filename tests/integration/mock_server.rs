use certificate_portal::domain::{Certificate, CertificateId};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

#[derive(Default)]
struct Backend {
    certificates: Vec<Certificate>,
    settings: serde_json::Value,
    requests: Vec<String>,
    /// Status code to answer the next API request with.
    fail_next: Option<u16>,
    report_contract: bool,
}

/// In-memory certificate backend speaking the REST API, plus an IPFS
/// gateway under `/ipfs/` serving each certificate's metadata.
#[derive(Clone)]
pub struct MockCertificateServer {
    backend: Arc<Mutex<Backend>>,
}

impl MockCertificateServer {
    pub fn new() -> Self {
        let backend = Backend {
            settings: serde_json::json!({
                "useMockContract": true,
                "useMockIPFS": true,
                "networkRpcUrl": "http://localhost:8545",
                "contractAddress": CONTRACT_ADDRESS,
                "pinataApiKey": "",
                "pinataSecretKey": ""
            }),
            report_contract: true,
            ..Default::default()
        };
        Self {
            backend: Arc::new(Mutex::new(backend)),
        }
    }

    pub async fn start(&self) -> String {
        let backend = self.backend.clone();

        let make_svc = make_service_fn(move |_conn| {
            let backend = backend.clone();

            async move {
                Ok::<_, Infallible>(service_fn(move |req| handle_request(req, backend.clone())))
            }
        });

        // Bind to random port
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let server = Server::bind(&addr).serve(make_svc);
        let actual_addr = server.local_addr();

        tokio::spawn(async move {
            if let Err(e) = server.await {
                eprintln!("Mock server error: {}", e);
            }
        });

        format!("http://{}", actual_addr)
    }

    pub fn seed(&self, certificate: Certificate) {
        self.backend.lock().unwrap().certificates.push(certificate);
    }

    pub fn certificates(&self) -> Vec<Certificate> {
        self.backend.lock().unwrap().certificates.clone()
    }

    /// Requests seen so far, as `"METHOD /path"`.
    pub fn requests(&self) -> Vec<String> {
        self.backend.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.backend.lock().unwrap().requests.clear();
    }

    pub fn fail_next(&self, status: u16) {
        self.backend.lock().unwrap().fail_next = Some(status);
    }

    /// Stop reporting a contract from `/api/network` and `/api/settings`.
    pub fn without_contract(&self) {
        let mut backend = self.backend.lock().unwrap();
        backend.report_contract = false;
        backend.settings["contractAddress"] = serde_json::json!("");
    }
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Body> {
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert("content-type", "application/json".parse().unwrap());
    response
}

fn not_found(id: &str) -> Response<Body> {
    json_response(
        StatusCode::NOT_FOUND,
        serde_json::json!({ "detail": format!("Certificate with ID {} not found", id) }),
    )
}

/// Value of a text part in a multipart body.
pub fn form_field(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{}\"\r\n\r\n", name);
    let start = body.find(&marker)? + marker.len();
    let end = body[start..].find("\r\n--")? + start;
    Some(body[start..end].to_string())
}

async fn handle_request(
    req: Request<Body>,
    backend: Arc<Mutex<Backend>>,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let body_bytes = hyper::body::to_bytes(req.into_body())
        .await
        .unwrap_or_default();
    let body = String::from_utf8_lossy(&body_bytes).to_string();

    let mut backend = backend.lock().unwrap();
    backend.requests.push(format!("{} {}", method, path));

    if let Some(cid) = path.strip_prefix("/ipfs/") {
        let id = cid.trim_start_matches("QmMeta");
        let Some(certificate) = backend.certificates.iter().find(|c| c.id.as_str() == id) else {
            return Ok(json_response(StatusCode::NOT_FOUND, serde_json::json!({})));
        };
        return Ok(json_response(
            StatusCode::OK,
            serde_json::json!({
                "name": format!("Certificate: {}", certificate.course_name),
                "description": certificate.description,
                "image": format!("ipfs://QmImage{}", certificate.id),
                "attributes": [
                    { "trait_type": "Recipient", "value": certificate.recipient_name },
                    { "trait_type": "Issue Date", "value": certificate.issue_date }
                ]
            }),
        ));
    }

    if let Some(status) = backend.fail_next.take() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Ok(json_response(
            status,
            serde_json::json!({ "detail": "Backend unavailable" }),
        ));
    }

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let response = match (&method, segments.as_slice()) {
        (&Method::GET, ["api", "certificates"]) => {
            json_response(StatusCode::OK, serde_json::json!(backend.certificates))
        }
        (&Method::POST, ["api", "certificates"]) => {
            if !body.contains("name=\"image\"; filename=") {
                return Ok(json_response(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    serde_json::json!({
                        "detail": [{ "loc": ["body", "image"], "msg": "field required" }]
                    }),
                ));
            }
            let id = backend.certificates.len() as u64 + 1;
            let recipient_address = form_field(&body, "recipient_address").unwrap_or_default();
            let certificate = Certificate {
                id: CertificateId::from(id),
                recipient_name: form_field(&body, "recipient_name").unwrap_or_default(),
                recipient_address: recipient_address.clone(),
                course_name: form_field(&body, "course_name").unwrap_or_default(),
                issue_date: form_field(&body, "issue_date").unwrap_or_default(),
                description: form_field(&body, "description").unwrap_or_default(),
                token_uri: format!("ipfs://QmMeta{}", id),
                owner: recipient_address,
                revoked: false,
            };
            backend.certificates.push(certificate.clone());
            json_response(StatusCode::OK, serde_json::json!(certificate))
        }
        (&Method::GET, ["api", "certificates", id]) => {
            match backend.certificates.iter().find(|c| c.id.as_str() == *id) {
                Some(certificate) => json_response(StatusCode::OK, serde_json::json!(certificate)),
                None => not_found(id),
            }
        }
        (&Method::PUT, ["api", "certificates", id]) => {
            match backend
                .certificates
                .iter_mut()
                .find(|c| c.id.as_str() == *id)
            {
                Some(certificate) => {
                    if let Some(course) = form_field(&body, "course_name") {
                        certificate.course_name = course;
                    }
                    if let Some(description) = form_field(&body, "description") {
                        certificate.description = description;
                    }
                    json_response(StatusCode::OK, serde_json::json!(certificate))
                }
                None => not_found(id),
            }
        }
        (&Method::DELETE, ["api", "certificates", id]) => {
            match backend
                .certificates
                .iter_mut()
                .find(|c| c.id.as_str() == *id)
            {
                Some(certificate) => {
                    certificate.revoked = true;
                    json_response(
                        StatusCode::OK,
                        serde_json::json!({ "message": format!("Certificate {} revoked", id) }),
                    )
                }
                None => not_found(id),
            }
        }
        (&Method::GET, ["api", "settings"]) => {
            let mut settings = backend.settings.clone();
            if settings["pinataSecretKey"].as_str().is_some_and(|s| !s.is_empty()) {
                settings["pinataSecretKey"] = serde_json::json!("********");
            }
            json_response(StatusCode::OK, settings)
        }
        (&Method::POST, ["api", "settings"]) => {
            match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(mut update) => {
                    // The mask means "keep the stored secret".
                    if update["pinataSecretKey"] == "********" {
                        update["pinataSecretKey"] = backend.settings["pinataSecretKey"].clone();
                    }
                    backend.settings = update;
                    json_response(
                        StatusCode::OK,
                        serde_json::json!({ "message": "Settings updated successfully" }),
                    )
                }
                Err(e) => json_response(
                    StatusCode::BAD_REQUEST,
                    serde_json::json!({ "detail": e.to_string() }),
                ),
            }
        }
        (&Method::GET, ["api", "network"]) => {
            let contract = if backend.report_contract {
                CONTRACT_ADDRESS
            } else {
                ""
            };
            json_response(
                StatusCode::OK,
                serde_json::json!({
                    "networkId": 1337,
                    "networkName": "Local Development Chain",
                    "contractAddress": contract,
                    "rpcUrl": "http://localhost:8545"
                }),
            )
        }
        _ => {
            let mut response = Response::new(Body::from("Not Found"));
            *response.status_mut() = StatusCode::NOT_FOUND;
            response
        }
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockCertificateServer::new();
        let url = server.start().await;

        assert!(url.starts_with("http://127.0.0.1:"));
    }

    #[test]
    fn test_form_field() {
        let body = "--b\r\nContent-Disposition: form-data; name=\"course_name\"\r\n\r\nRust 101\r\n--b--\r\n";
        assert_eq!(form_field(body, "course_name").as_deref(), Some("Rust 101"));
        assert!(form_field(body, "description").is_none());
    }
}
