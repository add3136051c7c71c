//! HTTP-level tests for the Redfish client
//!
//! Each test starts an in-process axum server that answers like a small BMC
//! and checks what the reqwest client actually sends and how it maps answers.
//! The TLS and proxy tests run against the same BMC behind a self-signed
//! certificate or a proxy address nothing listens on.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::serve::Listener;
use axum::{Json, Router};
use redfish_client::{
    AuthContext, BootSourceOverrideEnabled, BootSourceOverrideTarget, MediaType, RedfishClient,
    RedfishClientTrait, RedfishError, ResetType, TransportConfig,
};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tokio_rustls::server::TlsStream;

const BASIC_ADMIN: &str = "Basic YWRtaW46cGFzc3dvcmQ=";

#[derive(Clone, Default)]
struct Bmc {
    received: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Bmc {
    fn record(&self, what: &str, body: Value) {
        self.received.lock().unwrap().push((what.to_string(), body));
    }

    fn received(&self) -> Vec<(String, Value)> {
        self.received.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == BASIC_ADMIN)
}

async fn get_system(headers: HeaderMap, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    match id.as_str() {
        "node-1" => Ok(Json(json!({
            "@odata.id": "/redfish/v1/Systems/node-1",
            "Id": "node-1",
            "PowerState": "Off",
            "Links": {"ManagedBy": [{"@odata.id": "/redfish/v1/Managers/bmc-1"}]},
            "Boot": {"BootSourceOverrideTarget@Redfish.AllowableValues": ["Pxe", "Cd", "Hdd"]}
        }))),
        "broken" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(StatusCode::GATEWAY_TIMEOUT)
        }
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn patch_system(State(bmc): State<Bmc>, Path(id): Path<String>, Json(body): Json<Value>) -> StatusCode {
    bmc.record(&format!("patch {id}"), body);
    StatusCode::NO_CONTENT
}

async fn reset_system(State(bmc): State<Bmc>, Path(id): Path<String>, Json(body): Json<Value>) -> StatusCode {
    bmc.record(&format!("reset {id}"), body);
    StatusCode::ACCEPTED
}

async fn list_media(Path(manager): Path<String>) -> Json<Value> {
    Json(json!({
        "Members@odata.count": 2,
        "Members": [
            {"@odata.id": format!("/redfish/v1/Managers/{manager}/VirtualMedia/Floppy")},
            {"@odata.id": format!("/redfish/v1/Managers/{manager}/VirtualMedia/Cd")}
        ]
    }))
}

async fn get_media(Path((_manager, media)): Path<(String, String)>) -> Result<String, StatusCode> {
    match media.as_str() {
        "Cd" => Ok(json!({"Id": "Cd", "MediaTypes": ["CD", "DVD"], "Inserted": false}).to_string()),
        "Floppy" => Ok(json!({"Id": "Floppy", "MediaTypes": ["Floppy", "USBStick"]}).to_string()),
        "garbled" => Ok("this is not json".to_string()),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn insert_media(
    State(bmc): State<Bmc>,
    Path((_manager, media)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> StatusCode {
    bmc.record(&format!("insert {media}"), body);
    StatusCode::NO_CONTENT
}

async fn eject_media(
    State(bmc): State<Bmc>,
    Path((_manager, media)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> StatusCode {
    bmc.record(&format!("eject {media}"), body);
    StatusCode::NO_CONTENT
}

fn router(bmc: &Bmc) -> Router {
    Router::new()
        .route("/redfish/v1/Systems/{id}", get(get_system).patch(patch_system))
        .route("/redfish/v1/Systems/{id}/Actions/ComputerSystem.Reset", post(reset_system))
        .route("/redfish/v1/Managers/{id}/VirtualMedia", get(list_media))
        .route("/redfish/v1/Managers/{id}/VirtualMedia/{media}", get(get_media))
        .route(
            "/redfish/v1/Managers/{id}/VirtualMedia/{media}/Actions/VirtualMedia.InsertMedia",
            post(insert_media),
        )
        .route(
            "/redfish/v1/Managers/{id}/VirtualMedia/{media}/Actions/VirtualMedia.EjectMedia",
            post(eject_media),
        )
        .with_state(bmc.clone())
}

async fn start_bmc() -> (String, Bmc) {
    let bmc = Bmc::default();
    let app = router(&bmc);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), bmc)
}

/// TCP listener that completes a TLS handshake before axum sees the connection
struct TlsListener {
    tcp: TcpListener,
    acceptor: TlsAcceptor,
}

impl Listener for TlsListener {
    type Io = TlsStream<TcpStream>;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        loop {
            let Ok((stream, addr)) = self.tcp.accept().await else {
                continue;
            };
            // a client that verifies the certificate aborts the handshake
            if let Ok(tls) = self.acceptor.accept(stream).await {
                return (tls, addr);
            }
        }
    }

    fn local_addr(&self) -> std::io::Result<Self::Addr> {
        self.tcp.local_addr()
    }
}

/// Same BMC served over HTTPS with a freshly generated self-signed certificate
async fn start_tls_bmc() -> String {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()])
            .unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));
    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .unwrap();

    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let listener = TlsListener {
        tcp,
        acceptor: TlsAcceptor::from(Arc::new(config)),
    };
    let app = router(&Bmc::default());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("https://{addr}")
}

/// Local address with nothing listening on it
async fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn client(base_url: &str) -> RedfishClient {
    // the fake BMC is local; never route it through a proxy from the environment
    RedfishClient::new(base_url, TransportConfig::default().with_proxy(false)).unwrap()
}

fn admin() -> AuthContext {
    AuthContext::new().with_basic_auth("admin", "password")
}

#[tokio::test]
async fn test_get_system_with_basic_auth() {
    let (url, _bmc) = start_bmc().await;
    let client = client(&url);

    let system = client.get_system(&admin(), "node-1").await.unwrap();
    assert_eq!(system.id, "node-1");
    assert_eq!(system.manager_reference(), Some("/redfish/v1/Managers/bmc-1"));
    assert_eq!(
        system.boot.unwrap().allowable_targets,
        vec![BootSourceOverrideTarget::Pxe, BootSourceOverrideTarget::Cd, BootSourceOverrideTarget::Hdd]
    );
}

#[tokio::test]
async fn test_missing_credentials_is_authentication_error() {
    let (url, _bmc) = start_bmc().await;
    let client = client(&url);

    let result = client.get_system(&AuthContext::new(), "node-1").await;
    assert!(matches!(result, Err(RedfishError::Authentication(_))));
}

#[tokio::test]
async fn test_status_mapping() {
    let (url, _bmc) = start_bmc().await;
    let client = client(&url);

    let missing = client.get_system(&admin(), "node-9").await;
    assert!(matches!(missing, Err(RedfishError::NotFound(_))));

    let broken = client.get_system(&admin(), "broken").await;
    assert!(matches!(broken, Err(RedfishError::Api { status: 500, .. })));
}

#[tokio::test]
async fn test_decode_failure_reports_body() {
    let (url, _bmc) = start_bmc().await;
    let client = client(&url);

    match client.get_virtual_media(&admin(), "bmc-1", "garbled").await {
        Err(RedfishError::Api { status, message }) => {
            assert_eq!(status, 200);
            assert!(message.contains("this is not json"));
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_virtual_media_discovery() {
    let (url, _bmc) = start_bmc().await;
    let client = client(&url);
    let ctx = admin();

    let collection = client.get_virtual_media_collection(&ctx, "bmc-1").await.unwrap();
    assert_eq!(collection.members.len(), 2);
    assert_eq!(collection.members_count, Some(2));

    let cd = client.get_virtual_media(&ctx, "bmc-1", "Cd").await.unwrap();
    assert_eq!(cd.optical_media_type(), Some(MediaType::Cd));
    assert!(!cd.is_inserted());

    let floppy = client.get_virtual_media(&ctx, "bmc-1", "Floppy").await.unwrap();
    assert_eq!(floppy.optical_media_type(), None);
}

#[tokio::test]
async fn test_mutating_calls_send_redfish_bodies() {
    let (url, bmc) = start_bmc().await;
    let client = client(&url);
    let ctx = admin();

    client.eject_media(&ctx, "bmc-1", "Cd").await.unwrap();
    client.insert_media(&ctx, "bmc-1", "Cd", "http://images/install.iso").await.unwrap();
    client
        .set_boot_source_override(&ctx, "node-1", BootSourceOverrideTarget::Cd, BootSourceOverrideEnabled::Once)
        .await
        .unwrap();
    client.reset_system(&ctx, "node-1", ResetType::ForceRestart).await.unwrap();

    assert_eq!(
        bmc.received(),
        vec![
            ("eject Cd".to_string(), json!({})),
            (
                "insert Cd".to_string(),
                json!({"Image": "http://images/install.iso", "Inserted": true, "WriteProtected": true})
            ),
            (
                "patch node-1".to_string(),
                json!({"Boot": {"BootSourceOverrideTarget": "Cd", "BootSourceOverrideEnabled": "Once"}})
            ),
            ("reset node-1".to_string(), json!({"ResetType": "ForceRestart"})),
        ]
    );
}

#[tokio::test]
async fn test_cancel_aborts_in_flight_request() {
    let (url, _bmc) = start_bmc().await;
    let client = client(&url);
    let ctx = admin();

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result = client.get_system(&ctx, "slow").await;
    assert!(matches!(result, Err(RedfishError::Cancelled)));
}

#[tokio::test]
async fn test_self_signed_certificate_rejected_by_default() {
    let url = start_tls_bmc().await;
    let client = client(&url);

    let result = client.get_system(&admin(), "node-1").await;
    assert!(matches!(result, Err(RedfishError::Http(_))), "got {result:?}");
}

#[tokio::test]
async fn test_insecure_tls_accepts_self_signed_certificate() {
    let url = start_tls_bmc().await;
    let transport = TransportConfig::default().with_insecure_tls(true).with_proxy(false);
    let client = RedfishClient::new(&url, transport).unwrap();

    let system = client.get_system(&admin(), "node-1").await.unwrap();
    assert_eq!(system.id, "node-1");
}

#[tokio::test]
async fn test_requests_go_through_configured_proxy() {
    let (url, bmc) = start_bmc().await;
    let proxy = dead_address().await;
    let transport = TransportConfig::default().with_proxy_url(&proxy);
    let client = RedfishClient::new(&url, transport).unwrap();

    let result = client.reset_system(&admin(), "node-1", ResetType::ForceRestart).await;
    assert!(matches!(result, Err(RedfishError::Http(_))), "got {result:?}");
    // the BMC was never reached
    assert!(bmc.received().is_empty());
}

#[tokio::test]
async fn test_disabled_proxy_connects_directly() {
    let (url, bmc) = start_bmc().await;
    let proxy = dead_address().await;
    let transport = TransportConfig::default().with_proxy_url(&proxy).with_proxy(false);
    let client = RedfishClient::new(&url, transport).unwrap();

    client.reset_system(&admin(), "node-1", ResetType::ForceRestart).await.unwrap();
    assert_eq!(bmc.received().len(), 1);
}

#[tokio::test]
#[ignore] // Requires a reachable BMC
async fn test_real_bmc_system_lookup() {
    let url = std::env::var("REDFISH_URL").unwrap_or_else(|_| "https://localhost:8443".to_string());
    let system_id = std::env::var("EPHEMERAL_NODE_ID").expect("EPHEMERAL_NODE_ID environment variable must be set");
    let username = std::env::var("REDFISH_USERNAME").unwrap_or_default();
    let password = std::env::var("REDFISH_PASSWORD").unwrap_or_default();

    let client = RedfishClient::new(url, TransportConfig::default().with_insecure_tls(true))
        .expect("Failed to create client");
    let ctx = AuthContext::new().with_basic_auth(username, password);

    let system = client.get_system(&ctx, &system_id).await.expect("Failed to get system");
    println!("System {} managed by {:?}", system.id, system.manager_reference());
}
