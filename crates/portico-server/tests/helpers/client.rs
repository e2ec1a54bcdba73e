//! Test client helpers.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use portico_server::{ServerConfig, create_router_with_routes};
use tower::ServiceExt;

use super::routes::test_routes;

/// Helper para tests de integracion HTTP.
pub struct TestClient {
    app: Router,
}

/// Cookie and token obtained from `/api/csrf/restore`.
#[derive(Debug, Clone)]
pub struct CsrfSession {
    /// `name=value` pair of the signed secret cookie.
    pub cookie: String,
    pub token: String,
}

impl TestClient {
    /// Crea un nuevo test client con el router proporcionado.
    pub fn new(app: Router) -> Self {
        Self { app }
    }

    /// Hace un GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.get_with_headers(uri, vec![]).await
    }

    /// Hace un GET request con headers personalizados.
    pub async fn get_with_headers(&self, uri: &str, headers: Vec<(&str, &str)>) -> TestResponse {
        self.send(Method::GET, uri, headers, Body::empty()).await
    }

    /// Hace un POST con body JSON.
    pub async fn post_json(
        &self,
        uri: &str,
        body: &str,
        headers: Vec<(&str, &str)>,
    ) -> TestResponse {
        let mut headers = headers;
        headers.push(("content-type", "application/json"));
        self.send(Method::POST, uri, headers, Body::from(body.to_string()))
            .await
    }

    /// Hace un POST con body JSON y una sesion CSRF valida.
    pub async fn post_json_with_csrf(&self, uri: &str, body: &str) -> TestResponse {
        let session = self.csrf_session().await;
        self.post_json(
            uri,
            body,
            vec![
                ("cookie", session.cookie.as_str()),
                ("x-csrf-token", session.token.as_str()),
            ],
        )
        .await
    }

    /// Obtiene cookie y token CSRF.
    pub async fn csrf_session(&self) -> CsrfSession {
        let response = self.get("/api/csrf/restore").await;
        response.assert_status(StatusCode::OK);

        let cookie = response
            .cookie_pair("_csrf")
            .expect("restore should set the _csrf cookie");
        let body: serde_json::Value = response.json();
        let token = body["XSRF-Token"]
            .as_str()
            .expect("restore should return a token")
            .to_string();

        CsrfSession { cookie, token }
    }

    /// Envia un request con metodo, headers y body arbitrarios.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        headers: Vec<(&str, &str)>,
        body: Body,
    ) -> TestResponse {
        let mut builder = Request::builder().uri(uri).method(method);

        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        self.request(builder.body(body).unwrap()).await
    }

    /// Ejecuta un request arbitrario.
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        TestResponse::from_response(response).await
    }
}

/// Wrapper sobre Response con helpers para assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    async fn from_response(response: Response<Body>) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        Self {
            status,
            headers,
            body,
        }
    }

    /// Retorna el body como string.
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Body is not valid UTF-8")
    }

    /// Parsea el body como JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON")
    }

    /// Retorna un header especifico.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Retorna todos los `Set-Cookie`.
    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Retorna el `Set-Cookie` completo de una cookie.
    pub fn set_cookie(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}=", name);
        self.set_cookies()
            .into_iter()
            .find(|c| c.starts_with(&prefix))
    }

    /// Retorna el par `name=value` de una cookie, sin atributos.
    pub fn cookie_pair(&self, name: &str) -> Option<String> {
        self.set_cookie(name)
            .and_then(|c| c.split(';').next())
            .map(|pair| pair.trim().to_string())
    }

    /// Verifica que el status sea el esperado.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Verifica que el Content-Type contenga el valor esperado.
    pub fn assert_content_type_contains(&self, expected: &str) -> &Self {
        let content_type = self
            .header("content-type")
            .expect("Response missing Content-Type header");

        assert!(
            content_type.contains(expected),
            "Expected Content-Type to contain '{}' but got '{}'",
            expected,
            content_type
        );
        self
    }

    /// Verifica que un header exista.
    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(
            self.headers.contains_key(name),
            "Expected header '{}' to exist",
            name
        );
        self
    }

    /// Verifica que un header no exista.
    pub fn assert_header_absent(&self, name: &str) -> &Self {
        assert!(
            !self.headers.contains_key(name),
            "Expected header '{}' to be absent but got '{:?}'",
            name,
            self.headers.get(name)
        );
        self
    }

    /// Verifica que un header tenga un valor especifico.
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let value = self
            .header(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));

        assert_eq!(
            value, expected,
            "Expected header '{}' to be '{}' but got '{}'",
            name, expected, value
        );
        self
    }
}

/// Crea un TestClient de desarrollo con las rutas de prueba.
pub fn client() -> TestClient {
    client_for("development")
}

/// Crea un TestClient para el environment indicado.
pub fn client_for(environment: &str) -> TestClient {
    let mut config = ServerConfig::for_environment(environment);
    config.csrf.secret = Some("integration-test-key".to_string());
    config.body.limit_bytes = 1024;

    TestClient::new(create_router_with_routes(&config, test_routes()))
}
