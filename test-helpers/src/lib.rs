pub mod mock;
pub mod routes;

use std::net::TcpListener;

use actix_web::{App, HttpServer, web};
use payloads::requests;
use reqwest::StatusCode;

pub use mock::{Hit, MockBackend};

pub struct TestApp {
    #[allow(unused)]
    pub port: u16,
    pub address: String,
    pub backend: MockBackend,
}

impl TestApp {
    /// A fresh client with its own cookie jar, not yet logged in.
    pub fn client(&self) -> payloads::APIClient {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .cookie_store(true)
            .build()
            .unwrap();
        payloads::APIClient {
            address: self.address.clone(),
            inner_client: client,
        }
    }

    /// Register a public user who can log in with the seeded users'
    /// password.
    ///
    /// Using anyhow::Result keeps a backtrace from where the error was first
    /// converted. Run with RUST_BACKTRACE=1 to view.
    pub async fn create_user(&self, username: &str) -> anyhow::Result<()> {
        let details = requests::CreateAccount {
            first_name: username.to_uppercase(),
            last_name: "Tester".into(),
            username: username.into(),
            password: mock::ALICE_PASSWORD.into(),
        };
        self.client().create_account(&details).await?;
        Ok(())
    }

    /// A fresh client logged in as `username`. The mock serves one viewer
    /// at a time, so this logs out whoever was logged in before.
    pub async fn login_as(
        &self,
        username: &str,
    ) -> anyhow::Result<payloads::APIClient> {
        let client = self.client();
        let credentials = requests::LoginCredentials {
            username: username.into(),
            password: mock::ALICE_PASSWORD.into(),
        };
        let user = client.login(&credentials).await?;
        anyhow::ensure!(
            user.username == username,
            "logged in as {}",
            user.username
        );
        Ok(client)
    }
}

/// Start the mock API on an OS-assigned port, for parallel testing.
pub async fn spawn_app() -> TestApp {
    let backend = MockBackend::new();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let data = web::Data::new(backend.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();
    tokio::spawn(server);

    TestApp {
        port,
        address: format!("http://127.0.0.1:{port}"),
        backend,
    }
}

pub fn alice_credentials() -> requests::LoginCredentials {
    requests::LoginCredentials {
        username: mock::ALICE_USERNAME.into(),
        password: mock::ALICE_PASSWORD.into(),
    }
}

/// Assert that the result of an API action results in a specific status code.
pub fn assert_status_code<T>(
    result: Result<T, payloads::ClientError>,
    expected: StatusCode,
) {
    match result {
        Err(payloads::ClientError::APIError(code, _)) => {
            assert_eq!(code, expected)
        }
        _ => panic!("Expected APIError"),
    };
}
