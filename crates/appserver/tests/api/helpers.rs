use appserver::{
    app,
    domain::{Backends, PhotoLinkStore},
    infra::firebase::Error as FirebaseError,
    AuthError, Authenticator, Chat, DBConnection, DatabasePoolConfig, NoopChat, NoopStorage,
    NotificationDispatcher, Notifier, PhotoStorage, Service, ServiceClient, ServiceSettings,
    build_reqwest_client, AppState,
};
use appserver_core::{ChatPreview, Message, Participant};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use httpmock::MockServer;
use mockall::mock;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

pub const TOKEN: &str = "valid-token";
const BOUNDARY: &str = "appserver-test-boundary";

mock! {
    #[derive(Send, Sync)]
    pub AuthService { }

    #[async_trait]
    impl Authenticator for AuthService {
        async fn token_is_valid(&self, token: &str) -> Result<bool, AuthError>;
        async fn resolve_identity(&self, token: &str) -> Result<i64, AuthError>;
        async fn register(&self, token: &str, email: &str) -> Result<i64, AuthError>;
    }
}

mock! {
    #[derive(Send, Sync)]
    pub PushNotifier { }

    #[async_trait]
    impl Notifier for PushNotifier {
        async fn set_push_token(&self, user_id: i64, token: &str) -> Result<(), FirebaseError>;
        async fn get_push_token(&self, user_id: i64) -> Result<Option<String>, FirebaseError>;
        async fn remove_push_token(&self, user_id: i64) -> Result<Option<String>, FirebaseError>;
        async fn send(&self, token: &str, title: &str, body: &str) -> Result<(), FirebaseError>;
    }
}

mock! {
    #[derive(Send, Sync)]
    pub BlobStorage { }

    #[async_trait]
    impl PhotoStorage for BlobStorage {
        async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, FirebaseError>;
        async fn remove(&self, path: &str) -> Result<(), FirebaseError>;
    }
}

mock! {
    #[derive(Send, Sync)]
    pub ChatRoom { }

    #[async_trait]
    impl Chat for ChatRoom {
        async fn send_message(
            &self,
            message: &str,
            sender: &Participant,
            receiver: &Participant,
        ) -> Result<Message, FirebaseError>;
        async fn messages_between(&self, user_id: i64, other_id: i64) -> Result<Vec<Message>, FirebaseError>;
        async fn chats_of(&self, user_id: i64) -> Result<Vec<ChatPreview>, FirebaseError>;
    }
}

/// Auth service accepting [`TOKEN`] for `user_id`.
pub fn authenticated_as(user_id: i64) -> MockAuthService {
    let mut auth = MockAuthService::new();
    auth.expect_token_is_valid()
        .returning(|token| Ok(token == TOKEN));
    auth.expect_resolve_identity()
        .returning(move |_| Ok(user_id));
    auth
}

/// Notifier without any registered device.
pub fn silent_notifier() -> MockPushNotifier {
    let mut notifier = MockPushNotifier::new();
    notifier.expect_get_push_token().returning(|_| Ok(None));
    notifier.expect_send().never();
    notifier
}

pub struct TestApp {
    pub listing: MockServer,
    pub users: MockServer,
    pub payments: MockServer,
    pub photo_links: PhotoLinkStore,
    pub tracker: TaskTracker,
    pub router: Router,
}

pub struct TestAppBuilder {
    auth: MockAuthService,
    notifier: Arc<dyn Notifier>,
    storage: Arc<dyn PhotoStorage>,
    chat: Arc<dyn Chat>,
}

impl TestAppBuilder {
    pub fn new(auth: MockAuthService) -> Self {
        Self {
            auth,
            notifier: Arc::new(silent_notifier()),
            storage: Arc::new(NoopStorage),
            chat: Arc::new(NoopChat),
        }
    }

    pub fn notifier(mut self, notifier: MockPushNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn storage(mut self, storage: MockBlobStorage) -> Self {
        self.storage = Arc::new(storage);
        self
    }

    pub fn chat(mut self, chat: MockChatRoom) -> Self {
        self.chat = Arc::new(chat);
        self
    }

    pub async fn build(self) -> TestApp {
        let listing = MockServer::start_async().await;
        let users = MockServer::start_async().await;
        let payments = MockServer::start_async().await;

        let client = build_reqwest_client();
        let service = |kind: Service, server: &MockServer| {
            ServiceClient::new(
                kind,
                client.clone(),
                &ServiceSettings {
                    base_url: server.base_url(),
                    api_key: String::from("test-key"),
                },
            )
        };

        let tracker = TaskTracker::new();
        let backends = Backends {
            listing: service(Service::Listing, &listing),
            users: service(Service::Users, &users),
            payments: service(Service::Payments, &payments),
            notifications: NotificationDispatcher::new(self.notifier, tracker.clone()),
        };

        let photo_links = PhotoLinkStore::new(test_db().await);
        let state = AppState::new(
            backends,
            Arc::new(self.auth),
            self.storage,
            self.chat,
            photo_links.clone(),
        );

        TestApp {
            listing,
            users,
            payments,
            photo_links,
            tracker,
            router: app(state, vec![String::from("http://localhost:19006")]),
        }
    }
}

static DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

async fn test_db() -> DBConnection {
    let name = format!("photos_{}", DB_COUNTER.fetch_add(1, Ordering::SeqCst));
    DBConnection::new("test_data", &name, DatabasePoolConfig::testing())
        .await
        .expect("in-memory photos db")
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, Some(TOKEN), body).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("x-access-token", token);
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    /// Posts `bytes` as the `file` part of a multipart form.
    pub async fn upload(&self, uri: &str, file_name: &str, bytes: &[u8]) -> (StatusCode, Value) {
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n",
            boundary = BOUNDARY,
            file_name = file_name
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("x-access-token", TOKEN)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.dispatch(request).await
    }

    /// Waits for every queued notification to be delivered.
    pub async fn notifications_flushed(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

pub fn room_json(id: i64, owner_uuid: i64, blocked: bool) -> Value {
    json!({
        "id": id,
        "title": "Exclusive offer in Las Toninas",
        "description": "Apartment with sights to the almighty beach",
        "type": "Apartment",
        "owner": "Johnny Bravo",
        "owner_uuid": owner_uuid,
        "price_per_day": 67,
        "latitude": 0.0,
        "longitude": 0.0,
        "location": "Las Toninas",
        "capacity": 4,
        "blocked": blocked,
        "created_at": "2020-11-20T18:02:20.965Z",
        "updated_at": "2020-11-20T18:02:20.965Z",
    })
}

pub fn user_json(id: i64, firstname: &str, lastname: &str) -> Value {
    json!({
        "id": id,
        "firstname": firstname,
        "lastname": lastname,
        "email": format!("{}@bookbnb.com", firstname.to_lowercase()),
        "phonenumber": "1122334455",
        "country": "Argentina",
        "birthdate": "1990-01-01",
        "createdAt": "2020-11-20T18:02:20.965Z",
        "updatedAt": "2020-11-20T18:02:20.965Z",
    })
}

pub fn payment_booking_json(id: i64, room_id: i64, booker_id: i64, room_owner_id: i64, status: i64) -> Value {
    json!({
        "id": id,
        "price": 134,
        "roomId": room_id,
        "bookerId": booker_id,
        "roomOwnerId": room_owner_id,
        "dateFrom": "2020-12-01",
        "dateTo": "2020-12-03",
        "bookingStatus": status,
        "transactionHash": "0xfeed",
        "transactionStatus": 1,
        "createdAt": "2020-11-20T18:02:20.965Z",
        "updatedAt": "2020-11-20T18:02:20.965Z",
    })
}

pub fn photo_json(id: i64, room_id: i64, firebase_id: i64) -> Value {
    json!({
        "url": format!("https://storage.googleapis.com/bookbnb.appspot.com/rooms/{}/{}", room_id, firebase_id),
        "firebase_id": firebase_id,
        "id": id,
        "room_id": room_id,
        "created_at": "2020-11-20T18:02:20.965Z",
        "updated_at": "2020-11-20T18:02:20.965Z",
    })
}

pub fn comment_json(id: i64, room_id: i64, commentator_id: i64, main_comment_id: Option<i64>) -> Value {
    json!({
        "id": id,
        "room_id": room_id,
        "comment": "Is the beach close?",
        "commentator": "Ana Lopez",
        "commentator_id": commentator_id,
        "main_comment_id": main_comment_id,
        "created_at": "2020-11-20T18:02:20.965Z",
        "updated_at": "2020-11-20T18:02:20.965Z",
    })
}
