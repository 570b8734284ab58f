use crate::{
    api::routes::{
        accept_booking, add_favorite_room, add_user_feedback, comment_room, create_booking,
        create_room, create_user, delete_booking, delete_favorite_room, delete_push_token,
        delete_room, delete_room_comment, delete_room_photo, delete_room_rating,
        delete_room_review, delete_user, delete_user_feedback_entry, get_booking, get_bookings,
        get_chat_messages, get_favorite_rooms, get_me, get_my_bookings, get_my_chats,
        get_my_rooms, get_my_wallet, get_push_token, get_recommendations, get_room,
        get_room_comment, get_room_comments, get_room_photo, get_room_photos, get_room_rating,
        get_room_ratings, get_room_review, get_room_reviews, get_rooms, get_user,
        get_user_feedback, get_user_feedback_entry, get_users, health, rate_room,
        reject_booking, review_room, send_chat_message, set_push_token, update_profile_picture,
        update_room, update_room_rating, update_room_review, update_user, update_user_photo,
        upload_room_photo,
    },
    config::Settings,
    domain::{
        Backends, Bookings, Me, PhotoIdGenerator, PhotoLinkStore, Photos, RoomFeedback, Rooms,
        Users,
    },
    infra::{
        auth::{AuthClient, Authenticator, ACCESS_TOKEN_HEADER},
        chat::{Chat, FirebaseChat, NoopChat},
        db::{create_folder, DBConnection, DatabasePoolConfig},
        downstream::{Service, ServiceClient},
        notifier::{FirebaseNotifier, NoopNotifier, NotificationDispatcher, Notifier},
        storage::{FirebaseStorage, NoopStorage, PhotoStorage},
    },
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::{connect_info::IntoMakeServiceWithConnectInfo, ConnectInfo, Request},
    http::{Extensions, HeaderName, HeaderValue},
    middleware::{self, AddExtension, Next},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    serve::Serve,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::{error, info, warn};
use reqwest_middleware::{
    reqwest::{self, Client},
    ClientBuilder, ClientWithMiddleware, Middleware,
};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::signal::unix::{signal, SignalKind};
use tokio::{net::TcpListener, select};
use tokio_util::task::TaskTracker;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub struct Application {
    server: Serve<
        TcpListener,
        IntoMakeServiceWithConnectInfo<Router, SocketAddr>,
        AddExtension<Router, ConnectInfo<SocketAddr>>,
    >,
    background_tasks: TaskTracker,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            config.api_settings.domain, config.api_settings.port
        );
        let listener = SocketAddr::from_str(&address)?;
        let (app_state, background_tasks) = build_app(config.clone()).await?;
        let server = build_server(listener, app_state, config.api_settings.origins).await?;
        Ok(Self {
            server,
            background_tasks,
        })
    }

    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        info!("Starting server...");
        match self.server.with_graceful_shutdown(shutdown_signal()).await {
            Ok(_) => {
                info!("Server shutdown initiated");
                self.background_tasks.close();

                let timeout = tokio::time::sleep(std::time::Duration::from_secs(10));
                select! {
                    _ = self.background_tasks.wait() => {
                        info!("Pending notifications delivered");
                    }
                    _ = timeout => {
                        warn!("Pending notifications timed out during shutdown");
                    }
                }

                info!("Shutdown complete");
                Ok(())
            }
            Err(e) => {
                error!("Server shutdown error: {}", e);
                self.background_tasks.close();

                let _ = tokio::time::timeout(
                    std::time::Duration::from_secs(5),
                    self.background_tasks.wait(),
                )
                .await;

                Err(anyhow!("Error during server shutdown: {}", e))
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<dyn Authenticator>,
    pub bookings: Arc<Bookings>,
    pub rooms: Arc<Rooms>,
    pub feedback: Arc<RoomFeedback>,
    pub photos: Arc<Photos>,
    pub users: Arc<Users>,
    pub me: Arc<Me>,
}

impl AppState {
    /// Wires every orchestration service over the same downstream clients.
    pub fn new(
        backends: Backends,
        authenticator: Arc<dyn Authenticator>,
        storage: Arc<dyn PhotoStorage>,
        chat: Arc<dyn Chat>,
        photo_links: PhotoLinkStore,
    ) -> Self {
        let backends = Arc::new(backends);
        Self {
            bookings: Arc::new(Bookings::new(backends.clone())),
            rooms: Arc::new(Rooms::new(backends.clone())),
            feedback: Arc::new(RoomFeedback::new(backends.clone())),
            photos: Arc::new(Photos::new(
                backends.clone(),
                storage,
                photo_links,
                PhotoIdGenerator::default(),
            )),
            users: Arc::new(Users::new(backends.clone(), authenticator.clone())),
            me: Arc::new(Me::new(backends, chat)),
            authenticator,
        }
    }
}

pub async fn build_app(config: Settings) -> Result<(AppState, TaskTracker), anyhow::Error> {
    let reqwest_client = build_reqwest_client();
    let services = &config.services;

    let listing = ServiceClient::new(Service::Listing, reqwest_client.clone(), &services.listing);
    let users = ServiceClient::new(Service::Users, reqwest_client.clone(), &services.users);
    let payments = ServiceClient::new(Service::Payments, reqwest_client.clone(), &services.payments);
    let authenticator: Arc<dyn Authenticator> = Arc::new(AuthClient::new(ServiceClient::new(
        Service::Auth,
        reqwest_client.clone(),
        &services.auth,
    )));
    info!(
        "Downstream services configured, listing: {}, users: {}, payments: {}",
        listing.base_url(),
        users.base_url(),
        payments.base_url()
    );

    let firebase = &config.firebase_settings;
    let (notifier, storage, chat): (Arc<dyn Notifier>, Arc<dyn PhotoStorage>, Arc<dyn Chat>) =
        if firebase.enabled {
            info!("Firebase configured @ {}", firebase.database_url);
            (
                Arc::new(FirebaseNotifier::new(reqwest_client.clone(), firebase)),
                Arc::new(FirebaseStorage::new(reqwest_client.clone(), firebase)),
                Arc::new(FirebaseChat::new(reqwest_client, firebase)),
            )
        } else {
            warn!("Firebase disabled, photos, notifications and chats are not persisted");
            (
                Arc::new(NoopNotifier),
                Arc::new(NoopStorage),
                Arc::new(NoopChat),
            )
        };

    let tracker = TaskTracker::new();
    let notifications = NotificationDispatcher::new(notifier, tracker.clone());

    create_folder(&config.db_settings.data_folder)
        .map_err(|e| anyhow!("Error creating data folder: {}", e))?;
    let pool_config: DatabasePoolConfig = config.db_settings.clone().into();
    let photos_db = DBConnection::new(&config.db_settings.data_folder, "photos", pool_config)
        .await
        .map_err(|e| anyhow!("Error setting up photos db: {}", e))?;
    info!("Photo links stored @ {}", photos_db.database_path);

    let backends = Backends {
        listing,
        users,
        payments,
        notifications,
    };
    let app_state = AppState::new(
        backends,
        authenticator,
        storage,
        chat,
        PhotoLinkStore::new(photos_db),
    );
    Ok((app_state, tracker))
}

pub async fn build_server(
    socket_addr: SocketAddr,
    app_state: AppState,
    origins: Vec<String>,
) -> Result<
    Serve<
        TcpListener,
        IntoMakeServiceWithConnectInfo<Router, SocketAddr>,
        AddExtension<Router, ConnectInfo<SocketAddr>>,
    >,
    anyhow::Error,
> {
    let listener = TcpListener::bind(socket_addr).await?;

    info!("Setting up service");
    let app = app(app_state, origins);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
    info!(
        "Service running @: http://{}:{}",
        socket_addr.ip(),
        socket_addr.port()
    );
    Ok(server)
}

pub fn app(app_state: AppState, origins: Vec<String>) -> Router {
    let origins: Vec<HeaderValue> = origins
        .into_iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(ACCESS_TOKEN_HEADER),
        ])
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true);

    Router::new()
        .route("/health_check", get(health))
        .route("/bookings", post(create_booking).get(get_bookings))
        .route(
            "/bookings/{booking_id}",
            get(get_booking).delete(delete_booking),
        )
        .route("/bookings/{booking_id}/accept", post(accept_booking))
        .route("/bookings/{booking_id}/reject", post(reject_booking))
        .route("/rooms", post(create_room).get(get_rooms))
        .route(
            "/rooms/{room_id}",
            get(get_room).patch(update_room).delete(delete_room),
        )
        .route(
            "/rooms/{room_id}/ratings",
            post(rate_room).get(get_room_ratings),
        )
        .route(
            "/rooms/{room_id}/ratings/{rating_id}",
            get(get_room_rating)
                .patch(update_room_rating)
                .delete(delete_room_rating),
        )
        .route(
            "/rooms/{room_id}/reviews",
            post(review_room).get(get_room_reviews),
        )
        .route(
            "/rooms/{room_id}/reviews/{review_id}",
            get(get_room_review)
                .patch(update_room_review)
                .delete(delete_room_review),
        )
        .route(
            "/rooms/{room_id}/comments",
            post(comment_room).get(get_room_comments),
        )
        .route(
            "/rooms/{room_id}/comments/{comment_id}",
            get(get_room_comment).delete(delete_room_comment),
        )
        .route(
            "/rooms/{room_id}/photos",
            post(upload_room_photo).get(get_room_photos),
        )
        .route(
            "/rooms/{room_id}/photos/{firebase_id}",
            get(get_room_photo).delete(delete_room_photo),
        )
        .route("/recommendations", get(get_recommendations))
        .route("/users", post(create_user).get(get_users))
        .route(
            "/users/{user_id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/users/{user_id}/photo", patch(update_user_photo))
        .route(
            "/users/{user_id}/{feedback}",
            post(add_user_feedback).get(get_user_feedback),
        )
        .route(
            "/users/{user_id}/{feedback}/{entry_id}",
            get(get_user_feedback_entry).delete(delete_user_feedback_entry),
        )
        .route("/me", get(get_me))
        .route("/me/wallet", get(get_my_wallet))
        .route("/me/bookings", get(get_my_bookings))
        .route("/me/rooms", get(get_my_rooms))
        .route(
            "/me/token",
            post(set_push_token)
                .get(get_push_token)
                .delete(delete_push_token),
        )
        .route("/me/profile_picture", post(update_profile_picture))
        .route("/me/chats", get(get_my_chats))
        .route(
            "/me/chats/{other_id}",
            get(get_chat_messages).post(send_chat_message),
        )
        .route(
            "/me/favorite_rooms",
            post(add_favorite_room).get(get_favorite_rooms),
        )
        .route(
            "/me/favorite_rooms/{favorite_id}",
            delete(delete_favorite_room),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(Arc::new(app_state))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}

/// Shared outbound client, every downstream call goes through [`LoggingMiddleware`].
///
/// No retry layer: a failed downstream call is reported to the client as is.
pub fn build_reqwest_client() -> ClientWithMiddleware {
    ClientBuilder::new(Client::new())
        .with(LoggingMiddleware)
        .build()
}

struct LoggingMiddleware;

#[async_trait::async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let method = req.method().clone();
        let url = req.url().clone();

        info!("Making {} request to: {}", method, url);

        let result = next.run(req, extensions).await;

        match &result {
            Ok(response) => {
                info!("{} {} -> Status: {}", method, url, response.status());
            }
            Err(error) => {
                warn!("{} {} -> Error: {:?}", method, url, error);
            }
        }

        result
    }
}

async fn shutdown_signal() {
    let (mut sigint, mut sigterm) = match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to install signal handlers, waiting on ctrl-c: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for ctrl-c: {}", e);
            }
            return;
        }
    };

    select! {
        _ = sigint.recv() => info!("Received SIGINT signal"),
        _ = sigterm.recv() => info!("Received SIGTERM signal"),
    }
}
