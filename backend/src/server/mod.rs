//! Server construction and middleware wiring.

mod config;

pub use config::{ProviderEndpoint, ServerConfig};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    AppointmentCommand, AppointmentQuery, CaseCommand, CaseQuery, ChatCommand, ChatProvider,
    ChatQuery, FixtureAppointmentCommand, FixtureAppointmentQuery, FixtureCaseCommand,
    FixtureCaseQuery, FixtureChatCommand, FixtureChatProvider, FixtureChatQuery,
    FixtureIdentityService, FixtureLawyerQuery, FixtureMailer, IdentityService, LawyerQuery,
    Mailer,
};
use crate::domain::{
    AppointmentService, AuthService, CaseService, ChatService, DirectoryService,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::tokens::TokenSigner;
use crate::inbound::ws;
use crate::inbound::ws::state::WsState;
use crate::inbound::ws::OriginPolicy;
use crate::middleware::Trace;
use crate::outbound::chat::HttpChatProvider;
use crate::outbound::email::HttpMailer;
use crate::outbound::persistence::{
    DbPool, DieselAppointmentRepository, DieselAvailabilityRepository, DieselCaseRepository,
    DieselLawyerDirectory, DieselMessageRepository, DieselUserRepository,
};

fn provider_client_error(concern: &str, error: reqwest::Error) -> std::io::Error {
    std::io::Error::other(format!("{concern} client construction failed: {error}"))
}

fn build_identity_service(config: &ServerConfig) -> Arc<dyn IdentityService> {
    match &config.db_pool {
        Some(pool) => Arc::new(AuthService::new(Arc::new(DieselUserRepository::new(
            pool.clone(),
        )))),
        None => Arc::new(FixtureIdentityService),
    }
}

fn case_pair_with_mailer<M>(
    pool: &DbPool,
    mailer: Arc<M>,
) -> (Arc<dyn CaseCommand>, Arc<dyn CaseQuery>)
where
    M: Mailer + 'static,
{
    let service = Arc::new(CaseService::new(
        Arc::new(DieselCaseRepository::new(pool.clone())),
        Arc::new(DieselUserRepository::new(pool.clone())),
        mailer,
    ));
    (
        service.clone() as Arc<dyn CaseCommand>,
        service as Arc<dyn CaseQuery>,
    )
}

/// Case command/query pair backed by the database when a pool is present.
///
/// Decision emails go through the configured provider; without one the
/// fixture mailer swallows them, which matches their best-effort contract.
fn build_case_pair(
    config: &ServerConfig,
) -> std::io::Result<(Arc<dyn CaseCommand>, Arc<dyn CaseQuery>)> {
    let Some(pool) = &config.db_pool else {
        return Ok((Arc::new(FixtureCaseCommand), Arc::new(FixtureCaseQuery)));
    };
    match &config.email_provider {
        Some(provider) => {
            let mailer = HttpMailer::new(provider.endpoint.clone(), provider.api_key.clone())
                .map_err(|error| provider_client_error("email provider", error))?;
            Ok(case_pair_with_mailer(pool, Arc::new(mailer)))
        }
        None => Ok(case_pair_with_mailer(pool, Arc::new(FixtureMailer))),
    }
}

fn build_appointment_pair(
    config: &ServerConfig,
) -> (Arc<dyn AppointmentCommand>, Arc<dyn AppointmentQuery>) {
    match &config.db_pool {
        Some(pool) => {
            let service = Arc::new(AppointmentService::new(
                Arc::new(DieselAppointmentRepository::new(pool.clone())),
                Arc::new(DieselAvailabilityRepository::new(pool.clone())),
            ));
            (
                service.clone() as Arc<dyn AppointmentCommand>,
                service as Arc<dyn AppointmentQuery>,
            )
        }
        None => (
            Arc::new(FixtureAppointmentCommand),
            Arc::new(FixtureAppointmentQuery),
        ),
    }
}

fn chat_pair_with_provider<P>(
    pool: &DbPool,
    provider: Arc<P>,
) -> (Arc<dyn ChatCommand>, Arc<dyn ChatQuery>)
where
    P: ChatProvider + 'static,
{
    let service = Arc::new(ChatService::new(
        Arc::new(DieselMessageRepository::new(pool.clone())),
        provider,
    ));
    (
        service.clone() as Arc<dyn ChatCommand>,
        service as Arc<dyn ChatQuery>,
    )
}

fn build_chat_pair(
    config: &ServerConfig,
) -> std::io::Result<(Arc<dyn ChatCommand>, Arc<dyn ChatQuery>)> {
    let Some(pool) = &config.db_pool else {
        return Ok((Arc::new(FixtureChatCommand), Arc::new(FixtureChatQuery)));
    };
    match &config.chat_provider {
        Some(provider) => {
            let provider =
                HttpChatProvider::new(provider.endpoint.clone(), provider.api_key.clone())
                    .map_err(|error| provider_client_error("conversations provider", error))?;
            Ok(chat_pair_with_provider(pool, Arc::new(provider)))
        }
        None => Ok(chat_pair_with_provider(pool, Arc::new(FixtureChatProvider))),
    }
}

fn build_lawyer_query(config: &ServerConfig) -> Arc<dyn LawyerQuery> {
    match &config.db_pool {
        Some(pool) => Arc::new(DirectoryService::new(Arc::new(DieselLawyerDirectory::new(
            pool.clone(),
        )))),
        None => Arc::new(FixtureLawyerQuery),
    }
}

/// Build the shared HTTP state from configured ports and fixture fallbacks.
fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let identity = build_identity_service(config);
    let (case_command, case_query) = build_case_pair(config)?;
    let (appointment_command, appointment_query) = build_appointment_pair(config);
    let (chat_command, chat_query) = build_chat_pair(config)?;
    let lawyer_query = build_lawyer_query(config);

    Ok(HttpState {
        identity,
        case_command,
        case_query,
        appointment_command,
        appointment_query,
        chat_command,
        chat_query,
        lawyer_query,
    })
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
    signer: web::Data<TokenSigner>,
    origin_policy: web::Data<OriginPolicy>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
        signer,
        origin_policy,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .app_data(signer)
        .app_data(origin_policy)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api))
        .service(ws::ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when an outbound provider client cannot be
/// built, or when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let ws_state = web::Data::new(WsState::new(http_state.chat_command.clone()));
    let http_state = web::Data::new(http_state);
    let signer = web::Data::new(TokenSigner::new(&config.jwt_secret, config.secure_cookies));
    let origin_policy = web::Data::new(OriginPolicy::new(config.primary_host.clone()));

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
            signer: signer.clone(),
            origin_policy: origin_policy.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
