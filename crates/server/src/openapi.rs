use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorBody { pub error: String }

#[derive(ToSchema)]
pub struct MessageBody { pub message: String }

#[derive(Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "rememberMe")]
    pub remember_me: Option<bool>,
}

#[derive(ToSchema)]
pub struct SignupRequest {
    pub email: String,
    /// At least 6 characters.
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile: Option<String>,
}

#[derive(ToSchema)]
pub struct IdentityDoc { pub id: String, pub email: String }

#[derive(ToSchema)]
pub struct SessionDoc {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: IdentityDoc,
}

/// `session` on success; `user` plus `message` when email confirmation is
/// pending.
#[derive(ToSchema)]
pub struct SessionEnvelope {
    pub session: Option<SessionDoc>,
    pub user: Option<IdentityDoc>,
    pub message: Option<String>,
}

#[derive(ToSchema)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub starting_bid: f64,
    pub buy_now_price: Option<f64>,
    /// RFC3339 timestamp.
    pub auction_end_time: String,
    pub location: String,
}

#[derive(ToSchema)]
pub struct ListingCreated {
    pub listing_id: String,
    pub status: String,
    pub message: String,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::signup,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::auth::profile,
        crate::routes::listings::create_listing,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            MessageBody,
            LoginRequest,
            SignupRequest,
            IdentityDoc,
            SessionDoc,
            SessionEnvelope,
            CreateListingRequest,
            ListingCreated,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "profile"),
        (name = "listings")
    )
)]
pub struct ApiDoc;
