use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

pub const PROMPT_TAG: &str = "Prompts";
pub const TRIGGER_TAG: &str = "Trigger";
pub const USAGE_TAG: &str = "TokenUsage";
pub const LOG_TAG: &str = "ExecutionLogs";
pub const AUTH_TAG: &str = "Auth";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Herald",
        description = "Scheduled prompt execution and token accounting service",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
        )
    ),
    tags(
        (name = PROMPT_TAG, description = "Scheduled prompt management endpoints"),
        (name = TRIGGER_TAG, description = "Execution trigger endpoints for the external scheduler"),
        (name = USAGE_TAG, description = "Token usage accounting endpoints"),
        (name = LOG_TAG, description = "Execution log query endpoints"),
        (name = AUTH_TAG, description = "Authentication endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer Token Authentication"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "apiKeyAuth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-api-key",
                    "Shared secret for the execution trigger",
                ))),
            );
        }
    }
}
