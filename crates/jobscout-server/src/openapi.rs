use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "jobscout API",
        version = "0.2.0",
        description = "Job search aggregator: fetches postings from multiple sources, enriches and scores them against the candidate profile, and returns the most relevant few."
    ),
    paths(crate::routes::search, crate::routes::health),
    components(schemas(
        crate::dto::SearchRequest,
        crate::dto::SearchResponse,
        crate::dto::JobResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "search", description = "Job search and ranking"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
