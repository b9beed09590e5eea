use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use provision_lambda::adapters::secrets::CredentialStore;
use provision_lambda::adapters::source_control::{GithubClient, DEFAULT_API_URL};
use provision_lambda::handlers::worker::{handle_queue_event, MessageOutcome, WorkerConfig};
use serde_json::{json, Value};

struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl CredentialStore for SecretsManagerStore {
    fn fetch_secret(&self, secret_id: &str) -> Result<String, String> {
        let client = self.client.clone();
        let secret_id = secret_id.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_secret_value()
                    .secret_id(secret_id)
                    .send()
                    .await
                    .map_err(|error| format!("failed to fetch source-control secret: {error}"))?;
                output
                    .secret_string()
                    .map(str::to_string)
                    .ok_or_else(|| "secret has no string value".to_string())
            })
        })
    }
}

struct WorkerDependencies {
    config: WorkerConfig,
    gateway: GithubClient,
}

/// Cold-start initialization. Missing repository or secret configuration is
/// fatal here, before any message is processed; the GitHub credential is
/// fetched exactly once.
async fn init_dependencies() -> Result<WorkerDependencies, Error> {
    let repository = std::env::var("GITHUB_REPOSITORY")
        .map_err(|_| Error::from("GITHUB_REPOSITORY must be configured"))?;
    let secret_id = std::env::var("GITHUB_TOKEN_SECRET_ID")
        .map_err(|_| Error::from("GITHUB_TOKEN_SECRET_ID must be configured"))?;
    let base_branch =
        std::env::var("GITHUB_BASE_BRANCH").unwrap_or_else(|_| "main".to_string());
    let api_url =
        std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let credential_store = SecretsManagerStore {
        client: aws_sdk_secretsmanager::Client::new(&aws_config),
    };
    let token = credential_store.fetch_secret(&secret_id).map_err(Error::from)?;

    Ok(WorkerDependencies {
        config: WorkerConfig {
            repository: repository.clone(),
            base_branch,
        },
        gateway: GithubClient::new(&api_url, &repository, &token),
    })
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &WorkerDependencies,
) -> Result<Value, Error> {
    let now = Utc::now();
    let outcomes = tokio::task::block_in_place(|| {
        handle_queue_event(&event.payload, &deps.config, &deps.gateway, now)
    })
    .map_err(Error::from)?;

    let failed = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, MessageOutcome::Failed { .. }))
        .count();
    Ok(json!({
        "status": "ok",
        "processed": outcomes.len(),
        "failed": failed,
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let deps = init_dependencies().await?;
    let deps_ref = &deps;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps_ref).await
    }))
    .await
}
