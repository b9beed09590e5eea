use lambda_runtime::{service_fn, Error, LambdaEvent};
use provision_lambda::adapters::publish::RequestPublisher;
use provision_lambda::handlers::intake::{handle_intake_event, ApiGatewayResponse};
use serde_json::Value;

#[derive(Debug)]
struct SnsRequestPublisher {
    sns_client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl RequestPublisher for SnsRequestPublisher {
    fn publish(&self, message_body: &str) -> Result<String, String> {
        let client = self.sns_client.clone();
        let topic_arn = self.topic_arn.clone();
        let body = message_body.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .publish()
                    .topic_arn(topic_arn)
                    .message(body)
                    .send()
                    .await
                    .map_err(|error| format!("failed to publish provisioning request: {error}"))?;
                output
                    .message_id()
                    .map(str::to_string)
                    .ok_or_else(|| "SNS publish response did not include a message id".to_string())
            })
        })
    }
}

#[derive(Debug)]
struct IntakeDependencies {
    publisher: SnsRequestPublisher,
}

/// Cold-start initialization. A missing topic identifier is fatal here,
/// before any request is served; the SNS client is built exactly once and
/// reused across invocations.
async fn init_dependencies() -> Result<IntakeDependencies, Error> {
    let topic_arn = std::env::var("SNS_TOPIC_ARN")
        .map_err(|_| Error::from("SNS_TOPIC_ARN must be configured"))?;

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    Ok(IntakeDependencies {
        publisher: SnsRequestPublisher {
            sns_client: aws_sdk_sns::Client::new(&config),
            topic_arn,
        },
    })
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &IntakeDependencies,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_intake_event(event.payload, &deps.publisher))
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
