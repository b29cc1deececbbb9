//! Data connectors forwarding device events to external sinks.

// self
use crate::{
	_prelude::*,
	resource::{Resource, ResourceKind},
};

/// Forwards device events to an external sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataConnector {
	/// `projects/{project}/dataconnectors/{connector}`
	#[serde(default)]
	pub name: String,
	/// Human-readable name.
	#[serde(default)]
	pub display_name: String,
	/// `ACTIVE`, `USER_DISABLED` or `SYSTEM_DISABLED`.
	#[serde(default)]
	pub status: String,
	/// Event types forwarded; empty means all.
	#[serde(default)]
	pub events: Vec<String>,
	/// Device label keys included with each event.
	#[serde(default)]
	pub labels: Vec<String>,
	/// Sink type and its settings.
	#[serde(flatten)]
	pub config: DataConnectorConfig,
}
impl DataConnector {
	/// Creates an unnamed connector for the given sink.
	pub fn new(display_name: impl Into<String>, config: DataConnectorConfig) -> Self {
		Self {
			name: String::new(),
			display_name: display_name.into(),
			status: "ACTIVE".into(),
			events: Vec::new(),
			labels: Vec::new(),
			config,
		}
	}
}
impl Resource for DataConnector {
	const KIND: ResourceKind = ResourceKind::DataConnector;

	fn name(&self) -> &str {
		&self.name
	}
}

/// Sink type, tagged by `type`, together with the settings object the platform pairs with
/// it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataConnectorConfig {
	/// HTTPS push with an optional HMAC signature.
	HttpPush {
		/// Sink settings.
		#[serde(rename = "httpConfig")]
		http_config: HttpConfig,
	},
	/// Azure Service Bus queue or topic.
	AzureServiceBus {
		/// Sink settings.
		#[serde(rename = "azureServiceBusConfig")]
		azure_service_bus_config: AzureServiceBusConfig,
	},
	/// Azure Event Hub.
	AzureEventHub {
		/// Sink settings.
		#[serde(rename = "azureEventHubConfig")]
		azure_event_hub_config: AzureEventHubConfig,
	},
	/// Google Cloud Pub/Sub topic.
	GoogleCloudPubsub {
		/// Sink settings.
		#[serde(rename = "pubsubConfig")]
		pubsub_config: PubsubConfig,
	},
	/// AWS SQS queue.
	AwsSqs {
		/// Sink settings.
		#[serde(rename = "awsSqsConfig")]
		aws_sqs_config: AwsSqsConfig,
	},
}
impl DataConnectorConfig {
	/// Wire value of the `type` tag.
	pub const fn kind(&self) -> &'static str {
		match self {
			DataConnectorConfig::HttpPush { .. } => "HTTP_PUSH",
			DataConnectorConfig::AzureServiceBus { .. } => "AZURE_SERVICE_BUS",
			DataConnectorConfig::AzureEventHub { .. } => "AZURE_EVENT_HUB",
			DataConnectorConfig::GoogleCloudPubsub { .. } => "GOOGLE_CLOUD_PUBSUB",
			DataConnectorConfig::AwsSqs { .. } => "AWS_SQS",
		}
	}
}

/// HTTPS push settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
	/// Receiver URL.
	pub url: String,
	/// HMAC secret used to sign deliveries.
	pub signature_secret: String,
	/// Extra headers sent with each delivery.
	pub headers: BTreeMap<String, String>,
}

/// Azure Service Bus settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzureServiceBusConfig {
	/// Queue or topic URL.
	pub url: String,
	/// Entra ID application used to publish.
	pub authentication_config: AuthenticationConfig,
	/// Message broker properties.
	pub broker_properties: BrokerProperties,
}

/// Service Bus broker properties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrokerProperties {
	/// Correlation id stamped on each message.
	pub correlation_id: String,
}

/// Azure Event Hub settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzureEventHubConfig {
	/// Event Hub URL.
	pub url: String,
	/// Entra ID application used to publish.
	pub authentication_config: AuthenticationConfig,
}

/// Entra ID application identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthenticationConfig {
	/// Directory (tenant) id.
	pub tenant_id: String,
	/// Application (client) id.
	pub client_id: String,
}

/// Google Cloud Pub/Sub settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PubsubConfig {
	/// `projects/{gcp project}/topics/{topic}`
	pub topic: String,
	/// Audience of the identity token presented to Pub/Sub.
	pub audience: String,
}

/// AWS SQS settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AwsSqsConfig {
	/// Queue URL.
	pub queue_url: String,
	/// Role assumed to publish.
	pub aws_role_arn: String,
	/// Audience of the web identity token.
	pub audience: String,
}

/// Body of a data connector creation call; the platform assigns the name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDataConnectorRequest {
	/// Human-readable name.
	pub display_name: String,
	/// Initial status.
	pub status: String,
	/// Event types forwarded.
	pub events: Vec<String>,
	/// Device label keys included with each event.
	pub labels: Vec<String>,
	/// Sink type and its settings.
	#[serde(flatten)]
	pub config: DataConnectorConfig,
}
impl From<&DataConnector> for CreateDataConnectorRequest {
	fn from(connector: &DataConnector) -> Self {
		Self {
			display_name: connector.display_name.clone(),
			status: connector.status.clone(),
			events: connector.events.clone(),
			labels: connector.labels.clone(),
			config: connector.config.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::decode_json;

	#[test]
	fn decodes_the_sink_selected_by_type() {
		let connector = decode_json::<DataConnector>(
			br#"{
				"name": "projects/p1/dataconnectors/dc1",
				"type": "AWS_SQS",
				"displayName": "Queue",
				"status": "ACTIVE",
				"events": ["temperature"],
				"labels": ["room"],
				"httpConfig": null,
				"awsSqsConfig": {
					"queueUrl": "https://sqs.eu-north-1.amazonaws.com/1/q",
					"awsRoleArn": "arn:aws:iam::1:role/dt",
					"audience": "sts.amazonaws.com"
				}
			}"#,
		)
		.expect("Connector should decode.");

		assert_eq!(connector.config.kind(), "AWS_SQS");
		assert_eq!(connector.resource_name().map(|name| name.id().to_owned()), Ok("dc1".into()));

		match connector.config {
			DataConnectorConfig::AwsSqs { aws_sqs_config } =>
				assert_eq!(aws_sqs_config.aws_role_arn, "arn:aws:iam::1:role/dt"),
			other => panic!("Unexpected sink: {other:?}."),
		}
	}

	#[test]
	fn serializes_type_next_to_its_settings() {
		let connector = DataConnector::new("Push", DataConnectorConfig::HttpPush {
			http_config: HttpConfig {
				url: "https://receiver.example.com".into(),
				signature_secret: "s3cret".into(),
				headers: BTreeMap::new(),
			},
		});
		let value = serde_json::to_value(CreateDataConnectorRequest::from(&connector))
			.expect("Create request should serialize.");

		assert_eq!(value["type"], "HTTP_PUSH");
		assert_eq!(value["httpConfig"]["url"], "https://receiver.example.com");
		assert_eq!(value["displayName"], "Push");
		assert!(value.get("name").is_none());
	}

	#[test]
	fn missing_or_unknown_type_is_rejected() {
		assert!(decode_json::<DataConnector>(br#"{"name":"projects/p/dataconnectors/d"}"#).is_err());
		assert!(
			decode_json::<DataConnector>(
				br#"{"name":"projects/p/dataconnectors/d","type":"KAFKA"}"#
			)
			.is_err()
		);
	}
}
