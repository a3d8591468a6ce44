use std::time::Duration;

use mongodb::{
    bson::doc,
    error::Result,
    options::{ClientOptions, ReadPreference, SelectionCriteria},
    Client,
};

pub mod initializers;
pub mod manager;
pub mod repositories;

const APP_NAME: &str = "netgames";

/// Driver operations the connection manager depends on.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, uri: &str) -> Result<Client>;

    async fn ping(&self, client: &Client) -> Result<()>;

    async fn shutdown(&self, client: Client) -> Result<()>;
}

pub struct MongoConnector {
    timeout: Duration,
}

impl MongoConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait::async_trait]
impl Connector for MongoConnector {
    async fn connect(&self, uri: &str) -> Result<Client> {
        let mut options = ClientOptions::parse(uri).await?;

        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(self.timeout);
        options.server_selection_timeout = Some(self.timeout);

        Client::with_options(options)
    }

    async fn ping(&self, client: &Client) -> Result<()> {
        ping(client).await
    }

    async fn shutdown(&self, client: Client) -> Result<()> {
        client.shutdown().await;

        Ok(())
    }
}

pub async fn ping(client: &Client) -> Result<()> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .selection_criteria(SelectionCriteria::ReadPreference(ReadPreference::Primary))
        .await?;

    Ok(())
}
