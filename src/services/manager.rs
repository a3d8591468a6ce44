use std::{sync::Arc, time::Duration};

use mongodb::{bson::Document, Client, Collection, Database};

use crate::{
    config::Settings,
    models::{Achievement, GameType},
};

use super::{
    initializers::{default_initializers, Initializer},
    Connector, MongoConnector,
};

/// Owns the database client for the lifetime of the process.
///
/// `connect` and `disconnect` take `&mut self`, so the handle can only be set
/// and cleared by whoever owns the manager. Consumers get a cloned
/// [`Connection`].
pub struct ConnectionManager {
    settings: Settings,
    connector: Arc<dyn Connector>,
    initializers: Vec<Box<dyn Initializer>>,
    connection: Option<Connection>,
}

impl ConnectionManager {
    pub fn new(settings: Settings) -> Self {
        let connector = Arc::new(MongoConnector::new(settings.connect_timeout));

        Self::with_parts(settings, connector, default_initializers())
    }

    pub fn with_parts(
        settings: Settings,
        connector: Arc<dyn Connector>,
        initializers: Vec<Box<dyn Initializer>>,
    ) -> Self {
        Self {
            settings,
            connector,
            initializers,
            connection: None,
        }
    }

    /// Opens and verifies the client, binds the collections and runs the
    /// initializers. Initializer failures are returned as warnings on the
    /// connection instead of failing the call.
    pub async fn connect(&mut self) -> Result<Connection, DatabaseError> {
        if self.connection.is_some() {
            return Err(DatabaseError::AlreadyConnected);
        }

        let uri = self
            .settings
            .mongodb_uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
            .ok_or(DatabaseError::MissingConnectionString)?;

        let client = self.open(uri).await?;

        let database_name = self.settings.database_name.clone();
        let collections = Collections::bind(&client.database(&database_name));

        tracing::info!("Connected to MongoDB");

        let warnings = self.initialize(&client).await;

        let connection = Connection {
            client,
            database_name,
            collections,
            warnings,
        };

        self.connection = Some(connection.clone());

        Ok(connection)
    }

    /// Closes the held client. Does nothing when not connected.
    pub async fn disconnect(&mut self) -> Result<(), DatabaseError> {
        let Some(connection) = self.connection.take() else {
            tracing::debug!("Disconnect requested without an open connection");
            return Ok(());
        };

        self.connector
            .shutdown(connection.client)
            .await
            .map_err(DatabaseError::Disconnect)?;

        tracing::info!("Disconnected from MongoDB");

        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    async fn open(&self, uri: &str) -> Result<Client, DatabaseError> {
        let budget = self.settings.connect_timeout;

        let attempt = async {
            let client = self
                .connector
                .connect(uri)
                .await
                .map_err(DatabaseError::Connect)?;

            self.connector
                .ping(&client)
                .await
                .map_err(DatabaseError::Ping)?;

            Ok::<_, DatabaseError>(client)
        };

        tokio::time::timeout(budget, attempt)
            .await
            .map_err(|_| DatabaseError::Timeout(budget))?
    }

    async fn initialize(&self, client: &Client) -> Vec<InitWarning> {
        let mut warnings = Vec::new();

        for initializer in &self.initializers {
            let step = initializer.name();

            match initializer.run(client, &self.settings.database_name).await {
                Ok(()) => tracing::debug!("Initialized {step}"),
                Err(e) => {
                    tracing::warn!("Failed to initialize {step} | {e}");

                    warnings.push(InitWarning {
                        step,
                        message: e.to_string(),
                    });
                }
            }
        }

        warnings
    }
}

#[derive(Clone, Debug)]
pub struct Connection {
    client: Client,
    database_name: String,
    collections: Collections,
    warnings: Vec<InitWarning>,
}

impl Connection {
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> Database {
        self.client.database(&self.database_name)
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Initializers that failed while connecting.
    pub fn warnings(&self) -> &[InitWarning] {
        &self.warnings
    }
}

#[derive(Clone, Debug)]
pub struct Collections {
    pub users: Collection<Document>,
    pub scores: Collection<Document>,
    pub comments: Collection<Document>,
    pub game_types: Collection<GameType>,
    pub achievements: Collection<Achievement>,
    pub user_achievements: Collection<Document>,
}

impl Collections {
    fn bind(database: &Database) -> Self {
        Self {
            users: database.collection("users"),
            scores: database.collection("scores"),
            comments: database.collection("comments"),
            game_types: database.collection("game_types"),
            achievements: database.collection("achievements"),
            user_achievements: database.collection("user_achievements"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct InitWarning {
    pub step: &'static str,
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    #[error("MONGODB_URI environment variable not set")]
    MissingConnectionString,
    #[error("Failed to connect to MongoDB | {0}")]
    Connect(#[source] mongodb::error::Error),
    #[error("Failed to ping MongoDB | {0}")]
    Ping(#[source] mongodb::error::Error),
    #[error("MongoDB didn't answer within {0:?}")]
    Timeout(Duration),
    #[error("Failed to disconnect from MongoDB | {0}")]
    Disconnect(#[source] mongodb::error::Error),
    #[error("Already connected to MongoDB")]
    AlreadyConnected,
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
        time::Duration,
    };

    use mongodb::{error::Result, Client};

    use super::{ConnectionManager, DatabaseError};
    use crate::{
        config::Settings,
        services::{initializers::Initializer, Connector},
    };

    const URI: &str = "mongodb://localhost:27017";

    const STEPS: [&str; 4] = [
        "game types",
        "game score indexes",
        "achievements",
        "achievement indexes",
    ];

    fn injected(message: &str) -> mongodb::error::Error {
        std::io::Error::other(message.to_string()).into()
    }

    #[derive(Default)]
    struct StubConnector {
        fail_connect: bool,
        fail_ping: bool,
        hang_ping: bool,
        fail_shutdown: bool,
        connects: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Connector for StubConnector {
        async fn connect(&self, uri: &str) -> Result<Client> {
            self.connects.fetch_add(1, Ordering::SeqCst);

            if self.fail_connect {
                return Err(injected("connection refused"));
            }

            Client::with_uri_str(uri).await
        }

        async fn ping(&self, _client: &Client) -> Result<()> {
            if self.hang_ping {
                std::future::pending::<()>().await;
            }

            if self.fail_ping {
                return Err(injected("no primary available"));
            }

            Ok(())
        }

        async fn shutdown(&self, client: Client) -> Result<()> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);

            drop(client);

            if self.fail_shutdown {
                return Err(injected("close failed"));
            }

            Ok(())
        }
    }

    type Journal = Arc<Mutex<Vec<&'static str>>>;

    struct RecordingInitializer {
        step: &'static str,
        fail: bool,
        journal: Journal,
    }

    #[async_trait::async_trait]
    impl Initializer for RecordingInitializer {
        fn name(&self) -> &'static str {
            self.step
        }

        async fn run(&self, _client: &Client, database_name: &str) -> Result<()> {
            assert_eq!(database_name, "netgames");

            self.journal.lock().unwrap().push(self.step);

            if self.fail {
                return Err(injected("index build failed"));
            }

            Ok(())
        }
    }

    fn initializers(failing: Option<&str>, journal: &Journal) -> Vec<Box<dyn Initializer>> {
        STEPS
            .into_iter()
            .map(|step| {
                Box::new(RecordingInitializer {
                    step,
                    fail: failing == Some(step),
                    journal: journal.clone(),
                }) as Box<dyn Initializer>
            })
            .collect()
    }

    fn build_manager(
        settings: Settings,
        connector: Arc<StubConnector>,
        failing: Option<&str>,
    ) -> (ConnectionManager, Journal) {
        let journal = Journal::default();
        let initializers = initializers(failing, &journal);

        (
            ConnectionManager::with_parts(settings, connector, initializers),
            journal,
        )
    }

    fn settings() -> Settings {
        Settings::default().with_mongodb_uri(URI)
    }

    #[tokio::test]
    async fn test_missing_uri() {
        let connector = Arc::new(StubConnector::default());

        for uri in [None, Some(String::new())] {
            let settings = Settings {
                mongodb_uri: uri,
                ..Default::default()
            };
            let (mut manager, journal) = build_manager(settings, connector.clone(), None);

            let result = manager.connect().await;

            assert!(matches!(result, Err(DatabaseError::MissingConnectionString)));
            assert!(!manager.is_connected());
            assert!(journal.lock().unwrap().is_empty());
        }

        assert_eq!(connector.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_connect_failure_binds_nothing() {
        let connector = Arc::new(StubConnector {
            fail_connect: true,
            ..Default::default()
        });
        let (mut manager, journal) = build_manager(settings(), connector, None);

        let result = manager.connect().await;

        assert!(matches!(result, Err(DatabaseError::Connect(_))));
        assert!(manager.connection().is_none());
        assert!(journal.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ping_failure_binds_nothing() {
        let connector = Arc::new(StubConnector {
            fail_ping: true,
            ..Default::default()
        });
        let (mut manager, journal) = build_manager(settings(), connector, None);

        let result = manager.connect().await;

        assert!(matches!(result, Err(DatabaseError::Ping(_))));
        assert!(manager.connection().is_none());
        assert!(journal.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unanswered_ping_times_out() {
        let connector = Arc::new(StubConnector {
            hang_ping: true,
            ..Default::default()
        });
        let settings = Settings {
            connect_timeout: Duration::from_millis(50),
            ..settings()
        };
        let (mut manager, journal) = build_manager(settings, connector, None);

        let result = manager.connect().await;

        let budget = Duration::from_millis(50);
        assert!(matches!(result, Err(DatabaseError::Timeout(b)) if b == budget));
        assert!(!manager.is_connected());
        assert!(journal.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_binds_every_collection_once() {
        let connector = Arc::new(StubConnector::default());
        let (mut manager, journal) = build_manager(settings(), connector, None);

        let connection = manager.connect().await.unwrap();
        let c = connection.collections();

        let namespaces = [
            c.users.namespace(),
            c.scores.namespace(),
            c.comments.namespace(),
            c.game_types.namespace(),
            c.achievements.namespace(),
            c.user_achievements.namespace(),
        ];

        let names: HashSet<_> = namespaces.iter().map(|n| n.coll.as_str()).collect();
        let expected: HashSet<_> = [
            "users",
            "scores",
            "comments",
            "game_types",
            "achievements",
            "user_achievements",
        ]
        .into_iter()
        .collect();

        assert_eq!(names, expected);
        assert!(namespaces.iter().all(|n| n.db == "netgames"));
        assert_eq!(connection.database_name(), "netgames");
        assert!(connection.warnings().is_empty());
        assert_eq!(*journal.lock().unwrap(), STEPS.to_vec());
    }

    #[tokio::test]
    async fn test_failing_initializer_degrades_startup() {
        for failing in STEPS {
            let connector = Arc::new(StubConnector::default());
            let (mut manager, journal) = build_manager(settings(), connector, Some(failing));

            let connection = manager.connect().await.unwrap();

            assert!(manager.is_connected());
            assert_eq!(connection.collections().users.name(), "users");
            assert_eq!(
                connection.collections().user_achievements.name(),
                "user_achievements"
            );
            assert_eq!(connection.warnings().len(), 1);
            assert_eq!(connection.warnings()[0].step, failing);
            assert!(connection.warnings()[0].message.contains("index build failed"));
            assert_eq!(*journal.lock().unwrap(), STEPS.to_vec());
        }
    }

    #[tokio::test]
    async fn test_connect_twice() {
        let connector = Arc::new(StubConnector::default());
        let (mut manager, _) = build_manager(settings(), connector.clone(), None);

        manager.connect().await.unwrap();
        let result = manager.connect().await;

        assert!(matches!(result, Err(DatabaseError::AlreadyConnected)));
        assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disconnect_without_connection() {
        let connector = Arc::new(StubConnector::default());
        let (mut manager, _) = build_manager(settings(), connector.clone(), None);

        manager.disconnect().await.unwrap();

        assert_eq!(connector.shutdowns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disconnect_closes_once() {
        let connector = Arc::new(StubConnector::default());
        let (mut manager, _) = build_manager(settings(), connector.clone(), None);

        manager.connect().await.unwrap();

        manager.disconnect().await.unwrap();
        manager.disconnect().await.unwrap();

        assert!(!manager.is_connected());
        assert_eq!(connector.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disconnect_failure() {
        let connector = Arc::new(StubConnector {
            fail_shutdown: true,
            ..Default::default()
        });
        let (mut manager, _) = build_manager(settings(), connector.clone(), None);

        manager.connect().await.unwrap();

        let result = manager.disconnect().await;

        assert!(matches!(result, Err(DatabaseError::Disconnect(_))));
        assert!(!manager.is_connected());
    }
}
