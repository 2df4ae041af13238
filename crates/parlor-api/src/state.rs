//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository traits, but AppState pins them to the
//! concrete SQLite implementations.

use std::sync::Arc;

use parlor_core::reaper::Reaper;
use parlor_core::service::message::MessageService;
use parlor_core::service::presence::PresenceService;
use parlor_infra::sqlite::message::SqliteMessageRepository;
use parlor_infra::sqlite::participant::SqliteParticipantRepository;
use parlor_infra::sqlite::pool::DatabasePool;
use parlor_types::config::ParlorConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcretePresenceService = PresenceService<SqliteParticipantRepository>;

pub type ConcreteMessageService =
    MessageService<SqliteMessageRepository, SqliteParticipantRepository>;

pub type ConcreteReaper = Reaper<SqliteParticipantRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub presence: Arc<ConcretePresenceService>,
    pub messages: Arc<ConcreteMessageService>,
    pub reaper: Arc<ConcreteReaper>,
    pub config: Arc<ParlorConfig>,
}

impl AppState {
    /// Connect to the store named in `config` and wire services.
    pub async fn init(config: ParlorConfig) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&config.database_url).await?;
        Ok(Self::from_pool(db_pool, config))
    }

    /// Wire services over an already-open pool.
    pub fn from_pool(db_pool: DatabasePool, config: ParlorConfig) -> Self {
        let presence = Arc::new(PresenceService::new(SqliteParticipantRepository::new(
            db_pool.clone(),
        )));

        let messages = Arc::new(MessageService::new(
            SqliteMessageRepository::new(db_pool.clone()),
            SqliteParticipantRepository::new(db_pool),
        ));

        let reaper = Arc::new(Reaper::new(presence.clone(), config.reaper.clone()));

        Self {
            presence,
            messages,
            reaper,
            config: Arc::new(config),
        }
    }
}
