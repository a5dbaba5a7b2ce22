//! SQLite persistence adapters.

pub mod analytics_repository;
pub mod connection;
pub mod draw_repository;
pub mod execution_repository;
pub mod migrations;
pub mod performance_repository;
pub mod ticket_repository;

pub use analytics_repository::SqliteAnalyticsRepository;
pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError};
pub use draw_repository::SqliteDrawRepository;
pub use execution_repository::SqliteExecutionRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use performance_repository::SqlitePerformanceRepository;
pub use ticket_repository::SqliteTicketRepository;
