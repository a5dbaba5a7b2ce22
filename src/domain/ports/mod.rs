//! Ports (interfaces) between the pipeline core and its collaborators.

pub mod analytics_repository;
pub mod clock;
pub mod draw_repository;
pub mod draw_source;
pub mod execution_repository;
pub mod performance_repository;
pub mod ticket_repository;

pub use analytics_repository::{AnalyticsRepository, PairCount};
pub use clock::{FixedClock, LotteryClock, SystemClock};
pub use draw_repository::DrawRepository;
pub use draw_source::{BulkDrawSource, DrawSource};
pub use execution_repository::{ExecutionFilter, ExecutionRepository};
pub use performance_repository::PerformanceRepository;
pub use ticket_repository::TicketRepository;
