//! Repositories for database operations
//!
//! Thin raw-SQL data access, one repository per aggregate. Queries use
//! plain `sqlx::query` with manual row mapping; enumerations are stored as
//! TEXT and parsed at this boundary. Cross-row invariants that need
//! atomicity (answer links, roster import, event deletion) run inside a
//! single transaction.

pub mod answer;
pub mod customer;
pub mod event;
pub mod group;
pub mod image;
pub mod recap;
pub mod survey;
pub mod user;

pub use answer::AnswerRepository;
pub use customer::CustomerRepository;
pub use event::EventRepository;
pub use group::GroupRepository;
pub use image::ImageRepository;
pub use recap::RecapRepository;
pub use survey::SurveyRepository;
pub use user::UserRepository;
