//! Application state shared across handlers

use common::cache::RedisPool;
use sqlx::PgPool;

use crate::files::FileStore;
use crate::jwt::JwtService;
use crate::repositories::{
    AnswerRepository, CustomerRepository, EventRepository, GroupRepository, ImageRepository,
    RecapRepository, SurveyRepository, UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub redis_pool: RedisPool,
    pub jwt_service: JwtService,
    pub file_store: FileStore,
    pub user_repository: UserRepository,
    pub group_repository: GroupRepository,
    pub event_repository: EventRepository,
    pub survey_repository: SurveyRepository,
    pub answer_repository: AnswerRepository,
    pub recap_repository: RecapRepository,
    pub customer_repository: CustomerRepository,
    pub image_repository: ImageRepository,
}
